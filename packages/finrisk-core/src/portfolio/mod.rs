//! Portfolio aggregation module.
//!
//! Provides weight validation and the portfolio-level return, volatility,
//! diversification and risk-contribution calculations.

mod aggregation;
mod weights;

pub use aggregation::{
    annual_portfolio_volatility, asset_risk_contribution, daily_portfolio_volatility,
    diversification_benefit, portfolio_annual_return, portfolio_returns, portfolio_value_series,
    PORTFOLIO_ANNUALIZATION_DAYS,
};
pub(crate) use aggregation::quadratic_form_volatility;
pub(crate) use weights::ensure_aligned;
pub use weights::{validate_weights, Weights, WEIGHT_SUM_TOLERANCE};
