//! Stress testing.
//!
//! Applies hypothetical shocks to a weighted portfolio:
//!
//! - **Market shock**: a benchmark move propagated through asset betas
//! - **Concentration shock**: one asset collapses while the rest stay flat
//! - **Correlation breakdown**: all correlations rise, volatility is recomputed
//!
//! Shock magnitudes are bounded to [-1, 0].

mod scenarios;

pub use scenarios::{
    annual_correlation_breakdown_volatility, concentration_stress_loss,
    correlation_breakdown_volatility, portfolio_loss, stressed_asset_returns, validate_shock,
    CORRELATION_BREAKDOWN_MULTIPLIER,
};
