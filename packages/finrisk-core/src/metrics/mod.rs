//! Asset-level risk metrics.
//!
//! Every function here is a pure transformation over an immutable table:
//!
//! - **Returns**: simple and log daily returns
//! - **Volatility**: daily, annualized and rolling standard deviation
//! - **Drawdown**: peak-relative drawdown and maximum drawdown
//! - **Correlation**: Pearson or Spearman correlation, sample covariance
//! - **Beta**: covariance-based sensitivity to a benchmark
//! - **Sharpe**: annualized risk-adjusted return

mod beta;
mod correlation;
mod drawdown;
mod returns;
mod sharpe;
pub(crate) mod stats;
mod volatility;

pub use beta::beta;
pub use correlation::{correlation_matrix, covariance_matrix, CorrelationMethod};
pub use drawdown::{drawdown, drawdown_table, SeriesDrawdown, TableDrawdown};
pub use returns::{log_returns, simple_returns, simple_series_returns};
pub use sharpe::sharpe;
pub use volatility::{
    annual_volatility, annualize, annualize_vector, daily_volatility, rolling_annual_volatility,
    rolling_volatility, RollingIter, RollingVolatility,
};
