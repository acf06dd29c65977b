//! FinRisk Core - Portfolio risk analytics library.
//!
//! This crate turns cleaned historical price tables into risk metrics and
//! stress-test outputs:
//!
//! - **Metrics**: simple/log returns, volatility, drawdown, correlation, beta, Sharpe ratio
//! - **Portfolio aggregation**: weighted returns, quadratic-form volatility,
//!   diversification benefit, Euler risk contribution
//! - **Stress testing**: market shock, single-asset concentration, correlation breakdown
//! - **Pipeline**: one call running the whole analysis into a serializable report
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use finrisk_core::metrics::simple_returns;
//! use finrisk_core::types::TimeSeriesTable;
//!
//! let dates: Vec<NaiveDate> = (1..=4)
//!     .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
//!     .collect();
//! let prices = TimeSeriesTable::new(
//!     dates,
//!     vec![("AAPL".to_string(), vec![100.0, 110.0, 99.0, 121.0])],
//! )
//! .unwrap();
//!
//! let returns = simple_returns(&prices).unwrap();
//! let aapl = returns.column("AAPL").unwrap();
//! assert!((aapl[0] - 0.10).abs() < 1e-12);
//! ```

pub mod config;
pub mod loader;
pub mod metrics;
pub mod pipeline;
pub mod portfolio;
pub mod report;
pub mod stress;
pub mod types;

// Re-export commonly used types
pub use config::RiskConfig;
pub use metrics::CorrelationMethod;
pub use portfolio::Weights;
pub use types::{
    ApiResponse, AssetMatrix, AssetVector, CorrelationMatrix, CovarianceMatrix, PriceTable,
    ReturnTable, RollingTable, Series, TimeSeriesTable,
};

// Re-export main functionality
pub use pipeline::{analyze, Analysis};
pub use report::RiskReport;

/// Error types for finrisk-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid table: {0}")]
    InvalidTable(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Zero variance: {0}")]
    ZeroVariance(String),

    #[error("Asset mismatch: {0}")]
    AssetMismatch(String),

    #[error("Weight mismatch: {0}")]
    WeightMismatch(String),

    #[error("Portfolio weights must sum to 1. Current sum = {0:.6}")]
    WeightSum(f64),

    #[error("Portfolio weights cannot be negative: {asset} = {weight}")]
    NegativeWeight { asset: String, weight: f64 },

    #[error("Shock must be between -100% and 0%, got {0}")]
    InvalidShock(f64),

    #[error("Correlation stress multiplier must be finite and non-negative, got {0}")]
    InvalidMultiplier(f64),

    #[error("Undefined ratio: {0}")]
    UndefinedRatio(String),
}

/// Result type for finrisk-core operations.
pub type Result<T> = std::result::Result<T, Error>;
