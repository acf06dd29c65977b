//! Analysis configuration.
//!
//! Loaded from TOML. Every field has a default, so a partial file (or no
//! file at all) is valid:
//!
//! ```toml
//! trading_days = 252
//! rolling_window = 21
//! correlation_method = "spearman"
//! market_shock = -0.20
//! asset_shock = -0.40
//! correlation_stress_multiplier = 1.5
//! benchmark = "^BSESN"
//!
//! [weights]
//! "RELIANCE.NS" = 0.4
//! "TCS.NS" = 0.35
//! "INFY.NS" = 0.25
//! ```

use crate::metrics::CorrelationMethod;
use crate::portfolio::{Weights, PORTFOLIO_ANNUALIZATION_DAYS};
use crate::stress::{validate_shock, CORRELATION_BREAKDOWN_MULTIPLIER};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the default config file location.
pub const CONFIG_ENV_VAR: &str = "FINRISK_CONFIG";

/// Parameters for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Trading days per year for asset-level annualization and the Sharpe ratio
    pub trading_days: u32,
    /// Rolling volatility window, also the minimum sample for daily volatility
    pub rolling_window: usize,
    /// Correlation estimator
    pub correlation_method: CorrelationMethod,
    /// Market-wide shock in [-1, 0]
    pub market_shock: f64,
    /// Single-asset concentration shock in [-1, 0]
    pub asset_shock: f64,
    /// Factor applied to correlations in the breakdown scenario
    pub correlation_stress_multiplier: f64,
    /// Benchmark label, informational only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<String>,
    /// Portfolio weights by asset
    pub weights: Weights,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            trading_days: PORTFOLIO_ANNUALIZATION_DAYS,
            rolling_window: 21,
            correlation_method: CorrelationMethod::Pearson,
            market_shock: -0.20,
            asset_shock: -0.40,
            correlation_stress_multiplier: CORRELATION_BREAKDOWN_MULTIPLIER,
            benchmark: None,
            weights: Weights::default(),
        }
    }
}

impl RiskConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load from `path` if given, else from [`Self::default_path`] if that
    /// file exists, else fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default = Self::default_path();
        if default.exists() {
            return Self::load(&default);
        }

        tracing::debug!(path = %default.display(), "no config file, using defaults");
        Ok(Self::default())
    }

    /// Get the default config file path.
    ///
    /// Default path: `<config dir>/finrisk/config.toml`.
    /// Can be overridden with the `FINRISK_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("finrisk/config.toml"))
            .unwrap_or_else(|| PathBuf::from("finrisk.toml"))
    }

    /// Check parameter ranges. Weights are validated later, against the
    /// asset universe of the data they are applied to.
    pub fn validate(&self) -> Result<()> {
        if self.trading_days == 0 {
            return Err(Error::Config("trading_days must be positive".to_string()));
        }
        if self.rolling_window < 2 {
            return Err(Error::Config(format!(
                "rolling_window must be at least 2, got {}",
                self.rolling_window
            )));
        }
        validate_shock(self.market_shock)?;
        validate_shock(self.asset_shock)?;
        let multiplier = self.correlation_stress_multiplier;
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(Error::Config(format!(
                "correlation_stress_multiplier must be positive, got {}",
                multiplier
            )));
        }
        Ok(())
    }

    /// Whether asset-level annualization uses the same year length as the
    /// fixed portfolio-level constant.
    pub fn uses_standard_year(&self) -> bool {
        self.trading_days == PORTFOLIO_ANNUALIZATION_DAYS
    }
}
