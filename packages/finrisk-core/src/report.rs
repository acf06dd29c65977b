//! Risk report types and JSON output.

use crate::types::{AssetVector, CorrelationMatrix};
use crate::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Complete output of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub generated_at: DateTime<Utc>,
    pub assets: Vec<String>,
    /// Number of return observations (price rows minus one)
    pub observations: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub portfolio_metrics: PortfolioMetrics,
    pub stress_test_results: StressTestResults,
    pub asset_metrics: BTreeMap<String, AssetMetrics>,
    pub correlation_matrix: CorrelationMatrix,
}

/// Portfolio-level summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortfolioMetrics {
    /// Compounded return over the whole sample
    pub annual_return: f64,
    pub daily_volatility: f64,
    pub annual_volatility: f64,
    pub max_drawdown: f64,
    pub diversification_benefit: f64,
}

/// Results of the three stress scenarios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressTestResults {
    pub market_shock: f64,
    pub market_shock_loss: f64,
    pub asset_shock: f64,
    /// Portfolio loss when only that asset is shocked
    pub concentration_losses: AssetVector,
    pub concentration_loss_total: f64,
    pub correlation_breakdown_daily_volatility: f64,
    pub diversification_failure_volatility: f64,
}

/// Per-asset metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssetMetrics {
    pub daily_volatility: f64,
    pub annual_volatility: f64,
    pub sharpe_ratio: f64,
    pub beta: f64,
    pub max_drawdown: f64,
    pub risk_contribution: f64,
}

impl RiskReport {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write a report as pretty JSON, creating parent directories as needed.
pub fn write_report(path: &Path, report: &RiskReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report.to_json()?)?;
    tracing::info!(path = %path.display(), "wrote risk report");
    Ok(())
}
