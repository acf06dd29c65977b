//! End-to-end analysis pipeline.
//!
//! Runs every metric, the portfolio aggregation and the stress scenarios over
//! one cleaned price table and assembles a [`RiskReport`].

use crate::config::RiskConfig;
use crate::metrics::{
    annual_volatility, beta, correlation_matrix, daily_volatility, drawdown, drawdown_table,
    log_returns, rolling_annual_volatility, rolling_volatility, sharpe, simple_returns,
    simple_series_returns,
};
use crate::portfolio::{
    annual_portfolio_volatility, asset_risk_contribution, daily_portfolio_volatility,
    diversification_benefit, portfolio_annual_return, portfolio_returns, portfolio_value_series,
    validate_weights, PORTFOLIO_ANNUALIZATION_DAYS,
};
use crate::report::{AssetMetrics, PortfolioMetrics, RiskReport, StressTestResults};
use crate::stress::{
    annual_correlation_breakdown_volatility, concentration_stress_loss,
    correlation_breakdown_volatility, portfolio_loss, stressed_asset_returns,
};
use crate::types::{AssetVector, PriceTable, ReturnTable, RollingTable, Series, TimeSeriesTable};
use crate::{Error, Result};
use chrono::Utc;
use std::collections::BTreeMap;

/// Report plus the intermediate series behind it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: RiskReport,
    pub simple_returns: ReturnTable,
    pub log_returns: ReturnTable,
    pub rolling_annual_volatility: RollingTable,
    pub asset_drawdowns: TimeSeriesTable,
    pub portfolio_value: Series,
    pub portfolio_drawdown: Series,
}

/// Run the full analysis.
///
/// `prices` must already be cleaned (no gaps, strictly positive) and restricted
/// to the portfolio universe. `benchmark_prices` is the benchmark index price
/// series; it is aligned to the asset returns by date.
pub fn analyze(
    prices: &PriceTable,
    benchmark_prices: &Series,
    config: &RiskConfig,
) -> Result<Analysis> {
    config.validate()?;
    if config.weights.is_empty() {
        return Err(Error::Config("no portfolio weights configured".to_string()));
    }
    validate_weights(&config.weights, prices.assets())?;
    if !config.uses_standard_year() {
        tracing::warn!(
            trading_days = config.trading_days,
            portfolio_days = PORTFOLIO_ANNUALIZATION_DAYS,
            "asset metrics and portfolio volatility are annualized with different year lengths"
        );
    }

    let (start_date, end_date) = match (prices.dates().first(), prices.dates().last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(Error::EmptyInput("price table has no rows".to_string())),
    };
    tracing::info!(
        assets = prices.asset_count(),
        rows = prices.len(),
        %start_date,
        %end_date,
        "starting risk analysis"
    );

    // returns
    let simple = simple_returns(prices)?;
    let log = log_returns(prices)?;

    // volatility
    let daily_vol = daily_volatility(&log, config.rolling_window)?;
    let annual_vol = annual_volatility(&log, config.rolling_window, config.trading_days)?;
    let rolling = rolling_volatility(&log, config.rolling_window)?;
    let rolling_annual = rolling_annual_volatility(&rolling.to_table(), config.trading_days);
    tracing::debug!(window = config.rolling_window, "computed volatility");

    let asset_drawdowns = drawdown_table(prices)?;
    let correlation = correlation_matrix(&simple, config.correlation_method)?;
    tracing::debug!(method = %config.correlation_method, "computed correlation matrix");

    let benchmark_returns = simple_series_returns(benchmark_prices)?;
    let betas = beta(&simple, &benchmark_returns)?;
    let sharpe_ratios = sharpe(&simple, &annual_vol, config.trading_days)?;

    // portfolio
    let weights = &config.weights;
    let pf_returns = portfolio_returns(&simple, weights)?;
    let pf_annual_return = portfolio_annual_return(&pf_returns);
    let pf_daily_vol = daily_portfolio_volatility(&log, weights)?;
    let pf_annual_vol = annual_portfolio_volatility(pf_daily_vol);
    let benefit = diversification_benefit(&annual_vol, weights, pf_annual_vol)?;
    let contributions = asset_risk_contribution(weights, &log, pf_daily_vol)?;

    let pf_value = portfolio_value_series(&pf_returns);
    let pf_drawdown = drawdown(&pf_value)?;
    tracing::debug!(
        annual_return = pf_annual_return,
        annual_volatility = pf_annual_vol,
        "computed portfolio metrics"
    );

    // stress
    let stressed = stressed_asset_returns(&betas, config.market_shock)?;
    let market_loss = portfolio_loss(weights, &stressed)?;
    let concentration = concentration_stress_loss(weights, config.asset_shock)?;
    let concentration_total: f64 = concentration.values().sum();
    let breakdown_daily = correlation_breakdown_volatility(
        &correlation,
        &daily_vol,
        weights,
        config.correlation_stress_multiplier,
    )?;
    let breakdown_annual = annual_correlation_breakdown_volatility(breakdown_daily);
    tracing::debug!(market_loss, breakdown_annual, "ran stress scenarios");

    let mut asset_metrics = BTreeMap::new();
    for asset in prices.assets() {
        let lookup = |values: &AssetVector, name: &str| {
            values.get(asset).copied().ok_or_else(|| {
                Error::AssetMismatch(format!("missing {} for asset {}", name, asset))
            })
        };
        asset_metrics.insert(
            asset.clone(),
            AssetMetrics {
                daily_volatility: lookup(&daily_vol, "daily volatility")?,
                annual_volatility: lookup(&annual_vol, "annual volatility")?,
                sharpe_ratio: lookup(&sharpe_ratios, "Sharpe ratio")?,
                beta: lookup(&betas, "beta")?,
                max_drawdown: lookup(&asset_drawdowns.max_drawdown, "max drawdown")?,
                risk_contribution: lookup(&contributions, "risk contribution")?,
            },
        );
    }

    let report = RiskReport {
        generated_at: Utc::now(),
        assets: prices.assets().to_vec(),
        observations: simple.len(),
        start_date,
        end_date,
        portfolio_metrics: PortfolioMetrics {
            annual_return: pf_annual_return,
            daily_volatility: pf_daily_vol,
            annual_volatility: pf_annual_vol,
            max_drawdown: pf_drawdown.max_drawdown,
            diversification_benefit: benefit,
        },
        stress_test_results: StressTestResults {
            market_shock: config.market_shock,
            market_shock_loss: market_loss,
            asset_shock: config.asset_shock,
            concentration_losses: concentration,
            concentration_loss_total: concentration_total,
            correlation_breakdown_daily_volatility: breakdown_daily,
            diversification_failure_volatility: breakdown_annual,
        },
        asset_metrics,
        correlation_matrix: correlation,
    };
    tracing::info!(observations = report.observations, "risk analysis complete");

    Ok(Analysis {
        report,
        simple_returns: simple,
        log_returns: log,
        rolling_annual_volatility: rolling_annual,
        asset_drawdowns: asset_drawdowns.drawdowns,
        portfolio_value: pf_value,
        portfolio_drawdown: pf_drawdown.drawdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::Weights;
    use crate::types::test_util::dates;
    use approx::assert_relative_eq;

    const ROWS: usize = 40;

    fn benchmark() -> Series {
        let mut price = 1000.0;
        let values = (0..ROWS)
            .map(|i| {
                let r = [0.004, -0.006, 0.009, -0.002, 0.001][i % 5];
                price *= 1.0 + r;
                price
            })
            .collect();
        Series::new(dates(ROWS), values).unwrap()
    }

    fn prices() -> PriceTable {
        let bench = benchmark();
        let path = |scale: f64, noise: [f64; 3], start: f64| {
            let mut price = start;
            let mut out = vec![start];
            for (i, pair) in bench.values().windows(2).enumerate() {
                let r = scale * (pair[1] / pair[0] - 1.0) + noise[i % 3];
                price *= 1.0 + r;
                out.push(price);
            }
            out
        };
        TimeSeriesTable::new(
            dates(ROWS),
            vec![
                ("AAA".to_string(), path(1.2, [0.001, -0.002, 0.0015], 100.0)),
                ("BBB".to_string(), path(0.6, [-0.003, 0.002, 0.0005], 50.0)),
                ("CCC".to_string(), path(0.9, [0.002, 0.001, -0.004], 20.0)),
            ],
        )
        .unwrap()
    }

    fn config() -> RiskConfig {
        RiskConfig {
            rolling_window: 10,
            weights: [("AAA", 0.5), ("BBB", 0.3), ("CCC", 0.2)].into_iter().collect(),
            ..RiskConfig::default()
        }
    }

    #[test]
    fn test_analyze_produces_consistent_report() {
        let analysis = analyze(&prices(), &benchmark(), &config()).unwrap();
        let report = &analysis.report;

        assert_eq!(report.assets, ["AAA", "BBB", "CCC"]);
        assert_eq!(report.observations, ROWS - 1);
        assert_eq!(analysis.simple_returns.len(), ROWS - 1);
        assert_eq!(analysis.portfolio_value.len(), ROWS - 1);

        let contribution_total: f64 = report
            .asset_metrics
            .values()
            .map(|m| m.risk_contribution)
            .sum();
        assert_relative_eq!(
            contribution_total,
            report.portfolio_metrics.daily_volatility,
            epsilon = 1e-12
        );

        assert!(report.portfolio_metrics.diversification_benefit >= 0.0);
        assert!(report.portfolio_metrics.max_drawdown <= 0.0);
        assert!(report.stress_test_results.market_shock_loss < 0.0);
        assert_relative_eq!(
            report.stress_test_results.concentration_loss_total,
            -0.40,
            epsilon = 1e-12
        );
        assert!(report.asset_metrics["AAA"].beta > report.asset_metrics["BBB"].beta);
    }

    #[test]
    fn test_analyze_rolling_volatility_shape() {
        let analysis = analyze(&prices(), &benchmark(), &config()).unwrap();
        let rolling = analysis.rolling_annual_volatility.column("AAA").unwrap();

        assert_eq!(rolling.len(), ROWS - 1);
        assert!(rolling[..9].iter().all(Option::is_none));
        assert!(rolling[9..].iter().all(Option::is_some));
    }

    #[test]
    fn test_analyze_rejects_bad_weights() {
        let mut config = config();
        config.weights = [("AAA", 0.5), ("BBB", 0.5)].into_iter().collect();
        assert!(matches!(
            analyze(&prices(), &benchmark(), &config),
            Err(Error::WeightMismatch(_))
        ));

        config.weights = Weights::default();
        assert!(matches!(
            analyze(&prices(), &benchmark(), &config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_analyze_needs_enough_rows_for_window() {
        let config = RiskConfig {
            rolling_window: ROWS,
            ..config()
        };
        assert!(matches!(
            analyze(&prices(), &benchmark(), &config),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_analyze_with_nonstandard_year() {
        let mut config = config();
        config.trading_days = 250;
        let report = analyze(&prices(), &benchmark(), &config).unwrap().report;

        let daily = report.asset_metrics["AAA"].daily_volatility;
        assert_relative_eq!(
            report.asset_metrics["AAA"].annual_volatility,
            daily * 250.0_f64.sqrt(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            report.portfolio_metrics.annual_volatility,
            report.portfolio_metrics.daily_volatility * 252.0_f64.sqrt(),
            epsilon = 1e-12
        );
    }
}
