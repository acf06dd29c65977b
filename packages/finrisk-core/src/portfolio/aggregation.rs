//! Portfolio aggregation under explicit weights.
//!
//! Every weight-consuming function validates the weights against the asset
//! universe of its input before touching any covariance or weighted-sum data.

use super::weights::{ensure_aligned, validate_weights, Weights};
use crate::metrics::covariance_matrix;
use crate::types::{AssetMatrix, AssetVector, ReturnTable, Series};
use crate::{Error, Result};

/// Trading days used to annualize portfolio-level and stressed volatility.
///
/// Asset-level annualization and the Sharpe ratio use the configurable
/// [`crate::RiskConfig::trading_days`] instead; the two only agree when that
/// is left at 252.
pub const PORTFOLIO_ANNUALIZATION_DAYS: u32 = 252;

/// Weighted per-date portfolio return: each row of `asset_returns` dotted with the weights.
pub fn portfolio_returns(asset_returns: &ReturnTable, weights: &Weights) -> Result<Series> {
    validate_weights(weights, asset_returns.assets())?;
    ensure_aligned(weights, asset_returns.assets())?;

    let mut values = vec![0.0; asset_returns.len()];
    for ((_, column), (_, w)) in asset_returns.columns().zip(weights.iter()) {
        for (total, r) in values.iter_mut().zip(column) {
            *total += w * r;
        }
    }

    Ok(Series::from_parts(asset_returns.dates().to_vec(), values))
}

/// Geometrically compounded return over the whole series: `prod(1 + r) - 1`.
pub fn portfolio_annual_return(portfolio_daily_returns: &Series) -> f64 {
    portfolio_daily_returns
        .values()
        .iter()
        .fold(1.0, |acc, r| acc * (1.0 + r))
        - 1.0
}

/// Indexed portfolio value path: cumulative product of `(1 + r)` from a start value of 1.
pub fn portfolio_value_series(portfolio_daily_returns: &Series) -> Series {
    let mut value = 1.0;
    let path = portfolio_daily_returns
        .values()
        .iter()
        .map(|r| {
            value *= 1.0 + r;
            value
        })
        .collect();
    Series::from_parts(portfolio_daily_returns.dates().to_vec(), path)
}

/// Daily portfolio volatility `sqrt(w' Σ w)` with Σ the sample covariance of `log_returns`.
pub fn daily_portfolio_volatility(log_returns: &ReturnTable, weights: &Weights) -> Result<f64> {
    validate_weights(weights, log_returns.assets())?;
    let covariance = covariance_matrix(log_returns)?;
    quadratic_form_volatility(&covariance, weights)
}

/// `daily * sqrt(252)`, always with [`PORTFOLIO_ANNUALIZATION_DAYS`].
pub fn annual_portfolio_volatility(daily_portfolio_vol: f64) -> f64 {
    daily_portfolio_vol * f64::from(PORTFOLIO_ANNUALIZATION_DAYS).sqrt()
}

/// Weighted sum of individual asset volatilities minus the portfolio volatility.
///
/// Exactly 0.0 for a single-asset portfolio. Non-negative whenever pairwise
/// correlations do not exceed 1.
pub fn diversification_benefit(
    asset_annual_vols: &AssetVector,
    weights: &Weights,
    portfolio_annual_vol: f64,
) -> Result<f64> {
    let universe: Vec<&str> = asset_annual_vols.keys().map(String::as_str).collect();
    validate_weights(weights, &universe)?;

    if weights.len() == 1 {
        return Ok(0.0);
    }

    let naive_vol: f64 = weights
        .iter()
        .map(|(asset, w)| w * asset_annual_vols[asset])
        .sum();
    Ok(naive_vol - portfolio_annual_vol)
}

/// Per-asset contribution to portfolio volatility (Euler decomposition).
///
/// With `MRC = Σ w / portfolio_vol`, asset `i` contributes `w_i * MRC_i`.
/// When `portfolio_vol` is the volatility of the same weights, the
/// contributions sum to it.
///
/// # Errors
///
/// [`Error::UndefinedRatio`] if `portfolio_vol` is not positive.
pub fn asset_risk_contribution(
    weights: &Weights,
    log_returns: &ReturnTable,
    portfolio_vol: f64,
) -> Result<AssetVector> {
    validate_weights(weights, log_returns.assets())?;
    if portfolio_vol.is_nan() || portfolio_vol <= 0.0 {
        return Err(Error::UndefinedRatio(format!(
            "risk contribution undefined for portfolio volatility {}",
            portfolio_vol
        )));
    }

    let covariance = covariance_matrix(log_returns)?;
    ensure_aligned(weights, covariance.assets())?;

    let w = weights.to_vector();
    let marginal = (covariance.values() * &w) / portfolio_vol;

    Ok(covariance
        .assets()
        .iter()
        .enumerate()
        .map(|(i, asset)| (asset.clone(), w[i] * marginal[i]))
        .collect())
}

/// `sqrt(w' M w)` for an asset-ordered matrix, after checking the weight ordering.
pub(crate) fn quadratic_form_volatility(matrix: &AssetMatrix, weights: &Weights) -> Result<f64> {
    ensure_aligned(weights, matrix.assets())?;
    let w = weights.to_vector();
    let variance = w.dot(&(matrix.values() * &w));
    // rounding can push a zero variance slightly negative
    Ok(variance.max(0.0).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_util::dates;
    use crate::types::TimeSeriesTable;
    use approx::assert_relative_eq;

    fn log_returns() -> ReturnTable {
        TimeSeriesTable::new(
            dates(6),
            vec![
                ("A".to_string(), vec![0.010, -0.020, 0.015, 0.030, -0.010, 0.004]),
                ("B".to_string(), vec![0.002, 0.012, -0.008, 0.001, 0.020, -0.015]),
                ("C".to_string(), vec![-0.005, 0.007, 0.011, -0.013, 0.002, 0.009]),
            ],
        )
        .unwrap()
    }

    fn weights() -> Weights {
        [("A", 0.5), ("B", 0.3), ("C", 0.2)].into_iter().collect()
    }

    #[test]
    fn test_portfolio_returns_weighted_row_sum() {
        let returns = log_returns();
        let pf = portfolio_returns(&returns, &weights()).unwrap();

        assert_eq!(pf.len(), 6);
        let expected = 0.5 * 0.010 + 0.3 * 0.002 + 0.2 * -0.005;
        assert_relative_eq!(pf.values()[0], expected, epsilon = 1e-15);
    }

    #[test]
    fn test_portfolio_returns_validates_weights() {
        let bad: Weights = [("A", 0.5), ("B", 0.6)].into_iter().collect();
        assert!(matches!(
            portfolio_returns(&log_returns(), &bad),
            Err(Error::WeightMismatch(_))
        ));
    }

    #[test]
    fn test_compounding_and_value_path() {
        let series = Series::new(dates(3), vec![0.10, -0.10, 0.05]).unwrap();

        let annual = portfolio_annual_return(&series);
        assert_relative_eq!(annual, 1.1 * 0.9 * 1.05 - 1.0, epsilon = 1e-15);

        let path = portfolio_value_series(&series);
        assert_relative_eq!(path.values()[0], 1.1, epsilon = 1e-15);
        assert_relative_eq!(path.values()[1], 0.99, epsilon = 1e-15);
        assert_relative_eq!(path.last().unwrap(), 1.0 + annual, epsilon = 1e-15);
    }

    #[test]
    fn test_single_asset_volatility_is_asset_std() {
        let returns = log_returns().select(&["A".to_string()]).unwrap();
        let single: Weights = [("A", 1.0)].into_iter().collect();

        let vol = daily_portfolio_volatility(&returns, &single).unwrap();
        let cov = covariance_matrix(&returns).unwrap();
        assert_relative_eq!(vol, cov.get("A", "A").unwrap().sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn test_annual_portfolio_volatility_uses_252() {
        assert_relative_eq!(annual_portfolio_volatility(0.01), 0.01 * 252.0_f64.sqrt());
    }

    #[test]
    fn test_risk_contributions_sum_to_volatility() {
        let returns = log_returns();
        let vol = daily_portfolio_volatility(&returns, &weights()).unwrap();
        let contributions = asset_risk_contribution(&weights(), &returns, vol).unwrap();

        assert_eq!(contributions.len(), 3);
        let total: f64 = contributions.values().sum();
        assert_relative_eq!(total, vol, epsilon = 1e-12);
    }

    #[test]
    fn test_risk_contribution_needs_positive_volatility() {
        let result = asset_risk_contribution(&weights(), &log_returns(), 0.0);
        assert!(matches!(result, Err(Error::UndefinedRatio(_))));
    }

    #[test]
    fn test_diversification_benefit() {
        let returns = log_returns();
        let asset_vols: AssetVector = covariance_matrix(&returns)
            .unwrap()
            .to_nested()
            .iter()
            .map(|(a, row)| (a.clone(), row[a].sqrt()))
            .collect();
        let pf_vol = daily_portfolio_volatility(&returns, &weights()).unwrap();

        let benefit = diversification_benefit(&asset_vols, &weights(), pf_vol).unwrap();
        assert!(benefit >= 0.0);
    }

    #[test]
    fn test_diversification_benefit_single_asset_is_zero() {
        let vols: AssetVector = [("A".to_string(), 0.3)].into();
        let single: Weights = [("A", 1.0)].into_iter().collect();
        assert_eq!(diversification_benefit(&vols, &single, 0.25).unwrap(), 0.0);
    }

    #[test]
    fn test_diversification_benefit_validates() {
        let vols: AssetVector = [("A".to_string(), 0.3), ("B".to_string(), 0.2)].into();
        let negative: Weights = [("A", -0.2), ("B", 1.2)].into_iter().collect();
        assert!(matches!(
            diversification_benefit(&vols, &negative, 0.1),
            Err(Error::NegativeWeight { .. })
        ));
    }
}
