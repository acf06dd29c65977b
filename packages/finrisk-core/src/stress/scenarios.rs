//! Parameterized stress scenarios.

use crate::portfolio::{
    ensure_aligned, quadratic_form_volatility, validate_weights, Weights,
    PORTFOLIO_ANNUALIZATION_DAYS,
};
use crate::types::{AssetMatrix, AssetVector, CorrelationMatrix};
use crate::{Error, Result};
use nalgebra::{DMatrix, DVector};

/// Default factor applied to every correlation in the breakdown scenario.
pub const CORRELATION_BREAKDOWN_MULTIPLIER: f64 = 1.5;

/// Shocks must lie in [-1, 0]: at most a total loss, never a gain.
pub fn validate_shock(shock: f64) -> Result<()> {
    if !(-1.0..=0.0).contains(&shock) {
        return Err(Error::InvalidShock(shock));
    }
    Ok(())
}

/// Propagate a market-wide shock through a linear factor model: `beta_i * shock`.
pub fn stressed_asset_returns(betas: &AssetVector, market_shock: f64) -> Result<AssetVector> {
    validate_shock(market_shock)?;
    Ok(betas
        .iter()
        .map(|(asset, beta)| (asset.clone(), beta * market_shock))
        .collect())
}

/// Weighted sum of stressed asset returns: the aggregate portfolio loss.
pub fn portfolio_loss(weights: &Weights, stressed_asset_returns: &AssetVector) -> Result<f64> {
    let universe: Vec<&str> = stressed_asset_returns.keys().map(String::as_str).collect();
    validate_weights(weights, &universe)?;
    Ok(weights
        .iter()
        .map(|(asset, w)| w * stressed_asset_returns[asset])
        .sum())
}

/// Loss from collapsing one asset at a time while every other asset returns zero.
///
/// Produces one entry per asset: the portfolio loss if only that asset fell by
/// `asset_shock`.
pub fn concentration_stress_loss(weights: &Weights, asset_shock: f64) -> Result<AssetVector> {
    validate_shock(asset_shock)?;
    let universe: Vec<&str> = weights.assets().collect();
    validate_weights(weights, &universe)?;

    let mut losses = AssetVector::new();
    for (shocked, _) in weights.iter() {
        let loss: f64 = weights
            .iter()
            .map(|(asset, w)| {
                let r = if asset == shocked { asset_shock } else { 0.0 };
                w * r
            })
            .sum();
        losses.insert(shocked.to_string(), loss);
    }
    Ok(losses)
}

/// Daily portfolio volatility after every correlation rises by `multiplier`.
///
/// Off-diagonal correlations are scaled and clipped to [-1, 1] while the
/// diagonal stays 1. The result is turned back into a covariance matrix
/// `D C' D` with `D = diag(asset_daily_vols)`, and the portfolio volatility is
/// recomputed as `sqrt(w' Σ' w)`.
///
/// # Errors
///
/// [`Error::InvalidMultiplier`] if `multiplier` is negative or not finite.
pub fn correlation_breakdown_volatility(
    corr_matrix: &CorrelationMatrix,
    asset_daily_vols: &AssetVector,
    weights: &Weights,
    multiplier: f64,
) -> Result<f64> {
    if !(multiplier.is_finite() && multiplier >= 0.0) {
        return Err(Error::InvalidMultiplier(multiplier));
    }
    validate_weights(weights, corr_matrix.assets())?;
    if !asset_daily_vols.keys().eq(corr_matrix.assets().iter()) {
        return Err(Error::AssetMismatch(format!(
            "volatility assets {:?} do not match correlation assets {:?}",
            asset_daily_vols.keys().collect::<Vec<_>>(),
            corr_matrix.assets()
        )));
    }
    ensure_aligned(weights, corr_matrix.assets())?;

    let corr = corr_matrix.values();
    let n = corr_matrix.size();
    let stressed_corr = DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            1.0
        } else {
            (corr[(i, j)] * multiplier).clamp(-1.0, 1.0)
        }
    });
    let d = DMatrix::from_diagonal(&DVector::from_iterator(
        asset_daily_vols.len(),
        asset_daily_vols.values().copied(),
    ));
    let stressed_cov = &d * stressed_corr * &d;

    let stressed = AssetMatrix::from_parts(corr_matrix.assets().to_vec(), stressed_cov);
    quadratic_form_volatility(&stressed, weights)
}

/// `daily * sqrt(252)`, always with [`PORTFOLIO_ANNUALIZATION_DAYS`].
pub fn annual_correlation_breakdown_volatility(daily: f64) -> f64 {
    daily * f64::from(PORTFOLIO_ANNUALIZATION_DAYS).sqrt()
}
