//! Sharpe ratio.

use super::stats::mean;
use crate::types::{AssetVector, ReturnTable};
use crate::{Error, Result};

/// Annualized Sharpe ratio per asset.
///
/// Computed as `mean(daily_return) * trading_days / annual_volatility`: the
/// numerator scales the mean linearly by the trading-day count while the
/// denominator is already annualized. No risk-free rate is subtracted.
///
/// # Errors
///
/// - [`Error::UndefinedRatio`] if any annual volatility is zero, negative or
///   NaN, or an asset of `daily_returns` has no volatility entry.
/// - [`Error::EmptyInput`] if `daily_returns` has no rows.
pub fn sharpe(
    daily_returns: &ReturnTable,
    annual_volatility: &AssetVector,
    trading_days: u32,
) -> Result<AssetVector> {
    if let Some((asset, vol)) = annual_volatility.iter().find(|(_, v)| v.is_nan() || **v <= 0.0) {
        return Err(Error::UndefinedRatio(format!(
            "Sharpe ratio undefined when volatility is zero or negative ({} = {})",
            asset, vol
        )));
    }
    if daily_returns.is_empty() {
        return Err(Error::EmptyInput("return table has no rows".to_string()));
    }

    let mut ratios = AssetVector::new();
    for (asset, values) in daily_returns.columns() {
        let vol = annual_volatility.get(asset).ok_or_else(|| {
            Error::UndefinedRatio(format!("no annual volatility for {}", asset))
        })?;
        let mean_return = mean(values)
            .ok_or_else(|| Error::EmptyInput(format!("no returns for {}", asset)))?;
        ratios.insert(asset.to_string(), mean_return * f64::from(trading_days) / vol);
    }
    Ok(ratios)
}
