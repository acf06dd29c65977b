//! Daily, annualized and rolling volatility.

use super::stats::sample_std;
use crate::types::{AssetVector, ReturnTable, RollingTable};
use crate::{Error, Result};
use chrono::NaiveDate;

/// Per-asset sample standard deviation over the full return sample.
///
/// The length check uses the rolling `window`, not the two observations a
/// standard deviation needs.
///
/// # Errors
///
/// [`Error::InsufficientData`] if `log_returns` has fewer than `window` rows
/// (or fewer than two).
pub fn daily_volatility(log_returns: &ReturnTable, window: usize) -> Result<AssetVector> {
    let required = window.max(2);
    if log_returns.len() < required {
        return Err(Error::InsufficientData(format!(
            "Not enough data for rolling volatility. Need at least {} rows, got {}",
            required,
            log_returns.len()
        )));
    }

    log_returns
        .columns()
        .map(|(asset, values)| {
            let std = sample_std(values).ok_or_else(|| {
                Error::InsufficientData(format!("not enough returns for {}", asset))
            })?;
            Ok::<_, Error>((asset.to_string(), std))
        })
        .collect()
}

/// Scale a daily figure to a yearly one: `daily * sqrt(trading_days)`.
pub fn annualize(daily: f64, trading_days: u32) -> f64 {
    daily * f64::from(trading_days).sqrt()
}

/// [`annualize`] applied to every asset.
pub fn annualize_vector(daily: &AssetVector, trading_days: u32) -> AssetVector {
    daily
        .iter()
        .map(|(asset, v)| (asset.clone(), annualize(*v, trading_days)))
        .collect()
}

/// Annualized per-asset volatility, equal to `annualize(daily_volatility(..))`.
pub fn annual_volatility(
    log_returns: &ReturnTable,
    window: usize,
    trading_days: u32,
) -> Result<AssetVector> {
    daily_volatility(log_returns, window).map(|daily| annualize_vector(&daily, trading_days))
}

/// Trailing-window standard deviation over a return table.
///
/// Evaluation is lazy: nothing is computed until [`RollingVolatility::iter`]
/// is driven, and every call to `iter` starts again from the first date.
#[derive(Debug, Clone, Copy)]
pub struct RollingVolatility<'a> {
    returns: &'a ReturnTable,
    window: usize,
}

/// Build a rolling volatility view over `log_returns`.
///
/// # Errors
///
/// [`Error::InsufficientData`] if `window < 2`; a sample standard deviation
/// needs at least two observations.
pub fn rolling_volatility(
    log_returns: &ReturnTable,
    window: usize,
) -> Result<RollingVolatility<'_>> {
    if window < 2 {
        return Err(Error::InsufficientData(format!(
            "rolling window must cover at least 2 observations, got {}",
            window
        )));
    }
    Ok(RollingVolatility {
        returns: log_returns,
        window,
    })
}

impl<'a> RollingVolatility<'a> {
    pub fn window(&self) -> usize {
        self.window
    }

    /// Iterate `(date, per-asset value)` rows; `None` until the window fills.
    pub fn iter(&self) -> RollingIter<'a> {
        RollingIter {
            returns: self.returns,
            window: self.window,
            row: 0,
        }
    }

    /// Materialize every row into a [`RollingTable`].
    pub fn to_table(&self) -> RollingTable {
        let returns = self.returns;
        let mut columns = vec![Vec::with_capacity(returns.len()); returns.asset_count()];
        for (_, row) in self.iter() {
            for (col, value) in columns.iter_mut().zip(row) {
                col.push(value);
            }
        }
        RollingTable {
            window: self.window,
            dates: returns.dates().to_vec(),
            assets: returns.assets().to_vec(),
            columns,
        }
    }
}

impl<'a> IntoIterator for &RollingVolatility<'a> {
    type Item = (NaiveDate, Vec<Option<f64>>);
    type IntoIter = RollingIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Row iterator produced by [`RollingVolatility::iter`].
#[derive(Debug, Clone)]
pub struct RollingIter<'a> {
    returns: &'a ReturnTable,
    window: usize,
    row: usize,
}

impl Iterator for RollingIter<'_> {
    type Item = (NaiveDate, Vec<Option<f64>>);

    fn next(&mut self) -> Option<Self::Item> {
        let date = *self.returns.dates().get(self.row)?;
        let row = self.row;
        self.row += 1;

        let values = self
            .returns
            .columns()
            .map(|(_, col)| {
                if row + 1 < self.window {
                    None
                } else {
                    sample_std(&col[row + 1 - self.window..=row])
                }
            })
            .collect();

        Some((date, values))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.returns.len().saturating_sub(self.row);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RollingIter<'_> {}

/// Annualize every defined value of a rolling standard deviation table.
pub fn rolling_annual_volatility(rolling_std: &RollingTable, trading_days: u32) -> RollingTable {
    rolling_std.map_values(|v| annualize(v, trading_days))
}
