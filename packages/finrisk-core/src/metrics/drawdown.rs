//! Drawdown and maximum drawdown.
//!
//! Drawdown is measured against the running peak walked forward from the
//! first observation: `(value - peak) / peak`. It is zero at every new peak
//! and negative below it. The maximum drawdown is the most negative value of
//! that path. Inputs are expected to be strictly positive; zero or negative
//! values are not guarded.

use crate::types::{AssetVector, Series, TimeSeriesTable};
use crate::{Error, Result};
use serde::Serialize;

/// Drawdown path and its minimum for a single series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesDrawdown {
    pub drawdown: Series,
    pub max_drawdown: f64,
}

/// Drawdown paths and per-asset minimum for a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDrawdown {
    pub drawdowns: TimeSeriesTable,
    pub max_drawdown: AssetVector,
}

/// Drawdown of a value series (e.g. the portfolio value path).
///
/// # Errors
///
/// [`Error::EmptyInput`] if the series has no values.
pub fn drawdown(series: &Series) -> Result<SeriesDrawdown> {
    if series.is_empty() {
        return Err(Error::EmptyInput("value series is empty".to_string()));
    }
    let path = drawdown_path(series.values());
    let max_drawdown = minimum(&path);
    Ok(SeriesDrawdown {
        drawdown: Series::from_parts(series.dates().to_vec(), path),
        max_drawdown,
    })
}

/// Drawdown of every column of a table (e.g. asset prices).
///
/// # Errors
///
/// [`Error::EmptyInput`] if the table has no rows.
pub fn drawdown_table(table: &TimeSeriesTable) -> Result<TableDrawdown> {
    if table.is_empty() {
        return Err(Error::EmptyInput("value table has no rows".to_string()));
    }
    let drawdowns = table.map_columns(table.dates().to_vec(), drawdown_path);
    let max_drawdown = drawdowns
        .columns()
        .map(|(asset, path)| (asset.to_string(), minimum(path)))
        .collect();
    Ok(TableDrawdown {
        drawdowns,
        max_drawdown,
    })
}

fn drawdown_path(values: &[f64]) -> Vec<f64> {
    let mut running_max = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&value| {
            running_max = running_max.max(value);
            (value - running_max) / running_max
        })
        .collect()
}

fn minimum(path: &[f64]) -> f64 {
    path.iter().copied().fold(f64::INFINITY, f64::min)
}
