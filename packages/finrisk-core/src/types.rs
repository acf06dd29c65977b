//! Core data types for FinRisk analytics.

use crate::{Error, Result};
use chrono::NaiveDate;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Per-asset scalar keyed by asset identifier, in identifier order.
pub type AssetVector = BTreeMap<String, f64>;

/// Date-indexed table with one numeric column per asset.
///
/// Dates are strictly increasing and columns are stored in ascending asset
/// identifier order, so every table built from the same universe shares one
/// column ordering with [`crate::portfolio::Weights`] and [`AssetMatrix`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesTable {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    columns: Vec<Vec<f64>>,
}

/// Adjusted closing prices, one column per asset.
pub type PriceTable = TimeSeriesTable;

/// Simple or log returns; one row fewer than the prices they came from.
pub type ReturnTable = TimeSeriesTable;

impl TimeSeriesTable {
    /// Build a table from a date index and `(asset, values)` columns.
    ///
    /// Fails with [`Error::InvalidTable`] if dates are not strictly increasing,
    /// an asset appears twice, a column length differs from the index, or a
    /// value is not finite.
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        ensure_strictly_increasing(&dates)?;

        let mut seen = BTreeSet::new();
        for (asset, values) in &columns {
            if !seen.insert(asset.as_str()) {
                return Err(Error::InvalidTable(format!("duplicate asset column: {}", asset)));
            }
            if values.len() != dates.len() {
                return Err(Error::InvalidTable(format!(
                    "column {} has {} values for {} dates",
                    asset,
                    values.len(),
                    dates.len()
                )));
            }
            if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
                return Err(Error::InvalidTable(format!(
                    "non-finite value for {} on {}",
                    asset, dates[idx]
                )));
            }
        }

        let mut columns = columns;
        columns.sort_by(|a, b| a.0.cmp(&b.0));
        let (assets, columns) = columns.into_iter().unzip();

        Ok(Self {
            dates,
            assets,
            columns,
        })
    }

    /// Build a table whose invariants are already guaranteed by the caller.
    ///
    /// Used for tables derived from an existing table (returns, drawdowns),
    /// where the index and asset ordering are inherited and derived values may
    /// legitimately be non-finite.
    pub(crate) fn from_parts(
        dates: Vec<NaiveDate>,
        assets: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Self {
        debug_assert_eq!(assets.len(), columns.len());
        debug_assert!(columns.iter().all(|c| c.len() == dates.len()));
        Self {
            dates,
            assets,
            columns,
        }
    }

    /// Derive a new table over `dates` by transforming each column.
    pub(crate) fn map_columns<F>(&self, dates: Vec<NaiveDate>, mut f: F) -> Self
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        let columns = self.columns.iter().map(|c| f(c)).collect();
        Self::from_parts(dates, self.assets.clone(), columns)
    }

    /// Date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Asset identifiers in column order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Number of rows (dates).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of asset columns.
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Values for one asset.
    pub fn column(&self, asset: &str) -> Option<&[f64]> {
        self.assets
            .iter()
            .position(|a| a == asset)
            .map(|idx| self.columns[idx].as_slice())
    }

    /// Iterate `(asset, values)` in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.assets
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// One row across all assets, in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<f64>> {
        if idx >= self.len() {
            return None;
        }
        Some(self.columns.iter().map(|c| c[idx]).collect())
    }

    /// Keep only the given assets.
    ///
    /// Fails with [`Error::AssetMismatch`] if an asset is not in the table.
    pub fn select(&self, assets: &[String]) -> Result<Self> {
        let mut columns = Vec::with_capacity(assets.len());
        for asset in assets {
            let values = self
                .column(asset)
                .ok_or_else(|| Error::AssetMismatch(format!("asset not in table: {}", asset)))?;
            columns.push((asset.clone(), values.to_vec()));
        }
        Self::new(self.dates.clone(), columns)
    }

    /// Extract one column as a [`Series`].
    pub fn series(&self, asset: &str) -> Option<Series> {
        self.column(asset).map(|values| Series {
            dates: self.dates.clone(),
            values: values.to_vec(),
        })
    }

    /// Convert a single-column table into a [`Series`].
    pub fn into_single_series(self) -> Result<Series> {
        if self.assets.len() != 1 {
            return Err(Error::InvalidTable(format!(
                "expected exactly one column, found {}",
                self.assets.len()
            )));
        }
        let values = self.columns.into_iter().next().unwrap_or_default();
        Ok(Series {
            dates: self.dates,
            values,
        })
    }
}

/// A single date-indexed value sequence (benchmark returns, portfolio value path).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl Series {
    /// Create a series; dates must be strictly increasing and match `values` in length.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        ensure_strictly_increasing(&dates)?;
        if dates.len() != values.len() {
            return Err(Error::InvalidTable(format!(
                "series has {} values for {} dates",
                values.len(),
                dates.len()
            )));
        }
        Ok(Self { dates, values })
    }

    pub(crate) fn from_parts(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self { dates, values }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(date, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Last value, if any.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Per-date-per-asset values where leading rows may be undefined.
///
/// Produced by rolling-window computations: the first `window - 1` rows of
/// every column are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingTable {
    pub(crate) window: usize,
    pub(crate) dates: Vec<NaiveDate>,
    pub(crate) assets: Vec<String>,
    pub(crate) columns: Vec<Vec<Option<f64>>>,
}

impl RollingTable {
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, asset: &str) -> Option<&[Option<f64>]> {
        self.assets
            .iter()
            .position(|a| a == asset)
            .map(|idx| self.columns[idx].as_slice())
    }

    /// Apply `f` to every defined value.
    pub fn map_values<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            window: self.window,
            dates: self.dates.clone(),
            assets: self.assets.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| c.iter().map(|v| v.map(&f)).collect())
                .collect(),
        }
    }
}

/// Square asset-by-asset matrix (covariance or correlation) with its ordering attached.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetMatrix {
    assets: Vec<String>,
    values: DMatrix<f64>,
}

/// Pairwise correlation of asset returns.
pub type CorrelationMatrix = AssetMatrix;

/// Sample covariance of asset returns.
pub type CovarianceMatrix = AssetMatrix;

impl AssetMatrix {
    pub(crate) fn from_parts(assets: Vec<String>, values: DMatrix<f64>) -> Self {
        debug_assert_eq!(values.nrows(), assets.len());
        debug_assert_eq!(values.ncols(), assets.len());
        Self { assets, values }
    }

    /// Row/column asset ordering.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Underlying matrix, rows and columns ordered as [`Self::assets`].
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Number of assets.
    pub fn size(&self) -> usize {
        self.assets.len()
    }

    /// Entry for an asset pair.
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.assets.iter().position(|a| a == row)?;
        let j = self.assets.iter().position(|a| a == col)?;
        Some(self.values[(i, j)])
    }

    /// Nested `row -> col -> value` map.
    pub fn to_nested(&self) -> BTreeMap<String, AssetVector> {
        self.assets
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let cols = self
                    .assets
                    .iter()
                    .enumerate()
                    .map(|(j, col)| (col.clone(), self.values[(i, j)]))
                    .collect();
                (row.clone(), cols)
            })
            .collect()
    }
}

impl Serialize for AssetMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_nested().serialize(serializer)
    }
}

fn ensure_strictly_increasing(dates: &[NaiveDate]) -> Result<()> {
    for pair in dates.windows(2) {
        if pair[1] <= pair[0] {
            return Err(Error::InvalidTable(format!(
                "dates must be strictly increasing: {} followed by {}",
                pair[0], pair[1]
            )));
        }
    }
    Ok(())
}

/// API response wrapper for CLI output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use chrono::{Days, NaiveDate};

    /// `n` consecutive calendar dates starting 2024-01-01.
    pub fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| start.checked_add_days(Days::new(i as u64)).unwrap())
            .collect()
    }
}
