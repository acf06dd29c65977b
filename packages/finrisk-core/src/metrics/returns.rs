//! Daily return tables.

use crate::types::{PriceTable, ReturnTable, Series};
use crate::{Error, Result};

/// Simple daily returns: `P[t] / P[t-1] - 1`.
///
/// The first date has no return and is dropped, so the result has one row
/// fewer than `prices`.
///
/// # Errors
///
/// [`Error::EmptyInput`] if the price table has no rows.
pub fn simple_returns(prices: &PriceTable) -> Result<ReturnTable> {
    ensure_rows(prices)?;
    Ok(pairwise(prices, |prev, curr| curr / prev - 1.0))
}

/// Logarithmic daily returns: `ln(P[t]) - ln(P[t-1])`.
///
/// # Errors
///
/// [`Error::EmptyInput`] if the price table has no rows.
pub fn log_returns(prices: &PriceTable) -> Result<ReturnTable> {
    ensure_rows(prices)?;
    Ok(pairwise(prices, |prev, curr| curr.ln() - prev.ln()))
}

/// Simple daily returns of a single price series (e.g. a benchmark index).
pub fn simple_series_returns(prices: &Series) -> Result<Series> {
    if prices.is_empty() {
        return Err(Error::EmptyInput("price series is empty".to_string()));
    }
    let values = prices
        .values()
        .windows(2)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();
    Ok(Series::from_parts(prices.dates()[1..].to_vec(), values))
}

fn ensure_rows(prices: &PriceTable) -> Result<()> {
    if prices.is_empty() {
        return Err(Error::EmptyInput("price table has no rows".to_string()));
    }
    Ok(())
}

fn pairwise<F>(prices: &PriceTable, f: F) -> ReturnTable
where
    F: Fn(f64, f64) -> f64,
{
    let dates = prices.dates()[1..].to_vec();
    prices.map_columns(dates, |col| col.windows(2).map(|w| f(w[0], w[1])).collect())
}
