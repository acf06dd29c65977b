//! Price table loading from CSV.
//!
//! Expected layout: a `Date` column in `YYYY-MM-DD` form followed by one
//! column of adjusted closing prices per asset.
//!
//! ```text
//! Date,AAPL,MSFT
//! 2024-01-02,185.64,370.87
//! 2024-01-03,184.25,370.60
//! ```

use crate::types::{PriceTable, Series, TimeSeriesTable};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Name of the date index column.
pub const DATE_COLUMN: &str = "Date";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Read a price table from a CSV file.
pub fn read_price_csv(path: &Path) -> Result<PriceTable> {
    let file = File::open(path)?;
    let table = parse_price_csv(file)?;
    tracing::debug!(
        path = %path.display(),
        rows = table.len(),
        assets = table.asset_count(),
        "loaded price table"
    );
    Ok(table)
}

/// Parse a price table from any CSV source.
///
/// Rows may appear in any order and are sorted by date. Fails with
/// [`Error::InvalidTable`] on a missing `Date` column, duplicate dates,
/// empty or non-numeric cells, and prices that are not strictly positive.
pub fn parse_price_csv<R: Read>(reader: R) -> Result<PriceTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let date_idx = headers
        .iter()
        .position(|h| h == DATE_COLUMN)
        .ok_or_else(|| Error::InvalidTable(format!("missing {} column", DATE_COLUMN)))?;
    let assets: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != date_idx)
        .map(|(idx, name)| (idx, name.to_string()))
        .collect();
    if assets.is_empty() {
        return Err(Error::InvalidTable("no asset columns".to_string()));
    }

    let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
            .map_err(|e| Error::InvalidTable(format!("invalid date {:?}: {}", raw_date, e)))?;

        let mut values = Vec::with_capacity(assets.len());
        for (idx, asset) in &assets {
            values.push(parse_price(record.get(*idx).unwrap_or_default(), asset, date)?);
        }
        rows.push((date, values));
    }

    rows.sort_by_key(|(date, _)| *date);
    if let Some(pair) = rows.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(Error::InvalidTable(format!("duplicate date: {}", pair[0].0)));
    }

    let dates = rows.iter().map(|(date, _)| *date).collect();
    let columns = assets
        .iter()
        .enumerate()
        .map(|(col, (_, asset))| (asset.clone(), rows.iter().map(|(_, v)| v[col]).collect()))
        .collect();

    TimeSeriesTable::new(dates, columns)
}

/// Keep only the listed assets, in identifier order.
pub fn select_columns<S: AsRef<str>>(table: &PriceTable, assets: &[S]) -> Result<PriceTable> {
    let assets: Vec<String> = assets.iter().map(|a| a.as_ref().to_string()).collect();
    table.select(&assets)
}

/// Read benchmark prices from a CSV file.
///
/// With `column` unset the file must hold exactly one price column.
pub fn read_benchmark_csv(path: &Path, column: Option<&str>) -> Result<Series> {
    let table = read_price_csv(path)?;
    match column {
        Some(name) => table
            .series(name)
            .ok_or_else(|| Error::AssetMismatch(format!("benchmark column not found: {}", name))),
        None => table.into_single_series(),
    }
}

fn parse_price(raw: &str, asset: &str, date: NaiveDate) -> Result<f64> {
    if raw.is_empty() {
        return Err(Error::InvalidTable(format!("missing price for {} on {}", asset, date)));
    }
    let price: f64 = raw.parse().map_err(|_| {
        Error::InvalidTable(format!("non-numeric price {:?} for {} on {}", raw, asset, date))
    })?;
    if !(price.is_finite() && price > 0.0) {
        return Err(Error::InvalidTable(format!(
            "price must be positive, got {} for {} on {}",
            price, asset, date
        )));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PRICES: &str = "\
Date,MSFT,AAPL
2024-01-03,102.0,51.0
2024-01-02,100.0,50.0
2024-01-04,101.0,52.5
";

    #[test]
    fn test_parse_sorts_rows_and_columns() {
        let table = parse_price_csv(PRICES.as_bytes()).unwrap();

        assert_eq!(table.assets(), ["AAPL", "MSFT"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.dates()[0], NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(table.column("MSFT"), Some(&[100.0, 102.0, 101.0][..]));
    }

    #[test]
    fn test_parse_rejects_bad_cells() {
        let missing = "Date,A\n2024-01-02,\n";
        assert!(matches!(parse_price_csv(missing.as_bytes()), Err(Error::InvalidTable(_))));

        let text = "Date,A\n2024-01-02,abc\n";
        assert!(matches!(parse_price_csv(text.as_bytes()), Err(Error::InvalidTable(_))));

        let zero = "Date,A\n2024-01-02,0\n";
        assert!(matches!(parse_price_csv(zero.as_bytes()), Err(Error::InvalidTable(_))));

        let date = "Date,A\n01/02/2024,1.0\n";
        assert!(matches!(parse_price_csv(date.as_bytes()), Err(Error::InvalidTable(_))));
    }

    #[test]
    fn test_parse_rejects_duplicate_dates() {
        let text = "Date,A\n2024-01-02,1.0\n2024-01-03,1.1\n2024-01-02,1.2\n";
        let err = parse_price_csv(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("duplicate date"));
    }

    #[test]
    fn test_parse_requires_date_and_assets() {
        assert!(matches!(
            parse_price_csv("Day,A\n2024-01-02,1.0\n".as_bytes()),
            Err(Error::InvalidTable(_))
        ));
        assert!(matches!(
            parse_price_csv("Date\n2024-01-02\n".as_bytes()),
            Err(Error::InvalidTable(_))
        ));
    }

    #[test]
    fn test_select_columns() {
        let table = parse_price_csv(PRICES.as_bytes()).unwrap();
        let selected = select_columns(&table, &["MSFT"]).unwrap();
        assert_eq!(selected.assets(), ["MSFT"]);
        assert!(select_columns(&table, &["GOOG"]).is_err());
    }

    #[test]
    fn test_read_benchmark() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "Date,^GSPC\n2024-01-02,4700.0\n2024-01-03,4705.5\n").unwrap();

        let series = read_benchmark_csv(file.path(), None).unwrap();
        assert_eq!(series.values(), &[4700.0, 4705.5]);

        let mut wide = NamedTempFile::new().unwrap();
        wide.write_all(PRICES.as_bytes()).unwrap();
        assert!(read_benchmark_csv(wide.path(), None).is_err());
        let aapl = read_benchmark_csv(wide.path(), Some("AAPL")).unwrap();
        assert_eq!(aapl.len(), 3);
    }
}
