//! Beta against a benchmark.

use super::stats::{sample_covariance, sample_variance};
use crate::types::{AssetVector, ReturnTable, Series};
use crate::{Error, Result};
use std::cmp::Ordering;

/// Benchmark variance at or below this is treated as zero.
const VARIANCE_FLOOR: f64 = 1e-18;

/// Per-asset beta: `cov(asset, benchmark) / var(benchmark)`.
///
/// Asset and benchmark returns are inner-joined on date; rows where any
/// asset or the benchmark is missing (non-finite) are dropped before the
/// statistics are taken.
///
/// # Errors
///
/// - [`Error::InsufficientData`] if fewer than two dates survive alignment.
/// - [`Error::ZeroVariance`] if the aligned benchmark returns have zero variance.
pub fn beta(asset_returns: &ReturnTable, benchmark_returns: &Series) -> Result<AssetVector> {
    let rows = aligned_rows(asset_returns, benchmark_returns);
    if rows.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "need at least 2 dates shared with the benchmark, got {}",
            rows.len()
        )));
    }

    let market: Vec<f64> = rows.iter().map(|&(_, j)| benchmark_returns.values()[j]).collect();
    let market_var = sample_variance(&market).ok_or_else(|| {
        Error::InsufficientData("benchmark variance needs at least 2 returns".to_string())
    })?;
    if market_var <= VARIANCE_FLOOR {
        return Err(Error::ZeroVariance(
            "benchmark returns have zero variance over the aligned window".to_string(),
        ));
    }

    let mut betas = AssetVector::new();
    for (asset, values) in asset_returns.columns() {
        let asset_aligned: Vec<f64> = rows.iter().map(|&(i, _)| values[i]).collect();
        let cov = sample_covariance(&asset_aligned, &market).ok_or_else(|| {
            Error::InsufficientData(format!("covariance with benchmark undefined for {}", asset))
        })?;
        betas.insert(asset.to_string(), cov / market_var);
    }

    tracing::debug!(assets = betas.len(), aligned = rows.len(), "computed betas");
    Ok(betas)
}

/// `(asset row, benchmark row)` index pairs for dates present and complete on both sides.
fn aligned_rows(assets: &ReturnTable, benchmark: &Series) -> Vec<(usize, usize)> {
    let asset_dates = assets.dates();
    let bench_dates = benchmark.dates();
    let mut pairs = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < asset_dates.len() && j < bench_dates.len() {
        match asset_dates[i].cmp(&bench_dates[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                let complete = benchmark.values()[j].is_finite()
                    && assets.columns().all(|(_, col)| col[i].is_finite());
                if complete {
                    pairs.push((i, j));
                }
                i += 1;
                j += 1;
            }
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_util::dates;
    use crate::types::TimeSeriesTable;
    use approx::assert_relative_eq;

    #[test]
    fn test_beta_of_scaled_benchmark() {
        let market = vec![0.01, -0.02, 0.015, 0.005, -0.01];
        let asset: Vec<f64> = market.iter().map(|r| 2.0 * r).collect();

        let table = TimeSeriesTable::new(dates(5), vec![("A".to_string(), asset)]).unwrap();
        let bench = Series::new(dates(5), market).unwrap();

        let betas = beta(&table, &bench).unwrap();
        assert_relative_eq!(betas["A"], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_beta_uses_inner_alignment() {
        let all = dates(6);
        let market = vec![0.01, -0.02, 0.015, 0.005, -0.01, 0.02];
        let asset: Vec<f64> = market.iter().map(|r| 0.5 * r).collect();

        // asset has dates 0..5, benchmark has dates 1..6 plus a stray value
        let table = TimeSeriesTable::new(
            all[..5].to_vec(),
            vec![("A".to_string(), asset[..5].to_vec())],
        )
        .unwrap();
        let bench = Series::new(all[1..].to_vec(), market[1..].to_vec()).unwrap();

        let betas = beta(&table, &bench).unwrap();
        assert_relative_eq!(betas["A"], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_beta_drops_missing_benchmark_rows() {
        let market = vec![0.01, f64::NAN, 0.015, 0.005, -0.01];
        let asset = vec![0.03, 0.5, 0.045, 0.015, -0.03];
        let table = TimeSeriesTable::new(dates(5), vec![("A".to_string(), asset)]).unwrap();
        let bench = Series::new(dates(5), market).unwrap();

        let betas = beta(&table, &bench).unwrap();
        assert_relative_eq!(betas["A"], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_variance_benchmark_fails() {
        let table =
            TimeSeriesTable::new(dates(4), vec![("A".to_string(), vec![0.01, 0.02, -0.01, 0.0])])
                .unwrap();
        let bench = Series::new(dates(4), vec![0.01; 4]).unwrap();
        assert!(matches!(beta(&table, &bench), Err(Error::ZeroVariance(_))));
    }

    #[test]
    fn test_no_overlap_fails() {
        let all = dates(6);
        let table =
            TimeSeriesTable::new(all[..3].to_vec(), vec![("A".to_string(), vec![0.01, 0.02, 0.03])])
                .unwrap();
        let bench = Series::new(all[3..].to_vec(), vec![0.01, 0.02, 0.03]).unwrap();
        assert!(matches!(beta(&table, &bench), Err(Error::InsufficientData(_))));
    }
}
