//! Correlation and covariance matrices of asset returns.

use super::stats::{average_ranks, pearson, sample_covariance};
use crate::types::{AssetMatrix, CorrelationMatrix, CovarianceMatrix, ReturnTable};
use crate::{Error, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Correlation estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    /// Linear (product-moment) correlation.
    #[default]
    Pearson,
    /// Rank correlation: Pearson over average ranks.
    Spearman,
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pearson => write!(f, "pearson"),
            Self::Spearman => write!(f, "spearman"),
        }
    }
}

impl FromStr for CorrelationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pearson" => Ok(Self::Pearson),
            "spearman" => Ok(Self::Spearman),
            other => Err(Error::Config(format!(
                "unknown correlation method: {} (expected pearson or spearman)",
                other
            ))),
        }
    }
}

/// Pairwise correlation matrix of asset returns.
///
/// The diagonal is exactly 1, the matrix is symmetric by construction and
/// off-diagonal entries are clamped to [-1, 1].
///
/// # Errors
///
/// - [`Error::DegenerateInput`] for fewer than two assets, or an asset whose
///   returns have zero variance.
/// - [`Error::InsufficientData`] for fewer than two rows.
pub fn correlation_matrix(
    returns: &ReturnTable,
    method: CorrelationMethod,
) -> Result<CorrelationMatrix> {
    let n = returns.asset_count();
    if n < 2 {
        return Err(Error::DegenerateInput(
            "Correlation matrix undefined for single-asset portfolio".to_string(),
        ));
    }
    ensure_observations(returns)?;

    let columns: Vec<Vec<f64>> = returns
        .columns()
        .map(|(_, values)| match method {
            CorrelationMethod::Pearson => values.to_vec(),
            CorrelationMethod::Spearman => average_ranks(values),
        })
        .collect();

    let mut matrix = DMatrix::identity(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let rho = pearson(&columns[i], &columns[j]).ok_or_else(|| {
                Error::DegenerateInput(format!(
                    "correlation undefined between {} and {}: zero variance",
                    returns.assets()[i],
                    returns.assets()[j]
                ))
            })?;
            matrix[(i, j)] = rho;
            matrix[(j, i)] = rho;
        }
    }

    Ok(AssetMatrix::from_parts(returns.assets().to_vec(), matrix))
}

/// Sample covariance matrix of asset returns, ordered by asset identifier.
///
/// # Errors
///
/// - [`Error::EmptyInput`] if the table has no assets.
/// - [`Error::InsufficientData`] for fewer than two rows.
pub fn covariance_matrix(returns: &ReturnTable) -> Result<CovarianceMatrix> {
    let n = returns.asset_count();
    if n == 0 {
        return Err(Error::EmptyInput("return table has no assets".to_string()));
    }
    ensure_observations(returns)?;

    let columns: Vec<&[f64]> = returns.columns().map(|(_, values)| values).collect();
    let mut matrix = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in i..n {
            let cov = sample_covariance(columns[i], columns[j]).ok_or_else(|| {
                Error::InsufficientData(format!(
                    "covariance undefined between {} and {}",
                    returns.assets()[i],
                    returns.assets()[j]
                ))
            })?;
            matrix[(i, j)] = cov;
            matrix[(j, i)] = cov;
        }
    }

    Ok(AssetMatrix::from_parts(returns.assets().to_vec(), matrix))
}

fn ensure_observations(returns: &ReturnTable) -> Result<()> {
    if returns.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "need at least 2 return observations, got {}",
            returns.len()
        )));
    }
    Ok(())
}
