//! Portfolio weight vectors and their validation.

use crate::{Error, Result};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Allowed distance of the weight sum from 1.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Asset weights, ordered by asset identifier.
///
/// Construction never normalizes or checks anything; call
/// [`validate_weights`] against an asset universe before using them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weights(BTreeMap<String, f64>);

impl Weights {
    pub fn new(weights: BTreeMap<String, f64>) -> Self {
        Self(weights)
    }

    pub fn get(&self, asset: &str) -> Option<f64> {
        self.0.get(asset).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Asset identifiers in ascending order.
    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `(asset, weight)` pairs in ascending asset order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(a, w)| (a.as_str(), *w))
    }

    pub fn sum(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.0
    }

    /// Weights as a column vector in ascending asset order.
    pub fn to_vector(&self) -> DVector<f64> {
        DVector::from_iterator(self.0.len(), self.0.values().copied())
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Weights {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, w)| (k.into(), w)).collect())
    }
}

/// Check a weight vector against an asset universe.
///
/// Checks run in this order:
///
/// 1. [`Error::WeightMismatch`] if the weight keys and `universe` differ as sets
/// 2. [`Error::WeightSum`] if `|sum - 1| > 1e-6`
/// 3. [`Error::NegativeWeight`] if any weight is below zero
///
/// Invalid weights are never normalized.
pub fn validate_weights<S: AsRef<str>>(weights: &Weights, universe: &[S]) -> Result<()> {
    let expected: BTreeSet<&str> = universe.iter().map(AsRef::as_ref).collect();
    let actual: BTreeSet<&str> = weights.assets().collect();
    if expected != actual {
        let missing: Vec<&str> = expected.difference(&actual).copied().collect();
        let unknown: Vec<&str> = actual.difference(&expected).copied().collect();
        return Err(Error::WeightMismatch(format!(
            "Portfolio weights must match asset universe exactly (missing: {:?}, unknown: {:?})",
            missing, unknown
        )));
    }

    let total = weights.sum();
    if total.is_nan() || (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(Error::WeightSum(total));
    }

    if let Some((asset, weight)) = weights.iter().find(|(_, w)| *w < 0.0) {
        return Err(Error::NegativeWeight {
            asset: asset.to_string(),
            weight,
        });
    }

    Ok(())
}

/// Assert that `weights` iterate in exactly the order of `assets`.
///
/// Guards every product between a weight vector and an asset-ordered
/// matrix or table.
pub(crate) fn ensure_aligned(weights: &Weights, assets: &[String]) -> Result<()> {
    if !weights.assets().eq(assets.iter().map(String::as_str)) {
        return Err(Error::WeightMismatch(format!(
            "weight ordering {:?} does not match asset ordering {:?}",
            weights.assets().collect::<Vec<_>>(),
            assets
        )));
    }
    Ok(())
}
