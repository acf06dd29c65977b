//! Sample statistics shared by the metric modules.
//!
//! Variances and covariances use the `n - 1` denominator.

/// Arithmetic mean. `None` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance. `None` with fewer than two observations.
pub(crate) fn sample_variance(values: &[f64]) -> Option<f64> {
    sample_covariance(values, values)
}

/// Sample standard deviation. `None` with fewer than two observations.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(|v| v.max(0.0).sqrt())
}

/// Sample covariance of two equally long slices.
pub(crate) fn sample_covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let mean_x = mean(&x[..n])?;
    let mean_y = mean(&y[..n])?;
    let sum: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();
    Some(sum / (n - 1) as f64)
}

/// Pearson correlation, clamped to [-1, 1]. `None` if either side has zero variance.
pub(crate) fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let cov = sample_covariance(x, y)?;
    let var_x = sample_variance(x)?;
    let var_y = sample_variance(y)?;
    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

/// Ranks starting at 1, ties receiving the average of their positions.
pub(crate) fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end share ranks start+1..=end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_variance() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data).unwrap(), 5.0);
        // sum of squared deviations = 32, n - 1 = 7
        assert_relative_eq!(sample_variance(&data).unwrap(), 32.0 / 7.0);
        assert!(mean(&[]).is_none());
        assert!(sample_variance(&[1.0]).is_none());
    }

    #[test]
    fn test_pearson_perfect_and_zero_variance() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let z = [-1.0, -2.0, -3.0, -4.0];
        assert_relative_eq!(pearson(&x, &y).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pearson(&x, &z).unwrap(), -1.0, epsilon = 1e-12);
        assert!(pearson(&x, &[3.0, 3.0, 3.0, 3.0]).is_none());
    }

    #[test]
    fn test_average_ranks_with_ties() {
        let ranks = average_ranks(&[10.0, 30.0, 20.0, 30.0]);
        assert_eq!(ranks, vec![1.0, 3.5, 2.0, 3.5]);
    }
}
