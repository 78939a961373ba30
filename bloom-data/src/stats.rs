//! Small descriptive statistics shared by the onset, baseline, aggregation
//! and trend code.

use std::cmp::Ordering;

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut seq = values.to_vec();
    seq.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    seq
}

/// Percentile with linear interpolation between order statistics.
///
/// The rank is `(n - 1) * p`; a fractional rank blends the two
/// neighbouring sorted values. Returns `None` for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let seq = sorted(values);
    let idx = (seq.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        return Some(seq[lo]);
    }
    let frac = idx - lo as f64;
    Some(seq[lo] * (1.0 - frac) + seq[hi] * frac)
}

/// Median; an even count averages the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 0.5)
}

/// Weighted mean of `(value, weight)` pairs.
///
/// Pairs with a non-positive weight are ignored. `None` when nothing
/// carries weight.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> Option<f64> {
    let (numer, denom) = pairs
        .iter()
        .filter(|(_, w)| *w > 0.0)
        .fold((0.0, 0.0), |(n, d), (v, w)| (n + v * w, d + w));
    if denom > 0.0 {
        Some(numer / denom)
    } else {
        None
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1). Zero for fewer than two values.
pub fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Ordinary least squares fit of `ys` on `xs`, returned as `(slope, intercept)`.
///
/// Fewer than two points, or no spread in `xs`, gives a flat line through
/// the mean of `ys` (or through the lone value / zero).
pub fn linear_regression(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return (0.0, ys.first().copied().unwrap_or(0.0));
    }
    let xbar = xs[..n].iter().sum::<f64>() / n as f64;
    let ybar = ys[..n].iter().sum::<f64>() / n as f64;
    let num: f64 = xs[..n]
        .iter()
        .zip(&ys[..n])
        .map(|(x, y)| (x - xbar) * (y - ybar))
        .sum();
    let den: f64 = xs[..n].iter().map(|x| (x - xbar).powi(2)).sum();
    if den == 0.0 {
        return (0.0, ybar);
    }
    let slope = num / den;
    (slope, ybar - slope * xbar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_percentile_interpolates_between_order_statistics() {
        // rank = 4 * 0.2 = 0.8 -> 10 * 0.2 + 20 * 0.8
        let values = [50.0, 10.0, 40.0, 20.0, 30.0];
        assert_relative_eq!(percentile(&values, 0.2).unwrap(), 18.0, epsilon = 1e-9);
        assert_relative_eq!(percentile(&values, 0.0).unwrap(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(percentile(&values, 1.0).unwrap(), 50.0, epsilon = 1e-9);
        assert_relative_eq!(percentile(&values, 0.5).unwrap(), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_percentile_single_and_empty() {
        assert_eq!(percentile(&[], 0.2), None);
        assert_eq!(percentile(&[42.0], 0.2), Some(42.0));
    }

    #[test]
    fn test_median_even_count_averages_middle() {
        assert_eq!(median(&[1.0, 4.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[90.0, 95.0, 100.0]), Some(95.0));
    }

    #[test]
    fn test_weighted_mean() {
        let pairs = [(-10.0, 8.0), (2.0, 2.0)];
        assert_relative_eq!(weighted_mean(&pairs).unwrap(), -7.6, epsilon = 1e-9);
        assert_eq!(weighted_mean(&[]), None);
        assert_eq!(weighted_mean(&[(5.0, 0.0)]), None);
    }

    #[test]
    fn test_sample_stdev() {
        assert_eq!(sample_stdev(&[3.0]), 0.0);
        assert_relative_eq!(sample_stdev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.138089935299395, epsilon = 1e-9);
    }

    #[test]
    fn test_linear_regression() {
        let xs = [2017.0, 2018.0, 2019.0, 2020.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let (slope, intercept) = linear_regression(&xs, &ys);
        assert_relative_eq!(slope, 2.0, epsilon = 1e-9);
        assert_relative_eq!(intercept + slope * 2019.0, 5.0, epsilon = 1e-6);

        assert_eq!(linear_regression(&[2020.0], &[4.0]), (0.0, 4.0));
        assert_eq!(linear_regression(&[2020.0, 2020.0], &[1.0, 3.0]), (0.0, 2.0));
    }
}
