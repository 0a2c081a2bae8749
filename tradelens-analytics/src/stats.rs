//! Statistical primitives shared by every metric.
//!
//! All estimators use population moments (divisor `n`). Empty or undefined
//! input yields 0.0, never NaN, so callers can chain them without guards.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Skewness (third standardized moment).
pub fn skewness(values: &[f64]) -> f64 {
    standardized_moment(values, 3)
}

/// Excess kurtosis (fourth standardized moment minus 3).
///
/// Constant or empty samples report 0.0 rather than -3.
pub fn kurtosis(values: &[f64]) -> f64 {
    let m4 = standardized_moment(values, 4);
    if m4 == 0.0 {
        return 0.0;
    }
    m4 - 3.0
}

fn standardized_moment(values: &[f64], order: i32) -> f64 {
    let sd = std_dev(values);
    if values.is_empty() || sd < 1e-15 {
        return 0.0;
    }
    let m = mean(values);
    values
        .iter()
        .map(|v| ((v - m) / sd).powi(order))
        .sum::<f64>()
        / values.len() as f64
}

/// Population covariance over the aligned leading elements of `x` and `y`.
pub fn covariance(x: &[f64], y: &[f64]) -> f64 {
    let (x, y) = aligned(x, y);
    if x.is_empty() {
        return 0.0;
    }
    let mx = mean(x);
    let my = mean(y);
    x.iter()
        .zip(y)
        .map(|(a, b)| (a - mx) * (b - my))
        .sum::<f64>()
        / x.len() as f64
}

/// Pearson correlation over the aligned leading elements.
///
/// Zero variance on either side gives 0.0.
pub fn correlation(x: &[f64], y: &[f64]) -> f64 {
    let (x, y) = aligned(x, y);
    let sx = std_dev(x);
    let sy = std_dev(y);
    if sx < 1e-15 || sy < 1e-15 {
        return 0.0;
    }
    covariance(x, y) / (sx * sy)
}

/// Truncate both slices to their common length.
pub(crate) fn aligned<'a>(x: &'a [f64], y: &'a [f64]) -> (&'a [f64], &'a [f64]) {
    let n = x.len().min(y.len());
    (&x[..n], &y[..n])
}

/// Lower partial moment: mean of `max(0, threshold - r)^order`.
pub fn lower_partial_moment(returns: &[f64], threshold: f64, order: i32) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    returns
        .iter()
        .map(|r| (threshold - r).max(0.0).powi(order))
        .sum::<f64>()
        / returns.len() as f64
}

/// Downside deviation below `target`, averaged over the full sample.
pub fn downside_deviation(returns: &[f64], target: f64) -> f64 {
    lower_partial_moment(returns, target, 2).sqrt()
}

/// Median of an unsorted sample.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted_copy(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Rank `floor(q * n)` clamped into `0..n`. Callers must pass `n > 0`.
pub fn quantile_index(n: usize, q: f64) -> usize {
    let rank = (q.clamp(0.0, 1.0) * n as f64).floor() as usize;
    rank.min(n.saturating_sub(1))
}

/// Ascending copy of the sample; the caller's slice is left untouched.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}
