//! Per-period return series derived from equity.
//!
//! A return is only emitted when the previous equity is strictly positive.
//! Pairs that fail the check are dropped, so the return series can be
//! shorter than `equity.len() - 1`.

use tradelens_core::domain::{normalize_equity, EquityPoint, EquitySample};

/// Fractional returns: `e[i] / e[i-1] - 1`.
pub fn simple_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// Percentage-point returns: `(e[i] - e[i-1]) / e[i-1] * 100`.
pub fn percent_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0] * 100.0)
        .collect()
}

/// Fractional returns from mixed equity samples.
pub fn sample_returns(samples: &[EquitySample]) -> Vec<f64> {
    simple_returns(&normalize_equity(samples))
}

/// Plain equity values of a point series.
pub fn equity_values(points: &[EquityPoint]) -> Vec<f64> {
    points.iter().map(|p| p.equity).collect()
}

/// Fractional change from first to last observation; 0.0 without a positive start.
pub fn total_return(equity: &[f64]) -> f64 {
    match (equity.first(), equity.last()) {
        (Some(&first), Some(&last)) if equity.len() >= 2 && first > 0.0 => last / first - 1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_returns_from_three_points() {
        let r = simple_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.10).abs() < 1e-12);
        assert!((r[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn non_positive_base_shortens_series() {
        // 0 → 50 and -10 → 100 are skipped
        let r = simple_returns(&[100.0, 0.0, 50.0, -10.0, 100.0, 110.0]);
        assert_eq!(r.len(), 3);
        assert!((r[0] + 1.0).abs() < 1e-12);
        assert!((r[1] + 1.2).abs() < 1e-12);
        assert!((r[2] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn percent_variant_scales_by_hundred() {
        let r = percent_returns(&[200.0, 210.0]);
        assert!((r[0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn short_series_have_no_returns() {
        assert!(simple_returns(&[]).is_empty());
        assert!(simple_returns(&[100.0]).is_empty());
    }

    #[test]
    fn samples_and_numbers_agree() {
        let samples = vec![
            EquitySample::Value(100.0),
            EquitySample::Point(EquityPoint::new(Default::default(), 120.0)),
        ];
        assert_eq!(sample_returns(&samples), simple_returns(&[100.0, 120.0]));
    }

    #[test]
    fn total_return_guards() {
        assert!((total_return(&[100.0, 95.0, 110.0]) - 0.1).abs() < 1e-12);
        assert_eq!(total_return(&[100.0]), 0.0);
        assert_eq!(total_return(&[0.0, 10.0]), 0.0);
    }
}
