//! Sampling-frequency inference and annualization.
//!
//! Equity snapshots arrive at irregular intervals, so instead of assuming
//! daily bars the periods-per-year figure is derived from the median gap
//! between timestamps.

use chrono::{DateTime, Utc};

use crate::stats::median;

/// Calendar year in seconds (365 days; markets trade around the clock).
pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

/// Gap assumed when fewer than two timestamps are available.
pub const FALLBACK_GAP_SECONDS: f64 = 3600.0;

/// Trading-day convention used when nothing better is known.
pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

/// Median gap between successive timestamps, in seconds.
pub fn median_gap_seconds(timestamps: &[DateTime<Utc>]) -> f64 {
    if timestamps.len() < 2 {
        return FALLBACK_GAP_SECONDS;
    }
    let gaps: Vec<f64> = timestamps
        .windows(2)
        .map(|w| (w[1] - w[0]).num_milliseconds() as f64 / 1000.0)
        .collect();
    let gap = median(&gaps);
    if gap > 0.0 {
        gap
    } else {
        FALLBACK_GAP_SECONDS
    }
}

/// `max(1, seconds_per_year / median_gap)`.
pub fn infer_periods_per_year(timestamps: &[DateTime<Utc>]) -> f64 {
    (SECONDS_PER_YEAR / median_gap_seconds(timestamps)).max(1.0)
}

/// Explicit value if given and positive, otherwise inferred from timestamps.
pub fn resolve_periods_per_year(explicit: Option<f64>, timestamps: &[DateTime<Utc>]) -> f64 {
    match explicit {
        Some(ppy) if ppy > 0.0 && ppy.is_finite() => ppy,
        _ => infer_periods_per_year(timestamps),
    }
}

/// Scale a per-period ratio by `sqrt(periods_per_year)`.
pub fn annualize(per_period: f64, periods_per_year: f64) -> f64 {
    per_period * periods_per_year.max(0.0).sqrt()
}
