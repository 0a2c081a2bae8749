//! Drawdown analytics over an equity series.
//!
//! Drawdown at a point is `(running_peak - value) / running_peak * 100`.
//! A non-positive running peak yields 0% rather than a division artefact.

use serde::{Deserialize, Serialize};
use tradelens_core::domain::{normalize_equity, EquitySample};

use crate::stats::mean;

/// The single worst drawdown of a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MaxDrawdown {
    /// Absolute decline from peak to trough.
    pub value: f64,
    /// Decline as a percentage of the peak.
    pub percentage: f64,
    /// Samples between the peak and the trough.
    pub duration: usize,
    pub peak_index: usize,
    pub trough_index: usize,
    pub peak_value: f64,
    pub trough_value: f64,
}

/// One contiguous stretch below a prior peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPeriod {
    /// Index of the peak the period started from.
    pub start_index: usize,
    pub trough_index: usize,
    /// Index where equity got back to the peak; `None` while unrecovered.
    pub end_index: Option<usize>,
    pub peak_value: f64,
    pub trough_value: f64,
    pub depth: f64,
    pub depth_pct: f64,
    /// Samples from the peak to recovery, or to the last sample if unrecovered.
    pub duration: usize,
    /// Samples from the trough to recovery.
    pub recovery: Option<usize>,
}

impl DrawdownPeriod {
    pub fn is_recovered(&self) -> bool {
        self.end_index.is_some()
    }
}

fn drawdown_pct(peak: f64, value: f64) -> f64 {
    if peak > 0.0 {
        (peak - value) / peak * 100.0
    } else {
        0.0
    }
}

/// Worst peak-to-trough decline, by percentage.
pub fn max_drawdown(equity: &[f64]) -> MaxDrawdown {
    let Some(&first) = equity.first() else {
        return MaxDrawdown::default();
    };
    let mut worst = MaxDrawdown {
        peak_value: first,
        trough_value: first,
        ..MaxDrawdown::default()
    };
    let mut peak = first;
    let mut peak_index = 0;

    for (i, &value) in equity.iter().enumerate() {
        if value > peak {
            peak = value;
            peak_index = i;
            continue;
        }
        let pct = drawdown_pct(peak, value);
        if pct > worst.percentage {
            worst = MaxDrawdown {
                value: peak - value,
                percentage: pct,
                duration: i - peak_index,
                peak_index,
                trough_index: i,
                peak_value: peak,
                trough_value: value,
            };
        }
    }
    worst
}

/// `max_drawdown` over mixed number/point samples.
pub fn max_drawdown_of_samples(samples: &[EquitySample]) -> MaxDrawdown {
    max_drawdown(&normalize_equity(samples))
}

/// Per-sample drawdown percentage (the underwater curve).
pub fn underwater_curve(equity: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    equity
        .iter()
        .map(|&value| {
            peak = peak.max(value);
            drawdown_pct(peak, value)
        })
        .collect()
}

/// Segment the series into drawdown periods deeper than `threshold_pct`.
///
/// A period opens when equity drops below the running peak and closes when
/// equity returns to at least that peak. A period still open at the end is
/// reported without a recovery.
pub fn drawdown_periods(equity: &[f64], threshold_pct: f64) -> Vec<DrawdownPeriod> {
    let mut periods = Vec::new();
    let Some(&first) = equity.first() else {
        return periods;
    };
    let mut peak = first;
    let mut peak_index = 0;
    let mut open: Option<DrawdownPeriod> = None;

    for (i, &value) in equity.iter().enumerate().skip(1) {
        if value >= peak {
            if let Some(mut period) = open.take() {
                period.end_index = Some(i);
                period.duration = i - period.start_index;
                period.recovery = Some(i - period.trough_index);
                periods.push(period);
            }
            peak = value;
            peak_index = i;
            continue;
        }
        let period = open.get_or_insert(DrawdownPeriod {
            start_index: peak_index,
            trough_index: i,
            end_index: None,
            peak_value: peak,
            trough_value: value,
            depth: 0.0,
            depth_pct: 0.0,
            duration: 0,
            recovery: None,
        });
        if value <= period.trough_value {
            period.trough_value = value;
            period.trough_index = i;
        }
        period.depth = period.peak_value - period.trough_value;
        period.depth_pct = drawdown_pct(period.peak_value, period.trough_value);
    }

    if let Some(mut period) = open {
        period.duration = equity.len() - 1 - period.start_index;
        periods.push(period);
    }

    periods.retain(|p| p.depth_pct > threshold_pct);
    periods
}

/// Mean depth (percent) of the given periods.
pub fn average_drawdown(periods: &[DrawdownPeriod]) -> f64 {
    let depths: Vec<f64> = periods.iter().map(|p| p.depth_pct).collect();
    mean(&depths)
}

/// Ulcer index: root-mean-square of the underwater curve.
pub fn ulcer_index(equity: &[f64]) -> f64 {
    let curve = underwater_curve(equity);
    if curve.is_empty() {
        return 0.0;
    }
    (curve.iter().map(|d| d * d).sum::<f64>() / curve.len() as f64).sqrt()
}
