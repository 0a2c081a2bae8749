//! Equity observations and the number-or-record boundary type.

use crate::decode::lenient_f64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account equity at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(deserialize_with = "lenient_f64")]
    pub equity: f64,
}

impl EquityPoint {
    pub fn new(timestamp: DateTime<Utc>, equity: f64) -> Self {
        Self { timestamp, equity }
    }
}

/// An equity observation as callers hand it in: a bare value or a timestamped point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EquitySample {
    Value(f64),
    Point(EquityPoint),
}

impl EquitySample {
    pub fn equity(&self) -> f64 {
        match self {
            EquitySample::Value(v) => *v,
            EquitySample::Point(p) => p.equity,
        }
    }
}

impl From<f64> for EquitySample {
    fn from(value: f64) -> Self {
        EquitySample::Value(value)
    }
}

impl From<EquityPoint> for EquitySample {
    fn from(point: EquityPoint) -> Self {
        EquitySample::Point(point)
    }
}

/// Flatten mixed samples into the plain series the statistics work on.
pub fn normalize_equity(samples: &[EquitySample]) -> Vec<f64> {
    samples.iter().map(EquitySample::equity).collect()
}
