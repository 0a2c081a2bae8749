//! Engine configuration, loaded from TOML.
//!
//! Every field has a default, so an empty document is a valid config.
//! File reading is left to the caller; this module only parses and checks.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::liquidation::DEFAULT_MAINTENANCE_MARGIN;
use crate::tail_metrics::{MonteCarloConfig, VarMethod, DEFAULT_TAIL_PERCENTILE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Which record type feeds the trade statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSource {
    #[default]
    Positions,
    Fills,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Per-period risk-free rate, in the same unit as the returns.
    pub risk_free_rate: f64,
    /// `None` infers the sampling frequency from equity timestamps.
    pub periods_per_year: Option<f64>,
    pub var_confidence: f64,
    pub var_method: VarMethod,
    pub monte_carlo: MonteCarloConfig,
    /// Drawdown periods at or below this depth (percent) are ignored.
    pub drawdown_threshold_pct: f64,
    pub maintenance_margin: f64,
    pub tail_percentile: f64,
    pub trade_source: TradeSource,
    /// Fixed offset used for calendar grouping.
    pub utc_offset_minutes: i32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            periods_per_year: None,
            var_confidence: 0.95,
            var_method: VarMethod::Historical,
            monte_carlo: MonteCarloConfig::default(),
            drawdown_threshold_pct: 0.0,
            maintenance_margin: DEFAULT_MAINTENANCE_MARGIN,
            tail_percentile: DEFAULT_TAIL_PERCENTILE,
            trade_source: TradeSource::Positions,
            utc_offset_minutes: 0,
        }
    }
}

impl AnalyticsConfig {
    /// Parse a TOML document and validate the result.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if outside_open(self.var_confidence, 0.0, 1.0) {
            return Err(invalid(
                "var_confidence",
                format!("must be in (0, 1), got {}", self.var_confidence),
            ));
        }
        if let Some(ppy) = self.periods_per_year {
            if !ppy.is_finite() || ppy <= 0.0 {
                return Err(invalid(
                    "periods_per_year",
                    format!("must be positive, got {ppy}"),
                ));
            }
        }
        if self.maintenance_margin.is_nan() || self.maintenance_margin < 0.0 {
            return Err(invalid(
                "maintenance_margin",
                format!("must be non-negative, got {}", self.maintenance_margin),
            ));
        }
        if self.monte_carlo.simulations == 0 {
            return Err(invalid("monte_carlo.simulations", "must be at least 1".into()));
        }
        if outside_open(self.tail_percentile, 0.0, 0.5) {
            return Err(invalid(
                "tail_percentile",
                format!("must be in (0, 0.5), got {}", self.tail_percentile),
            ));
        }
        // chrono accepts offsets strictly inside ±24h
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(invalid(
                "utc_offset_minutes",
                format!("must be within ±1439, got {}", self.utc_offset_minutes),
            ));
        }
        Ok(())
    }

    /// The calendar offset for grouping, falling back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

/// True unless `lo < x < hi`. NaN is outside every interval.
fn outside_open(x: f64, lo: f64, hi: f64) -> bool {
    x.is_nan() || x <= lo || x >= hi
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Parsing ──

    #[test]
    fn empty_document_gives_defaults() {
        let config = AnalyticsConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalyticsConfig::default());
        assert_eq!(config.var_confidence, 0.95);
        assert_eq!(config.monte_carlo.simulations, 10_000);
        assert_eq!(config.monte_carlo.seed, 42);
        assert_eq!(config.maintenance_margin, 0.006);
        assert_eq!(config.tail_percentile, 0.05);
        assert_eq!(config.trade_source, TradeSource::Positions);
        assert!(config.periods_per_year.is_none());
    }

    #[test]
    fn parses_partial_document() {
        let toml = r#"
            risk_free_rate = 0.0001
            periods_per_year = 365.0
            var_method = "monte_carlo"
            trade_source = "fills"
            utc_offset_minutes = -300

            [monte_carlo]
            seed = 7
        "#;
        let config = AnalyticsConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.risk_free_rate, 0.0001);
        assert_eq!(config.periods_per_year, Some(365.0));
        assert_eq!(config.var_method, VarMethod::MonteCarlo);
        assert_eq!(config.trade_source, TradeSource::Fills);
        assert_eq!(config.monte_carlo.seed, 7);
        assert_eq!(config.monte_carlo.simulations, 10_000);
        assert_eq!(config.utc_offset().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = AnalyticsConfig::from_toml_str("var_confidence = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_method_is_parse_error() {
        let err = AnalyticsConfig::from_toml_str(r#"var_method = "bootstrap""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    // ── Validation ──

    #[test]
    fn rejects_out_of_range_fields() {
        let cases = [
            ("var_confidence = 1.0", "var_confidence"),
            ("var_confidence = 0.0", "var_confidence"),
            ("periods_per_year = 0.0", "periods_per_year"),
            ("maintenance_margin = -0.01", "maintenance_margin"),
            ("tail_percentile = 0.5", "tail_percentile"),
            ("utc_offset_minutes = 1440", "utc_offset_minutes"),
            ("[monte_carlo]\nsimulations = 0", "monte_carlo.simulations"),
        ];
        for (doc, expected) in cases {
            match AnalyticsConfig::from_toml_str(doc) {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected, "{doc}"),
                other => panic!("{doc}: expected Invalid, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_non_finite_fields() {
        let cases = [
            ("var_confidence = nan", "var_confidence"),
            ("periods_per_year = inf", "periods_per_year"),
            ("periods_per_year = nan", "periods_per_year"),
            ("maintenance_margin = nan", "maintenance_margin"),
            ("tail_percentile = nan", "tail_percentile"),
        ];
        for (doc, expected) in cases {
            match AnalyticsConfig::from_toml_str(doc) {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected, "{doc}"),
                other => panic!("{doc}: expected Invalid, got {other:?}"),
            }
        }
    }

    #[test]
    fn error_message_names_field() {
        let err = AnalyticsConfig::from_toml_str("var_confidence = 2.0").unwrap_err();
        assert!(err.to_string().contains("var_confidence"));
    }

    // ── Serialization ──

    #[test]
    fn json_roundtrip() {
        let config = AnalyticsConfig {
            periods_per_year: Some(8760.0),
            var_method: VarMethod::Parametric,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: AnalyticsConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
