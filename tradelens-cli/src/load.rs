//! Record loading from disk: JSON arrays for fills/positions/benchmark,
//! JSON or CSV for equity.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tradelens_analytics::AnalyticsConfig;
use tradelens_core::domain::{EquityPoint, EquitySample};

/// Equity series plus whether its samples carry real timestamps.
#[derive(Debug, Clone, Default)]
pub struct LoadedEquity {
    pub points: Vec<EquityPoint>,
    pub timestamped: bool,
}

/// Parse a JSON array file into records.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Load an optional JSON array; a missing flag yields an empty vector.
pub fn load_json_opt<T: DeserializeOwned>(path: Option<&Path>) -> Result<Vec<T>> {
    path.map_or_else(|| Ok(Vec::new()), |p| load_json(p))
}

/// Load equity from `.csv` (header with `timestamp` and `equity` columns) or
/// JSON (all bare numbers or all `{timestamp, equity}` points).
pub fn load_equity(path: &Path) -> Result<LoadedEquity> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        load_equity_csv(path)
    } else {
        let samples: Vec<EquitySample> = load_json(path)?;
        equity_from_samples(&samples).with_context(|| format!("invalid equity {}", path.display()))
    }
}

/// Bare numbers get placeholder timestamps, so a series must be all numbers
/// or all points.
fn equity_from_samples(samples: &[EquitySample]) -> Result<LoadedEquity> {
    let stamped = samples
        .iter()
        .filter(|s| matches!(s, EquitySample::Point(_)))
        .count();
    if stamped > 0 && stamped < samples.len() {
        bail!(
            "mixes {stamped} timestamped points with {} bare numbers",
            samples.len() - stamped
        );
    }
    let points = samples
        .iter()
        .map(|s| match s {
            EquitySample::Point(p) => *p,
            EquitySample::Value(v) => EquityPoint::new(DateTime::<Utc>::default(), *v),
        })
        .collect();
    Ok(LoadedEquity {
        points,
        timestamped: stamped > 0,
    })
}

fn load_equity_csv(path: &Path) -> Result<LoadedEquity> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let Some(equity_col) = column("equity") else {
        bail!("{}: missing `equity` column", path.display());
    };
    let time_col = column("timestamp");

    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("{}: bad row {}", path.display(), row + 1))?;
        let equity: f64 = record
            .get(equity_col)
            .unwrap_or_default()
            .trim()
            .parse()
            .with_context(|| format!("{}: row {} equity", path.display(), row + 1))?;
        let timestamp = match time_col.and_then(|c| record.get(c)) {
            Some(raw) => raw
                .trim()
                .parse::<DateTime<Utc>>()
                .with_context(|| format!("{}: row {} timestamp", path.display(), row + 1))?,
            None => DateTime::<Utc>::default(),
        };
        points.push(EquityPoint::new(timestamp, equity));
    }
    Ok(LoadedEquity {
        points,
        timestamped: time_col.is_some(),
    })
}

/// Read and validate a TOML config file, or fall back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    let Some(path) = path else {
        return Ok(AnalyticsConfig::default());
    };
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    AnalyticsConfig::from_toml_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tradelens_core::domain::Position;

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_equity_with_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "equity.csv",
            "timestamp,equity\n2024-01-01T00:00:00Z,100\n2024-01-01T01:00:00Z, 101.5\n",
        );
        let loaded = load_equity(&path).unwrap();
        assert!(loaded.timestamped);
        assert_eq!(loaded.points.len(), 2);
        assert_eq!(loaded.points[1].equity, 101.5);
        assert_eq!(
            (loaded.points[1].timestamp - loaded.points[0].timestamp).num_seconds(),
            3600
        );
    }

    #[test]
    fn csv_without_equity_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "equity.csv", "timestamp,value\n2024-01-01T00:00:00Z,1\n");
        let err = load_equity(&path).unwrap_err();
        assert!(err.to_string().contains("equity"));
    }

    #[test]
    fn json_equity_accepts_bare_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "equity.json", "[100, 110, 99]");
        let loaded = load_equity(&path).unwrap();
        assert!(!loaded.timestamped);
        let values: Vec<f64> = loaded.points.iter().map(|p| p.equity).collect();
        assert_eq!(values, vec![100.0, 110.0, 99.0]);
    }

    #[test]
    fn json_equity_with_points_is_timestamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "equity.json",
            r#"[{"timestamp": "2024-01-01T00:00:00Z", "equity": 100},
                {"timestamp": "2024-01-02T00:00:00Z", "equity": "101"}]"#,
        );
        let loaded = load_equity(&path).unwrap();
        assert!(loaded.timestamped);
        assert_eq!(loaded.points[1].equity, 101.0);
    }

    #[test]
    fn json_equity_mixing_numbers_and_points_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "equity.json",
            r#"[100, {"timestamp": "2024-01-02T00:00:00Z", "equity": 101}, 102]"#,
        );
        let err = load_equity(&path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("equity.json"), "{message}");
        assert!(message.contains("bare numbers"), "{message}");
    }

    #[test]
    fn positions_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "positions.json",
            r#"[{"market": "BTC-USD", "status": "CLOSED", "realizedPnl": "12.5"}]"#,
        );
        let positions: Vec<Position> = load_json(&path).unwrap();
        assert_eq!(positions[0].realized_pnl, 12.5);
        assert!(load_json_opt::<Position>(None).unwrap().is_empty());
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_json::<Position>(Path::new("/nonexistent/positions.json")).unwrap_err();
        assert!(format!("{err:#}").contains("positions.json"));
    }

    #[test]
    fn config_file_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_temp(&dir, "good.toml", "var_confidence = 0.99\n");
        assert_eq!(load_config(Some(&good)).unwrap().var_confidence, 0.99);

        let bad = write_temp(&dir, "bad.toml", "var_confidence = 1.5\n");
        assert!(load_config(Some(&bad)).is_err());
        assert_eq!(load_config(None).unwrap(), AnalyticsConfig::default());
    }
}
