use crate::decode::{lenient_f64, lenient_opt_f64};
use crate::domain::trade::{Side, TradeLike};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    #[default]
    Open,
    Closed,
}

/// Position snapshot as reported by the data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    pub market: String,
    pub side: Side,
    #[serde(deserialize_with = "lenient_f64")]
    pub size: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub entry_price: f64,
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub exit_price: Option<f64>,
    pub status: PositionStatus,
    #[serde(deserialize_with = "lenient_f64")]
    pub realized_pnl: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub unrealized_pnl: f64,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_f64")]
    pub sum_open: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub sum_close: f64,
    /// Positive when funding was received, negative when paid.
    #[serde(deserialize_with = "lenient_f64")]
    pub net_funding: f64,
}

impl Position {
    pub fn is_closed(&self) -> bool {
        self.status == PositionStatus::Closed
    }

    /// Time held in hours, `None` unless the position is closed with a timestamp.
    pub fn hold_hours(&self) -> Option<f64> {
        if !self.is_closed() {
            return None;
        }
        let closed_at = self.closed_at?;
        let seconds = (closed_at - self.created_at).num_milliseconds() as f64 / 1000.0;
        Some(seconds / 3600.0)
    }

    /// Notional at entry.
    pub fn entry_notional(&self) -> f64 {
        (self.size * self.entry_price).abs()
    }
}

impl TradeLike for Position {
    fn market(&self) -> &str {
        &self.market
    }

    fn closed_pnl(&self) -> Option<f64> {
        self.is_closed().then_some(self.realized_pnl)
    }

    fn notional(&self) -> f64 {
        self.entry_notional()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn closed(pnl: f64, hours: i64) -> Position {
        let opened = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        Position {
            market: "BTC-USD".into(),
            side: Side::Long,
            size: 0.5,
            entry_price: 40_000.0,
            exit_price: Some(41_000.0),
            status: PositionStatus::Closed,
            realized_pnl: pnl,
            created_at: opened,
            closed_at: Some(opened + chrono::Duration::hours(hours)),
            ..Default::default()
        }
    }

    #[test]
    fn open_position_has_no_closed_pnl() {
        let mut p = closed(100.0, 4);
        p.status = PositionStatus::Open;
        assert_eq!(p.closed_pnl(), None);
        assert_eq!(p.hold_hours(), None);
    }

    #[test]
    fn hold_hours_for_closed_position() {
        let p = closed(100.0, 30);
        assert_eq!(p.hold_hours(), Some(30.0));
        assert_eq!(p.closed_pnl(), Some(100.0));
        assert!((p.notional() - 20_000.0).abs() < 1e-9);
    }

    #[test]
    fn decodes_status_and_funding() {
        let json = r#"{
            "market": "SOL-USD",
            "side": "SHORT",
            "size": "-10",
            "entryPrice": "100",
            "status": "CLOSED",
            "realizedPnl": "25",
            "netFunding": "-1.5",
            "createdAt": "2024-02-01T00:00:00Z",
            "closedAt": "2024-02-01T06:00:00Z"
        }"#;
        let p: Position = serde_json::from_str(json).unwrap();
        assert!(p.is_closed());
        assert_eq!(p.side, Side::Short);
        assert_eq!(p.net_funding, -1.5);
        assert_eq!(p.hold_hours(), Some(6.0));
        assert_eq!(p.notional(), 1000.0);
    }
}
