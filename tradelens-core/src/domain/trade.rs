//! Side of a trade and the `TradeLike` seam shared by fills and positions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of exposure.
///
/// Order-side spellings (`BUY`/`SELL`) are accepted on input so raw fills
/// decode without an adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    #[default]
    #[serde(alias = "BUY", alias = "long", alias = "buy")]
    Long,
    #[serde(alias = "SELL", alias = "short", alias = "sell")]
    Short,
}

/// Anything that can be counted as a trade by the statistics layer.
pub trait TradeLike {
    fn market(&self) -> &str;

    /// Realized P&L once the trade is resolved, `None` while it is still open.
    fn closed_pnl(&self) -> Option<f64>;

    /// Traded notional (`size * price`), always non-negative.
    fn notional(&self) -> f64;

    fn created_at(&self) -> DateTime<Utc>;
}
