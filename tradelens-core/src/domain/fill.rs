use crate::decode::{lenient_f64, lenient_opt_f64};
use crate::domain::trade::{Side, TradeLike};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether the fill added or removed book liquidity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Liquidity {
    Maker,
    #[default]
    Taker,
}

/// Executed trade record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fill {
    pub market: String,
    pub side: Side,
    #[serde(deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub size: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub fee: f64,
    /// `None` while the exposure this fill opened is unresolved.
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub realized_pnl: Option<f64>,
    pub liquidity: Liquidity,
    pub created_at: DateTime<Utc>,
}

impl TradeLike for Fill {
    fn market(&self) -> &str {
        &self.market
    }

    fn closed_pnl(&self) -> Option<f64> {
        self.realized_pnl
    }

    fn notional(&self) -> f64 {
        (self.size * self.price).abs()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
