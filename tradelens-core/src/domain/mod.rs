//! Domain records for TradeLens

pub mod equity;
pub mod fill;
pub mod position;
pub mod trade;

pub use equity::{normalize_equity, EquityPoint, EquitySample};
pub use fill::{Fill, Liquidity};
pub use position::{Position, PositionStatus};
pub use trade::{Side, TradeLike};
