//! Liquidation and leverage risk for perpetual positions.

use serde::{Deserialize, Serialize};
use tradelens_core::domain::{Position, Side};

/// Maintenance margin fraction applied when none is configured (0.6%).
pub const DEFAULT_MAINTENANCE_MARGIN: f64 = 0.006;

/// Price at which the position's margin is exhausted.
///
/// Long: `entry * (1 - (1/leverage - mm))`. Short: `entry * (1 + (1/leverage - mm))`.
/// Returns 0.0 when entry price, size or leverage is missing. A long whose
/// margin covers the whole notional cannot be liquidated above zero, so its
/// price floors at 0.0.
pub fn liquidation_price(
    side: Side,
    entry_price: f64,
    size: f64,
    leverage: f64,
    maintenance_margin: f64,
) -> f64 {
    if entry_price <= 0.0 || size == 0.0 || leverage <= 0.0 {
        return 0.0;
    }
    let buffer = 1.0 / leverage - maintenance_margin;
    match side {
        Side::Long => (entry_price * (1.0 - buffer)).max(0.0),
        Side::Short => entry_price * (1.0 + buffer),
    }
}

/// Distance from the current price to liquidation, in percent of the current price.
///
/// Positive while the position is on the safe side; it shrinks toward zero
/// as price approaches the liquidation level and turns negative past it.
/// A long liquidating at 0.0 is 100% away: price would have to reach zero.
pub fn distance_to_liquidation(side: Side, current_price: f64, liquidation_price: f64) -> f64 {
    if current_price <= 0.0 {
        return 0.0;
    }
    let liquidation_price = liquidation_price.max(0.0);
    let gap = match side {
        Side::Long => current_price - liquidation_price,
        Side::Short if liquidation_price == 0.0 => return 0.0,
        Side::Short => liquidation_price - current_price,
    };
    gap / current_price * 100.0
}

/// Effective leverage: `|notional| / equity`, 0.0 without positive equity.
pub fn leverage(notional: f64, equity: f64) -> f64 {
    if equity <= 0.0 {
        return 0.0;
    }
    notional.abs() / equity
}

/// Risk snapshot of one open position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionRisk {
    pub leverage: f64,
    pub liquidation_price: f64,
    pub distance_pct: f64,
}

/// Leverage, liquidation price and distance for a position at `mark_price`.
///
/// Leverage is measured against `account_equity` using the mark-to-market
/// notional. Closed positions, and positions with no measurable leverage
/// (flat size or non-positive equity), report zeros.
pub fn assess_position(
    position: &Position,
    mark_price: f64,
    account_equity: f64,
    maintenance_margin: f64,
) -> PositionRisk {
    if position.is_closed() {
        return PositionRisk::default();
    }
    let lev = leverage(position.size * mark_price, account_equity);
    if lev == 0.0 {
        return PositionRisk::default();
    }
    let liq = liquidation_price(
        position.side,
        position.entry_price,
        position.size,
        lev,
        maintenance_margin,
    );
    PositionRisk {
        leverage: lev,
        liquidation_price: liq,
        distance_pct: distance_to_liquidation(position.side, mark_price, liq),
    }
}
