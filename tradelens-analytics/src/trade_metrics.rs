//! Trade and position statistics — pure functions over `TradeLike` records.
//!
//! A record counts as a trade once it has a resolved P&L (`closed_pnl()` is
//! `Some`). Zero P&L is neither a win nor a loss.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tradelens_core::domain::{Fill, Liquidity, Position, TradeLike};

use crate::saturating_ratio;

/// Aggregate win/loss statistics for one set of trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeSummary {
    pub closed_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub total_pnl: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    /// Percentage, 0..=100.
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    /// Positive magnitude.
    pub avg_loss: f64,
    pub largest_win: f64,
    /// Most negative P&L (0.0 when there are no losses).
    pub largest_loss: f64,
    pub payoff_ratio: f64,
    pub expectancy: f64,
}

impl TradeSummary {
    pub fn compute<T: TradeLike>(trades: &[T]) -> Self {
        let mut s = Self::default();
        for pnl in trades.iter().filter_map(TradeLike::closed_pnl) {
            s.closed_trades += 1;
            s.total_pnl += pnl;
            if pnl > 0.0 {
                s.wins += 1;
                s.gross_profit += pnl;
                s.largest_win = s.largest_win.max(pnl);
            } else if pnl < 0.0 {
                s.losses += 1;
                s.gross_loss += pnl.abs();
                s.largest_loss = s.largest_loss.min(pnl);
            }
        }
        s.win_rate = percent(s.wins, s.closed_trades);
        s.profit_factor = saturating_ratio(s.gross_profit, s.gross_loss);
        s.avg_win = average(s.gross_profit, s.wins);
        s.avg_loss = average(s.gross_loss, s.losses);
        s.payoff_ratio = saturating_ratio(s.avg_win, s.avg_loss);
        s.expectancy = expectancy(s.win_rate, s.avg_win, s.avg_loss);
        s
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Sum of resolved P&L; unresolved records contribute nothing.
pub fn total_pnl<T: TradeLike>(trades: &[T]) -> f64 {
    trades.iter().filter_map(TradeLike::closed_pnl).sum()
}

/// Winning share of resolved trades, in percent.
pub fn win_rate<T: TradeLike>(trades: &[T]) -> f64 {
    let closed: Vec<f64> = trades.iter().filter_map(TradeLike::closed_pnl).collect();
    let wins = closed.iter().filter(|&&p| p > 0.0).count();
    percent(wins, closed.len())
}

/// Gross profit / gross loss, saturating at 999 when there are no losses.
pub fn profit_factor<T: TradeLike>(trades: &[T]) -> f64 {
    let (profit, loss) = trades
        .iter()
        .filter_map(TradeLike::closed_pnl)
        .fold((0.0, 0.0), |(p, l), pnl| {
            if pnl > 0.0 {
                (p + pnl, l)
            } else {
                (p, l - pnl.min(0.0))
            }
        });
    saturating_ratio(profit, loss)
}

/// `p * avg_win - (1 - p) * avg_loss` with `p` the win rate as a fraction.
pub fn expectancy(win_rate_pct: f64, avg_win: f64, avg_loss: f64) -> f64 {
    let p = win_rate_pct / 100.0;
    p * avg_win - (1.0 - p) * avg_loss
}

/// Consecutive win/loss runs over resolved trades in input order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    pub max_wins: usize,
    pub max_losses: usize,
    /// Win run still open after the last trade.
    pub current_wins: usize,
    /// Loss run still open after the last trade.
    pub current_losses: usize,
}

/// A flat trade ends whichever run is active without starting the other.
pub fn streaks<T: TradeLike>(trades: &[T]) -> Streaks {
    let mut s = Streaks::default();
    for pnl in trades.iter().filter_map(TradeLike::closed_pnl) {
        if pnl > 0.0 {
            s.current_wins += 1;
            s.current_losses = 0;
        } else if pnl < 0.0 {
            s.current_losses += 1;
            s.current_wins = 0;
        } else {
            s.current_wins = 0;
            s.current_losses = 0;
        }
        s.max_wins = s.max_wins.max(s.current_wins);
        s.max_losses = s.max_losses.max(s.current_losses);
    }
    s
}

/// Average holding time in hours over closed positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HoldTimes {
    pub average: f64,
    pub winners: f64,
    pub losers: f64,
}

pub fn hold_times(positions: &[Position]) -> HoldTimes {
    let held: Vec<(f64, f64)> = positions
        .iter()
        .filter_map(|p| p.hold_hours().map(|h| (h, p.realized_pnl)))
        .collect();
    let avg_where = |keep: fn(f64) -> bool| {
        let hours: Vec<f64> = held
            .iter()
            .filter(|(_, pnl)| keep(*pnl))
            .map(|(h, _)| *h)
            .collect();
        crate::stats::mean(&hours)
    };
    HoldTimes {
        average: avg_where(|_| true),
        winners: avg_where(|pnl| pnl > 0.0),
        losers: avg_where(|pnl| pnl < 0.0),
    }
}

// ─── Grouping ───────────────────────────────────────────────────────

/// Calendar bucket used to group trades by their creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

/// Bucket key for a timestamp in the given local offset.
///
/// Weeks are numbered from the day of year: `ceil((yday + weekday(Jan 1)) / 7)`
/// with Sunday as weekday 0. This intentionally differs from ISO 8601.
pub fn bucket_key(at: DateTime<Utc>, bucket: TimeBucket, offset: FixedOffset) -> String {
    let local = at.with_timezone(&offset);
    match bucket {
        TimeBucket::Hourly => format!("{} {:02}:00", local.format("%Y-%m-%d"), local.hour()),
        TimeBucket::Daily => local.format("%Y-%m-%d").to_string(),
        TimeBucket::Weekly => format!("{}-W{:02}", local.year(), week_of_year(local.date_naive())),
        TimeBucket::Monthly => local.format("%Y-%m").to_string(),
    }
}

fn week_of_year(date: chrono::NaiveDate) -> u32 {
    let jan1 = date.with_ordinal(1).unwrap_or(date);
    let jan1_weekday = jan1.weekday().num_days_from_sunday();
    (date.ordinal() + jan1_weekday).div_ceil(7)
}

/// Totals for one time bucket or one market.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub trades: usize,
    pub total_pnl: f64,
    pub wins: usize,
    pub losses: usize,
    /// Sum of `size * price`.
    pub volume: f64,
    pub win_rate: f64,
    pub avg_pnl: f64,
    pub profit_factor: f64,
    #[serde(skip)]
    gross_profit: f64,
    #[serde(skip)]
    gross_loss: f64,
    #[serde(skip)]
    closed: usize,
}

impl GroupStats {
    fn add<T: TradeLike>(&mut self, trade: &T) {
        self.trades += 1;
        self.volume += trade.notional();
        if let Some(pnl) = trade.closed_pnl() {
            self.closed += 1;
            self.total_pnl += pnl;
            if pnl > 0.0 {
                self.wins += 1;
                self.gross_profit += pnl;
            } else if pnl < 0.0 {
                self.losses += 1;
                self.gross_loss -= pnl;
            }
        }
    }

    fn finish(mut self) -> Self {
        self.win_rate = percent(self.wins, self.closed);
        self.avg_pnl = average(self.total_pnl, self.trades);
        self.profit_factor = saturating_ratio(self.gross_profit, self.gross_loss);
        self
    }
}

/// Group trades by calendar bucket; keys sort chronologically.
pub fn group_by_period<T: TradeLike>(
    trades: &[T],
    bucket: TimeBucket,
    offset: FixedOffset,
) -> BTreeMap<String, GroupStats> {
    group_by(trades, |t| bucket_key(t.created_at(), bucket, offset))
}

/// Per-market statistics keyed by market identifier.
pub fn market_stats<T: TradeLike>(trades: &[T]) -> BTreeMap<String, GroupStats> {
    group_by(trades, |t| t.market().to_string())
}

fn group_by<T, F>(trades: &[T], key: F) -> BTreeMap<String, GroupStats>
where
    T: TradeLike,
    F: Fn(&T) -> String,
{
    let mut groups: BTreeMap<String, GroupStats> = BTreeMap::new();
    for trade in trades {
        groups.entry(key(trade)).or_default().add(trade);
    }
    groups
        .into_iter()
        .map(|(k, stats)| (k, stats.finish()))
        .collect()
}

// ─── Costs ──────────────────────────────────────────────────────────

/// Fees paid, split by liquidity role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeSummary {
    pub total: f64,
    pub maker: f64,
    pub taker: f64,
}

pub fn fee_summary(fills: &[Fill]) -> FeeSummary {
    fills.iter().fold(FeeSummary::default(), |mut acc, f| {
        acc.total += f.fee;
        match f.liquidity {
            Liquidity::Maker => acc.maker += f.fee,
            Liquidity::Taker => acc.taker += f.fee,
        }
        acc
    })
}

/// Net funding across all positions (positive = received).
pub fn net_funding(positions: &[Position]) -> f64 {
    positions.iter().map(|p| p.net_funding).sum()
}

/// Realized P&L across all positions regardless of status.
pub fn total_realized_pnl(positions: &[Position]) -> f64 {
    positions.iter().map(|p| p.realized_pnl).sum()
}

pub fn total_unrealized_pnl(positions: &[Position]) -> f64 {
    positions.iter().map(|p| p.unrealized_pnl).sum()
}

// ─── Helpers ────────────────────────────────────────────────────────

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    total / count as f64
}
