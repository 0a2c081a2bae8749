//! Metrics bundle — every metric for one dataset in a single struct.
//!
//! `MetricsBundle::compute` is the one place where the individual metric
//! functions are wired together. Ratios run on fractional returns; drawdown
//! percentages are converted to fractions before they meet those returns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use tradelens_core::domain::{EquityPoint, Fill, Position};

use crate::annualization::{resolve_periods_per_year, SECONDS_PER_YEAR};
use crate::config::{AnalyticsConfig, TradeSource};
use crate::drawdown::{average_drawdown, drawdown_periods, max_drawdown, ulcer_index, MaxDrawdown};
use crate::ratios::{
    alpha, beta, burke_ratio, cagr_pct, calmar_ratio, gain_to_pain, information_ratio,
    kappa_three, kelly_criterion, mar_ratio, omega_ratio, r_squared, recovery_factor,
    sharpe_ratio, sortino_ratio, sterling_ratio, treynor_ratio,
};
use crate::returns::{equity_values, simple_returns, total_return};
use crate::stats::{kurtosis, mean, skewness};
use crate::tail_metrics::{conditional_var, tail_ratio, value_at_risk_with, volatility};
use crate::trade_metrics::{
    fee_summary, hold_times, net_funding, streaks, total_unrealized_pnl, FeeSummary, HoldTimes,
    Streaks, TradeSummary,
};

/// Borrowed records for one bundle computation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsInput<'a> {
    pub fills: &'a [Fill],
    pub positions: &'a [Position],
    /// Time-ascending equity snapshots.
    pub equity: &'a [EquityPoint],
    /// Benchmark returns aligned with the equity returns.
    pub benchmark: Option<&'a [f64]>,
}

/// All metrics for one dataset. Every field is present; empty input gives zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsBundle {
    // Equity
    pub periods_per_year: f64,
    pub observations: usize,
    /// Fractional change over the whole series.
    pub total_return: f64,
    /// Percent per year.
    pub cagr: f64,
    pub mean_return: f64,
    pub volatility: f64,
    pub skewness: f64,
    pub kurtosis: f64,

    // Risk-adjusted
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    pub omega: f64,
    pub kappa_three: f64,
    pub sterling: f64,
    pub burke: f64,
    pub gain_to_pain: f64,
    pub mar: f64,
    pub recovery_factor: f64,

    // Benchmark-relative (zero without a benchmark)
    pub beta: f64,
    pub alpha: f64,
    pub treynor: f64,
    pub information_ratio: f64,
    pub r_squared: f64,

    // Drawdown and tail
    pub max_drawdown: MaxDrawdown,
    /// Percent.
    pub average_drawdown: f64,
    pub drawdown_count: usize,
    pub ulcer_index: f64,
    pub value_at_risk: f64,
    pub conditional_var: f64,
    pub tail_ratio: f64,

    // Trades
    pub trades: TradeSummary,
    pub streaks: Streaks,
    pub hold_times: HoldTimes,
    pub kelly: f64,
    pub fees: FeeSummary,
    pub net_funding: f64,
    pub unrealized_pnl: f64,
}

impl MetricsBundle {
    pub fn compute(input: &MetricsInput<'_>, config: &AnalyticsConfig) -> Self {
        let timestamps: Vec<_> = input.equity.iter().map(|p| p.timestamp).collect();
        let ppy = resolve_periods_per_year(config.periods_per_year, &timestamps);
        let equity = equity_values(input.equity);
        let returns = simple_returns(&equity);
        let rf = config.risk_free_rate;

        debug!(
            fills = input.fills.len(),
            positions = input.positions.len(),
            equity_points = equity.len(),
            returns = returns.len(),
            periods_per_year = ppy,
            "computing metrics bundle"
        );

        let dd = max_drawdown(&equity);
        let periods = drawdown_periods(&equity, config.drawdown_threshold_pct);
        let avg_dd_pct = average_drawdown(&periods);
        let period_depths: Vec<f64> = periods.iter().map(|p| p.depth_pct / 100.0).collect();

        let years = span_years(input.equity, returns.len(), ppy);
        let (initial, last) = match (equity.first(), equity.last()) {
            (Some(&a), Some(&b)) => (a, b),
            _ => (0.0, 0.0),
        };
        let mean_return = mean(&returns);

        let trades = match config.trade_source {
            TradeSource::Positions => TradeSummary::compute(input.positions),
            TradeSource::Fills => TradeSummary::compute(input.fills),
        };
        let trade_streaks = match config.trade_source {
            TradeSource::Positions => streaks(input.positions),
            TradeSource::Fills => streaks(input.fills),
        };

        let market = input.benchmark.unwrap_or(&[]);

        Self {
            periods_per_year: ppy,
            observations: equity.len(),
            total_return: total_return(&equity),
            cagr: cagr_pct(initial, last, years),
            mean_return,
            volatility: volatility(&returns, ppy),
            skewness: skewness(&returns),
            kurtosis: kurtosis(&returns),

            sharpe: sharpe_ratio(&returns, rf, ppy),
            sortino: sortino_ratio(&returns, rf, ppy),
            calmar: calmar_ratio(&returns, dd.percentage / 100.0, ppy),
            omega: omega_ratio(&returns, rf),
            kappa_three: kappa_three(&returns, rf),
            sterling: if returns.is_empty() {
                0.0
            } else {
                sterling_ratio(mean_return * ppy, rf * ppy, avg_dd_pct / 100.0)
            },
            burke: burke_ratio(&returns, &period_depths, rf),
            gain_to_pain: gain_to_pain(&returns),
            mar: mar_ratio(initial, last, years, dd.percentage),
            recovery_factor: if equity.len() < 2 {
                0.0
            } else {
                recovery_factor(last - initial, dd.value)
            },

            beta: beta(&returns, market),
            alpha: alpha(&returns, market, rf),
            treynor: treynor_ratio(&returns, market, rf),
            information_ratio: information_ratio(&returns, market),
            r_squared: r_squared(&returns, market),

            max_drawdown: dd,
            average_drawdown: avg_dd_pct,
            drawdown_count: periods.len(),
            ulcer_index: ulcer_index(&equity),
            value_at_risk: var_for(&returns, config),
            conditional_var: conditional_var(&returns, config.var_confidence),
            tail_ratio: tail_ratio(&returns, config.tail_percentile),

            kelly: kelly_criterion(trades.win_rate, trades.avg_win, trades.avg_loss),
            trades,
            streaks: trade_streaks,
            hold_times: hold_times(input.positions),
            fees: fee_summary(input.fills),
            net_funding: net_funding(input.positions),
            unrealized_pnl: total_unrealized_pnl(input.positions),
        }
    }

    /// Flattened `name → value` view. Nested records use dotted keys
    /// (`max_drawdown.percentage`, `trades.win_rate`).
    pub fn to_flat_map(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        if let Ok(value) = serde_json::to_value(self) {
            flatten_into(&mut out, "", &value);
        }
        out
    }

    /// Look up one metric by its flattened name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.to_flat_map().get(name).copied()
    }
}

fn flatten_into(out: &mut BTreeMap<String, f64>, prefix: &str, value: &Value) {
    match value {
        Value::Object(fields) => {
            for (key, child) in fields {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(out, &name, child);
            }
        }
        Value::Number(n) => {
            if let Some(x) = n.as_f64() {
                out.insert(prefix.to_string(), x);
            }
        }
        _ => {}
    }
}

fn var_for(returns: &[f64], config: &AnalyticsConfig) -> f64 {
    value_at_risk_with(
        returns,
        config.var_confidence,
        config.var_method,
        &config.monte_carlo,
    )
}

/// Length of the series in years: wall-clock span when the timestamps cover
/// one, otherwise the return count over the sampling frequency.
fn span_years(points: &[EquityPoint], return_count: usize, ppy: f64) -> f64 {
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        let seconds = (last.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0;
        if seconds > 0.0 {
            return seconds / SECONDS_PER_YEAR;
        }
    }
    if ppy > 0.0 {
        return_count as f64 / ppy
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tail_metrics::{historical_var, value_at_risk, VarMethod};
    use chrono::{Duration, TimeZone, Utc};
    use tradelens_core::domain::{PositionStatus, Side};

    fn daily_equity(values: &[f64]) -> Vec<EquityPoint> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint::new(start + Duration::days(i as i64), v))
            .collect()
    }

    fn closed(pnl: f64) -> Position {
        let opened = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Position {
            market: "ETH-USD".into(),
            side: Side::Long,
            size: 1.0,
            entry_price: 2_000.0,
            status: PositionStatus::Closed,
            realized_pnl: pnl,
            created_at: opened,
            closed_at: Some(opened + Duration::hours(4)),
            ..Default::default()
        }
    }

    // ── Empty input ──

    #[test]
    fn empty_input_is_all_zero() {
        let bundle = MetricsBundle::compute(&MetricsInput::default(), &AnalyticsConfig::default());
        for (name, value) in bundle.to_flat_map() {
            if name == "periods_per_year" {
                continue;
            }
            assert_eq!(value, 0.0, "{name} should be zero on empty input");
        }
    }

    // ── Equity-driven metrics ──

    #[test]
    fn daily_series_infers_365_periods() {
        let equity = daily_equity(&[100.0, 110.0, 99.0, 120.0]);
        let input = MetricsInput {
            equity: &equity,
            ..Default::default()
        };
        let bundle = MetricsBundle::compute(&input, &AnalyticsConfig::default());
        assert!((bundle.periods_per_year - 365.0).abs() < 1e-9);
        assert_eq!(bundle.observations, 4);
        assert!((bundle.total_return - 0.2).abs() < 1e-12);
        assert!((bundle.max_drawdown.percentage - 10.0).abs() < 1e-9);
        assert_eq!(bundle.drawdown_count, 1);
    }

    #[test]
    fn calmar_uses_fractional_drawdown() {
        let equity = daily_equity(&[100.0, 110.0, 99.0, 120.0]);
        let config = AnalyticsConfig {
            periods_per_year: Some(1.0),
            ..Default::default()
        };
        let input = MetricsInput {
            equity: &equity,
            ..Default::default()
        };
        let bundle = MetricsBundle::compute(&input, &config);
        let returns = simple_returns(&equity_values(&equity));
        let expected = mean(&returns) / 0.1;
        assert!((bundle.calmar - expected).abs() < 1e-9);
    }

    #[test]
    fn rising_equity_saturates_drawdown_ratios() {
        let equity = daily_equity(&[100.0, 101.0, 103.0, 106.0]);
        let input = MetricsInput {
            equity: &equity,
            ..Default::default()
        };
        let bundle = MetricsBundle::compute(&input, &AnalyticsConfig::default());
        assert_eq!(bundle.calmar, crate::SATURATED);
        assert_eq!(bundle.sterling, crate::SATURATED);
        assert_eq!(bundle.burke, crate::SATURATED);
        assert_eq!(bundle.omega, crate::SATURATED);
        assert_eq!(bundle.value_at_risk, historical_var(&bundle_returns(&equity), 0.95));
    }

    fn bundle_returns(equity: &[EquityPoint]) -> Vec<f64> {
        simple_returns(&equity_values(equity))
    }

    #[test]
    fn benchmark_metrics_need_a_benchmark() {
        let equity = daily_equity(&[100.0, 102.0, 101.0, 104.0]);
        let returns = bundle_returns(&equity);
        let benchmark: Vec<f64> = returns.iter().map(|r| r / 2.0).collect();

        let without = MetricsBundle::compute(
            &MetricsInput {
                equity: &equity,
                ..Default::default()
            },
            &AnalyticsConfig::default(),
        );
        assert_eq!(without.beta, 0.0);
        assert_eq!(without.r_squared, 0.0);

        let with = MetricsBundle::compute(
            &MetricsInput {
                equity: &equity,
                benchmark: Some(&benchmark),
                ..Default::default()
            },
            &AnalyticsConfig::default(),
        );
        assert!((with.beta - 2.0).abs() < 1e-9);
        assert!((with.r_squared - 1.0).abs() < 1e-9);
    }

    // ── VaR method selection ──

    #[test]
    fn monte_carlo_var_is_seeded() {
        let equity = daily_equity(&[100.0, 97.0, 103.0, 99.0, 104.0, 101.0]);
        let input = MetricsInput {
            equity: &equity,
            ..Default::default()
        };
        let config = AnalyticsConfig {
            var_method: VarMethod::MonteCarlo,
            ..Default::default()
        };
        let a = MetricsBundle::compute(&input, &config);
        let b = MetricsBundle::compute(&input, &config);
        assert_eq!(a.value_at_risk, b.value_at_risk);
        assert!(a.value_at_risk > 0.0);

        let returns = simple_returns(&equity_values(&equity));
        assert_eq!(
            a.value_at_risk,
            value_at_risk(&returns, config.var_confidence, VarMethod::MonteCarlo)
        );
    }

    // ── Trade source ──

    #[test]
    fn trade_stats_follow_source() {
        let positions = vec![closed(50.0), closed(-25.0), closed(30.0)];
        let fills = vec![Fill {
            realized_pnl: Some(-10.0),
            ..Default::default()
        }];
        let input = MetricsInput {
            positions: &positions,
            fills: &fills,
            ..Default::default()
        };

        let by_position = MetricsBundle::compute(&input, &AnalyticsConfig::default());
        assert_eq!(by_position.trades.closed_trades, 3);
        assert!((by_position.trades.total_pnl - 55.0).abs() < 1e-12);
        assert!((by_position.hold_times.average - 4.0).abs() < 1e-12);

        let config = AnalyticsConfig {
            trade_source: TradeSource::Fills,
            ..Default::default()
        };
        let by_fill = MetricsBundle::compute(&input, &config);
        assert_eq!(by_fill.trades.closed_trades, 1);
        assert_eq!(by_fill.trades.losses, 1);
        assert_eq!(by_fill.streaks.max_losses, 1);
    }

    // ── Flat map ──

    #[test]
    fn flat_map_uses_dotted_keys() {
        let equity = daily_equity(&[100.0, 80.0, 90.0, 70.0, 120.0]);
        let input = MetricsInput {
            equity: &equity,
            ..Default::default()
        };
        let bundle = MetricsBundle::compute(&input, &AnalyticsConfig::default());
        let flat = bundle.to_flat_map();
        assert!((flat["max_drawdown.percentage"] - 30.0).abs() < 1e-9);
        assert_eq!(flat["max_drawdown.trough_index"], 3.0);
        assert!(flat.contains_key("trades.win_rate"));
        assert!(flat.contains_key("fees.total"));
        assert_eq!(bundle.get("sharpe"), Some(bundle.sharpe));
        assert_eq!(bundle.get("no_such_metric"), None);
    }

    #[test]
    fn json_roundtrip() {
        let equity = daily_equity(&[100.0, 105.0, 95.0]);
        let input = MetricsInput {
            equity: &equity,
            ..Default::default()
        };
        let bundle = MetricsBundle::compute(&input, &AnalyticsConfig::default());
        let json = serde_json::to_string(&bundle).unwrap();
        let back: MetricsBundle = serde_json::from_str(&json).unwrap();
        for (name, value) in bundle.to_flat_map() {
            let restored = back.get(&name).unwrap();
            assert!((value - restored).abs() <= 1e-12 * value.abs().max(1.0), "{name}");
        }
    }
}
