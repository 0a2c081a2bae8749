//! TradeLens Analytics — performance and risk metrics over trading records.
//!
//! This crate builds on `tradelens-core` to provide:
//! - Statistical primitives (population moments, partial moments, quantiles)
//! - Trade and position statistics, calendar and per-market grouping
//! - Risk-adjusted ratios (Sharpe, Sortino, Calmar, Omega, Kappa, Kelly, ...)
//! - Drawdown segmentation, VaR/CVaR and tail ratios
//! - Sampling-frequency inference for annualization
//! - Liquidation price and leverage risk
//! - A `MetricsBundle` that computes everything for one dataset
//!
//! Everything here is a pure function of its inputs. Degenerate inputs never
//! produce NaN: undefined results are 0.0 and a favourable division by zero
//! is reported as [`SATURATED`].

pub mod annualization;
pub mod bundle;
pub mod config;
pub mod drawdown;
pub mod liquidation;
pub mod ratios;
pub mod returns;
pub mod stats;
pub mod tail_metrics;
pub mod trade_metrics;

pub use bundle::{MetricsBundle, MetricsInput};
pub use config::{AnalyticsConfig, ConfigError, TradeSource};
pub use drawdown::{DrawdownPeriod, MaxDrawdown};
pub use liquidation::PositionRisk;
pub use tail_metrics::{MonteCarloConfig, VarMethod};
pub use trade_metrics::{FeeSummary, GroupStats, HoldTimes, Streaks, TimeBucket, TradeSummary};

/// Value reported when a ratio's denominator is zero and its numerator is
/// favourable (e.g. profit factor with no losing trades).
pub const SATURATED: f64 = 999.0;

/// `gain / loss`, with a zero loss mapped to `SATURATED` when there is any
/// gain and to 0.0 otherwise.
pub(crate) fn saturating_ratio(gain: f64, loss: f64) -> f64 {
    if loss.abs() < 1e-15 {
        if gain > 0.0 {
            tracing::trace!(gain, "ratio saturated on zero denominator");
        }
        return saturate_on_zero(gain);
    }
    gain / loss
}

/// `SATURATED` for a positive numerator, 0.0 otherwise.
pub(crate) fn saturate_on_zero(numerator: f64) -> f64 {
    if numerator > 0.0 {
        SATURATED
    } else {
        0.0
    }
}
