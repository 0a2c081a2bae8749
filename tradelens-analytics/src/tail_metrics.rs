//! Tail risk — Value-at-Risk, CVaR, volatility, tail ratio.
//!
//! VaR and CVaR are reported as magnitudes (non-negative). All functions are
//! pure: returns in, scalar out. The only randomness is the Monte Carlo VaR,
//! which draws from a caller-supplied `Rng` or the seed hierarchy.

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tradelens_core::rng::RngHierarchy;

use crate::saturating_ratio;
use crate::stats::{mean, quantile_index, sorted_copy, std_dev};

/// Default number of Monte Carlo draws.
pub const DEFAULT_SIMULATIONS: usize = 10_000;

/// Default tail percentile for the tail ratio.
pub const DEFAULT_TAIL_PERCENTILE: f64 = 0.05;

/// Seed-hierarchy stream that Monte Carlo VaR draws from.
pub const VAR_STREAM: &str = "value_at_risk";

/// Monte Carlo VaR settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub simulations: usize,
    pub seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            simulations: DEFAULT_SIMULATIONS,
            seed: 42,
        }
    }
}

/// How VaR is estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarMethod {
    /// Empirical quantile of the observed returns.
    #[default]
    Historical,
    /// Normal approximation from mean and standard deviation.
    Parametric,
    /// Empirical quantile of simulated normal returns.
    MonteCarlo,
}

/// Value-at-Risk magnitude at `confidence` (e.g. 0.95).
///
/// Monte Carlo runs with `MonteCarloConfig::default()`.
pub fn value_at_risk(returns: &[f64], confidence: f64, method: VarMethod) -> f64 {
    value_at_risk_with(returns, confidence, method, &MonteCarloConfig::default())
}

/// VaR by `method`, with explicit Monte Carlo settings.
///
/// Monte Carlo draws from `RngHierarchy::new(seed).rng_for(VAR_STREAM, 0)`,
/// so equal seeds give equal results wherever VaR is computed.
pub fn value_at_risk_with(
    returns: &[f64],
    confidence: f64,
    method: VarMethod,
    monte_carlo: &MonteCarloConfig,
) -> f64 {
    match method {
        VarMethod::Historical => historical_var(returns, confidence),
        VarMethod::Parametric => parametric_var(returns, confidence),
        VarMethod::MonteCarlo => {
            let mut rng = RngHierarchy::new(monte_carlo.seed).rng_for(VAR_STREAM, 0);
            monte_carlo_var(returns, confidence, monte_carlo.simulations, &mut rng)
        }
    }
}

/// Historical VaR: the return at rank `floor((1 - c) * n)` of the sorted sample.
pub fn historical_var(returns: &[f64], confidence: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let sorted = sorted_copy(returns);
    sorted[quantile_index(sorted.len(), 1.0 - confidence)].abs()
}

/// One-sided z-score for the supported confidence levels.
///
/// Unknown levels fall back to the 95% value.
pub fn z_score(confidence: f64) -> f64 {
    const TABLE: [(f64, f64); 3] = [(0.90, 1.282), (0.95, 1.645), (0.99, 2.326)];
    TABLE
        .iter()
        .find(|(c, _)| (c - confidence).abs() < 1e-9)
        .map_or(1.645, |&(_, z)| z)
}

/// Parametric VaR: `|mean − z(c) · σ|`.
pub fn parametric_var(returns: &[f64], confidence: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    (mean(returns) - z_score(confidence) * std_dev(returns)).abs()
}

/// Monte Carlo VaR with an injected random source.
///
/// Simulates `simulations` normal returns with the sample's mean and σ
/// (Box–Muller), then takes the historical VaR of the simulated set.
pub fn monte_carlo_var<R: Rng + ?Sized>(
    returns: &[f64],
    confidence: f64,
    simulations: usize,
    rng: &mut R,
) -> f64 {
    if returns.is_empty() || simulations == 0 {
        return 0.0;
    }
    let mu = mean(returns);
    let sigma = std_dev(returns);
    let simulated: Vec<f64> = (0..simulations)
        .map(|_| mu + sigma * standard_normal(rng))
        .collect();
    historical_var(&simulated, confidence)
}

/// One standard normal draw via the Box–Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // gen() is in [0, 1); shift to (0, 1] so ln never sees zero
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Conditional VaR: mean of the sorted returns up to and including the VaR rank.
pub fn conditional_var(returns: &[f64], confidence: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let sorted = sorted_copy(returns);
    let cutoff = quantile_index(sorted.len(), 1.0 - confidence);
    mean(&sorted[..=cutoff]).abs()
}

/// Volatility: population σ scaled by `sqrt(annualization_factor)`.
pub fn volatility(returns: &[f64], annualization_factor: f64) -> f64 {
    std_dev(returns) * annualization_factor.max(0.0).sqrt()
}

/// Tail ratio: |upper-tail quantile| / |lower-tail quantile|.
///
/// A zero lower tail saturates when the upper tail is non-zero.
pub fn tail_ratio(returns: &[f64], percentile: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let sorted = sorted_copy(returns);
    let n = sorted.len();
    let right = sorted[quantile_index(n, 1.0 - percentile)].abs();
    let left = sorted[quantile_index(n, percentile)].abs();
    saturating_ratio(right, left)
}

// ─── Tests ───────────────────────────────────────────────────────────
