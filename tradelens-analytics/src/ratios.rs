//! Risk-adjusted return ratios.
//!
//! Every ratio takes per-period returns. Fractional and percentage returns
//! both work as long as the caller is consistent across arguments (risk-free
//! rate, thresholds and drawdowns in the same unit). Empty input gives 0.0.
//! Zero denominators resolve to 0.0 or the `SATURATED` sentinel per ratio.

use crate::annualization::annualize;
use crate::stats::{
    aligned, correlation, covariance, downside_deviation, lower_partial_moment, mean, std_dev,
    variance,
};
use crate::{saturate_on_zero, saturating_ratio};

/// Upper bound applied to the Kelly fraction, in percent.
pub const KELLY_CAP_PCT: f64 = 25.0;

/// Sharpe = (mean − rf) / σ, annualized by `sqrt(periods_per_year)`.
///
/// `risk_free` is per period. Zero volatility gives 0.0.
pub fn sharpe_ratio(returns: &[f64], risk_free: f64, periods_per_year: f64) -> f64 {
    let sd = std_dev(returns);
    if returns.is_empty() || sd < 1e-15 {
        return 0.0;
    }
    annualize((mean(returns) - risk_free) / sd, periods_per_year)
}

/// Sortino = (mean − target) / downside deviation, annualized.
///
/// With no downside the ratio saturates when the mean beats the target.
pub fn sortino_ratio(returns: &[f64], target: f64, periods_per_year: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let excess = mean(returns) - target;
    let dd = downside_deviation(returns, target);
    if dd < 1e-15 {
        return saturate_on_zero(excess);
    }
    annualize(excess / dd, periods_per_year)
}

/// Calmar = annualized mean return / |max drawdown|.
///
/// `max_drawdown` must be in the same unit as the returns.
pub fn calmar_ratio(returns: &[f64], max_drawdown: f64, periods_per_year: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let annual = mean(returns) * periods_per_year;
    let dd = max_drawdown.abs();
    if dd < 1e-15 {
        return saturate_on_zero(annual);
    }
    annual / dd
}

/// Omega = Σ gains above `threshold` / Σ shortfalls below it.
pub fn omega_ratio(returns: &[f64], threshold: f64) -> f64 {
    let (gains, losses) = returns.iter().fold((0.0, 0.0), |(g, l), r| {
        let d = r - threshold;
        if d > 0.0 {
            (g + d, l)
        } else {
            (g, l - d)
        }
    });
    saturating_ratio(gains, losses)
}

/// Kappa-3 = (mean − threshold) / LPM₃^(1/3).
pub fn kappa_three(returns: &[f64], threshold: f64) -> f64 {
    let lpm = lower_partial_moment(returns, threshold, 3);
    if returns.is_empty() || lpm < 1e-30 {
        return 0.0;
    }
    (mean(returns) - threshold) / lpm.cbrt()
}

/// Sterling = |annual return − rf| / average drawdown.
///
/// With no drawdown, saturates when the excess return is positive.
pub fn sterling_ratio(annual_return: f64, risk_free: f64, avg_drawdown: f64) -> f64 {
    let excess = annual_return - risk_free;
    let dd = avg_drawdown.abs();
    if dd < 1e-15 {
        return saturate_on_zero(excess);
    }
    excess.abs() / dd
}

/// Burke = (mean − rf) / sqrt(Σ drawdownᵢ²).
pub fn burke_ratio(returns: &[f64], drawdowns: &[f64], risk_free: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let excess = mean(returns) - risk_free;
    let denom = drawdowns.iter().map(|d| d * d).sum::<f64>().sqrt();
    if denom < 1e-15 {
        return saturate_on_zero(excess);
    }
    excess / denom
}

/// Beta = cov(r, m) / var(m) over the aligned prefix.
pub fn beta(returns: &[f64], market: &[f64]) -> f64 {
    let (r, m) = aligned(returns, market);
    let market_var = variance(m);
    if r.is_empty() || market_var < 1e-30 {
        return 0.0;
    }
    covariance(r, m) / market_var
}

/// Jensen's alpha = mean(r) − (rf + β (mean(m) − rf)).
pub fn alpha(returns: &[f64], market: &[f64], risk_free: f64) -> f64 {
    let (r, m) = aligned(returns, market);
    if r.is_empty() {
        return 0.0;
    }
    mean(r) - (risk_free + beta(r, m) * (mean(m) - risk_free))
}

/// Treynor = (mean − rf) / β.
pub fn treynor_ratio(returns: &[f64], market: &[f64], risk_free: f64) -> f64 {
    let (r, m) = aligned(returns, market);
    let b = beta(r, m);
    if b.abs() < 1e-15 {
        return 0.0;
    }
    (mean(r) - risk_free) / b
}

/// Information ratio = mean(active) / σ(active), active = r − benchmark.
pub fn information_ratio(returns: &[f64], benchmark: &[f64]) -> f64 {
    let (r, b) = aligned(returns, benchmark);
    let active: Vec<f64> = r.iter().zip(b).map(|(x, y)| x - y).collect();
    let tracking_error = std_dev(&active);
    if active.is_empty() || tracking_error < 1e-15 {
        return 0.0;
    }
    mean(&active) / tracking_error
}

/// Coefficient of determination against the market.
pub fn r_squared(returns: &[f64], market: &[f64]) -> f64 {
    correlation(returns, market).powi(2)
}

/// Gain-to-pain = Σr / Σ|r|.
pub fn gain_to_pain(returns: &[f64]) -> f64 {
    let pain: f64 = returns.iter().map(|r| r.abs()).sum();
    if pain < 1e-15 {
        return 0.0;
    }
    returns.iter().sum::<f64>() / pain
}

/// Compound annual growth rate, in percent.
///
/// Returns 0.0 without positive capital and a positive horizon, or when the
/// growth factor has no real root (negative final equity).
pub fn cagr_pct(initial: f64, final_equity: f64, years: f64) -> f64 {
    if initial <= 0.0 || years <= 0.0 || final_equity < 0.0 {
        return 0.0;
    }
    let cagr = ((final_equity / initial).powf(1.0 / years) - 1.0) * 100.0;
    if cagr.is_finite() {
        cagr
    } else {
        0.0
    }
}

/// MAR = |CAGR% / max drawdown%|.
pub fn mar_ratio(initial: f64, final_equity: f64, years: f64, max_drawdown_pct: f64) -> f64 {
    if initial <= 0.0 || years <= 0.0 || max_drawdown_pct.abs() < 1e-15 {
        return 0.0;
    }
    (cagr_pct(initial, final_equity, years) / max_drawdown_pct).abs()
}

/// Kelly fraction in percent, clamped to `[0, KELLY_CAP_PCT]`.
///
/// `win_rate_pct` is 0..=100; the payoff ratio is `avg_win / avg_loss`.
pub fn kelly_criterion(win_rate_pct: f64, avg_win_ratio: f64, avg_loss_ratio: f64) -> f64 {
    if avg_loss_ratio.abs() < 1e-15 {
        return 0.0;
    }
    let b = avg_win_ratio / avg_loss_ratio;
    if b.abs() < 1e-15 {
        return 0.0;
    }
    let p = win_rate_pct / 100.0;
    let q = 1.0 - p;
    let kelly = (p * b - q) / b * 100.0;
    kelly.clamp(0.0, KELLY_CAP_PCT)
}

/// Net profit / largest absolute drawdown.
pub fn recovery_factor(net_profit: f64, max_drawdown_value: f64) -> f64 {
    let dd = max_drawdown_value.abs();
    if dd < 1e-15 {
        return saturate_on_zero(net_profit);
    }
    net_profit / dd
}
