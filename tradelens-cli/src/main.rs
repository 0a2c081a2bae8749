//! TradeLens CLI — run the analytics engine over record files.
//!
//! Commands:
//! - `report` — compute the full metrics bundle from positions, fills and equity
//! - `var` — Value-at-Risk and CVaR of an equity series by a chosen method

mod load;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tradelens_analytics::annualization::DEFAULT_PERIODS_PER_YEAR;
use tradelens_analytics::returns::{equity_values, simple_returns};
use tradelens_analytics::tail_metrics::{
    conditional_var, value_at_risk_with, MonteCarloConfig, VarMethod, DEFAULT_SIMULATIONS,
};
use tradelens_analytics::{MetricsBundle, MetricsInput};
use tradelens_core::domain::{Fill, Position};

#[derive(Parser)]
#[command(
    name = "tradelens",
    about = "TradeLens CLI — performance and risk analytics for trading records"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every metric for one dataset and print it as JSON.
    Report {
        /// Positions JSON array.
        #[arg(long)]
        positions: Option<PathBuf>,

        /// Fills JSON array.
        #[arg(long)]
        fills: Option<PathBuf>,

        /// Equity series: `.csv` with timestamp,equity columns, or JSON.
        #[arg(long)]
        equity: Option<PathBuf>,

        /// Benchmark per-period returns as a JSON array of numbers.
        #[arg(long)]
        benchmark: Option<PathBuf>,

        /// TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print a flat `name -> value` map instead of the nested bundle.
        #[arg(long, default_value_t = false)]
        flat: bool,
    },
    /// Value-at-Risk of an equity series.
    Var {
        /// Equity series: `.csv` with timestamp,equity columns, or JSON.
        #[arg(long)]
        equity: PathBuf,

        /// Confidence level in (0, 1).
        #[arg(long, default_value_t = 0.95)]
        confidence: f64,

        #[arg(long, value_enum, default_value_t = Method::Historical)]
        method: Method,

        /// Monte Carlo draws.
        #[arg(long, default_value_t = DEFAULT_SIMULATIONS)]
        simulations: usize,

        /// Monte Carlo master seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
enum Method {
    Historical,
    Parametric,
    MonteCarlo,
}

impl From<Method> for VarMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Historical => VarMethod::Historical,
            Method::Parametric => VarMethod::Parametric,
            Method::MonteCarlo => VarMethod::MonteCarlo,
        }
    }
}

#[derive(Serialize)]
struct VarReport {
    method: Method,
    confidence: f64,
    observations: usize,
    value_at_risk: f64,
    conditional_var: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            positions,
            fills,
            equity,
            benchmark,
            config,
            flat,
        } => run_report(positions, fills, equity, benchmark, config, flat),
        Commands::Var {
            equity,
            confidence,
            method,
            simulations,
            seed,
        } => run_var(equity, confidence, method, simulations, seed),
    }
}

fn run_report(
    positions_path: Option<PathBuf>,
    fills_path: Option<PathBuf>,
    equity_path: Option<PathBuf>,
    benchmark_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    flat: bool,
) -> Result<()> {
    let mut config = load::load_config(config_path.as_deref())?;
    let positions: Vec<Position> = load::load_json_opt(positions_path.as_deref())?;
    let fills: Vec<Fill> = load::load_json_opt(fills_path.as_deref())?;
    let benchmark: Vec<f64> = load::load_json_opt(benchmark_path.as_deref())?;
    let equity = match equity_path.as_deref() {
        Some(path) => load::load_equity(path)?,
        None => load::LoadedEquity::default(),
    };

    // Bare numbers carry no sampling interval to infer from.
    if !equity.timestamped && config.periods_per_year.is_none() {
        debug!(
            periods_per_year = DEFAULT_PERIODS_PER_YEAR,
            "equity has no timestamps, using default frequency"
        );
        config.periods_per_year = Some(DEFAULT_PERIODS_PER_YEAR);
    }

    info!(
        positions = positions.len(),
        fills = fills.len(),
        equity = equity.points.len(),
        "loaded records"
    );

    let input = MetricsInput {
        fills: &fills,
        positions: &positions,
        equity: &equity.points,
        benchmark: benchmark_path.is_some().then_some(benchmark.as_slice()),
    };
    let bundle = MetricsBundle::compute(&input, &config);

    let output = if flat {
        serde_json::to_string_pretty(&bundle.to_flat_map())?
    } else {
        serde_json::to_string_pretty(&bundle)?
    };
    println!("{output}");
    Ok(())
}

fn run_var(
    equity_path: PathBuf,
    confidence: f64,
    method: Method,
    simulations: usize,
    seed: u64,
) -> Result<()> {
    if confidence.is_nan() || confidence <= 0.0 || confidence >= 1.0 {
        bail!("--confidence must be in (0, 1), got {confidence}");
    }
    if simulations == 0 {
        bail!("--simulations must be at least 1");
    }

    let equity = load::load_equity(&equity_path)?;
    let returns = simple_returns(&equity_values(&equity.points));

    let monte_carlo = MonteCarloConfig { simulations, seed };
    let value_at_risk = value_at_risk_with(&returns, confidence, method.into(), &monte_carlo);

    let report = VarReport {
        method,
        confidence,
        observations: returns.len(),
        value_at_risk,
        conditional_var: conditional_var(&returns, confidence),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
