//! permpower CLI

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pp_core::PowerConfig;
use pp_inference::{PowerSimulator, simulate_parallel};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "permpower")]
#[command(about = "permpower - Monte Carlo power of the one-sided permutation t-test")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

/// Simulation settings: a JSON config file plus per-field overrides.
#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Simulation config (JSON). Missing fields take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of simulated trials
    #[arg(long)]
    simulations: Option<usize>,

    /// Number of permutations per trial
    #[arg(long)]
    permutations: Option<usize>,

    /// Observations per group
    #[arg(long)]
    observations: Option<usize>,

    /// Mean of the first group
    #[arg(long, allow_hyphen_values = true)]
    mean_1: Option<f64>,

    /// Mean of the second group
    #[arg(long, allow_hyphen_values = true)]
    mean_2: Option<f64>,

    /// Common standard deviation
    #[arg(long, allow_hyphen_values = true)]
    scale: Option<f64>,

    /// Significance level
    #[arg(long)]
    alpha: Option<f64>,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<PowerConfig> {
        let mut config = match &self.config {
            Some(path) => PowerConfig::from_json_path(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => PowerConfig::default(),
        };
        if let Some(v) = self.simulations {
            config.number_of_simulations = v;
        }
        if let Some(v) = self.permutations {
            config.number_of_permutations = v;
        }
        if let Some(v) = self.observations {
            config.number_of_observations = v;
        }
        if let Some(v) = self.mean_1 {
            config.means[0] = v;
        }
        if let Some(v) = self.mean_2 {
            config.means[1] = v;
        }
        if let Some(v) = self.scale {
            config.scale = v;
        }
        if let Some(v) = self.alpha {
            config.alpha = v;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate power for one configuration
    Simulate {
        #[command(flatten)]
        config: ConfigArgs,

        /// Seed of the random stream
        #[arg(long, default_value = "1234")]
        seed: u64,

        /// Threads. 1 runs every trial on one shared stream; otherwise each trial
        /// gets its own stream (0 = auto).
        #[arg(long, default_value = "1")]
        threads: usize,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Power as a function of the mean difference
    Curve {
        #[command(flatten)]
        config: ConfigArgs,

        /// Mean differences (comma-separated), applied on top of the second mean
        #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
        differences: Vec<f64>,

        /// Seed of the random stream
        #[arg(long, default_value = "1234")]
        seed: u64,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Smallest group size reaching a target power
    SampleSize {
        #[command(flatten)]
        config: ConfigArgs,

        /// Candidate group sizes (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        candidates: Vec<usize>,

        /// Power to reach
        #[arg(long, default_value = "0.8")]
        target_power: f64,

        /// Seed of the random stream
        #[arg(long, default_value = "1234")]
        seed: u64,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Simulate { config, seed, threads, output } => {
            cmd_simulate(&config, seed, threads, output.as_ref())
        }
        Commands::Curve { config, differences, seed, output } => {
            cmd_curve(&config, &differences, seed, output.as_ref())
        }
        Commands::SampleSize { config, candidates, target_power, seed, output } => {
            cmd_sample_size(&config, &candidates, target_power, seed, output.as_ref())
        }
        Commands::Version => {
            println!("permpower {}", pp_core::VERSION);
            Ok(())
        }
    }
}

fn simulator(seed: u64) -> Result<PowerSimulator> {
    let seed = i64::try_from(seed).with_context(|| format!("seed [{seed}] is too large"))?;
    Ok(PowerSimulator::make(seed)?)
}

fn cmd_simulate(
    args: &ConfigArgs,
    seed: u64,
    threads: usize,
    output: Option<&PathBuf>,
) -> Result<()> {
    let config = args.resolve()?;
    let parallel = threads != 1;
    tracing::info!(seed, threads, "simulating {} trials", config.number_of_simulations);

    let estimate = if parallel {
        simulate_parallel(seed, &config, threads)?
    } else {
        simulator(seed)?.simulate_with(&config)?
    };

    let value = serde_json::json!({
        "seed": seed,
        "config": config,
        "power": estimate.power,
        "rejections": estimate.rejections,
        "number_of_simulations": estimate.number_of_simulations,
        "standard_error": estimate.standard_error,
        "parallel": parallel,
    });
    write_json(output, value)
}

fn cmd_curve(
    args: &ConfigArgs,
    differences: &[f64],
    seed: u64,
    output: Option<&PathBuf>,
) -> Result<()> {
    let config = args.resolve()?;
    tracing::info!(seed, "power curve over {} differences", differences.len());
    let curve = simulator(seed)?.power_curve(&config, differences)?;

    let value = serde_json::json!({
        "seed": seed,
        "config": config,
        "points": curve,
    });
    write_json(output, value)
}

fn cmd_sample_size(
    args: &ConfigArgs,
    candidates: &[usize],
    target_power: f64,
    seed: u64,
    output: Option<&PathBuf>,
) -> Result<()> {
    let config = args.resolve()?;
    tracing::info!(seed, target_power, "sample size search over {} candidates", candidates.len());
    let result = simulator(seed)?.find_sample_size(&config, candidates, target_power)?;
    if result.number_of_observations.is_none() {
        tracing::warn!("no candidate reached power {target_power}");
    }

    let value = serde_json::json!({
        "seed": seed,
        "config": config,
        "target_power": target_power,
        "number_of_observations": result.number_of_observations,
        "achieved_power": result.achieved_power,
        "curve": result
            .curve
            .iter()
            .map(|&(n, power)| serde_json::json!({ "number_of_observations": n, "power": power }))
            .collect::<Vec<_>>(),
    });
    write_json(output, value)
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
