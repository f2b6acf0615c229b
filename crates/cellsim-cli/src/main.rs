//! Headless runner: load a scenario, play it, log population metrics.

mod runner;
mod telemetry;

use anyhow::{Context, Result};
use cellsim_core::{RuleFamily, Scenario};
use cellsim_world::{GenerationController, MetricsObserver, Summary, DEFAULT_RATE};
use clap::Parser;
use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "cellsim", version, about = "Multi-family cellular automaton simulator")]
struct Args {
    /// Scenario JSON file; a built-in demo of `--family` is used when absent
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Rule family of the built-in demo scenario
    #[arg(long, default_value = "life")]
    family: RuleFamily,

    /// Generations to play; 0 runs until interrupted
    #[arg(long, default_value_t = 100)]
    generations: u64,

    /// Steps per second in running mode
    #[arg(long, default_value_t = DEFAULT_RATE)]
    rate: f64,

    /// Override the scenario's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Advance one generation at a time, ignoring the rate
    #[arg(long)]
    step: bool,

    /// Log population metrics every N generations
    #[arg(long, default_value_t = 10)]
    metrics_interval: u64,

    /// Write the final summary and population as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    summary: Summary,
    population: Vec<(String, usize)>,
}

fn load_scenario(args: &Args) -> Result<Scenario> {
    let mut scenario = match &args.scenario {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read scenario {}", path.display()))?;
            Scenario::from_json(&json)
                .with_context(|| format!("invalid scenario {}", path.display()))?
        }
        None => Scenario::demo(args.family),
    };

    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }
    Ok(scenario)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_logging(args.json_logs)?;

    let scenario = load_scenario(&args)?;
    info!(
        name = %scenario.name,
        family = %scenario.params.family(),
        seed = scenario.seed,
        "Starting cellsim"
    );

    let mut controller = GenerationController::new();
    controller.add_observer(Box::new(MetricsObserver::new(args.metrics_interval)));
    controller.set_rate(args.rate)?;
    controller.load(scenario)?;

    let limit = (args.generations > 0).then_some(args.generations);

    if args.step {
        let Some(limit) = limit else {
            anyhow::bail!("--step needs a positive --generations");
        };
        for _ in 0..limit {
            controller.step()?;
        }
        finish(&controller, &args)?;
        return Ok(());
    }

    controller.start()?;
    let controller = Arc::new(Mutex::new(controller));

    match runner::run(controller.clone(), limit, shutdown_signal()).await {
        Ok(stats) => info!(
            generation = stats.generation,
            dropped_ticks = stats.dropped_ticks,
            "Run finished"
        ),
        Err(e) => error!(error = %e, "Run aborted"),
    }

    let controller = controller.lock();
    finish(&controller, &args)
}

fn finish(controller: &GenerationController, args: &Args) -> Result<()> {
    let summary = controller
        .summary()
        .context("no scenario loaded")?;
    println!("{}", summary);

    if let Some(path) = &args.report {
        let population = controller
            .population()
            .map(|counts| counts.labelled(summary.family))
            .unwrap_or_default();
        let report = Report { summary, population };
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        info!(path = %path.display(), "Report written");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "cellsim", "--family", "predator-prey", "--generations", "7", "--seed", "9", "--step",
        ]);
        assert_eq!(args.family, RuleFamily::PredatorPrey);
        assert_eq!(args.generations, 7);
        assert!(args.step);

        let scenario = load_scenario(&args).unwrap();
        assert_eq!(scenario.seed, 9);
        assert_eq!(scenario.params.family(), RuleFamily::PredatorPrey);
    }

    #[test]
    fn test_demo_scenarios_load() {
        let demos = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos");
        for name in ["glider.json", "forest_fire.json", "segregation.json", "wator.json", "slime.json"] {
            let path = PathBuf::from(demos).join(name);
            let args = Args::parse_from(["cellsim", "--scenario", path.to_str().unwrap()]);
            let scenario = load_scenario(&args).unwrap();
            let mut controller = GenerationController::new();
            controller.load(scenario).unwrap();
            assert_eq!(controller.step().unwrap(), 1, "{}", name);
        }
    }
}
