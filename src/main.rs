use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs;
use std::path::PathBuf;

use routesim::scenario;

/// Network-layer routing and address-resolution simulation runner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the scenario YAML file
    #[arg(short, long)]
    scenario: PathBuf,

    /// Optional path for the JSON decision report
    #[arg(short, long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting RouteSim scenario runner");
    info!("Scenario file: {:?}", args.scenario);

    let scenario = scenario::load_scenario(&args.scenario)?;
    let report = scenario.run()?;

    for (network, devices) in &report.assignments {
        for assignment in devices {
            info!(
                "network {}: {} -> {} ({})",
                network, assignment.device, assignment.ip, assignment.physical_address
            );
        }
    }
    if let Some(costs) = &report.costs {
        for (node, cost) in costs {
            info!("planner: cost to {} = {}", node, cost);
        }
    }
    for outcome in &report.outcomes {
        info!("action outcome: {:?}", outcome);
    }

    if let Some(path) = args.report {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&path, json)
            .wrap_err_with(|| format!("failed to write report to {:?}", path))?;
        info!("Wrote decision report to {:?}", path);
    }

    info!("Scenario completed with {} action outcomes", report.outcomes.len());
    Ok(())
}
