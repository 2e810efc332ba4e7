#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that deploys a rover fleet from a batch file.

mod batch;
mod logging;
mod render;
mod terrain;

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use rover_fleet_system_fleet::FleetCoordinator;
use tracing::info;

use crate::{
    render::OutputFormat,
    terrain::{PlateauTerrain, TerrainConfig},
};

/// Command-line arguments for the rover fleet runner.
#[derive(Debug, Parser)]
#[command(
    name = "rover-fleet",
    version,
    about = "Drives a fleet of rovers across a partially known plateau"
)]
struct CliArgs {
    /// Batch file of alternating start lines and instruction lines.
    input: PathBuf,

    /// Writes results to this file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// TOML file describing the plateau extent and its hazards.
    #[arg(long, value_name = "TOML")]
    terrain: Option<PathBuf>,

    /// Layout of the results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Raises log verbosity; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Entry point for the rover fleet command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    logging::init(args.verbose)?;

    let entries = batch::read_batch(&args.input)?;
    let config = match &args.terrain {
        Some(path) => TerrainConfig::load(path)?,
        None => TerrainConfig::default(),
    };

    let mut coordinator = FleetCoordinator::new(PlateauTerrain::from(config));
    let reports = coordinator.deploy(entries);
    let rendered = render::render(&reports, args.format)?;

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write results to {}", path.display()))?,
        None => io::stdout()
            .lock()
            .write_all(rendered.as_bytes())
            .context("failed to write results to stdout")?,
    }

    info!(rovers = reports.len(), "run complete");
    Ok(())
}
