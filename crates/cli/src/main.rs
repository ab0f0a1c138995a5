//! wattcast CLI
//!
//! Trains a power-consumption regression model from historical CSV data,
//! scores observations piped in on stdin, and forecasts hourly
//! consumption over a caller-chosen horizon.

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use wattcast_lib::{dataset, observability};

/// Power consumption model trainer and forecaster
#[derive(Parser)]
#[command(name = "wattcast")]
#[command(author, version, about = "Train and query power consumption forecasts", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Train a model: input CSV file and output model path
    #[arg(short, long, num_args = 2, value_names = ["INPUT", "OUTPUT"])]
    pub train: Option<Vec<PathBuf>>,

    /// Score observations read line by line from standard input
    /// (a blank line ends the session)
    #[arg(short, long)]
    pub predict: bool,

    /// Model file (can also be set via WATTCAST_MODEL)
    #[arg(short, long, env = "WATTCAST_MODEL")]
    pub model: Option<PathBuf>,

    /// Write scored output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Forecast hourly consumption starting one hour after this instant
    /// (e.g. 2024-12-21T15:00:00)
    #[arg(short = 'f', long, value_name = "START")]
    pub forecast: Option<String>,

    /// Number of hourly forecast steps
    #[arg(short = 'n', long, default_value_t = 24)]
    pub steps: usize,

    /// Object id to forecast for (required by multi-entity models)
    #[arg(long)]
    pub object: Option<String>,

    /// Fitting budget passed to the trainer
    #[arg(long, default_value_t = wattcast_lib::DEFAULT_BUDGET)]
    pub budget: f32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing(cli.verbose);

    let mut ran = false;

    if let Some(paths) = &cli.train {
        ran = true;
        commands::train::run(&paths[0], &paths[1], cli.budget, cli.verbose)?;
    }

    if cli.predict {
        ran = true;
        match &cli.model {
            Some(model) => commands::predict::run(model, cli.output.as_deref())?,
            None => {
                output::print_error("a model file is required for prediction (-m <path>)");
                return Ok(());
            }
        }
    }

    if let Some(raw_start) = &cli.forecast {
        ran = true;
        let Some(model) = &cli.model else {
            output::print_error("a model file is required for forecasting (-m <path>)");
            return Ok(());
        };
        let start = match dataset::parse_instant(raw_start) {
            Ok(start) => start,
            Err(err) => {
                output::print_error(&format!("{err:#}"));
                return Ok(());
            }
        };
        commands::forecast::run(
            model,
            start,
            cli.steps,
            cli.object.as_deref(),
            cli.output.as_deref(),
        )?;
    }

    if !ran {
        output::print_info("nothing to do: pass --train, --predict or --forecast (see --help)");
    }

    Ok(())
}
