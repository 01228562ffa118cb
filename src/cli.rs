//! The `mapunit` command-line interface.
//!
//! This module is the entry point for all CLI commands and orchestrates the
//! suite runner and output modules.

use std::{path::PathBuf, process};

use clap::{Parser, Subcommand};
use miette::Report;
use tracing::Level;

use crate::suite::{run_suites, SuiteConfig};

pub mod output;

// ============================================================================
// CLI ARGUMENTS
// ============================================================================

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "mapunit",
    version,
    about = "Run YAML-described test suites against key/value mappers."
)]
pub struct MapunitArgs {
    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: ArgsCommand,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum ArgsCommand {
    /// Discover and run all suite files in a directory.
    Test {
        /// The directory containing `.yaml` suite files.
        #[arg(default_value = "tests/suites")]
        path: PathBuf,
        /// Only run cases whose name contains this substring.
        #[arg(short, long)]
        filter: Option<String>,
        /// Print results as JSON instead of text.
        #[arg(long)]
        json: bool,
        /// Disable coloured output.
        #[arg(long)]
        no_color: bool,
    },
    /// List the mappers available to suite files.
    Mappers,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = MapunitArgs::parse();
    init_logging(args.verbose);

    let result = match args.command {
        ArgsCommand::Test {
            path,
            filter,
            json,
            no_color,
        } => {
            let config = SuiteConfig {
                root: path,
                filter,
                use_colors: !no_color,
            };
            run_test_command(&config, json)
        }
        ArgsCommand::Mappers => output::print_mappers().map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{:?}", Report::msg(format!("failed to write output: {e}")));
            process::exit(2);
        }
    }
}

/// Runs the suites and prints results; `Ok(false)` means some case failed
/// or the suites could not be discovered.
fn run_test_command(config: &SuiteConfig, json: bool) -> std::io::Result<bool> {
    let summary = match run_suites(config) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{:?}", Report::new(e));
            return Ok(false);
        }
    };
    if json {
        output::print_json(&summary)?;
    } else {
        output::print_summary(&summary, config.use_colors)?;
    }
    Ok(summary.failed == 0)
}
