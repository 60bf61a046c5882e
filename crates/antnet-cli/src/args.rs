//! # antnet-cli::args
//!
//! Defines the command-line argument structure using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "human")]
    pub log: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run an experiment from a scenario file.
    Run(RunOpts),
    /// Validate a scenario file for correctness.
    Validate {
        #[arg(value_name = "SCENARIO_PATH")]
        scenario: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct RunOpts {
    /// Path to the scenario file (YAML or TOML).
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// Override the base RNG seed from the scenario file.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the stop time from the scenario file (virtual seconds).
    #[arg(long)]
    pub stop_at: Option<f64>,

    /// Override the replicate count from the scenario file.
    #[arg(long)]
    pub replicates: Option<u32>,

    /// Emit the full report as JSON instead of the human summary.
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}
