//! Command-line interface for speechseal
//!
//! Provides argument parsing using clap derive macros.

use clap::Parser;
use std::path::PathBuf;

/// Confirmed-word fingerprinting over streamed hypotheses
#[derive(Parser, Debug)]
#[command(
    name = "speechseal",
    version,
    about = "Turns streamed partial hypotheses into confirmed words and window fingerprints"
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress stderr diagnostics
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output (-v: session lifecycle, -vv: per-event trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
