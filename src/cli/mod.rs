//! CLI argument parsing using clap.
//!
//! This module defines the command-line interface for corrpairs.

mod config;

pub use config::SelectCliConfig;

use clap::{Parser, Subcommand};

/// corrpairs - correlation-based pair selection
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Set the verbosity level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub verbose: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    pub json_logs: bool,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run one selection cycle over a CSV history file
    Select {
        /// CSV file with columns symbol,end_time,price,time_zone (sample: demos/history.csv)
        #[arg(long)]
        history: String,
        /// Symbols to track (comma-separated, or "all" for every symbol in the file)
        #[arg(long, default_value = "all")]
        symbols: String,
        /// JSON selection config; overrides the numeric flags below
        #[arg(long)]
        config: Option<String>,
        /// Number of historical bars to use
        #[arg(long, default_value_t = 252)]
        lookback: usize,
        /// Bar resolution: tick, second, minute, hour or daily
        #[arg(long, default_value = "daily")]
        resolution: String,
        /// Minimum Pearson correlation for a pair to be selected
        #[arg(long, default_value_t = 0.5, allow_hyphen_values = true)]
        min_correlation: f64,
        /// Ratio deviation threshold passed to the trading strategy
        #[arg(long, default_value_t = 1.0)]
        ratio_threshold: f64,
        /// Print Prometheus metrics after the cycle
        #[arg(long, default_value_t = false)]
        metrics: bool,
    },
}
