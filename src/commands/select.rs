//! Pair selection command handler.
//!
//! Implements the `select` subcommand: load a CSV history file, track its
//! symbols, run one selection cycle and report the selected pair.

use crate::cli::SelectCliConfig;

use corrpairs::history::CsvHistoryProvider;
use corrpairs::metrics;
use corrpairs::selection::{CycleOutcome, PairSelectionEngine, PairSelectionModel};
use corrpairs::universe::{SecurityInfo, UniverseChanges};

use std::sync::Arc;
use tracing::{info, warn};

/// Run one pair selection cycle over a CSV history file.
///
/// # Errors
/// Returns error if the arguments are invalid or the history file cannot be
/// loaded. A cycle that keeps no pair is reported, not treated as an error.
pub async fn run_select(cli: SelectCliConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("--- corrpairs: Pair Selection ---");

    let config = cli.selection_config()?;
    let filter = cli.symbol_filter()?;
    let provider = CsvHistoryProvider::from_path(&cli.history_path)
        .map_err(|e| format!("failed to load {}: {}", cli.history_path, e))?;

    let securities: Vec<SecurityInfo> = match &filter {
        Some(symbols) => {
            let found: Vec<SecurityInfo> = provider
                .securities()
                .iter()
                .filter(|s| symbols.contains(&s.symbol))
                .cloned()
                .collect();
            for symbol in symbols {
                if !found.iter().any(|s| &s.symbol == symbol) {
                    warn!(symbol = %symbol, "Symbol not present in history file");
                }
            }
            found
        }
        None => provider.securities().to_vec(),
    };

    info!(
        history = %cli.history_path,
        symbols = securities.len(),
        lookback = config.lookback,
        resolution = %config.resolution,
        min_corr = config.min_correlation,
        "Configuration loaded"
    );

    let changes = UniverseChanges::added(securities);
    if changes.is_empty() {
        return Err(format!("no requested symbol found in {}", cli.history_path).into());
    }

    let engine = PairSelectionEngine::new(config, Arc::new(provider))?;
    let outcome = engine.run_cycle(&changes).await;

    match &outcome {
        CycleOutcome::Updated(pair) => {
            println!("\n{:<24} | {:>11}", "Pair", "Correlation");
            println!("{}", "-".repeat(38));
            println!(
                "{:<24} | {:>11.4}",
                format!("{}/{}", pair.first, pair.second),
                pair.correlation
            );
            println!(
                "\nTrading {}/{}: {} (ratio threshold {})",
                pair.first,
                pair.second,
                engine.evaluate(&pair.first, &pair.second),
                engine.ratio_threshold()
            );
        }
        CycleOutcome::Retained { reason } => {
            println!("\nNo pair selected: {}", reason);
        }
    }

    if cli.print_metrics {
        println!("\n{}", metrics::gather_metrics());
    }

    Ok(())
}
