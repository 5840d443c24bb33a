//! CLI configuration structs bridging CLI arguments to domain types.

use corrpairs::selection::SelectionConfig;
use corrpairs::types::{Resolution, Symbol};
use thiserror::Error;

/// Errors that can occur when turning CLI arguments into a selection config.
#[derive(Debug, Error)]
pub enum SelectConfigError {
    #[error("{0}")]
    InvalidResolution(String),

    #[error("At least two symbols are required, got {0}")]
    TooFewSymbols(usize),

    #[error("Invalid selection config: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config file: {0}")]
    ConfigFile(#[from] corrpairs::selection::SelectionError),
}

/// CLI configuration for the `select` command.
#[derive(Debug, Clone)]
pub struct SelectCliConfig {
    /// Path to the CSV history file
    pub history_path: String,
    /// Raw symbols argument ("all" or comma-separated)
    pub symbols: String,
    /// Optional JSON config file
    pub config_path: Option<String>,
    pub lookback: usize,
    pub resolution: String,
    pub min_correlation: f64,
    pub ratio_threshold: f64,
    /// Print metrics after the run
    pub print_metrics: bool,
}

impl SelectCliConfig {
    /// Parse the symbols argument. `None` means every symbol in the file.
    ///
    /// # Errors
    /// Returns `TooFewSymbols` if an explicit list names fewer than two symbols.
    pub fn symbol_filter(&self) -> Result<Option<Vec<Symbol>>, SelectConfigError> {
        let raw = self.symbols.trim();
        if raw.eq_ignore_ascii_case("all") {
            return Ok(None);
        }

        let symbols: Vec<Symbol> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Symbol::from)
            .collect();

        if symbols.len() < 2 {
            return Err(SelectConfigError::TooFewSymbols(symbols.len()));
        }
        Ok(Some(symbols))
    }

    /// Build the engine configuration from the config file or the flags.
    pub fn selection_config(&self) -> Result<SelectionConfig, SelectConfigError> {
        if let Some(path) = &self.config_path {
            return Ok(SelectionConfig::from_json_file(path)?);
        }

        let resolution: Resolution = self
            .resolution
            .parse()
            .map_err(SelectConfigError::InvalidResolution)?;

        let config = SelectionConfig {
            lookback: self.lookback,
            resolution,
            min_correlation: self.min_correlation,
            ratio_threshold: self.ratio_threshold,
        };
        config.validate().map_err(SelectConfigError::InvalidConfig)?;
        Ok(config)
    }
}
