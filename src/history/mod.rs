//! Historical price collaborators
//!
//! The selection engine does not fetch data itself. It asks a
//! [`HistoryProvider`] for the lookback window of the current universe:
//!
//! - `CsvHistoryProvider` - bars loaded from a CSV file
//! - `StaticHistoryProvider` - in-memory slices for demos and tests

pub mod csv;

pub use self::csv::CsvHistoryProvider;

use crate::selection::error::HistoryError;
use crate::types::{PriceObservation, PriceSlice, Resolution, Symbol};
use async_trait::async_trait;
use std::collections::HashMap;

/// Trait for history sources. Enables swapping between file, replay and
/// live sources without changing the selection engine.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Return the last `lookback` bars of each of `symbols` as slices,
    /// oldest first.
    ///
    /// Slices only contain observations of the requested symbols.
    async fn history(
        &self,
        symbols: &[Symbol],
        lookback: usize,
        resolution: Resolution,
    ) -> Result<Vec<PriceSlice>, HistoryError>;
}

/// Restrict `slices` to `symbols` and keep the most recent `lookback` bars
/// of each symbol.
///
/// Symbols in different time zones close at different local times, so one
/// trading day can span several slices. The window is counted per symbol.
pub(crate) fn lookback_window(
    slices: &[PriceSlice],
    symbols: &[Symbol],
    lookback: usize,
) -> Vec<PriceSlice> {
    let mut remaining: HashMap<&Symbol, usize> =
        symbols.iter().map(|symbol| (symbol, lookback)).collect();

    let mut window: Vec<PriceSlice> = Vec::new();
    for slice in slices.iter().rev() {
        let observations: Vec<PriceObservation> = slice
            .observations
            .iter()
            .filter(|obs| match remaining.get_mut(&obs.symbol) {
                Some(left) if *left > 0 => {
                    *left -= 1;
                    true
                }
                _ => false,
            })
            .cloned()
            .collect();
        if !observations.is_empty() {
            window.push(PriceSlice::new(observations));
        }
    }

    window.reverse();
    window
}

// ===== Static Provider =====

/// In-memory history, served regardless of the requested resolution.
#[derive(Debug, Clone, Default)]
pub struct StaticHistoryProvider {
    slices: Vec<PriceSlice>,
}

impl StaticHistoryProvider {
    pub fn new(slices: Vec<PriceSlice>) -> Self {
        Self { slices }
    }
}

#[async_trait]
impl HistoryProvider for StaticHistoryProvider {
    async fn history(
        &self,
        symbols: &[Symbol],
        lookback: usize,
        _resolution: Resolution,
    ) -> Result<Vec<PriceSlice>, HistoryError> {
        Ok(lookback_window(&self.slices, symbols, lookback))
    }
}
