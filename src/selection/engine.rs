//! Pair selection engine
//!
//! Runs one selection cycle per universe change:
//! 1. Apply the membership change to the tracked universe
//! 2. Fetch the lookback window from the history collaborator
//! 3. Align → correlate → select
//! 4. Replace the stored best pair, or keep it on any failure
//!
//! The stored pair is the engine's only persistent state. It is written as
//! a whole value under one write lock, so readers never see a half-updated
//! pair. Cycles are serialized: a cycle started while another is running is
//! rejected with [`SelectionError::CycleInProgress`].

use super::aligner::PriceSeriesAligner;
use super::config::SelectionConfig;
use super::correlation::CorrelationMatrixBuilder;
use super::error::SelectionError;
use super::selector::BestPairSelector;
use crate::history::HistoryProvider;
use crate::metrics;
use crate::types::{BestPair, Symbol};
use crate::universe::{Universe, UniverseChanges};

use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Capability set shared by interchangeable pair selection models.
#[async_trait]
pub trait PairSelectionModel: Send + Sync {
    /// React to a change of the tracked universe.
    async fn on_universe_changed(&self, changes: &UniverseChanges);

    /// Whether the ordered pair `(asset1, asset2)` should be traded.
    fn evaluate(&self, asset1: &Symbol, asset2: &Symbol) -> bool;
}

/// True iff `stored` is set and equals `(asset1, asset2)` in that order.
pub fn evaluate_pair(stored: Option<&BestPair>, asset1: &Symbol, asset2: &Symbol) -> bool {
    match stored {
        Some(pair) => pair.first == *asset1 && pair.second == *asset2,
        None => false,
    }
}

/// Result of one selection cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// A qualifying pair replaced the stored one
    Updated(BestPair),
    /// The stored pair was kept
    Retained { reason: SelectionError },
}

impl CycleOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, CycleOutcome::Updated(_))
    }

    fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Updated(_) => "updated",
            CycleOutcome::Retained { reason } => reason.kind(),
        }
    }
}

/// Picks the most correlated pair of the tracked universe.
pub struct PairSelectionEngine {
    config: SelectionConfig,
    history: Arc<dyn HistoryProvider>,
    universe: RwLock<Universe>,
    best_pair: RwLock<Option<BestPair>>,
    /// Held for the duration of a cycle
    cycle_guard: Mutex<()>,
}

impl PairSelectionEngine {
    /// Create an engine with an empty universe and no selection.
    ///
    /// # Errors
    /// `InvalidConfig` if the configuration does not validate.
    pub fn new(
        config: SelectionConfig,
        history: Arc<dyn HistoryProvider>,
    ) -> Result<Self, SelectionError> {
        config.validate().map_err(SelectionError::InvalidConfig)?;
        Ok(Self {
            config,
            history,
            universe: RwLock::new(Universe::new()),
            best_pair: RwLock::new(None),
            cycle_guard: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Ratio deviation threshold for the trading strategy
    pub fn ratio_threshold(&self) -> f64 {
        self.config.ratio_threshold
    }

    /// Snapshot of the stored pair
    pub fn best_pair(&self) -> Option<BestPair> {
        self.read_best_pair().clone()
    }

    /// Snapshot of the tracked universe
    pub fn universe(&self) -> Universe {
        self.read_universe().clone()
    }

    /// Apply `changes` and run one selection cycle.
    ///
    /// Never fails: every error leaves the stored pair untouched and is
    /// reported as [`CycleOutcome::Retained`].
    pub async fn run_cycle(&self, changes: &UniverseChanges) -> CycleOutcome {
        let outcome = match self.cycle_guard.try_lock() {
            Ok(_guard) => {
                let universe = {
                    let mut universe = self.write_universe();
                    universe.apply(changes);
                    universe.clone()
                };
                match self.select(&universe).await {
                    Ok(pair) => {
                        self.commit(pair.clone());
                        CycleOutcome::Updated(pair)
                    }
                    Err(reason) => CycleOutcome::Retained { reason },
                }
            }
            Err(_) => CycleOutcome::Retained {
                reason: SelectionError::CycleInProgress,
            },
        };

        metrics::record_cycle(outcome.label());
        if let CycleOutcome::Retained { reason } = &outcome {
            self.log_retained(reason);
        }
        outcome
    }

    async fn select(&self, universe: &Universe) -> Result<BestPair, SelectionError> {
        if universe.len() < 2 {
            return Err(SelectionError::InsufficientSymbols {
                found: universe.len(),
            });
        }

        let symbols = universe.symbols();
        info!(
            symbols = symbols.len(),
            lookback = self.config.lookback,
            resolution = %self.config.resolution,
            "Starting pair selection"
        );

        let slices = self
            .history
            .history(&symbols, self.config.lookback, self.config.resolution)
            .await?;

        let aligned = PriceSeriesAligner::new(self.config.resolution).align(universe, &slices)?;
        metrics::set_aligned_symbols(aligned.len());

        let matrix = CorrelationMatrixBuilder::new().build(&aligned)?;
        BestPairSelector::new(self.config.min_correlation).select(&matrix)
    }

    /// The only writer of the stored pair.
    fn commit(&self, pair: BestPair) {
        metrics::set_best_pair_correlation(pair.correlation);
        let previous = {
            let mut stored = self.write_best_pair();
            stored.replace(pair.clone())
        };
        info!(
            pair = %pair,
            previous = previous.map(|p| p.to_string()).unwrap_or_else(|| "none".to_string()),
            "Best pair updated"
        );
    }

    fn log_retained(&self, reason: &SelectionError) {
        let current = self
            .best_pair()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "none".to_string());
        match reason {
            SelectionError::NoAlignedData => {
                warn!(current = %current, "No fully aligned price series this cycle, keeping selection");
            }
            SelectionError::Upstream(e) => {
                warn!(current = %current, error = %e, "History retrieval failed, keeping selection");
            }
            SelectionError::CycleInProgress => {
                warn!(current = %current, "Selection cycle already running, change ignored");
            }
            other => {
                debug!(current = %current, reason = %other, "Keeping selection");
            }
        }
    }

    // Poisoned locks still hold a whole value; recover it instead of panicking.
    fn read_best_pair(&self) -> RwLockReadGuard<'_, Option<BestPair>> {
        self.best_pair.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_best_pair(&self) -> RwLockWriteGuard<'_, Option<BestPair>> {
        self.best_pair.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read_universe(&self) -> RwLockReadGuard<'_, Universe> {
        self.universe.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_universe(&self) -> RwLockWriteGuard<'_, Universe> {
        self.universe.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PairSelectionModel for PairSelectionEngine {
    async fn on_universe_changed(&self, changes: &UniverseChanges) {
        self.run_cycle(changes).await;
    }

    fn evaluate(&self, asset1: &Symbol, asset2: &Symbol) -> bool {
        evaluate_pair(self.read_best_pair().as_ref(), asset1, asset2)
    }
}

/// Accepts every ordered pair of distinct tracked symbols.
///
/// No statistical filter; useful as a baseline or when pair choice is made
/// elsewhere.
#[derive(Debug, Default)]
pub struct EveryPairModel {
    universe: RwLock<Universe>,
}

impl EveryPairModel {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PairSelectionModel for EveryPairModel {
    async fn on_universe_changed(&self, changes: &UniverseChanges) {
        self.universe
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .apply(changes);
    }

    fn evaluate(&self, asset1: &Symbol, asset2: &Symbol) -> bool {
        let universe = self.universe.read().unwrap_or_else(|e| e.into_inner());
        asset1 != asset2 && universe.contains(asset1) && universe.contains(asset2)
    }
}
