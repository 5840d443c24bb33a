//! Pair Selection Module
//!
//! Picks the most correlated pair of a dynamic universe from historical
//! log-returns, and answers whether a candidate pair is the selected one.
//!
//! # Example
//!
//! ```ignore
//! use corrpairs::history::CsvHistoryProvider;
//! use corrpairs::selection::{PairSelectionEngine, SelectionConfig};
//! use corrpairs::universe::UniverseChanges;
//!
//! let provider = CsvHistoryProvider::from_path("history.csv")?;
//! let changes = UniverseChanges::added(provider.securities().to_vec());
//! let engine = PairSelectionEngine::new(SelectionConfig::default(), Arc::new(provider))?;
//! let outcome = engine.run_cycle(&changes).await;
//! ```

pub mod aligner;
pub mod config;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod selector;

pub use aligner::{AlignedSeries, AlignmentMode, PriceSeriesAligner};
pub use config::SelectionConfig;
pub use correlation::{CorrelationMatrix, CorrelationMatrixBuilder};
pub use engine::{evaluate_pair, CycleOutcome, EveryPairModel, PairSelectionEngine, PairSelectionModel};
pub use error::{HistoryError, SelectionError};
pub use selector::BestPairSelector;
