//! End-to-end selection scenarios against a mocked history collaborator.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::America::New_York;
use chrono_tz::Europe::London;
use mockall::mock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use corrpairs::history::HistoryProvider;
use corrpairs::selection::{
    BestPairSelector, CorrelationMatrix, CycleOutcome, PairSelectionEngine, PairSelectionModel,
    PriceSeriesAligner, SelectionConfig, SelectionError, HistoryError,
};
use corrpairs::types::{PriceObservation, PriceSlice, Resolution, Symbol};
use corrpairs::universe::{SecurityInfo, Universe, UniverseChanges};

// --- Mocks ---

mock! {
    pub History {}

    #[async_trait]
    impl HistoryProvider for History {
        async fn history(
            &self,
            symbols: &[Symbol],
            lookback: usize,
            resolution: Resolution,
        ) -> Result<Vec<PriceSlice>, HistoryError>;
    }
}

/// Blocks inside `history` until released, to hold a cycle open.
struct GatedHistory {
    entered: Notify,
    release: Notify,
    slices: Vec<PriceSlice>,
}

#[async_trait]
impl HistoryProvider for GatedHistory {
    async fn history(
        &self,
        _symbols: &[Symbol],
        _lookback: usize,
        _resolution: Resolution,
    ) -> Result<Vec<PriceSlice>, HistoryError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.slices.clone())
    }
}

// --- Fixtures ---

const A: [f64; 8] = [100.0, 102.0, 101.0, 104.0, 103.0, 106.0, 105.0, 108.0];
const B: [f64; 8] = [50.0, 51.2, 50.4, 52.3, 51.6, 53.1, 52.7, 54.0];
const C: [f64; 8] = [20.0, 19.8, 20.3, 20.1, 19.7, 20.2, 20.6, 20.4];

fn close(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 2, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn daily_slices(series: &[(&str, &[f64])]) -> Vec<PriceSlice> {
    (0..series[0].1.len())
        .map(|i| {
            PriceSlice::new(
                series
                    .iter()
                    .map(|(symbol, prices)| PriceObservation {
                        symbol: Symbol::from(*symbol),
                        end_time: close(1 + i as u32, 16),
                        price: prices[i],
                        time_zone: New_York,
                    })
                    .collect(),
            )
        })
        .collect()
}

fn tracked(symbols: &[&str]) -> UniverseChanges {
    UniverseChanges::added(
        symbols
            .iter()
            .map(|s| SecurityInfo::new(*s, New_York))
            .collect(),
    )
}

fn config(min_correlation: f64) -> SelectionConfig {
    SelectionConfig {
        lookback: 30,
        resolution: Resolution::Daily,
        min_correlation,
        ..Default::default()
    }
}

fn scenario_matrix() -> CorrelationMatrix {
    CorrelationMatrix::new(
        vec!["A".into(), "B".into(), "C".into()],
        vec![
            vec![1.0, 0.9, 0.3],
            vec![0.9, 1.0, 0.1],
            vec![0.3, 0.1, 1.0],
        ],
    )
    .unwrap()
}

// --- Tests ---

#[test]
fn test_strongest_pair_above_minimum_is_selected() {
    let pair = BestPairSelector::new(0.5).select(&scenario_matrix()).unwrap();
    assert_eq!(pair.first, Symbol::from("A"));
    assert_eq!(pair.second, Symbol::from("B"));
    assert_eq!(pair.correlation, 0.9);
}

#[test]
fn test_strongest_pair_below_minimum_is_rejected() {
    let result = BestPairSelector::new(0.95).select(&scenario_matrix());
    assert!(matches!(result, Err(SelectionError::NoQualifyingPair { .. })));
}

#[test]
fn test_two_time_zones_keep_only_complete_instants() {
    let mut universe = Universe::new();
    universe.apply(&UniverseChanges::added(vec![
        SecurityInfo::new("NYSE1", New_York),
        SecurityInfo::new("NYSE2", New_York),
        SecurityInfo::new("LSE1", London),
    ]));

    // February: New York is UTC-5. Five UTC instants 15:00..19:00.
    let observations = |i: u32, with_london: bool| -> Vec<PriceObservation> {
        let mut obs = vec![
            PriceObservation {
                symbol: "NYSE1".into(),
                end_time: close(5, 10 + i),
                price: 100.0 + (i * i) as f64,
                time_zone: New_York,
            },
            PriceObservation {
                symbol: "NYSE2".into(),
                end_time: close(5, 10 + i),
                price: 40.0 - i as f64,
                time_zone: New_York,
            },
        ];
        if with_london {
            obs.push(PriceObservation {
                symbol: "LSE1".into(),
                end_time: close(5, 15 + i),
                price: 7.0 + 0.1 * i as f64,
                time_zone: London,
            });
        }
        obs
    };

    let slices: Vec<PriceSlice> = (0..5u32)
        .map(|i| PriceSlice::new(observations(i, i % 2 == 0)))
        .collect();

    let aligned = PriceSeriesAligner::new(Resolution::Hour)
        .align(&universe, &slices)
        .unwrap();

    assert_eq!(aligned.len(), 3);
    assert_eq!(aligned.points(), 3);
    for (_, series) in aligned.iter() {
        assert_eq!(series.len(), 3);
    }
}

#[tokio::test]
async fn test_single_symbol_skips_history_and_selection() {
    let mut history = MockHistory::new();
    history.expect_history().never();

    let engine = PairSelectionEngine::new(config(0.5), Arc::new(history)).unwrap();
    let outcome = engine.run_cycle(&tracked(&["A"])).await;

    assert!(matches!(
        outcome,
        CycleOutcome::Retained {
            reason: SelectionError::InsufficientSymbols { found: 1 }
        }
    ));
    assert!(engine.best_pair().is_none());
}

#[tokio::test]
async fn test_constant_price_series_is_never_selected() {
    let flat = [25.0; 8];
    let slices = daily_slices(&[("A", &A[..]), ("B", &B[..]), ("ZFLAT", &flat[..])]);

    let mut history = MockHistory::new();
    history
        .expect_history()
        .times(1)
        .returning(move |_, _, _| Ok(slices.clone()));

    let engine = PairSelectionEngine::new(config(0.5), Arc::new(history)).unwrap();
    let outcome = engine.run_cycle(&tracked(&["A", "B", "ZFLAT"])).await;

    let CycleOutcome::Updated(pair) = outcome else {
        panic!("expected an updated pair, got {:?}", outcome);
    };
    assert_eq!(pair.first, Symbol::from("A"));
    assert_eq!(pair.second, Symbol::from("B"));
    assert!(!engine.evaluate(&"A".into(), &"ZFLAT".into()));
    assert!(!engine.evaluate(&"B".into(), &"ZFLAT".into()));
}

#[tokio::test]
async fn test_upstream_failure_keeps_previous_pair() {
    let slices = daily_slices(&[("A", &A[..]), ("B", &B[..]), ("C", &C[..])]);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut history = MockHistory::new();
    history.expect_history().times(2).returning(move |_, _, _| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(slices.clone())
        } else {
            Err("history service timed out".into())
        }
    });

    let engine = PairSelectionEngine::new(config(0.5), Arc::new(history)).unwrap();

    assert!(engine.run_cycle(&tracked(&["A", "B", "C"])).await.is_updated());
    let selected = engine.best_pair().unwrap();

    let outcome = engine
        .run_cycle(&UniverseChanges::added(vec![SecurityInfo::new("D", New_York)]))
        .await;
    assert!(matches!(
        outcome,
        CycleOutcome::Retained {
            reason: SelectionError::Upstream(_)
        }
    ));
    assert_eq!(engine.best_pair(), Some(selected));
    assert!(engine.evaluate(&"A".into(), &"B".into()));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_requested_window_matches_config() {
    let slices = daily_slices(&[("A", &A[..]), ("B", &B[..])]);

    let mut history = MockHistory::new();
    history
        .expect_history()
        .times(1)
        .returning(move |symbols, lookback, resolution| {
            assert_eq!(symbols.len(), 2);
            assert_eq!(lookback, 30);
            assert_eq!(resolution, Resolution::Daily);
            Ok(slices.clone())
        });

    let engine = PairSelectionEngine::new(config(0.5), Arc::new(history)).unwrap();
    engine.run_cycle(&tracked(&["A", "B"])).await;
}

#[tokio::test]
async fn test_overlapping_cycles_are_serialized() {
    let gated = Arc::new(GatedHistory {
        entered: Notify::new(),
        release: Notify::new(),
        slices: daily_slices(&[("A", &A[..]), ("B", &B[..]), ("C", &C[..])]),
    });
    let engine = Arc::new(
        PairSelectionEngine::new(config(0.5), Arc::clone(&gated) as Arc<dyn HistoryProvider>)
            .unwrap(),
    );

    let first = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.run_cycle(&tracked(&["A", "B", "C"])).await })
    };

    // Wait until the first cycle is inside the history call
    gated.entered.notified().await;
    assert!(!engine.evaluate(&"A".into(), &"B".into()));

    let second = engine.run_cycle(&tracked(&["D"])).await;
    assert!(matches!(
        second,
        CycleOutcome::Retained {
            reason: SelectionError::CycleInProgress
        }
    ));

    gated.release.notify_one();
    let first = first.await.unwrap();
    assert!(first.is_updated());
    assert!(engine.evaluate(&"A".into(), &"B".into()));
    assert!(!engine.universe().contains(&Symbol::from("D")));
}
