//! Price series alignment
//!
//! Turns raw history slices into per-symbol log-return vectors that share
//! one time axis. Two strategies are used:
//!
//! - **Fast path**: every tracked symbol trades in the same time zone, so
//!   slices can be trusted as cross-sections and incomplete ones dropped.
//! - **Cross-section path**: time zones differ, so each observation is moved
//!   to UTC (calendar date for daily bars) and only instants reported by
//!   every tracked symbol are kept.

use super::error::SelectionError;
use crate::types::{PriceSlice, Resolution, Symbol};
use crate::universe::Universe;

use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Alignment strategy picked for a universe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentMode {
    FastPath,
    CrossSection,
}

impl AlignmentMode {
    pub fn for_universe(universe: &Universe) -> Self {
        if universe.shares_time_zone() {
            AlignmentMode::FastPath
        } else {
            AlignmentMode::CrossSection
        }
    }
}

/// Symbol → log-return vector, all vectors of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedSeries {
    series: BTreeMap<Symbol, Vec<f64>>,
    points: usize,
}

impl AlignedSeries {
    /// Build from a prepared map, checking that every vector has the same length.
    pub fn from_map(series: BTreeMap<Symbol, Vec<f64>>) -> Result<Self, SelectionError> {
        let points = series.values().next().map(Vec::len).unwrap_or(0);
        if let Some((symbol, values)) = series.iter().find(|(_, v)| v.len() != points) {
            return Err(SelectionError::Data(format!(
                "series for {} has {} points, expected {}",
                symbol,
                values.len(),
                points
            )));
        }
        Ok(Self { series, points })
    }

    /// Number of symbols with a vector
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Shared vector length
    pub fn points(&self) -> usize {
        self.points
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.series.keys().cloned().collect()
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&[f64]> {
        self.series.get(symbol).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &[f64])> {
        self.series.iter().map(|(s, v)| (s, v.as_slice()))
    }
}

/// Log-return transform used by both alignment paths.
///
/// `diff[i] = ln(p[i]) - ln(p[i-1])` for `i >= 1`, and `diff[0]` repeats
/// `diff[1]` so the output keeps the input length. The repeated first element
/// is kept for compatibility with existing pair selections.
///
/// Returns `None` for fewer than two prices or any non-positive or
/// non-finite price.
pub fn log_returns(prices: &[f64]) -> Option<Vec<f64>> {
    if prices.len() < 2 || prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
        return None;
    }

    let log_prices: Vec<f64> = prices.iter().map(|p| p.ln()).collect();
    let mut diff = vec![0.0; log_prices.len()];
    for i in (1..log_prices.len()).rev() {
        diff[i] = log_prices[i] - log_prices[i - 1];
    }
    diff[0] = diff[1];

    Some(diff)
}

/// Aligns raw history into an [`AlignedSeries`]
#[derive(Debug, Clone, Copy)]
pub struct PriceSeriesAligner {
    resolution: Resolution,
}

impl PriceSeriesAligner {
    pub fn new(resolution: Resolution) -> Self {
        Self { resolution }
    }

    /// Align `slices` for the tracked `universe`.
    ///
    /// Symbols without complete data over the retained time points are left
    /// out. Only observations of tracked symbols are counted.
    ///
    /// # Errors
    /// `SelectionError::NoAlignedData` when no symbol ends up with a vector.
    pub fn align(
        &self,
        universe: &Universe,
        slices: &[PriceSlice],
    ) -> Result<AlignedSeries, SelectionError> {
        let mode = AlignmentMode::for_universe(universe);
        let (raw, points) = match mode {
            AlignmentMode::FastPath => Self::group_complete_slices(universe, slices),
            AlignmentMode::CrossSection => self.group_cross_sections(universe, slices),
        };

        let mut series = BTreeMap::new();
        for (symbol, prices) in raw {
            if prices.len() != points {
                debug!(
                    symbol = %symbol,
                    expected = points,
                    actual = prices.len(),
                    "Incomplete alignment, skipping"
                );
                continue;
            }
            match log_returns(&prices) {
                Some(returns) => {
                    series.insert(symbol, returns);
                }
                None => {
                    debug!(symbol = %symbol, points, "Unusable price series, skipping");
                }
            }
        }

        if series.is_empty() {
            return Err(SelectionError::NoAlignedData);
        }

        let aligned = AlignedSeries::from_map(series)?;
        info!(
            mode = ?mode,
            tracked = universe.len(),
            aligned = aligned.len(),
            points = aligned.points(),
            "Price series aligned"
        );
        Ok(aligned)
    }

    /// Fast path: keep slices that hold exactly one cross-section.
    fn group_complete_slices(
        universe: &Universe,
        slices: &[PriceSlice],
    ) -> (BTreeMap<Symbol, Vec<f64>>, usize) {
        let expected = universe.len();
        let mut raw: BTreeMap<Symbol, Vec<f64>> = BTreeMap::new();
        let mut retained = 0usize;

        for slice in slices {
            // A repeated symbol keeps its last price in the slice
            let tracked: BTreeMap<&Symbol, f64> = slice
                .observations
                .iter()
                .filter(|obs| universe.contains(&obs.symbol))
                .map(|obs| (&obs.symbol, obs.price))
                .collect();
            if tracked.len() != expected {
                continue;
            }
            retained += 1;
            for (symbol, price) in tracked {
                raw.entry(symbol.clone()).or_default().push(price);
            }
        }

        debug!(
            slices = slices.len(),
            retained,
            "Dropped incomplete slices"
        );
        (raw, retained)
    }

    /// Cross-section path: regroup observations by their UTC instant.
    fn group_cross_sections(
        &self,
        universe: &Universe,
        slices: &[PriceSlice],
    ) -> (BTreeMap<Symbol, Vec<f64>>, usize) {
        let expected = universe.len();
        let mut instants: BTreeMap<NaiveDateTime, BTreeMap<&Symbol, f64>> = BTreeMap::new();

        for obs in slices.iter().flat_map(|s| s.observations.iter()) {
            let Some(tz) = universe.time_zone(&obs.symbol) else {
                continue;
            };
            match self.normalize(obs.end_time, tz) {
                Some(instant) => {
                    instants
                        .entry(instant)
                        .or_default()
                        .insert(&obs.symbol, obs.price);
                }
                None => {
                    debug!(symbol = %obs.symbol, end_time = %obs.end_time, tz = %tz, "Nonexistent local time, skipping");
                }
            }
        }

        let total = instants.len();
        let mut raw: BTreeMap<Symbol, Vec<f64>> = BTreeMap::new();
        let mut retained = 0usize;

        for group in instants.into_values() {
            if group.len() != expected {
                continue;
            }
            retained += 1;
            for (symbol, price) in group {
                raw.entry(symbol.clone()).or_default().push(price);
            }
        }

        debug!(instants = total, retained, "Kept complete cross-sections");
        (raw, retained)
    }

    /// Local bar end → UTC instant, truncated to the date for daily bars.
    fn normalize(&self, end_time: NaiveDateTime, tz: Tz) -> Option<NaiveDateTime> {
        let utc = tz.from_local_datetime(&end_time).earliest()?.naive_utc();
        if self.resolution.is_daily() {
            utc.date().and_hms_opt(0, 0, 0)
        } else {
            Some(utc)
        }
    }
}
