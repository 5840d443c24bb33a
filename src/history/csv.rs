//! CSV-backed history provider
//!
//! Expected columns: `symbol,end_time,price,time_zone`, where `end_time` is
//! the bar end in exchange-local time (`%Y-%m-%d %H:%M:%S`) and `time_zone`
//! is an IANA name such as `America/New_York`.
//!
//! `demos/history.csv` is a small sample mixing New York and London closes.

use super::{lookback_window, HistoryProvider};
use crate::selection::error::HistoryError;
use crate::types::{PriceObservation, PriceSlice, Resolution, Symbol};
use crate::universe::SecurityInfo;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Timestamp format of the `end_time` column
pub const END_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// History loaded once from a CSV file and served from memory.
///
/// Rows sharing an `end_time` form one slice; slices are ordered by time.
/// Lookback is counted in bars per symbol, not in slices.
#[derive(Debug, Clone)]
pub struct CsvHistoryProvider {
    slices: Vec<PriceSlice>,
    securities: Vec<SecurityInfo>,
}

impl CsvHistoryProvider {
    /// Load and parse a history file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, a column is missing, or a
    /// row has an empty or unparseable value.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let df = CsvReader::new(file).finish()?;

        let provider = Self::from_frame(&df)?;
        info!(
            path = %path.display(),
            rows = df.height(),
            slices = provider.slices.len(),
            symbols = provider.securities.len(),
            "History file loaded"
        );
        Ok(provider)
    }

    fn from_frame(df: &DataFrame) -> Result<Self, HistoryError> {
        let symbols = df.column("symbol")?.cast(&DataType::String)?;
        let end_times = df.column("end_time")?.cast(&DataType::String)?;
        let prices = df.column("price")?.cast(&DataType::Float64)?;
        let zones = df.column("time_zone")?.cast(&DataType::String)?;

        let mut by_time: BTreeMap<NaiveDateTime, Vec<PriceObservation>> = BTreeMap::new();
        let mut securities: BTreeMap<Symbol, Tz> = BTreeMap::new();

        let rows = symbols
            .str()?
            .into_iter()
            .zip(end_times.str()?.into_iter())
            .zip(prices.f64()?.into_iter())
            .zip(zones.str()?.into_iter());

        for (index, (((symbol, end_time), price), zone)) in rows.enumerate() {
            // Header is line 1
            let line = index + 2;
            let (Some(symbol), Some(end_time), Some(price), Some(zone)) =
                (symbol, end_time, price, zone)
            else {
                return Err(format!("line {}: missing value", line).into());
            };

            let end_time = NaiveDateTime::parse_from_str(end_time.trim(), END_TIME_FORMAT)
                .map_err(|e| format!("line {}: invalid end_time '{}': {}", line, end_time, e))?;
            let time_zone: Tz = zone
                .trim()
                .parse()
                .map_err(|e| format!("line {}: invalid time_zone '{}': {}", line, zone, e))?;
            let symbol = Symbol::from(symbol.trim());

            securities.entry(symbol.clone()).or_insert(time_zone);
            by_time.entry(end_time).or_default().push(PriceObservation {
                symbol,
                end_time,
                price,
                time_zone,
            });
        }

        Ok(Self {
            slices: by_time.into_values().map(PriceSlice::new).collect(),
            securities: securities
                .into_iter()
                .map(|(symbol, time_zone)| SecurityInfo { symbol, time_zone })
                .collect(),
        })
    }

    /// Every symbol in the file with the time zone of its first row.
    pub fn securities(&self) -> &[SecurityInfo] {
        &self.securities
    }

    pub fn slices(&self) -> &[PriceSlice] {
        &self.slices
    }
}

#[async_trait]
impl HistoryProvider for CsvHistoryProvider {
    async fn history(
        &self,
        symbols: &[Symbol],
        lookback: usize,
        _resolution: Resolution,
    ) -> Result<Vec<PriceSlice>, HistoryError> {
        Ok(lookback_window(&self.slices, symbols, lookback))
    }
}
