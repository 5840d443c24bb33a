//! Tracked universe of instruments and their exchange time zones.

use crate::types::Symbol;
use chrono_tz::Tz;
use std::collections::BTreeMap;
use tracing::debug;

/// Security metadata supplied when an instrument joins the universe.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityInfo {
    pub symbol: Symbol,
    pub time_zone: Tz,
}

impl SecurityInfo {
    pub fn new(symbol: impl Into<Symbol>, time_zone: Tz) -> Self {
        Self {
            symbol: symbol.into(),
            time_zone,
        }
    }
}

/// Membership notification delivered by universe-selection logic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniverseChanges {
    pub added: Vec<SecurityInfo>,
    pub removed: Vec<Symbol>,
}

impl UniverseChanges {
    pub fn added(added: Vec<SecurityInfo>) -> Self {
        Self {
            added,
            removed: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Ordered set of tracked symbols with their time zones.
///
/// Iteration order is ascending symbol order, which is also the row order of
/// every correlation matrix built from this universe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Universe {
    members: BTreeMap<Symbol, Tz>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply removals first, then additions. Re-adding a symbol updates its
    /// time zone; removing an unknown symbol is a no-op.
    pub fn apply(&mut self, changes: &UniverseChanges) {
        for symbol in &changes.removed {
            if self.members.remove(symbol).is_some() {
                debug!(symbol = %symbol, "Removed from universe");
            }
        }
        for security in &changes.added {
            self.members
                .insert(security.symbol.clone(), security.time_zone);
            debug!(symbol = %security.symbol, tz = %security.time_zone, "Added to universe");
        }
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.members.keys().cloned().collect()
    }

    pub fn time_zone(&self, symbol: &Symbol) -> Option<Tz> {
        self.members.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.members.contains_key(symbol)
    }

    /// True when every tracked symbol trades in the same time zone
    /// (vacuously true for an empty universe).
    pub fn shares_time_zone(&self) -> bool {
        let mut zones = self.members.values();
        match zones.next() {
            Some(first) => zones.all(|tz| tz == first),
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
