//! Identifier types.
//!
//! Venue order/position ids and execution ids are formatted strings so that
//! a deterministic replay produces byte-identical identifiers (spec §4.3):
//! `"{instrument_index}-{pos_count:03d}"` for venue order/position ids,
//! `"{exec_count}"` for execution ids. Client-supplied ids are opaque.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(ClientOrderId);
string_id!(VenueOrderId);
string_id!(VenuePositionId);
string_id!(ExecutionId);
string_id!(StrategyId);
string_id!(InstrumentId);
string_id!(OcoGroupId);

/// Monotonic identifier generator.
///
/// Per-instrument counters for venue order/position ids, one global counter
/// for execution ids. `instrument_index` is the 1-based insertion order of
/// the instrument into the engine (spec §4.3), assigned by `register_instrument`.
#[derive(Debug, Default)]
pub struct IdGen {
    instrument_index: HashMap<InstrumentId, u64>,
    next_instrument_index: u64,
    pos_count: HashMap<InstrumentId, u64>,
    ord_count: HashMap<InstrumentId, u64>,
    exec_count: u64,
}

impl IdGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next 1-based instrument index, if not already assigned.
    pub fn register_instrument(&mut self, instrument: &InstrumentId) {
        self.instrument_index
            .entry(instrument.clone())
            .or_insert_with(|| {
                self.next_instrument_index += 1;
                self.next_instrument_index
            });
    }

    fn index_of(&self, instrument: &InstrumentId) -> u64 {
        *self
            .instrument_index
            .get(instrument)
            .unwrap_or_else(|| panic!("instrument {instrument} was never registered with IdGen"))
    }

    pub fn next_venue_order_id(&mut self, instrument: &InstrumentId) -> VenueOrderId {
        let idx = self.index_of(instrument);
        let counter = self.ord_count.entry(instrument.clone()).or_insert(0);
        *counter += 1;
        VenueOrderId(format!("{idx}-{:03}", *counter))
    }

    pub fn next_venue_position_id(&mut self, instrument: &InstrumentId) -> VenuePositionId {
        let idx = self.index_of(instrument);
        let counter = self.pos_count.entry(instrument.clone()).or_insert(0);
        *counter += 1;
        VenuePositionId(format!("{idx}-{:03}", *counter))
    }

    pub fn next_execution_id(&mut self) -> ExecutionId {
        self.exec_count += 1;
        ExecutionId(self.exec_count.to_string())
    }

    /// Reset all counters to zero, keeping registered instrument indices
    /// (spec §6: `reset()` "identifier counters reset to zero").
    pub fn reset(&mut self) {
        self.pos_count.clear();
        self.ord_count.clear();
        self.exec_count = 0;
    }
}
