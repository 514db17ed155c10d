//! Engine configuration: venue shape, account setup, and execution policy,
//! validated once at construction time.

use crate::book::BookType;
use crate::domain::{AccountType, Instrument};
use crate::engine::fill_model::FillModelConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OmsType {
    /// Every fill opens or closes its own position, keyed per order.
    Hedging,
    /// All fills on an instrument net into a single position.
    Netting,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("venue must not be empty")]
    EmptyVenue,
    #[error("no instruments configured")]
    NoInstruments,
    #[error("starting balance currency {0:?} listed more than once")]
    DuplicateStartingBalance(String),
    #[error("cash accounts cannot specify leverage for {0:?}")]
    LeverageOnCashAccount(String),
    #[error("default_leverage must be >= 1.0, got {0}")]
    InvalidDefaultLeverage(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub venue: String,
    pub oms_type: OmsType,
    pub account_type: AccountType,
    pub base_currency: Option<String>,
    pub starting_balances: Vec<(String, f64)>,
    pub default_leverage: f64,
    pub leverages: HashMap<String, f64>,
    pub is_frozen_account: bool,
    #[serde(skip, default)]
    pub instruments: Vec<Instrument>,
    pub fill_model: FillModelConfig,
    pub book_type: BookType,
    /// If true, bar-driven matching is permitted (spec's bar-execution open
    /// question is resolved as out of scope; see DESIGN.md). Kept as an
    /// explicit flag so a caller's intent is visible in the config, not
    /// silently ignored.
    pub bar_execution: bool,
    pub reject_stop_orders: bool,
}

impl EngineConfig {
    pub fn new(venue: impl Into<String>, oms_type: OmsType, account_type: AccountType) -> Self {
        Self {
            venue: venue.into(),
            oms_type,
            account_type,
            base_currency: None,
            starting_balances: Vec::new(),
            default_leverage: 1.0,
            leverages: HashMap::new(),
            is_frozen_account: false,
            instruments: Vec::new(),
            fill_model: FillModelConfig::default(),
            book_type: BookType::L1Tbbo,
            bar_execution: false,
            reject_stop_orders: false,
        }
    }

    pub fn with_instrument(mut self, instrument: Instrument) -> Self {
        self.instruments.push(instrument);
        self
    }

    pub fn with_starting_balance(mut self, currency: impl Into<String>, amount: f64) -> Self {
        self.starting_balances.push((currency.into(), amount));
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.venue.trim().is_empty() {
            return Err(ConfigError::EmptyVenue);
        }
        if self.instruments.is_empty() {
            return Err(ConfigError::NoInstruments);
        }
        let mut seen = std::collections::HashSet::new();
        for (ccy, _) in &self.starting_balances {
            if !seen.insert(ccy.clone()) {
                return Err(ConfigError::DuplicateStartingBalance(ccy.clone()));
            }
        }
        if self.default_leverage < 1.0 {
            return Err(ConfigError::InvalidDefaultLeverage(self.default_leverage));
        }
        if self.account_type == AccountType::Cash {
            if let Some((ccy, _)) = self.leverages.iter().next() {
                return Err(ConfigError::LeverageOnCashAccount(ccy.clone()));
            }
        }
        Ok(())
    }
}
