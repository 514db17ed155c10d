//! The matching engine proper: clock, command intake, state machine,
//! matching, contingency cascades, position/account adjustment.

pub mod account_adapter;
pub mod clock;
pub mod command_queue;
pub mod config;
pub mod contingency;
pub mod engine;
pub mod fill_model;
pub mod fingerprint;
pub mod matching;
pub mod order_index;
pub mod position_resolver;
pub mod state_machine;

pub use account_adapter::AccountAdapter;
pub use clock::ClockDriver;
pub use command_queue::{Command, CommandQueue};
pub use config::{ConfigError, EngineConfig, OmsType};
pub use contingency::ContingencyManager;
pub use engine::Engine;
pub use fill_model::{FillModel, FillModelConfig};
pub use fingerprint::ReplayFingerprint;
pub use matching::MatchingEngine;
pub use order_index::OrderIndex;
pub use position_resolver::{InMemoryPositionCache, PositionCacheMut, PositionResolver};
pub use state_machine::OrderStateMachine;
