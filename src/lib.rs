//! simx-core — deterministic simulated-exchange matching engine.
//!
//! This crate contains the replayable execution core of a backtest node:
//! - Domain types (orders, positions, accounts, instruments, events)
//! - A FIFO command intake driven by an explicit simulated clock
//! - Order lifecycle state machine (submit/modify/cancel/expire)
//! - Book-walk matching against a pluggable `BookView`
//! - A seeded probabilistic fill model for realistic partial/no-fill behavior
//! - OTO/OCO contingency cascades
//! - HEDGING/NETTING position resolution and account adjustment

pub mod book;
pub mod domain;
pub mod engine;
pub mod error;

pub use domain::*;
pub use engine::{Command, CommandQueue, Engine, EngineConfig, OmsType};
pub use error::ConfigError;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: domain value types stay plain-data and therefore
    /// `Send + Sync`, so a backtest node can shuttle them across threads
    /// without this crate having to think about synchronization itself.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Order>();
        require_sync::<domain::Order>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::AccountState>();
        require_sync::<domain::AccountState>();
        require_send::<domain::Instrument>();
        require_sync::<domain::Instrument>();
        require_send::<domain::OrderEvent>();
        require_sync::<domain::OrderEvent>();
        require_send::<engine::ReplayFingerprint>();
        require_sync::<engine::ReplayFingerprint>();
    }
}
