//! Top-level error re-exports.

pub use crate::engine::config::ConfigError;
