//! Read-only market-data view the matching engine walks to find fill prices.
//!
//! Spec §4.6: limit and stop orders fill by walking this view's price levels
//! (book-walk), not just against a single top-of-book quote, so a large order
//! can be filled across several price levels in one pass.

use crate::domain::OrderSide;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookType {
    /// Top-of-book only: one (price, size) quote per side.
    L1Tbbo,
    /// Market-by-price: aggregated size at each price level.
    L2Mbp,
    /// Market-by-order: full order-level depth.
    L3Mbo,
}

/// A market snapshot the matching engine can walk for fill prices and sizes.
///
/// Implementations range from a single top-of-book quote (L1, where
/// `simulate_fills` degrades to a residual-walk heuristic past the displayed
/// size) up to full L3 depth.
pub trait BookView {
    fn book_type(&self) -> BookType;
    fn best_bid(&self) -> Option<f64>;
    fn best_ask(&self) -> Option<f64>;
    fn best_bid_size(&self) -> Option<f64>;
    fn best_ask_size(&self) -> Option<f64>;

    /// Walk the book on `side` consuming up to `qty` units at prices no worse
    /// than `limit_price` (or unbounded, for market orders). Returns the
    /// sequence of (price, qty) fills that would result, in the order they'd
    /// print; the sum of returned quantities may be less than `qty` if the
    /// book doesn't have enough depth within the limit.
    ///
    /// `side` is the *incoming order's* side: a resting bid is matched
    /// against incoming sell orders, so `side == Sell` walks the bid side of
    /// the book and vice versa.
    fn simulate_fills(&self, side: OrderSide, limit_price: Option<f64>, qty: f64) -> Vec<(f64, f64)>;
}
