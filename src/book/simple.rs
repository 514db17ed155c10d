//! `SimpleBook`: an in-memory L2 book view, for standalone testing and as a
//! reference plug-in (spec §10.2 — a real deployment would swap in a venue's
//! actual depth feed, e.g. an order-book-by-price-level crate).

use super::view::{BookType, BookView};
use crate::domain::OrderSide;

/// Price levels sorted best-first: bids descending, asks ascending.
#[derive(Debug, Clone, Default)]
pub struct SimpleBook {
    bids: Vec<(f64, f64)>,
    asks: Vec<(f64, f64)>,
}

impl SimpleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bids(&mut self, mut levels: Vec<(f64, f64)>) {
        levels.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
        self.bids = levels;
    }

    pub fn set_asks(&mut self, mut levels: Vec<(f64, f64)>) {
        levels.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        self.asks = levels;
    }

    fn walk(levels: &[(f64, f64)], side: OrderSide, limit_price: Option<f64>, mut qty: f64) -> Vec<(f64, f64)> {
        let mut fills = Vec::new();
        for &(price, size) in levels {
            if qty <= 1e-12 {
                break;
            }
            let within_limit = match (side, limit_price) {
                (_, None) => true,
                (OrderSide::Buy, Some(lp)) => price <= lp,
                (OrderSide::Sell, Some(lp)) => price >= lp,
            };
            if !within_limit {
                break;
            }
            let take = qty.min(size);
            if take > 1e-12 {
                fills.push((price, take));
                qty -= take;
            }
        }
        fills
    }
}

impl BookView for SimpleBook {
    fn book_type(&self) -> BookType {
        BookType::L2Mbp
    }

    fn best_bid(&self) -> Option<f64> {
        self.bids.first().map(|&(p, _)| p)
    }

    fn best_ask(&self) -> Option<f64> {
        self.asks.first().map(|&(p, _)| p)
    }

    fn best_bid_size(&self) -> Option<f64> {
        self.bids.first().map(|&(_, s)| s)
    }

    fn best_ask_size(&self) -> Option<f64> {
        self.asks.first().map(|&(_, s)| s)
    }

    fn simulate_fills(&self, side: OrderSide, limit_price: Option<f64>, qty: f64) -> Vec<(f64, f64)> {
        // An incoming buy consumes the ask side (sellers), and vice versa.
        match side {
            OrderSide::Buy => Self::walk(&self.asks, side, limit_price, qty),
            OrderSide::Sell => Self::walk(&self.bids, side, limit_price, qty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> SimpleBook {
        let mut b = SimpleBook::new();
        b.set_asks(vec![(100.0, 5.0), (100.5, 5.0), (101.0, 10.0)]);
        b.set_bids(vec![(99.5, 5.0), (99.0, 5.0)]);
        b
    }

    #[test]
    fn best_quotes_are_top_of_sorted_levels() {
        let b = book();
        assert_eq!(b.best_ask(), Some(100.0));
        assert_eq!(b.best_bid(), Some(99.5));
    }

    #[test]
    fn market_buy_walks_multiple_ask_levels() {
        let b = book();
        let fills = b.simulate_fills(OrderSide::Buy, None, 8.0);
        assert_eq!(fills, vec![(100.0, 5.0), (100.5, 3.0)]);
    }

    #[test]
    fn limit_buy_stops_at_price_boundary() {
        let b = book();
        let fills = b.simulate_fills(OrderSide::Buy, Some(100.2), 8.0);
        assert_eq!(fills, vec![(100.0, 5.0)]);
    }

    #[test]
    fn insufficient_depth_returns_partial_fills() {
        let b = book();
        let fills = b.simulate_fills(OrderSide::Buy, None, 100.0);
        let total: f64 = fills.iter().map(|&(_, q)| q).sum();
        assert_eq!(total, 20.0);
    }

    #[test]
    fn sell_walks_bid_side() {
        let b = book();
        let fills = b.simulate_fills(OrderSide::Sell, None, 7.0);
        assert_eq!(fills, vec![(99.5, 5.0), (99.0, 2.0)]);
    }
}
