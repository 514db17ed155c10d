//! Instrument metadata and tick rounding.

use super::ids::InstrumentId;
use super::order::OrderSide;
use serde::{Deserialize, Serialize};

/// Immutable-after-load metadata for a tradable instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    pub quote_currency: String,
    pub price_precision: u32,
    pub price_increment: f64,
    pub tick_size: f64,
}

impl Instrument {
    pub fn new(
        id: impl Into<InstrumentId>,
        quote_currency: impl Into<String>,
        price_precision: u32,
        price_increment: f64,
    ) -> Self {
        Self {
            id: id.into(),
            quote_currency: quote_currency.into(),
            price_precision,
            price_increment,
            tick_size: price_increment,
        }
    }

    /// Side-aware tick rounding: buys round up (pay more, ensures fill),
    /// sells round down (receive less, ensures fill).
    pub fn round_price(&self, price: f64, side: OrderSide) -> f64 {
        if self.price_increment <= 0.0 || price.is_nan() {
            return price;
        }
        match side {
            OrderSide::Buy => (price / self.price_increment).ceil() * self.price_increment,
            OrderSide::Sell => (price / self.price_increment).floor() * self.price_increment,
        }
    }

    /// Round a raw price to the nearest increment (used for display / storage,
    /// not for taker-pays-more rounding).
    pub fn round_to_increment(&self, price: f64) -> f64 {
        if self.price_increment <= 0.0 || price.is_nan() {
            return price;
        }
        (price / self.price_increment).round() * self.price_increment
    }
}
