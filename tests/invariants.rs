//! Property-based checks of invariants that must hold for every fill,
//! regardless of the specific order/book combination that produced it.

use proptest::prelude::*;
use simx_core::book::SimpleBook;
use simx_core::domain::{
    AccountType, ClientOrderId, Instrument, InstrumentId, Order, OrderEvent, OrderSide,
    OrderType, StrategyId,
};
use simx_core::engine::{Command, Engine, EngineConfig, OmsType, OrderIndex};

fn engine() -> Engine {
    let config = EngineConfig::new("SIM", OmsType::Netting, AccountType::Margin)
        .with_instrument(Instrument::new("SPY", "USD", 2, 0.01))
        .with_starting_balance("USD", 10_000_000.0);
    Engine::new(config).expect("valid config")
}

proptest! {
    /// A market order's cumulative filled quantity never exceeds the book
    /// depth available, and every fill's price is at or past the quoted
    /// touch on the correct side.
    #[test]
    fn market_order_never_overfills_past_book_depth(
        qty in 1.0f64..500.0,
        depth in 1.0f64..500.0,
        side in prop_oneof![Just(OrderSide::Buy), Just(OrderSide::Sell)],
    ) {
        let mut engine = engine();
        let instrument_id = InstrumentId::from("SPY");
        let order = Order::new(
            ClientOrderId::from("c-1"),
            StrategyId::from("s-1"),
            instrument_id.clone(),
            side,
            OrderType::Market,
            qty,
        );
        engine.send(Command::SubmitOrder(order));
        engine.process(1, &mut Vec::new());

        let mut book = SimpleBook::new();
        book.set_bids(vec![(99.0, depth)]);
        book.set_asks(vec![(100.0, depth)]);

        let mut events = Vec::new();
        engine.process_order_book(&instrument_id, &book, 2, &mut events);

        let filled: f64 = events
            .iter()
            .filter_map(|e| match e {
                OrderEvent::OrderFilled { last_qty, .. } => Some(*last_qty),
                _ => None,
            })
            .sum();

        prop_assert!(filled <= qty + 1e-9);
        prop_assert!(filled <= depth + 1e-9);

        for e in &events {
            if let OrderEvent::OrderFilled { last_px, .. } = e {
                match side {
                    OrderSide::Buy => prop_assert!(*last_px >= 100.0 - 1e-9),
                    OrderSide::Sell => prop_assert!(*last_px <= 99.0 + 1e-9),
                }
            }
        }
    }

    /// A non-marketable limit order never fills, regardless of quantity.
    #[test]
    fn non_marketable_limit_never_fills(qty in 1.0f64..500.0) {
        let mut engine = engine();
        let instrument_id = InstrumentId::from("SPY");
        let order = Order::new(
            ClientOrderId::from("c-1"),
            StrategyId::from("s-1"),
            instrument_id.clone(),
            OrderSide::Buy,
            OrderType::Limit { price: 50.0 },
            qty,
        );
        engine.send(Command::SubmitOrder(order));
        engine.process(1, &mut Vec::new());

        let mut book = SimpleBook::new();
        book.set_bids(vec![(99.0, 1_000.0)]);
        book.set_asks(vec![(100.0, 1_000.0)]);

        let mut events = Vec::new();
        engine.process_order_book(&instrument_id, &book, 2, &mut events);

        prop_assert!(!events.iter().any(|e| matches!(e, OrderEvent::OrderFilled { .. })));
    }

    /// Whatever order resting limit orders are inserted in, the bid side
    /// index is sorted strictly non-increasing by price and the ask side is
    /// sorted non-decreasing (Testable Property 3).
    #[test]
    fn working_index_keeps_bids_and_asks_price_sorted(
        bid_prices in prop::collection::vec(1.0f64..1_000.0, 0..20),
        ask_prices in prop::collection::vec(1.0f64..1_000.0, 0..20),
    ) {
        let mut index = OrderIndex::new();
        let instrument_id = InstrumentId::from("SPY");

        for (i, price) in bid_prices.iter().enumerate() {
            index.insert(Order::new(
                ClientOrderId::from(format!("bid-{i}")),
                StrategyId::from("s-1"),
                instrument_id.clone(),
                OrderSide::Buy,
                OrderType::Limit { price: *price },
                1.0,
            ));
        }
        for (i, price) in ask_prices.iter().enumerate() {
            index.insert(Order::new(
                ClientOrderId::from(format!("ask-{i}")),
                StrategyId::from("s-1"),
                instrument_id.clone(),
                OrderSide::Sell,
                OrderType::Limit { price: *price },
                1.0,
            ));
        }

        let bids: Vec<f64> = index
            .bids(&instrument_id)
            .iter()
            .map(|cid| match index.get(cid).unwrap().order_type {
                OrderType::Limit { price } => price,
                _ => unreachable!(),
            })
            .collect();
        let asks: Vec<f64> = index
            .asks(&instrument_id)
            .iter()
            .map(|cid| match index.get(cid).unwrap().order_type {
                OrderType::Limit { price } => price,
                _ => unreachable!(),
            })
            .collect();

        prop_assert!(bids.windows(2).all(|w| w[0] >= w[1]));
        prop_assert!(asks.windows(2).all(|w| w[0] <= w[1]));
    }
}
