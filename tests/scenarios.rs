//! End-to-end scenario tests exercising the engine as a real caller would:
//! build a config, submit commands, feed market data, and check the emitted
//! event sequence.

use simx_core::book::SimpleBook;
use simx_core::domain::{
    AccountType, ClientOrderId, Contingency, Instrument, InstrumentId, Order, OrderEvent,
    OrderSide, OrderType, StrategyId,
};
use simx_core::engine::{Command, Engine, EngineConfig, OmsType};

fn engine_with(venue_balance: f64) -> Engine {
    let config = EngineConfig::new("SIM", OmsType::Netting, AccountType::Margin)
        .with_instrument(Instrument::new("SPY", "USD", 2, 0.01))
        .with_starting_balance("USD", venue_balance);
    Engine::new(config).expect("valid config")
}

fn spy_book(bid: f64, ask: f64) -> SimpleBook {
    let mut book = SimpleBook::new();
    book.set_bids(vec![(bid, 1_000.0)]);
    book.set_asks(vec![(ask, 1_000.0)]);
    book
}

#[test]
fn crossing_limit_buy_fills_immediately() {
    let mut engine = engine_with(100_000.0);
    let instrument_id = InstrumentId::from("SPY");

    let order = Order::new(
        ClientOrderId::from("c-1"),
        StrategyId::from("s-1"),
        instrument_id.clone(),
        OrderSide::Buy,
        OrderType::Limit { price: 100.5 },
        10.0,
    );
    engine.send(Command::SubmitOrder(order));

    let mut events = Vec::new();
    engine.process(1, &mut events);
    assert!(events.iter().any(|e| matches!(e, OrderEvent::OrderAccepted { .. })));

    events.clear();
    engine.process_order_book(&instrument_id, &spy_book(99.5, 100.0), 2, &mut events);
    assert!(events.iter().any(|e| matches!(e, OrderEvent::OrderFilled { last_px, .. } if *last_px == 100.0)));
}

#[test]
fn post_only_modify_that_would_cross_is_rejected() {
    let mut engine = engine_with(100_000.0);
    let instrument_id = InstrumentId::from("SPY");

    let mut order = Order::new(
        ClientOrderId::from("c-1"),
        StrategyId::from("s-1"),
        instrument_id.clone(),
        OrderSide::Buy,
        OrderType::Limit { price: 99.0 },
        10.0,
    );
    order.is_post_only = true;
    engine.send(Command::SubmitOrder(order));

    let mut events = Vec::new();
    engine.process(1, &mut events);
    assert!(events.iter().any(|e| matches!(e, OrderEvent::OrderAccepted { .. })));

    // First tick establishes a live quote that does not cross the resting
    // order (ask 99.5 is above its 99.0 limit), so it is left untouched.
    events.clear();
    engine.process_order_book(&instrument_id, &spy_book(98.5, 99.5), 2, &mut events);
    assert!(!events.iter().any(|e| matches!(e, OrderEvent::OrderFilled { .. })));

    // Moving the price up to 100.0 would now cross the 99.5 ask, so the
    // engine must reject the modify rather than let a post-only order take.
    events.clear();
    engine.send(Command::ModifyOrder {
        client_order_id: ClientOrderId::from("c-1"),
        quantity: None,
        price: Some(100.0),
        trigger_price: None,
    });
    engine.process(3, &mut events);
    assert!(events.iter().any(|e| matches!(
        e,
        OrderEvent::OrderModifyRejected { reason, .. } if *reason == simx_core::domain::RejectReason::PostOnlyWouldTake
    )));
}

#[test]
fn stop_market_triggers_and_walks_the_book() {
    let mut engine = engine_with(100_000.0);
    let instrument_id = InstrumentId::from("SPY");

    let order = Order::new(
        ClientOrderId::from("c-1"),
        StrategyId::from("s-1"),
        instrument_id.clone(),
        OrderSide::Buy,
        OrderType::StopMarket { trigger: 100.0 },
        10.0,
    );
    engine.send(Command::SubmitOrder(order));
    engine.process(1, &mut Vec::new());

    let mut events = Vec::new();
    engine.process_order_book(&instrument_id, &spy_book(99.0, 100.25), 2, &mut events);
    assert!(events.iter().any(|e| matches!(e, OrderEvent::OrderTriggered { .. })));
    assert!(events.iter().any(|e| matches!(e, OrderEvent::OrderFilled { .. })));
}

#[test]
fn reduce_only_order_is_clipped_to_open_exposure() {
    let mut engine = engine_with(100_000.0);
    let instrument_id = InstrumentId::from("SPY");

    // Establish a live quote first so the entry order below can fill
    // immediately as a Taker on submission.
    engine.process_order_book(&instrument_id, &spy_book(99.5, 100.0), 1, &mut Vec::new());

    let entry = Order::new(
        ClientOrderId::from("entry"),
        StrategyId::from("s-1"),
        instrument_id.clone(),
        OrderSide::Sell,
        OrderType::Market,
        10.0,
    );
    engine.send(Command::SubmitOrder(entry));
    let mut entry_events = Vec::new();
    engine.process(2, &mut entry_events);
    assert!(entry_events.iter().any(|e| matches!(e, OrderEvent::OrderFilled { last_qty, .. } if *last_qty == 10.0)));

    // The short position opened above is only 10.0; a reduce-only buy for
    // 15.0 must be clipped down to the open exposure rather than flipping
    // the position, emitting an `OrderUpdated` before the (clipped) fill.
    let mut reduce_only = Order::new(
        ClientOrderId::from("reduce"),
        StrategyId::from("s-1"),
        instrument_id.clone(),
        OrderSide::Buy,
        OrderType::Market,
        15.0,
    );
    reduce_only.is_reduce_only = true;
    engine.send(Command::SubmitOrder(reduce_only));
    let mut events = Vec::new();
    engine.process(3, &mut events);

    assert!(events.iter().any(
        |e| matches!(e, OrderEvent::OrderUpdated { client_order_id, quantity, .. }
            if client_order_id.as_str() == "reduce" && *quantity == 10.0)
    ));
    assert!(events.iter().any(
        |e| matches!(e, OrderEvent::OrderFilled { client_order_id, last_qty, .. }
            if client_order_id.as_str() == "reduce" && *last_qty == 10.0)
    ));
    assert!(!events.iter().any(
        |e| matches!(e, OrderEvent::OrderFilled { client_order_id, last_qty, .. }
            if client_order_id.as_str() == "reduce" && *last_qty > 10.0)
    ));
}

#[test]
fn oco_sibling_is_canceled_on_fill() {
    let mut engine = engine_with(100_000.0);
    let instrument_id = InstrumentId::from("SPY");

    let mut take_profit = Order::new(
        ClientOrderId::from("tp"),
        StrategyId::from("s-1"),
        instrument_id.clone(),
        OrderSide::Sell,
        OrderType::Limit { price: 100.0 },
        10.0,
    );
    let mut stop_loss = Order::new(
        ClientOrderId::from("sl"),
        StrategyId::from("s-1"),
        instrument_id.clone(),
        OrderSide::Sell,
        OrderType::StopMarket { trigger: 95.0 },
        10.0,
    );
    take_profit.contingency = Contingency::Oco;
    take_profit.contingency_ids.push(ClientOrderId::from("sl"));
    stop_loss.contingency = Contingency::Oco;
    stop_loss.contingency_ids.push(ClientOrderId::from("tp"));

    engine.send(Command::SubmitOrderList(vec![take_profit, stop_loss]));
    engine.process(1, &mut Vec::new());

    let mut events = Vec::new();
    engine.process_order_book(&instrument_id, &spy_book(100.5, 101.0), 2, &mut events);
    assert!(events.iter().any(|e| matches!(e, OrderEvent::OrderFilled { client_order_id, .. } if client_order_id.as_str() == "tp")));
    assert!(events.iter().any(|e| matches!(e, OrderEvent::OrderCanceled { client_order_id } if client_order_id.as_str() == "sl")));
}

#[test]
fn oto_parent_rejection_propagates_to_child() {
    let mut engine = engine_with(100_000.0);
    let instrument_id = InstrumentId::from("SPY");

    // Parent is reduce-only with no opposing position open, so it is
    // rejected on submission; the child (an ordinary order, not itself
    // reduce-only) should be rejected too, purely via OTO propagation.
    let mut parent = Order::new(
        ClientOrderId::from("parent"),
        StrategyId::from("s-1"),
        instrument_id.clone(),
        OrderSide::Buy,
        OrderType::Market,
        10.0,
    );
    parent.is_reduce_only = true;
    let mut child = Order::new(
        ClientOrderId::from("child"),
        StrategyId::from("s-1"),
        instrument_id.clone(),
        OrderSide::Sell,
        OrderType::Limit { price: 105.0 },
        10.0,
    );
    parent.contingency = Contingency::Oto;
    parent.child_order_ids.push(ClientOrderId::from("child"));
    child.parent_order_id = Some(ClientOrderId::from("parent"));

    engine.send(Command::SubmitOrderList(vec![parent, child]));

    let mut events = Vec::new();
    engine.process(1, &mut events);
    assert!(events.iter().any(|e| matches!(
        e,
        OrderEvent::OrderRejected { client_order_id, .. } if client_order_id.as_str() == "parent"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        OrderEvent::OrderRejected { client_order_id, .. } if client_order_id.as_str() == "child"
    )));
}
