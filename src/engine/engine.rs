//! `Engine`: the single entry point assembling every component into the
//! inbound API a backtest node drives (spec §6).

use crate::book::{BookType, BookView, SimpleBook};
use crate::domain::{
    AccountCache, AccountState, ClientOrderId, CommissionSchedule, EventSink, IdGen,
    InMemoryAccountCache, Instrument, InstrumentId, Order, OrderEvent, OrderSide,
};
use crate::engine::account_adapter::AccountAdapter;
use crate::engine::clock::ClockDriver;
use crate::engine::command_queue::{Command, CommandQueue};
use crate::engine::config::EngineConfig;
use crate::engine::contingency::ContingencyManager;
use crate::engine::fill_model::FillModel;
use crate::engine::fingerprint::ReplayFingerprint;
use crate::engine::matching::MatchingEngine;
use crate::engine::order_index::OrderIndex;
use crate::engine::position_resolver::{InMemoryPositionCache, PositionCacheMut, PositionResolver};
use crate::engine::state_machine::OrderStateMachine;
use crate::error::ConfigError;
use std::collections::HashMap;

/// Deterministic simulated-exchange matching engine.
///
/// Generic over the account and position caches so a real execution client
/// can supply its own store; both default to this crate's in-memory
/// implementations so the engine is usable standalone (spec §10.1).
pub struct Engine<
    A: AccountCache = InMemoryAccountCache,
    P: PositionCacheMut = InMemoryPositionCache,
> {
    config: EngineConfig,
    clock: ClockDriver,
    id_gen: IdGen,
    order_index: OrderIndex,
    command_queue: CommandQueue,
    fill_model: FillModel,
    account_adapter: AccountAdapter<A>,
    position_resolver: PositionResolver<P>,
    instruments: HashMap<InstrumentId, Instrument>,
    /// Last market data fed per instrument, flattened to a top-of-book
    /// snapshot. Used by `submit`/`modify` to evaluate marketability without
    /// requiring a book to be passed alongside every command; only ever as
    /// good as the last `process_order_book` call (L1-quality even if the
    /// feed driving it had deeper levels, since that's all a `BookView`
    /// exposes read-only).
    last_books: HashMap<InstrumentId, SimpleBook>,
}

impl Engine<InMemoryAccountCache, InMemoryPositionCache> {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut id_gen = IdGen::new();
        let mut instruments = HashMap::new();
        for instrument in &config.instruments {
            id_gen.register_instrument(&instrument.id);
            instruments.insert(instrument.id.clone(), instrument.clone());
        }

        let account_state = AccountState::new(config.account_type, &config.starting_balances);
        let account_cache = InMemoryAccountCache {
            state: Some(account_state),
        };
        let commission_schedule = CommissionSchedule::PerShare { maker: 0.0, taker: 0.0 };

        Ok(Self {
            fill_model: FillModel::new(config.fill_model),
            account_adapter: AccountAdapter::new(account_cache, commission_schedule),
            position_resolver: PositionResolver::new(InMemoryPositionCache::default()),
            clock: ClockDriver::new(),
            id_gen,
            order_index: OrderIndex::new(),
            command_queue: CommandQueue::new(),
            instruments,
            last_books: HashMap::new(),
            config,
        })
    }
}

impl<A: AccountCache, P: PositionCacheMut> Engine<A, P> {
    pub fn with_caches(config: EngineConfig, account_cache: A, position_cache: P) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut id_gen = IdGen::new();
        let mut instruments = HashMap::new();
        for instrument in &config.instruments {
            id_gen.register_instrument(&instrument.id);
            instruments.insert(instrument.id.clone(), instrument.clone());
        }

        let commission_schedule = CommissionSchedule::PerShare { maker: 0.0, taker: 0.0 };

        Ok(Self {
            fill_model: FillModel::new(config.fill_model),
            account_adapter: AccountAdapter::new(account_cache, commission_schedule),
            position_resolver: PositionResolver::new(position_cache),
            clock: ClockDriver::new(),
            id_gen,
            order_index: OrderIndex::new(),
            command_queue: CommandQueue::new(),
            instruments,
            last_books: HashMap::new(),
            config,
        })
    }

    pub fn set_commission_schedule(&mut self, schedule: CommissionSchedule) {
        self.account_adapter.set_commission_schedule(schedule);
    }

    pub fn set_fill_model(&mut self, fill_model: FillModel) {
        self.fill_model = fill_model;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now_ns(&self) -> u64 {
        self.clock.now_ns()
    }

    pub fn order_index(&self) -> &OrderIndex {
        &self.order_index
    }

    pub fn account_adapter(&self) -> &AccountAdapter<A> {
        &self.account_adapter
    }

    pub fn replay_fingerprint(&self) -> ReplayFingerprint {
        let instruments: Vec<Instrument> = self.instruments.values().cloned().collect();
        ReplayFingerprint::compute(&self.config, &instruments)
    }

    /// Queue a command for the next `process` call (spec §4.2 FIFO intake).
    pub fn send(&mut self, command: Command) {
        self.command_queue.push(command);
    }

    /// Directly adjust a currency balance, bypassing commission/fill logic
    /// (e.g. for funding, deposits, or test setup).
    pub fn adjust_account(&mut self, currency: &str, delta: f64) {
        if let Some(account) = self.account_adapter.cache_mut().account_mut() {
            if let Some(balance) = account.balances.get_mut(currency) {
                balance.total += delta;
            } else {
                tracing::warn!(currency, "adjust_account: unknown currency balance");
            }
        }
    }

    /// Advance the clock and drain every queued command in FIFO order,
    /// running contingency cascades after every event batch.
    pub fn process(&mut self, now_ns: u64, events: &mut dyn EventSink) {
        self.clock.advance_to(now_ns);

        while let Some(command) = self.command_queue.pop() {
            let mut local: Vec<OrderEvent> = Vec::new();
            match command {
                Command::SubmitOrder(order) => {
                    self.submit_one(order, &mut local);
                }
                Command::SubmitOrderList(orders) => {
                    for order in orders {
                        self.submit_one(order, &mut local);
                    }
                }
                Command::ModifyOrder {
                    client_order_id,
                    quantity,
                    price,
                    trigger_price,
                } => {
                    let instrument_id = self.order_index.get(&client_order_id).map(|o| o.instrument_id.clone());
                    let book: Option<&dyn BookView> = instrument_id
                        .as_ref()
                        .and_then(|iid| self.last_books.get(iid))
                        .map(|b| b as &dyn BookView);
                    OrderStateMachine::modify(
                        &client_order_id,
                        quantity,
                        price,
                        trigger_price,
                        &mut self.order_index,
                        book,
                        &mut local,
                    );
                }
                Command::CancelOrder { client_order_id } => {
                    OrderStateMachine::cancel(&client_order_id, &mut self.order_index, &mut local);
                }
            }

            for event in &local {
                ContingencyManager::on_event(event, &mut self.order_index, &mut self.id_gen, events);
            }
            for event in local {
                events.push(event);
            }
        }

        let mut expiry_events: Vec<OrderEvent> = Vec::new();
        OrderStateMachine::expire_due(now_ns, &mut self.order_index, &mut expiry_events);
        for event in expiry_events {
            events.push(event);
        }
    }

    /// Resolve `order`'s instrument and last-known book, then dispatch it
    /// through `OrderStateMachine::submit` (spec §4.5). An order referencing
    /// an instrument this engine was never configured with is rejected
    /// without ever being handed to the state machine.
    fn submit_one(&mut self, order: Order, events: &mut dyn EventSink) {
        let Some(instrument) = self.instruments.get(&order.instrument_id).cloned() else {
            let instrument_id = order.instrument_id.clone();
            events.push(OrderEvent::OrderSubmitted {
                client_order_id: order.client_order_id.clone(),
            });
            tracing::error!(%instrument_id, "submit: unknown instrument");
            let mut order = order;
            order.status = crate::domain::OrderStatus::Rejected;
            let client_order_id = order.client_order_id.clone();
            self.order_index.insert(order);
            events.push(OrderEvent::OrderRejected {
                client_order_id,
                reason: crate::domain::RejectReason::Other(format!("unknown instrument {instrument_id}")),
            });
            return;
        };

        let book: Option<&dyn BookView> = self.last_books.get(&order.instrument_id).map(|b| b as &dyn BookView);
        OrderStateMachine::submit(
            order,
            &mut self.order_index,
            &mut self.id_gen,
            &self.config,
            &instrument,
            book,
            &mut self.fill_model,
            &mut self.position_resolver,
            &mut self.account_adapter,
            events,
        );
    }

    /// Feed a fresh market-data book for `instrument_id` and run one matching
    /// pass against it.
    pub fn process_order_book(
        &mut self,
        instrument_id: &InstrumentId,
        book: &dyn BookView,
        now_ns: u64,
        events: &mut dyn EventSink,
    ) {
        self.clock.advance_to(now_ns);
        let Some(instrument) = self.instruments.get(instrument_id).cloned() else {
            tracing::error!(%instrument_id, "process_order_book: unknown instrument");
            return;
        };

        self.last_books.insert(instrument_id.clone(), Self::snapshot_book(book));

        let mut local: Vec<OrderEvent> = Vec::new();
        MatchingEngine::process_instrument(
            &instrument,
            book,
            &mut self.order_index,
            &mut self.fill_model,
            &mut self.id_gen,
            &mut self.position_resolver,
            &mut self.account_adapter,
            &self.config,
            &mut local,
        );

        for event in &local {
            ContingencyManager::on_event(event, &mut self.order_index, &mut self.id_gen, events);
        }
        for event in local {
            events.push(event);
        }
    }

    /// Feed a top-of-book quote; convenience wrapper over
    /// `process_order_book` for L1 venues (spec §3 `BookType::L1Tbbo`).
    pub fn process_tick(
        &mut self,
        instrument_id: &InstrumentId,
        bid: f64,
        ask: f64,
        bid_size: f64,
        ask_size: f64,
        now_ns: u64,
        events: &mut dyn EventSink,
    ) {
        let mut book = SimpleBook::new();
        book.set_bids(vec![(bid, bid_size)]);
        book.set_asks(vec![(ask, ask_size)]);
        self.process_order_book(instrument_id, &book, now_ns, events);
    }

    /// Advance the clock to a bar's close timestamp. Bar-driven matching
    /// (SOB/intrabar/EOB fills against OHLC) is explicitly out of scope
    /// (spec's open question, resolved in DESIGN.md) — this only moves time
    /// forward and expires due orders.
    pub fn process_bar(&mut self, close_ns: u64, events: &mut dyn EventSink) {
        self.clock.advance_to(close_ns);
        let mut expiry_events: Vec<OrderEvent> = Vec::new();
        OrderStateMachine::expire_due(close_ns, &mut self.order_index, &mut expiry_events);
        for event in expiry_events {
            events.push(event);
        }
        if self.config.bar_execution {
            tracing::warn!("bar_execution requested but bar-driven matching is not implemented");
        }
    }

    /// Reset the clock, identifier counters, and order index. Account
    /// balances and position state are left untouched — callers reinitialize
    /// those explicitly if a full run reset is wanted.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.id_gen.reset();
        self.order_index.clear();
        self.command_queue = CommandQueue::new();
        self.fill_model.reset();
    }

    #[allow(dead_code)]
    fn book_type(&self) -> BookType {
        self.config.book_type
    }

    /// Flatten an arbitrary `BookView` down to a top-of-book snapshot for
    /// `last_books`. The trait only exposes best bid/ask (and their sizes),
    /// so even a deep L2/L3 feed is remembered at L1 quality here.
    fn snapshot_book(book: &dyn BookView) -> SimpleBook {
        let mut snapshot = SimpleBook::new();
        if let (Some(bid), Some(size)) = (book.best_bid(), book.best_bid_size()) {
            snapshot.set_bids(vec![(bid, size)]);
        }
        if let (Some(ask), Some(size)) = (book.best_ask(), book.best_ask_size()) {
            snapshot.set_asks(vec![(ask, size)]);
        }
        snapshot
    }
}

#[allow(dead_code)]
fn validate_order_side_exhaustive(side: OrderSide) -> OrderSide {
    // Keeps `OrderSide` match-exhaustiveness honest if a third side is ever added.
    match side {
        OrderSide::Buy => OrderSide::Buy,
        OrderSide::Sell => OrderSide::Sell,
    }
}
