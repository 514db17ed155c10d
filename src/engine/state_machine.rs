//! Order lifecycle transitions: submit, modify, cancel, expire.
//!
//! Validation failures are never `Result::Err` — they're emitted as
//! `OrderRejected` / `OrderModifyRejected` / `OrderCancelRejected` events, the
//! same way a real venue would respond to a bad request instead of the
//! client's process crashing on it (spec §4.5, §6.2).

use crate::book::BookView;
use crate::domain::{
    AccountCache, ClientOrderId, EventSink, IdGen, Instrument, LiquiditySide, Order, OrderEvent,
    OrderSide, OrderStatus, OrderType, PositionCache, RejectReason,
};
use crate::engine::account_adapter::AccountAdapter;
use crate::engine::config::EngineConfig;
use crate::engine::fill_model::FillModel;
use crate::engine::matching::MatchingEngine;
use crate::engine::order_index::OrderIndex;
use crate::engine::position_resolver::{PositionCacheMut, PositionResolver};

pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Validate a newly submitted order and dispatch it per its type (spec
    /// §4.5): Market and a marketable Limit fill immediately as Taker;
    /// StopMarket/StopLimit only ever accept or reject here, since they wait
    /// to trigger during a later matching pass.
    #[allow(clippy::too_many_arguments)]
    pub fn submit<A: AccountCache, P: PositionCacheMut>(
        order: Order,
        index: &mut OrderIndex,
        id_gen: &mut IdGen,
        config: &EngineConfig,
        instrument: &Instrument,
        book: Option<&dyn BookView>,
        fill_model: &mut FillModel,
        position_resolver: &mut PositionResolver<P>,
        account_adapter: &mut AccountAdapter<A>,
        events: &mut dyn EventSink,
    ) {
        events.push(OrderEvent::OrderSubmitted {
            client_order_id: order.client_order_id.clone(),
        });

        if config.is_frozen_account {
            Self::reject(order, RejectReason::Frozen, index, events);
            return;
        }

        if order.is_reduce_only && !Self::reduces_position(&order, position_resolver.cache()) {
            Self::reject(order, RejectReason::ReduceOnlyWouldIncrease, index, events);
            return;
        }

        if let Some(parent_id) = &order.parent_order_id {
            if let Some(parent) = index.get(parent_id) {
                if parent.status == OrderStatus::Rejected {
                    Self::reject(order, RejectReason::ParentOrderRejected, index, events);
                    return;
                }
            }
        }

        match order.order_type {
            OrderType::Market => Self::submit_market(
                order,
                index,
                id_gen,
                instrument,
                book,
                fill_model,
                position_resolver,
                account_adapter,
                config,
                events,
            ),
            OrderType::Limit { price } => Self::submit_limit(
                order,
                price,
                index,
                id_gen,
                instrument,
                book,
                fill_model,
                position_resolver,
                account_adapter,
                config,
                events,
            ),
            OrderType::StopMarket { trigger } => {
                Self::submit_stop_market(order, trigger, index, id_gen, book, config, events)
            }
            OrderType::StopLimit { trigger, .. } => {
                Self::submit_stop_limit(order, trigger, index, id_gen, book, events)
            }
        }
    }

    /// Market order: reject if no opposing price exists to fill against,
    /// otherwise accept and fill the entire quantity immediately as Taker.
    #[allow(clippy::too_many_arguments)]
    fn submit_market<A: AccountCache, P: PositionCacheMut>(
        order: Order,
        index: &mut OrderIndex,
        id_gen: &mut IdGen,
        instrument: &Instrument,
        book: Option<&dyn BookView>,
        fill_model: &mut FillModel,
        position_resolver: &mut PositionResolver<P>,
        account_adapter: &mut AccountAdapter<A>,
        config: &EngineConfig,
        events: &mut dyn EventSink,
    ) {
        let side = order.side;
        let opposing = book.and_then(|b| Self::opposing_price(side, b));
        if opposing.is_none() {
            let instrument_id = order.instrument_id.clone();
            Self::reject(
                order,
                RejectReason::Other(format!("no market for {instrument_id}")),
                index,
                events,
            );
            return;
        }

        let qty = order.leaves_qty();
        let cid = Self::accept(order, index, id_gen, events);
        let book = book.expect("opposing price implies a book");
        let walk = book.simulate_fills(side, None, qty);
        if !walk.is_empty() {
            MatchingEngine::walk_and_fill(
                &cid,
                side,
                LiquiditySide::Taker,
                walk,
                instrument,
                fill_model,
                index,
                id_gen,
                position_resolver,
                account_adapter,
                config,
                events,
            );
        }
    }

    /// Limit order: reject a post-only order that would cross on arrival
    /// (post-only violation), otherwise accept and, if it crosses the
    /// opposing best price, fill it immediately as Taker.
    #[allow(clippy::too_many_arguments)]
    fn submit_limit<A: AccountCache, P: PositionCacheMut>(
        order: Order,
        price: f64,
        index: &mut OrderIndex,
        id_gen: &mut IdGen,
        instrument: &Instrument,
        book: Option<&dyn BookView>,
        fill_model: &mut FillModel,
        position_resolver: &mut PositionResolver<P>,
        account_adapter: &mut AccountAdapter<A>,
        config: &EngineConfig,
        events: &mut dyn EventSink,
    ) {
        let side = order.side;
        let crosses = book.is_some_and(|b| Self::would_take(side, price, b));

        if order.is_post_only && crosses {
            Self::reject(order, RejectReason::PostOnlyWouldTake, index, events);
            return;
        }

        let qty = order.leaves_qty();
        let cid = Self::accept(order, index, id_gen, events);

        if crosses {
            let book = book.expect("crosses implies a book");
            let walk = book.simulate_fills(side, Some(price), qty);
            if !walk.is_empty() {
                MatchingEngine::walk_and_fill(
                    &cid,
                    side,
                    LiquiditySide::Taker,
                    walk,
                    instrument,
                    fill_model,
                    index,
                    id_gen,
                    position_resolver,
                    account_adapter,
                    config,
                    events,
                );
            }
        }
    }

    /// StopMarket: rejection when the stop price is already in the market is
    /// gated by `config.reject_stop_orders` (spec §4.5). Never fills at
    /// submission — it only becomes workable once it triggers during a later
    /// matching pass.
    fn submit_stop_market(
        order: Order,
        trigger: f64,
        index: &mut OrderIndex,
        id_gen: &mut IdGen,
        book: Option<&dyn BookView>,
        config: &EngineConfig,
        events: &mut dyn EventSink,
    ) {
        let in_market = book.is_some_and(|b| Self::trigger_crossed(order.side, trigger, b));
        if in_market && config.reject_stop_orders {
            Self::reject(order, RejectReason::StopTriggerInvalid, index, events);
            return;
        }
        Self::accept(order, index, id_gen, events);
    }

    /// StopLimit: rejection when the trigger price is already in the market
    /// is unconditional (spec §4.5) — unlike StopMarket, it is not gated by
    /// `config.reject_stop_orders`.
    fn submit_stop_limit(
        order: Order,
        trigger: f64,
        index: &mut OrderIndex,
        id_gen: &mut IdGen,
        book: Option<&dyn BookView>,
        events: &mut dyn EventSink,
    ) {
        let in_market = book.is_some_and(|b| Self::trigger_crossed(order.side, trigger, b));
        if in_market {
            Self::reject(order, RejectReason::StopTriggerInvalid, index, events);
            return;
        }
        Self::accept(order, index, id_gen, events);
    }

    /// Accept `order`: assign its venue id, mark it working, insert it, and
    /// emit `OrderAccepted`. Returns the client-order-id for callers that
    /// still need to look it back up (e.g. to immediately fill it).
    fn accept(mut order: Order, index: &mut OrderIndex, id_gen: &mut IdGen, events: &mut dyn EventSink) -> ClientOrderId {
        let venue_order_id = id_gen.next_venue_order_id(&order.instrument_id);
        order.venue_order_id = Some(venue_order_id.clone());
        order.status = OrderStatus::Accepted;
        let client_order_id = order.client_order_id.clone();
        index.insert(order);

        events.push(OrderEvent::OrderAccepted {
            client_order_id: client_order_id.clone(),
            venue_order_id,
        });
        client_order_id
    }

    fn opposing_price(side: OrderSide, book: &dyn BookView) -> Option<f64> {
        match side {
            OrderSide::Buy => book.best_ask(),
            OrderSide::Sell => book.best_bid(),
        }
    }

    fn trigger_crossed(side: OrderSide, trigger: f64, book: &dyn BookView) -> bool {
        match side {
            OrderSide::Buy => book.best_ask().is_some_and(|ask| ask >= trigger),
            OrderSide::Sell => book.best_bid().is_some_and(|bid| bid <= trigger),
        }
    }

    /// Mark `order` rejected and keep it in the index (so OTO children still
    /// linked to it can be looked up by the contingency cascade) before
    /// emitting the rejection event.
    fn reject(mut order: Order, reason: RejectReason, index: &mut OrderIndex, events: &mut dyn EventSink) {
        order.status = OrderStatus::Rejected;
        let client_order_id = order.client_order_id.clone();
        index.insert(order);
        events.push(OrderEvent::OrderRejected {
            client_order_id,
            reason,
        });
    }

    /// True if the order, given current position exposure, would only
    /// reduce (never flip or increase) the position on its instrument.
    fn reduces_position(order: &Order, position_cache: &dyn PositionCache) -> bool {
        let position_id = position_cache.open_position_for_instrument(&order.instrument_id);
        let Some(position) = position_id.and_then(|id| position_cache.position(&id)) else {
            return false;
        };
        let signed = position.signed_quantity();
        match order.side {
            OrderSide::Buy => signed < 0.0,
            OrderSide::Sell => signed > 0.0,
        }
    }

    pub fn modify(
        client_order_id: &ClientOrderId,
        quantity: Option<f64>,
        price: Option<f64>,
        trigger_price: Option<f64>,
        index: &mut OrderIndex,
        book: Option<&dyn BookView>,
        events: &mut dyn EventSink,
    ) {
        let Some(order) = index.get(client_order_id) else {
            events.push(OrderEvent::OrderModifyRejected {
                client_order_id: client_order_id.clone(),
                reason: RejectReason::Other("unknown order".to_string()),
            });
            return;
        };

        if !order.status.is_working() {
            events.push(OrderEvent::OrderModifyRejected {
                client_order_id: client_order_id.clone(),
                reason: RejectReason::Other(format!("order not working: {:?}", order.status)),
            });
            return;
        }

        if order.is_post_only {
            let new_price = price.or_else(|| order.order_type.limit_price());
            if let (Some(px), Some(book)) = (new_price, book) {
                if Self::would_take(order.side, px, book) {
                    events.push(OrderEvent::OrderModifyRejected {
                        client_order_id: client_order_id.clone(),
                        reason: RejectReason::PostOnlyWouldTake,
                    });
                    return;
                }
            }
        }

        events.push(OrderEvent::OrderPendingUpdate {
            client_order_id: client_order_id.clone(),
        });

        let order = index.get_mut(client_order_id).expect("checked above");
        let (instrument_id, side) = (order.instrument_id.clone(), order.side);
        if let Some(qty) = quantity {
            order.quantity = qty;
        }
        if let Some(px) = price {
            order.order_type = match order.order_type {
                crate::domain::OrderType::Limit { .. } => crate::domain::OrderType::Limit { price: px },
                crate::domain::OrderType::StopLimit { trigger, .. } => {
                    crate::domain::OrderType::StopLimit { trigger, price: px }
                }
                other => other,
            };
        }
        if let Some(trigger) = trigger_price {
            order.order_type = match order.order_type {
                crate::domain::OrderType::StopMarket { .. } => {
                    crate::domain::OrderType::StopMarket { trigger }
                }
                crate::domain::OrderType::StopLimit { price, .. } => {
                    crate::domain::OrderType::StopLimit { trigger, price }
                }
                other => other,
            };
        }
        order.status = OrderStatus::Accepted;
        let (quantity, order_price, order_trigger) = (order.quantity, order.order_type.limit_price(), order.order_type.trigger_price());

        if price.is_some() || trigger_price.is_some() {
            index.resort(&instrument_id, side);
        }

        events.push(OrderEvent::OrderUpdated {
            client_order_id: client_order_id.clone(),
            quantity,
            price: order_price,
            trigger_price: order_trigger,
        });
    }

    fn would_take(side: OrderSide, price: f64, book: &dyn BookView) -> bool {
        match side {
            OrderSide::Buy => book.best_ask().is_some_and(|ask| price >= ask),
            OrderSide::Sell => book.best_bid().is_some_and(|bid| price <= bid),
        }
    }

    pub fn cancel(client_order_id: &ClientOrderId, index: &mut OrderIndex, events: &mut dyn EventSink) {
        let Some(order) = index.get(client_order_id) else {
            events.push(OrderEvent::OrderCancelRejected {
                client_order_id: client_order_id.clone(),
                reason: RejectReason::Other("unknown order".to_string()),
            });
            return;
        };

        if order.status.is_terminal() {
            events.push(OrderEvent::OrderCancelRejected {
                client_order_id: client_order_id.clone(),
                reason: RejectReason::Other(format!("already terminal: {:?}", order.status)),
            });
            return;
        }

        events.push(OrderEvent::OrderPendingCancel {
            client_order_id: client_order_id.clone(),
        });

        let order = index.get_mut(client_order_id).expect("checked above");
        order.status = OrderStatus::Canceled;

        events.push(OrderEvent::OrderCanceled {
            client_order_id: client_order_id.clone(),
        });
    }

    /// Expire every working, non-GTC order whose `expire_time_ns` has passed.
    pub fn expire_due(now_ns: u64, index: &mut OrderIndex, events: &mut dyn EventSink) {
        let due: Vec<ClientOrderId> = index
            .all_orders()
            .filter(|o| o.status.is_working() && o.is_expired(now_ns))
            .map(|o| o.client_order_id.clone())
            .collect();

        for cid in due {
            if let Some(order) = index.get_mut(&cid) {
                order.status = OrderStatus::Expired;
            }
            events.push(OrderEvent::OrderExpired { client_order_id: cid });
        }
    }
}
