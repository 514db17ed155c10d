//! Matching: walks working orders against a `BookView` and turns crossed
//! quantity into fills.
//!
//! Per spec §4.6, each matching pass snapshots the working-order set for an
//! instrument before mutating any of them, so a fill applied to order A
//! cannot change which orders B or C see as "currently working" in the same
//! pass. The segment-filling logic (`walk_and_fill`) is shared with
//! `OrderStateMachine::submit`'s submission-time marketable-order path, so
//! reduce-only clipping and position/account bookkeeping only exist once.

use crate::book::BookView;
use crate::domain::{
    AccountCache, ClientOrderId, EventSink, IdGen, Instrument, LiquiditySide, Order, OrderEvent,
    OrderSide, OrderStatus, OrderType,
};
use crate::engine::account_adapter::AccountAdapter;
use crate::engine::config::{EngineConfig, OmsType};
use crate::engine::fill_model::FillModel;
use crate::engine::order_index::OrderIndex;
use crate::engine::position_resolver::{PositionCacheMut, PositionResolver};

pub struct MatchingEngine;

impl MatchingEngine {
    /// Run one matching pass for a single instrument's working orders.
    #[allow(clippy::too_many_arguments)]
    pub fn process_instrument<A: AccountCache, P: PositionCacheMut>(
        instrument: &Instrument,
        book: &dyn BookView,
        index: &mut OrderIndex,
        fill_model: &mut FillModel,
        id_gen: &mut IdGen,
        position_resolver: &mut PositionResolver<P>,
        account_adapter: &mut AccountAdapter<A>,
        config: &EngineConfig,
        events: &mut dyn EventSink,
    ) {
        let working = index.working_order_ids(&instrument.id);

        for cid in working {
            let Some(order) = index.get(&cid) else { continue };
            if order.order_type.requires_trigger() && !order.is_triggered {
                if Self::trigger_crossed(order, book) {
                    if fill_model.is_stop_filled() {
                        let order = index.get_mut(&cid).expect("present");
                        order.is_triggered = true;
                        order.status = OrderStatus::Triggered;
                        events.push(OrderEvent::OrderTriggered {
                            client_order_id: cid.clone(),
                        });
                    } else {
                        continue;
                    }
                } else {
                    continue;
                }
            }

            let order = index.get(&cid).expect("present");
            // An order reached here because it's already resting on the
            // book (it's in `working_order_ids`), so any fill found in this
            // loop is always Maker liquidity for Limit/StopLimit, Taker for
            // Market/StopMarket — regardless of how the order got here.
            // Initial-submission crossing fills are a distinct path, handled
            // by `OrderStateMachine::submit` and classified Taker there
            // (spec §4.5, §4.6, §8 Scenario 1).
            let (limit_price, liquidity_side) = match order.order_type {
                OrderType::Market => (None, LiquiditySide::Taker),
                OrderType::Limit { price } => (Some(price), LiquiditySide::Maker),
                OrderType::StopMarket { .. } => (None, LiquiditySide::Taker),
                OrderType::StopLimit { price, .. } => (Some(price), LiquiditySide::Maker),
            };

            if matches!(order.order_type, OrderType::Limit { .. } | OrderType::StopLimit { .. })
                && !fill_model.is_limit_filled()
            {
                continue;
            }

            let leaves = order.leaves_qty();
            if leaves <= 1e-12 {
                continue;
            }
            let side = order.side;
            let walk = book.simulate_fills(side, limit_price, leaves);
            if walk.is_empty() {
                continue;
            }

            Self::walk_and_fill(
                &cid,
                side,
                liquidity_side,
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

    /// Apply a pre-computed book walk to `cid`, one (price, qty) segment at a
    /// time: clip a reduce-only order to remaining exposure, slip and round
    /// the price, record the fill, resolve the venue position, account for
    /// commission, and emit the corresponding events. Shared between resting
    /// matching (`process_instrument`) and submission-time marketable fills
    /// (`OrderStateMachine::submit`), so both paths apply the exact same
    /// reduce-only and bookkeeping rules (spec §4.6).
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn walk_and_fill<A: AccountCache, P: PositionCacheMut>(
        cid: &ClientOrderId,
        side: OrderSide,
        liquidity_side: LiquiditySide,
        walk: Vec<(f64, f64)>,
        instrument: &Instrument,
        fill_model: &mut FillModel,
        index: &mut OrderIndex,
        id_gen: &mut IdGen,
        position_resolver: &mut PositionResolver<P>,
        account_adapter: &mut AccountAdapter<A>,
        config: &EngineConfig,
        events: &mut dyn EventSink,
    ) {
        for (mut price, mut qty) in walk {
            if qty <= 1e-12 {
                continue;
            }

            let order = index.get(cid).expect("present");
            if order.is_reduce_only {
                let reducible = Self::reducible_quantity(order, position_resolver.cache(), config.oms_type);
                if order.leaves_qty() > reducible + 1e-9 {
                    let order = index.get_mut(cid).expect("present");
                    order.clip_quantity(reducible);
                    events.push(OrderEvent::OrderUpdated {
                        client_order_id: cid.clone(),
                        quantity: order.quantity,
                        price: order.order_type.limit_price(),
                        trigger_price: order.order_type.trigger_price(),
                    });
                }
            }

            let order = index.get(cid).expect("present");
            let leaves = order.leaves_qty();
            if leaves <= 1e-12 {
                // Reduce-only clip left nothing to fill; no more position to
                // close, so the rest of this walk is moot.
                break;
            }
            qty = qty.min(leaves);

            if fill_model.is_slipped() {
                price = Self::slip(price, side, instrument);
            }
            price = instrument.round_to_increment(price);

            let order = index.get_mut(cid).expect("present");
            order.apply_fill(qty);
            let new_status = order.status;
            let venue_order_id = order.venue_order_id.clone().expect("accepted order has venue id");
            let instrument_id = order.instrument_id.clone();
            let strategy_id = order.strategy_id.clone();

            let venue_position_id = position_resolver.resolve(
                cid,
                &strategy_id,
                &instrument_id,
                side,
                qty,
                config.oms_type,
                id_gen,
            );
            {
                let order = index.get_mut(cid).expect("present");
                order.venue_position_id = Some(venue_position_id.clone());
            }

            let commission = account_adapter.calculate_commission(qty, price, liquidity_side);
            account_adapter.adjust_account(side, qty, price, commission);

            let execution_id = id_gen.next_execution_id();
            events.push(OrderEvent::OrderFilled {
                client_order_id: cid.clone(),
                venue_order_id,
                venue_position_id,
                execution_id,
                instrument_id,
                last_qty: qty,
                last_px: price,
                commission,
                liquidity_side,
            });

            if new_status == OrderStatus::Filled {
                break;
            }
        }
    }

    /// How much of `order`'s side could still reduce (not flip or increase)
    /// the position it would fill against, per the OMS type's position
    /// lookup (spec §4.6's reduce-only fill-time clip).
    pub(crate) fn reducible_quantity<P: PositionCacheMut>(order: &Order, cache: &P, oms_type: OmsType) -> f64 {
        use crate::domain::PositionCache;
        let position_id = match oms_type {
            OmsType::Hedging => cache.position_id_for_order(&order.client_order_id),
            OmsType::Netting => cache.open_position_for_instrument(&order.instrument_id),
        };
        let Some(position) = position_id.and_then(|id| cache.position(&id)) else {
            return 0.0;
        };
        let signed = position.signed_quantity();
        match order.side {
            OrderSide::Buy => (-signed).max(0.0),
            OrderSide::Sell => signed.max(0.0),
        }
    }

    fn trigger_crossed(order: &Order, book: &dyn BookView) -> bool {
        let trigger = match order.order_type.trigger_price() {
            Some(t) => t,
            None => return false,
        };
        match order.side {
            OrderSide::Buy => book.best_ask().is_some_and(|ask| ask >= trigger),
            OrderSide::Sell => book.best_bid().is_some_and(|bid| bid <= trigger),
        }
    }

    /// Worsen a nominal fill price by one tick in the adverse direction.
    fn slip(price: f64, side: OrderSide, instrument: &Instrument) -> f64 {
        match side {
            OrderSide::Buy => price + instrument.tick_size,
            OrderSide::Sell => price - instrument.tick_size,
        }
    }
}
