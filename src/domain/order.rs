//! Order — the tagged-variant order type and its lifecycle state.

use super::ids::{ClientOrderId, InstrumentId, OcoGroupId, StrategyId, VenueOrderId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// Which side of the trade provided or removed liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiquiditySide {
    Maker,
    Taker,
}

/// Order type and its price parameters, per spec §3: a tagged variant over
/// `{Market, Limit, StopMarket, StopLimit}` rather than a dynamic-dispatch
/// hierarchy (spec §9 redesign flag).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit { price: f64 },
    StopMarket { trigger: f64 },
    StopLimit { trigger: f64, price: f64 },
}

impl OrderType {
    pub fn limit_price(&self) -> Option<f64> {
        match self {
            OrderType::Limit { price } => Some(*price),
            OrderType::StopLimit { price, .. } => Some(*price),
            _ => None,
        }
    }

    pub fn trigger_price(&self) -> Option<f64> {
        match self {
            OrderType::StopMarket { trigger } => Some(*trigger),
            OrderType::StopLimit { trigger, .. } => Some(*trigger),
            _ => None,
        }
    }

    pub fn requires_trigger(&self) -> bool {
        matches!(self, OrderType::StopMarket { .. } | OrderType::StopLimit { .. })
    }

    /// Price to sort a working order's side list by (spec §3: bids
    /// non-increasing, asks non-decreasing). Limit/StopLimit sort on their
    /// limit price, StopMarket on its trigger; a bare Market order never
    /// rests long enough to matter and sorts as if at the worst price for
    /// its side so it never jumps the queue.
    pub fn sort_key(&self, side: OrderSide) -> f64 {
        match self.limit_price().or_else(|| self.trigger_price()) {
            Some(price) => price,
            None => match side {
                OrderSide::Buy => f64::NEG_INFINITY,
                OrderSide::Sell => f64::INFINITY,
            },
        }
    }
}

/// Order lifecycle states (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Initialized,
    Submitted,
    Accepted,
    PendingUpdate,
    PendingCancel,
    Rejected,
    Triggered,
    PartiallyFilled,
    Filled,
    Canceled,
    Expired,
}

impl OrderStatus {
    /// Orders in these states occupy a slot in `OrderIndex`'s working lists.
    pub fn is_working(self) -> bool {
        matches!(
            self,
            OrderStatus::Accepted | OrderStatus::PartiallyFilled | OrderStatus::Triggered
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Rejected
                | OrderStatus::Filled
                | OrderStatus::Canceled
                | OrderStatus::Expired
        )
    }
}

/// One-Triggers-Other / One-Cancels-Other linkage (spec §3, glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contingency {
    None,
    Oto,
    Oco,
}

/// An order, with full lifecycle and contingency-linkage tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub client_order_id: ClientOrderId,
    pub venue_order_id: Option<VenueOrderId>,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub side: OrderSide,
    pub order_type: OrderType,

    pub quantity: f64,
    pub filled_qty: f64,

    pub is_post_only: bool,
    pub is_reduce_only: bool,
    pub is_triggered: bool,
    /// 0 means GTC (good-til-canceled).
    pub expire_time_ns: u64,

    pub contingency: Contingency,
    pub parent_order_id: Option<ClientOrderId>,
    pub child_order_ids: Vec<ClientOrderId>,
    /// OCO sibling client-order-ids, populated when `contingency == Oco`.
    pub contingency_ids: Vec<ClientOrderId>,
    pub oco_group_id: Option<OcoGroupId>,

    pub status: OrderStatus,
    pub venue_position_id: Option<super::ids::VenuePositionId>,
}

impl Order {
    pub fn new(
        client_order_id: ClientOrderId,
        strategy_id: StrategyId,
        instrument_id: InstrumentId,
        side: OrderSide,
        order_type: OrderType,
        quantity: f64,
    ) -> Self {
        Self {
            client_order_id,
            venue_order_id: None,
            strategy_id,
            instrument_id,
            side,
            order_type,
            quantity,
            filled_qty: 0.0,
            is_post_only: false,
            is_reduce_only: false,
            is_triggered: false,
            expire_time_ns: 0,
            contingency: Contingency::None,
            parent_order_id: None,
            child_order_ids: Vec::new(),
            contingency_ids: Vec::new(),
            oco_group_id: None,
            status: OrderStatus::Initialized,
            venue_position_id: None,
        }
    }

    pub fn leaves_qty(&self) -> f64 {
        self.quantity - self.filled_qty
    }

    /// Price this order sorts its side's working-order list by.
    pub fn sort_key(&self) -> f64 {
        self.order_type.sort_key(self.side)
    }

    pub fn is_gtc(&self) -> bool {
        self.expire_time_ns == 0
    }

    pub fn is_expired(&self, now_ns: u64) -> bool {
        !self.is_gtc() && now_ns >= self.expire_time_ns
    }

    /// Record a (possibly partial) fill; caller is responsible for emitting
    /// the corresponding `OrderFilled` event and for keeping
    /// `filled_qty + leaves_qty == quantity` (spec §3 invariant).
    pub fn apply_fill(&mut self, qty: f64) {
        assert!(
            qty <= self.leaves_qty() + 1e-9,
            "fill qty {qty} exceeds leaves_qty {}",
            self.leaves_qty()
        );
        self.filled_qty += qty;
        if self.leaves_qty() <= 1e-9 {
            self.status = OrderStatus::Filled;
        } else {
            self.status = OrderStatus::PartiallyFilled;
        }
    }

    /// Clip `quantity` down to `filled_qty + new_leaves`, preserving the
    /// fill/leaves identity (used by reduce-only clipping, spec §4.6).
    pub fn clip_quantity(&mut self, new_leaves: f64) {
        self.quantity = self.filled_qty + new_leaves;
    }
}
