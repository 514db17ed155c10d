//! Outbound events — everything the engine reports back to its caller.
//!
//! Mirrors the inbound command side: one tagged enum, emitted in the order
//! produced, never dropped. The caller (execution client / backtest node)
//! is the `EventSink`; this crate never holds event history itself.

use super::ids::{ClientOrderId, ExecutionId, InstrumentId, VenueOrderId, VenuePositionId};
use super::order::LiquiditySide;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectReason {
    InsufficientBalance,
    ReduceOnlyWouldIncrease,
    PostOnlyWouldTake,
    ParentOrderRejected,
    StopTriggerInvalid,
    Frozen,
    Other(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderSubmitted {
        client_order_id: ClientOrderId,
    },
    OrderAccepted {
        client_order_id: ClientOrderId,
        venue_order_id: VenueOrderId,
    },
    OrderRejected {
        client_order_id: ClientOrderId,
        reason: RejectReason,
    },
    OrderPendingUpdate {
        client_order_id: ClientOrderId,
    },
    OrderPendingCancel {
        client_order_id: ClientOrderId,
    },
    OrderModifyRejected {
        client_order_id: ClientOrderId,
        reason: RejectReason,
    },
    OrderCancelRejected {
        client_order_id: ClientOrderId,
        reason: RejectReason,
    },
    OrderUpdated {
        client_order_id: ClientOrderId,
        quantity: f64,
        price: Option<f64>,
        trigger_price: Option<f64>,
    },
    OrderCanceled {
        client_order_id: ClientOrderId,
    },
    OrderTriggered {
        client_order_id: ClientOrderId,
    },
    OrderExpired {
        client_order_id: ClientOrderId,
    },
    OrderFilled {
        client_order_id: ClientOrderId,
        venue_order_id: VenueOrderId,
        venue_position_id: VenuePositionId,
        execution_id: ExecutionId,
        instrument_id: InstrumentId,
        last_qty: f64,
        last_px: f64,
        commission: f64,
        liquidity_side: LiquiditySide,
    },
}

impl OrderEvent {
    pub fn client_order_id(&self) -> &ClientOrderId {
        match self {
            OrderEvent::OrderSubmitted { client_order_id }
            | OrderEvent::OrderAccepted { client_order_id, .. }
            | OrderEvent::OrderRejected { client_order_id, .. }
            | OrderEvent::OrderPendingUpdate { client_order_id }
            | OrderEvent::OrderPendingCancel { client_order_id }
            | OrderEvent::OrderModifyRejected { client_order_id, .. }
            | OrderEvent::OrderCancelRejected { client_order_id, .. }
            | OrderEvent::OrderUpdated { client_order_id, .. }
            | OrderEvent::OrderCanceled { client_order_id }
            | OrderEvent::OrderTriggered { client_order_id }
            | OrderEvent::OrderExpired { client_order_id }
            | OrderEvent::OrderFilled { client_order_id, .. } => client_order_id,
        }
    }
}

/// Sink the engine pushes events into, in emission order. A `Vec<OrderEvent>`
/// satisfies this trivially; a real execution client implements its own to
/// forward events onto a bus.
pub trait EventSink {
    fn push(&mut self, event: OrderEvent);
}

impl EventSink for Vec<OrderEvent> {
    fn push(&mut self, event: OrderEvent) {
        Vec::push(self, event);
    }
}
