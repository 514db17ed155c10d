//! OTO (one-triggers-other) activation and OCO (one-cancels-other) linkage.
//!
//! Child orders of an OTO parent are submitted alongside it but held
//! `Initialized` until the parent's first fill activates them; a parent
//! rejection propagates the rejection down to every child instead (spec §3
//! glossary, §8 scenarios).

use crate::domain::{ClientOrderId, Contingency, EventSink, IdGen, Order, OrderEvent, OrderStatus, RejectReason};
use crate::engine::order_index::OrderIndex;
use crate::engine::state_machine::OrderStateMachine;
use std::collections::HashSet;

pub struct ContingencyManager;

impl ContingencyManager {
    /// React to an event just emitted by submission or matching, cascading
    /// any OTO activation / OCO cancellation it implies. `seen` guards
    /// against reprocessing the same order twice within one cascade.
    pub fn on_event(event: &OrderEvent, index: &mut OrderIndex, id_gen: &mut IdGen, events: &mut dyn EventSink) {
        let mut seen = HashSet::new();
        Self::dispatch(event, index, id_gen, events, &mut seen);
    }

    fn dispatch(
        event: &OrderEvent,
        index: &mut OrderIndex,
        id_gen: &mut IdGen,
        events: &mut dyn EventSink,
        seen: &mut HashSet<ClientOrderId>,
    ) {
        match event {
            OrderEvent::OrderRejected { client_order_id, .. } => {
                Self::reject_children(client_order_id, index, events, seen);
            }
            OrderEvent::OrderFilled { client_order_id, .. } => {
                Self::activate_children_on_first_fill(client_order_id, index, id_gen, events, seen);
                Self::cancel_oco_siblings_if_closed(client_order_id, index, events, seen);
                Self::sync_oco_siblings_leaves_qty(client_order_id, index, events, seen);
            }
            _ => {}
        }
    }

    fn reject_children(
        parent_id: &ClientOrderId,
        index: &mut OrderIndex,
        events: &mut dyn EventSink,
        seen: &mut HashSet<ClientOrderId>,
    ) {
        if !seen.insert(parent_id.clone()) {
            return;
        }
        let Some(parent) = index.get(parent_id) else { return };
        let children: Vec<ClientOrderId> = parent.child_order_ids.clone();

        for child_id in children {
            let child = index.get_mut(&child_id).unwrap_or_else(|| {
                tracing::error!(%child_id, "OTO child missing from order index during rejection cascade");
                panic!("OTO child {child_id} referenced by parent {parent_id} is missing from the order index");
            });
            if child.status.is_terminal() {
                continue;
            }
            child.status = OrderStatus::Rejected;
            events.push(OrderEvent::OrderRejected {
                client_order_id: child_id.clone(),
                reason: RejectReason::ParentOrderRejected,
            });
            Self::reject_children(&child_id, index, events, seen);
        }
    }

    fn activate_children_on_first_fill(
        parent_id: &ClientOrderId,
        index: &mut OrderIndex,
        id_gen: &mut IdGen,
        events: &mut dyn EventSink,
        seen: &mut HashSet<ClientOrderId>,
    ) {
        let Some(parent) = index.get(parent_id) else { return };
        if parent.contingency != Contingency::Oto || parent.filled_qty != parent.quantity {
            // Only activate on the fill that fully closes the parent entry;
            // partial fills of the parent leave children pending.
            if parent.filled_qty != parent.quantity {
                return;
            }
        }
        let children: Vec<ClientOrderId> = parent.child_order_ids.clone();

        for child_id in children {
            if !seen.insert(child_id.clone()) {
                continue;
            }
            let child = index.get_mut(&child_id).unwrap_or_else(|| {
                tracing::error!(%child_id, "OTO child missing from order index during activation");
                panic!("OTO child {child_id} referenced by parent {parent_id} is missing from the order index");
            });
            if child.status != OrderStatus::Initialized {
                continue;
            }
            let venue_order_id = id_gen.next_venue_order_id(&child.instrument_id);
            child.venue_order_id = Some(venue_order_id.clone());
            child.status = OrderStatus::Accepted;
            events.push(OrderEvent::OrderAccepted {
                client_order_id: child_id,
                venue_order_id,
            });
        }
    }

    fn cancel_oco_siblings_if_closed(
        order_id: &ClientOrderId,
        index: &mut OrderIndex,
        events: &mut dyn EventSink,
        seen: &mut HashSet<ClientOrderId>,
    ) {
        let Some(order) = index.get(order_id) else { return };
        if order.contingency != Contingency::Oco || order.status != OrderStatus::Filled {
            return;
        }
        let siblings: Vec<ClientOrderId> = order.contingency_ids.clone();

        for sibling_id in siblings {
            if !seen.insert(sibling_id.clone()) {
                continue;
            }
            let sibling = index.get(&sibling_id).unwrap_or_else(|| {
                tracing::error!(%sibling_id, "OCO sibling missing from order index during cancellation cascade");
                panic!("OCO sibling {sibling_id} referenced by order {order_id} is missing from the order index");
            });
            if !sibling.status.is_terminal() {
                OrderStateMachine::cancel(&sibling_id, index, events);
            }
        }
    }

    /// On a partial (non-closing) fill of an OCO parent, propagate its new
    /// `leaves_qty` onto its still-active siblings, single-pass and
    /// non-cascading (spec §4.5 modify path, §4.6): a sibling's own fills
    /// don't re-trigger another sync of this order.
    fn sync_oco_siblings_leaves_qty(
        order_id: &ClientOrderId,
        index: &mut OrderIndex,
        events: &mut dyn EventSink,
        seen: &mut HashSet<ClientOrderId>,
    ) {
        let Some(order) = index.get(order_id) else { return };
        if order.contingency != Contingency::Oco || order.status != OrderStatus::PartiallyFilled {
            return;
        }
        let new_leaves = order.leaves_qty();
        let siblings: Vec<ClientOrderId> = order.contingency_ids.clone();

        for sibling_id in siblings {
            if !seen.insert(sibling_id.clone()) {
                continue;
            }
            let sibling = index.get_mut(&sibling_id).unwrap_or_else(|| {
                tracing::error!(%sibling_id, "OCO sibling missing from order index during leaves-qty sync");
                panic!("OCO sibling {sibling_id} referenced by order {order_id} is missing from the order index");
            });
            if sibling.status.is_terminal() {
                continue;
            }
            sibling.clip_quantity(new_leaves);
            events.push(OrderEvent::OrderUpdated {
                client_order_id: sibling_id,
                quantity: sibling.quantity,
                price: sibling.order_type.limit_price(),
                trigger_price: sibling.order_type.trigger_price(),
            });
        }
    }

    /// Link two orders as mutual OCO siblings, recorded on both sides.
    pub fn link_oco(a: &mut Order, b: &mut Order) {
        a.contingency = Contingency::Oco;
        b.contingency = Contingency::Oco;
        a.contingency_ids.push(b.client_order_id.clone());
        b.contingency_ids.push(a.client_order_id.clone());
    }

    /// Link a child order under an OTO parent.
    pub fn link_oto(parent: &mut Order, child: &mut Order) {
        parent.contingency = Contingency::Oto;
        parent.child_order_ids.push(child.client_order_id.clone());
        child.parent_order_id = Some(parent.client_order_id.clone());
    }
}
