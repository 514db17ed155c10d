//! Inbound command queue: a strict FIFO of client intents, drained one at a
//! time by `Engine::process` so that ordering effects (e.g. an OCO cancel
//! racing a modify) are always reproducible (spec §4.2, §6).

use crate::domain::{ClientOrderId, Order};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub enum Command {
    SubmitOrder(Order),
    /// A linked list of orders submitted together (e.g. an OCO pair, or an
    /// OTO parent plus its children), applied in list order.
    SubmitOrderList(Vec<Order>),
    ModifyOrder {
        client_order_id: ClientOrderId,
        quantity: Option<f64>,
        price: Option<f64>,
        trigger_price: Option<f64>,
    },
    CancelOrder {
        client_order_id: ClientOrderId,
    },
}

#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    queue: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
