//! Order storage and per-instrument working-order lookup.
//!
//! Mirrors the teacher's id-keyed `HashMap` order book rather than a graph of
//! cyclic references: orders reference each other (parent/child, OCO
//! siblings) only by `ClientOrderId`, resolved back through this index.
//!
//! Per instrument, working orders are kept on two side lists — `bids[]`
//! (Buy side, sorted strictly non-increasing by price) and `asks[]` (Sell
//! side, non-decreasing) — per spec §3's data model and Testable Property 3.

use crate::domain::{ClientOrderId, InstrumentId, Order, OrderSide};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct OrderIndex {
    orders: HashMap<ClientOrderId, Order>,
    bids: HashMap<InstrumentId, Vec<ClientOrderId>>,
    asks: HashMap<InstrumentId, Vec<ClientOrderId>>,
}

impl OrderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or re-insert, on a price-changing modify) an order, keeping
    /// its side list sorted.
    pub fn insert(&mut self, order: Order) {
        let cid = order.client_order_id.clone();
        let instrument_id = order.instrument_id.clone();
        let side = order.side;
        self.orders.insert(cid.clone(), order);

        let list = Self::side_list_mut(&mut self.bids, &mut self.asks, &instrument_id, side);
        if !list.contains(&cid) {
            list.push(cid);
        }
        self.resort_side(&instrument_id, side);
    }

    /// Re-sort an instrument's side list after a price-changing mutation
    /// (e.g. a modify that changes a resting order's limit/trigger price).
    pub fn resort(&mut self, instrument_id: &InstrumentId, side: OrderSide) {
        self.resort_side(instrument_id, side);
    }

    fn side_list_mut<'a>(
        bids: &'a mut HashMap<InstrumentId, Vec<ClientOrderId>>,
        asks: &'a mut HashMap<InstrumentId, Vec<ClientOrderId>>,
        instrument_id: &InstrumentId,
        side: OrderSide,
    ) -> &'a mut Vec<ClientOrderId> {
        match side {
            OrderSide::Buy => bids.entry(instrument_id.clone()).or_default(),
            OrderSide::Sell => asks.entry(instrument_id.clone()).or_default(),
        }
    }

    fn resort_side(&mut self, instrument_id: &InstrumentId, side: OrderSide) {
        let orders = &self.orders;
        let key_of = |cid: &ClientOrderId| orders.get(cid).map(|o| o.sort_key()).unwrap_or(0.0);
        match side {
            OrderSide::Buy => {
                if let Some(list) = self.bids.get_mut(instrument_id) {
                    list.sort_by(|a, b| {
                        key_of(b).partial_cmp(&key_of(a)).unwrap_or(Ordering::Equal)
                    });
                }
            }
            OrderSide::Sell => {
                if let Some(list) = self.asks.get_mut(instrument_id) {
                    list.sort_by(|a, b| {
                        key_of(a).partial_cmp(&key_of(b)).unwrap_or(Ordering::Equal)
                    });
                }
            }
        }
    }

    pub fn get(&self, cid: &ClientOrderId) -> Option<&Order> {
        self.orders.get(cid)
    }

    pub fn get_mut(&mut self, cid: &ClientOrderId) -> Option<&mut Order> {
        self.orders.get_mut(cid)
    }

    pub fn contains(&self, cid: &ClientOrderId) -> bool {
        self.orders.contains_key(cid)
    }

    /// The Buy-side working-order list for an instrument, sorted strictly
    /// non-increasing by price (spec §3, Testable Property 3).
    pub fn bids(&self, instrument_id: &InstrumentId) -> &[ClientOrderId] {
        self.bids.get(instrument_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The Sell-side working-order list for an instrument, sorted
    /// non-decreasing by price.
    pub fn asks(&self, instrument_id: &InstrumentId) -> &[ClientOrderId] {
        self.asks.get(instrument_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All client-order-ids resting on `instrument_id`: the bid side
    /// snapshot followed by the ask side snapshot (spec §4.6's iteration
    /// order). A snapshot: callers collect this before mutating individual
    /// orders during a matching pass, so fills applied mid-pass can't
    /// perturb the set being walked.
    pub fn instrument_order_ids(&self, instrument_id: &InstrumentId) -> Vec<ClientOrderId> {
        self.bids(instrument_id)
            .iter()
            .chain(self.asks(instrument_id).iter())
            .cloned()
            .collect()
    }

    /// Working orders (is_working() == true) resting on an instrument,
    /// snapshotted by client-order-id for the matching pass to iterate.
    pub fn working_order_ids(&self, instrument_id: &InstrumentId) -> Vec<ClientOrderId> {
        self.instrument_order_ids(instrument_id)
            .into_iter()
            .filter(|cid| {
                self.orders
                    .get(cid)
                    .map(|o| o.status.is_working())
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn all_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub fn remove(&mut self, cid: &ClientOrderId) -> Option<Order> {
        let order = self.orders.remove(cid)?;
        let list = match order.side {
            OrderSide::Buy => self.bids.get_mut(&order.instrument_id),
            OrderSide::Sell => self.asks.get_mut(&order.instrument_id),
        };
        if let Some(list) = list {
            list.retain(|id| id != cid);
        }
        Some(order)
    }

    pub fn clear(&mut self) {
        self.orders.clear();
        self.bids.clear();
        self.asks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderStatus, OrderType, StrategyId};

    fn order(cid: &str, instrument: &str, side: OrderSide, price: f64) -> Order {
        Order::new(
            ClientOrderId::from(cid),
            StrategyId::from("s-1"),
            InstrumentId::from(instrument),
            side,
            OrderType::Limit { price },
            1.0,
        )
    }

    #[test]
    fn insert_and_get() {
        let mut idx = OrderIndex::new();
        idx.insert(order("a", "SPY", OrderSide::Buy, 100.0));
        assert!(idx.get(&ClientOrderId::from("a")).is_some());
    }

    #[test]
    fn instrument_order_ids_scoped_per_instrument() {
        let mut idx = OrderIndex::new();
        idx.insert(order("a", "SPY", OrderSide::Buy, 100.0));
        idx.insert(order("b", "QQQ", OrderSide::Buy, 50.0));
        let spy_ids = idx.instrument_order_ids(&InstrumentId::from("SPY"));
        assert_eq!(spy_ids, vec![ClientOrderId::from("a")]);
    }

    #[test]
    fn working_order_ids_filters_by_status() {
        let mut idx = OrderIndex::new();
        let mut o = order("a", "SPY", OrderSide::Buy, 100.0);
        o.status = OrderStatus::Accepted;
        idx.insert(o);
        idx.insert(order("b", "SPY", OrderSide::Buy, 99.0)); // stays Initialized, not working
        let working = idx.working_order_ids(&InstrumentId::from("SPY"));
        assert_eq!(working, vec![ClientOrderId::from("a")]);
    }

    #[test]
    fn remove_cleans_up_instrument_index() {
        let mut idx = OrderIndex::new();
        idx.insert(order("a", "SPY", OrderSide::Buy, 100.0));
        idx.remove(&ClientOrderId::from("a"));
        assert!(idx.instrument_order_ids(&InstrumentId::from("SPY")).is_empty());
        assert!(idx.get(&ClientOrderId::from("a")).is_none());
    }

    #[test]
    fn bids_sort_strictly_non_increasing() {
        let mut idx = OrderIndex::new();
        let spy = InstrumentId::from("SPY");
        idx.insert(order("a", "SPY", OrderSide::Buy, 99.0));
        idx.insert(order("b", "SPY", OrderSide::Buy, 101.0));
        idx.insert(order("c", "SPY", OrderSide::Buy, 100.0));
        assert_eq!(
            idx.bids(&spy),
            &[ClientOrderId::from("b"), ClientOrderId::from("c"), ClientOrderId::from("a")]
        );
    }

    #[test]
    fn asks_sort_non_decreasing() {
        let mut idx = OrderIndex::new();
        let spy = InstrumentId::from("SPY");
        idx.insert(order("a", "SPY", OrderSide::Sell, 102.0));
        idx.insert(order("b", "SPY", OrderSide::Sell, 100.0));
        idx.insert(order("c", "SPY", OrderSide::Sell, 101.0));
        assert_eq!(
            idx.asks(&spy),
            &[ClientOrderId::from("b"), ClientOrderId::from("c"), ClientOrderId::from("a")]
        );
    }

    #[test]
    fn resort_after_price_change_keeps_invariant() {
        let mut idx = OrderIndex::new();
        let spy = InstrumentId::from("SPY");
        idx.insert(order("a", "SPY", OrderSide::Buy, 100.0));
        idx.insert(order("b", "SPY", OrderSide::Buy, 99.0));
        idx.get_mut(&ClientOrderId::from("b")).unwrap().order_type = OrderType::Limit { price: 105.0 };
        idx.resort(&spy, OrderSide::Buy);
        assert_eq!(idx.bids(&spy), &[ClientOrderId::from("b"), ClientOrderId::from("a")]);
    }
}
