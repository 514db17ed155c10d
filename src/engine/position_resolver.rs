//! Resolves which venue position a fill belongs to, per OMS type (spec §4.7).
//!
//! Under HEDGING every order gets its own position (one-to-one); under
//! NETTING all fills on an instrument net into the single position currently
//! open for it, created lazily on the first fill.

use crate::domain::{
    ClientOrderId, IdGen, InstrumentId, OrderSide, Position, PositionCache, PositionSide,
    VenuePositionId,
};
use crate::engine::config::OmsType;
use std::collections::HashMap;

/// Mutation surface a position resolver needs beyond the read-only
/// `PositionCache` contract. A real execution client applies `OrderFilled`
/// events to its own store instead; this is the in-memory stand-in used when
/// this crate runs standalone (spec §10.1).
pub trait PositionCacheMut: PositionCache {
    fn upsert(&mut self, position: Position);
    fn bind_order(&mut self, client_order_id: ClientOrderId, position_id: VenuePositionId);
    fn bind_instrument(&mut self, instrument_id: InstrumentId, position_id: VenuePositionId);
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryPositionCache {
    positions: HashMap<VenuePositionId, Position>,
    order_to_position: HashMap<ClientOrderId, VenuePositionId>,
    instrument_to_position: HashMap<InstrumentId, VenuePositionId>,
}

impl PositionCache for InMemoryPositionCache {
    fn position_id_for_order(&self, client_order_id: &ClientOrderId) -> Option<VenuePositionId> {
        self.order_to_position.get(client_order_id).cloned()
    }

    fn open_position_for_instrument(&self, instrument_id: &InstrumentId) -> Option<VenuePositionId> {
        self.instrument_to_position.get(instrument_id).cloned()
    }

    fn position(&self, id: &VenuePositionId) -> Option<&Position> {
        self.positions.get(id)
    }
}

impl PositionCacheMut for InMemoryPositionCache {
    fn upsert(&mut self, position: Position) {
        if position.is_flat() {
            self.instrument_to_position.remove(&position.instrument_id);
        } else {
            self.instrument_to_position
                .insert(position.instrument_id.clone(), position.id.clone());
        }
        self.positions.insert(position.id.clone(), position);
    }

    fn bind_order(&mut self, client_order_id: ClientOrderId, position_id: VenuePositionId) {
        self.order_to_position.insert(client_order_id, position_id);
    }

    fn bind_instrument(&mut self, instrument_id: InstrumentId, position_id: VenuePositionId) {
        self.instrument_to_position.insert(instrument_id, position_id);
    }
}

pub struct PositionResolver<C: PositionCacheMut = InMemoryPositionCache> {
    cache: C,
}

impl<C: PositionCacheMut> PositionResolver<C> {
    pub fn new(cache: C) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut C {
        &mut self.cache
    }

    /// Resolve (assigning a fresh position id on first use) the position a
    /// fill of `qty` for `client_order_id` on `side` should be applied to.
    pub fn resolve(
        &mut self,
        client_order_id: &ClientOrderId,
        _strategy_id: &crate::domain::StrategyId,
        instrument_id: &InstrumentId,
        side: OrderSide,
        qty: f64,
        oms_type: OmsType,
        id_gen: &mut IdGen,
    ) -> VenuePositionId {
        let existing = match oms_type {
            OmsType::Hedging => self.cache.position_id_for_order(client_order_id),
            OmsType::Netting => self.cache.open_position_for_instrument(instrument_id),
        };

        let position_id = existing.unwrap_or_else(|| id_gen.next_venue_position_id(instrument_id));

        if oms_type == OmsType::Hedging {
            self.cache.bind_order(client_order_id.clone(), position_id.clone());
        }

        let existing_position = self.cache.position(&position_id).cloned();
        let updated = Self::apply_side(existing_position, position_id.clone(), instrument_id.clone(), side, qty);
        self.cache.upsert(updated);

        position_id
    }

    fn apply_side(
        existing: Option<Position>,
        id: VenuePositionId,
        instrument_id: InstrumentId,
        side: OrderSide,
        qty: f64,
    ) -> Position {
        let signed_delta = match side {
            OrderSide::Buy => qty,
            OrderSide::Sell => -qty,
        };
        match existing {
            None => Position {
                id,
                instrument_id,
                side: if signed_delta > 0.0 { PositionSide::Long } else { PositionSide::Short },
                quantity: signed_delta.abs(),
            },
            Some(mut pos) => {
                let current_signed = pos.signed_quantity() + signed_delta;
                pos.quantity = current_signed.abs();
                pos.side = if current_signed > 1e-9 {
                    PositionSide::Long
                } else if current_signed < -1e-9 {
                    PositionSide::Short
                } else {
                    PositionSide::Flat
                };
                pos
            }
        }
    }
}
