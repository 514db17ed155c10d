//! Position — a read-only (to this crate) venue position, queried by id.

use super::ids::{InstrumentId, VenuePositionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
    Flat,
}

/// An open (or just-closed) position. Owned by the external position cache;
/// mutated only indirectly, by the execution client applying this crate's
/// emitted `OrderFilled` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: VenuePositionId,
    pub instrument_id: InstrumentId,
    pub side: PositionSide,
    pub quantity: f64,
}

impl Position {
    pub fn is_flat(&self) -> bool {
        self.side == PositionSide::Flat || self.quantity == 0.0
    }

    /// Signed quantity: positive for Long, negative for Short, 0 for Flat.
    pub fn signed_quantity(&self) -> f64 {
        match self.side {
            PositionSide::Long => self.quantity,
            PositionSide::Short => -self.quantity,
            PositionSide::Flat => 0.0,
        }
    }
}

/// Read-only contract for looking up positions, implemented by the external
/// execution client (spec §3: "Positions are owned by the external cache").
pub trait PositionCache {
    /// The currently open position id for this client order's strategy +
    /// instrument under HEDGING, if one has already been assigned to it.
    fn position_id_for_order(&self, client_order_id: &super::ids::ClientOrderId) -> Option<VenuePositionId>;

    /// The single open position for an instrument under NETTING, if any.
    fn open_position_for_instrument(&self, instrument_id: &InstrumentId) -> Option<VenuePositionId>;

    fn position(&self, id: &VenuePositionId) -> Option<&Position>;
}
