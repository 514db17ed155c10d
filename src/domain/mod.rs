//! Domain value types: ids, instruments, orders, positions, accounts, events.

pub mod account;
pub mod events;
pub mod ids;
pub mod instrument;
pub mod order;
pub mod position;

pub use account::{AccountCache, AccountState, AccountType, Balance, CommissionSchedule, InMemoryAccountCache, Money};
pub use events::{EventSink, OrderEvent, RejectReason};
pub use ids::{ClientOrderId, ExecutionId, IdGen, InstrumentId, OcoGroupId, StrategyId, VenueOrderId, VenuePositionId};
pub use instrument::Instrument;
pub use order::{Contingency, LiquiditySide, Order, OrderSide, OrderStatus, OrderType};
pub use position::{Position, PositionCache, PositionSide};
