//! Core value types.
//!
//! - [`Order`]: a resting or incoming order, with its time-in-force
//! - [`OrderModify`]: the cancel-then-re-enter request
//! - [`Trade`]: an executed match, recorded per participant
//! - [`Snapshot`] / [`LevelInfo`]: read-only depth aggregates

mod order;
mod snapshot;
mod trade;

pub use order::{
    Order, OrderId, OrderModify, OrderType, Price, Quantity, Side, INVALID_PRICE,
};
pub use snapshot::{LevelInfo, Snapshot};
pub use trade::{Trade, TradeInfo};
