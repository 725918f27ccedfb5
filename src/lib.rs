//! # matchbook
//!
//! A single-instrument limit order book with a continuous matching
//! engine.
//!
//! ## Architecture
//!
//! - **Types**: orders, modify requests, trades, depth snapshots
//! - **OrderBook**: slab-arena storage, price-ordered level indices, an
//!   id directory for O(1) cancel, and the cross-matching loop
//! - **Replay**: the line-based action-script format used for preload
//!   and test replay
//!
//! ## Design principles
//!
//! 1. **Price-time priority**: best price first; within a price level,
//!    first arrival first. Insertion always appends, matching always
//!    consumes from the head.
//! 2. **Single ownership**: the book's arena owns every resting order;
//!    the indices and the directory hold arena keys, which stay valid
//!    under any other mutation.
//! 3. **Synchronous operations**: every public call runs to completion
//!    on the caller's thread; submitters serialise access themselves.
//!
//! ## Example
//!
//! ```
//! use matchbook::{Order, OrderBook, OrderType, Side};
//!
//! let mut book = OrderBook::new();
//!
//! book.add(Order::new(OrderType::GoodTillCancel, 1, Side::Buy, 100, 50));
//! let trades = book.add(Order::new(OrderType::GoodTillCancel, 2, Side::Sell, 100, 20));
//!
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].quantity(), 20);
//! assert_eq!(book.order(1).unwrap().remaining_quantity(), 30);
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core value types: orders, trades, snapshots.
pub mod types;

/// The order book and its matching loop.
pub mod orderbook;

/// Action-script parsing and replay.
pub mod replay;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use orderbook::OrderBook;
pub use types::{
    LevelInfo, Order, OrderId, OrderModify, OrderType, Price, Quantity, Side, Snapshot, Trade,
    TradeInfo, INVALID_PRICE,
};
