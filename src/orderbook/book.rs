//! The order book: indices, directory, and the public contract.
//!
//! ## Structure
//!
//! Three structures that must stay mutually consistent under every
//! mutation:
//!
//! - **Arena** (`slab::Slab<OrderNode>`): owns every resting order. Keys
//!   are stable for the life of the slot, so a key is a valid cursor into
//!   the order's queue position no matter what happens elsewhere.
//! - **Bid / ask indices** (`BTreeMap`): price level queues, bids keyed
//!   by `Reverse(price)` so the first entry of either map is the best
//!   quote on that side. A level is erased the moment its queue empties.
//! - **Directory** (`HashMap<OrderId, usize>`): order id to arena key,
//!   giving O(1) cancel from anywhere in a queue.
//!
//! ## Rejections
//!
//! Invalid submissions (duplicate id, unmatchable fill-and-kill, market
//! order against an empty opposite side, zero quantity) return empty
//! trades and leave the book untouched; callers validate upstream and
//! treat empty-plus-absent as "not admitted".

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use slab::Slab;
use tracing::debug;

use super::level::PriceLevel;
use super::node::OrderNode;
use crate::types::{LevelInfo, Order, OrderId, OrderModify, OrderType, Price, Side, Snapshot, Trade};

/// A single-instrument limit order book with continuous matching.
///
/// # Example
///
/// ```
/// use matchbook::{Order, OrderBook, OrderType, Side};
///
/// let mut book = OrderBook::new();
/// book.add(Order::new(OrderType::GoodTillCancel, 1, Side::Buy, 100, 50));
/// let trades = book.add(Order::new(OrderType::GoodTillCancel, 2, Side::Sell, 100, 50));
///
/// assert_eq!(trades.len(), 1);
/// assert_eq!(trades[0].quantity(), 50);
/// assert!(book.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct OrderBook {
    /// Owns every resting order; keys double as directory cursors.
    pub(super) arena: Slab<OrderNode>,
    /// Buy side, best (highest) price first.
    pub(super) bids: BTreeMap<Reverse<Price>, PriceLevel>,
    /// Sell side, best (lowest) price first.
    pub(super) asks: BTreeMap<Price, PriceLevel>,
    /// Order id to arena key.
    pub(super) directory: HashMap<OrderId, usize>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate room for `order_capacity` resting orders.
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            arena: Slab::with_capacity(order_capacity),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            directory: HashMap::with_capacity(order_capacity),
        }
    }

    // ========================================================================
    // Public contract
    // ========================================================================

    /// Submit an order and return the trades it produced.
    ///
    /// Market orders are pegged to the best opposite quote (and become
    /// good-till-cancel) before insertion, or dropped when the opposite
    /// side is empty. Fill-and-kill orders that cannot match immediately
    /// are dropped. A duplicate id or zero quantity is silently rejected.
    pub fn add(&mut self, mut order: Order) -> Vec<Trade> {
        if self.directory.contains_key(&order.id()) {
            debug!(order_id = order.id(), "add rejected: duplicate order id");
            return Vec::new();
        }
        if order.remaining_quantity() == 0 {
            debug!(order_id = order.id(), "add rejected: zero quantity");
            return Vec::new();
        }

        if order.order_type() == OrderType::Market {
            let peg = match order.side() {
                Side::Buy => self.best_ask(),
                Side::Sell => self.best_bid(),
            };
            match peg {
                Some(price) => order.to_good_till_cancel(price),
                None => {
                    debug!(
                        order_id = order.id(),
                        "add rejected: market order with an empty opposite side"
                    );
                    return Vec::new();
                }
            }
        }

        if order.order_type() == OrderType::FillAndKill
            && !self.can_match(order.side(), order.price())
        {
            debug!(
                order_id = order.id(),
                "add rejected: fill-and-kill with nothing to match"
            );
            return Vec::new();
        }

        self.insert_resting(order);
        self.match_orders()
    }

    /// Cancel the order with `order_id`. Unknown ids are a no-op, so
    /// cancelling twice is safe.
    pub fn cancel(&mut self, order_id: OrderId) {
        let Some(key) = self.directory.remove(&order_id) else {
            return;
        };
        debug!(order_id, "cancel");
        self.remove_resting(key);
    }

    /// Replace the resting order named by the request, preserving its
    /// order type. The replacement joins the tail of its new level, so
    /// time priority is forfeited. Unknown ids return empty trades.
    pub fn modify(&mut self, request: OrderModify) -> Vec<Trade> {
        let Some(&key) = self.directory.get(&request.order_id) else {
            return Vec::new();
        };
        let order_type = self.arena[key].order.order_type();
        self.cancel(request.order_id);
        self.add(request.into_order(order_type))
    }

    /// Number of resting orders.
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Depth of both sides: bids descending, asks ascending, quantities
    /// aggregated over each level's resting remainder.
    pub fn snapshot(&self) -> Snapshot {
        let bids = self
            .bids
            .iter()
            .map(|(price, level)| LevelInfo {
                price: price.0,
                quantity: level.total_quantity(),
            })
            .collect();
        let asks = self
            .asks
            .iter()
            .map(|(&price, level)| LevelInfo {
                price,
                quantity: level.total_quantity(),
            })
            .collect();
        Snapshot::new(bids, asks)
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    /// Highest resting buy price.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next().map(|price| price.0)
    }

    /// Lowest resting sell price.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.directory.contains_key(&order_id)
    }

    /// The resting order with `order_id`, if any.
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        let key = *self.directory.get(&order_id)?;
        Some(&self.arena[key].order)
    }

    /// All resting orders, in no particular order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.arena.iter().map(|(_, node)| &node.order)
    }

    pub fn bid_level_count(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_level_count(&self) -> usize {
        self.asks.len()
    }

    // ========================================================================
    // Internals shared with the matching loop
    // ========================================================================

    /// Append `order` to the tail of its price queue and record it in the
    /// directory.
    fn insert_resting(&mut self, order: Order) {
        let id = order.id();
        let side = order.side();
        let price = order.price();

        let key = self.arena.insert(OrderNode::new(order));
        match side {
            Side::Buy => self
                .bids
                .entry(Reverse(price))
                .or_insert_with(|| PriceLevel::new(price))
                .append(key, &mut self.arena),
            Side::Sell => self
                .asks
                .entry(price)
                .or_insert_with(|| PriceLevel::new(price))
                .append(key, &mut self.arena),
        }
        self.directory.insert(id, key);
    }

    /// Unlink the node at `key` from its queue, erase the level if that
    /// emptied it, and free the arena slot. The caller has already
    /// removed the directory entry.
    pub(super) fn remove_resting(&mut self, key: usize) -> Order {
        let (side, price) = {
            let node = &self.arena[key];
            (node.order.side(), node.price())
        };

        match side {
            Side::Buy => {
                let level = self
                    .bids
                    .get_mut(&Reverse(price))
                    .expect("resting bid without a price level");
                level.unlink(key, &mut self.arena);
                if level.is_empty() {
                    self.bids.remove(&Reverse(price));
                }
            }
            Side::Sell => {
                let level = self
                    .asks
                    .get_mut(&price)
                    .expect("resting ask without a price level");
                level.unlink(key, &mut self.arena);
                if level.is_empty() {
                    self.asks.remove(&price);
                }
            }
        }

        self.arena.remove(key).order
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
