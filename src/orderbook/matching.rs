//! The cross-matching loop.
//!
//! Runs after every successful insertion. The outer loop re-reads the
//! best quote on each side and stops once a side is empty or the book is
//! no longer crossed; the inner loop consumes the two top levels
//! head-to-head, so price priority comes from the index ordering and time
//! priority from the queue order. Between outer iterations any
//! fill-and-kill order stranded at the head of a top-of-book level is
//! dropped, and the cross is re-tested in case that exposed a new match.
//!
//! On return, best bid < best ask whenever both sides are non-empty.

use std::cmp::Reverse;

use tracing::trace;

use super::book::OrderBook;
use super::level::PriceLevel;
use crate::types::{OrderId, OrderType, Price, Quantity, Side, Trade, TradeInfo};

impl OrderBook {
    /// Whether an order at `price` on `side` could trade immediately.
    pub(super) fn can_match(&self, side: Side, price: Price) -> bool {
        match side {
            Side::Buy => self.best_ask().is_some_and(|best_ask| price >= best_ask),
            Side::Sell => self.best_bid().is_some_and(|best_bid| price <= best_bid),
        }
    }

    pub(super) fn match_orders(&mut self) -> Vec<Trade> {
        let mut trades = Vec::new();

        loop {
            let (Some(bid_price), Some(ask_price)) = (self.best_bid(), self.best_ask()) else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            // Consume the two top levels head-to-head until one drains
            // and its emptied level is erased.
            loop {
                let Some(bid_key) = self.bids.get(&Reverse(bid_price)).and_then(PriceLevel::front)
                else {
                    break;
                };
                let Some(ask_key) = self.asks.get(&ask_price).and_then(PriceLevel::front) else {
                    break;
                };

                let quantity = self.arena[bid_key]
                    .remaining()
                    .min(self.arena[ask_key].remaining());

                let bid_half = self.fill_resting(bid_key, quantity);
                let ask_half = self.fill_resting(ask_key, quantity);

                trace!(
                    bid_id = bid_half.order_id,
                    ask_id = ask_half.order_id,
                    quantity,
                    "fill"
                );
                trades.push(Trade::new(bid_half, ask_half));
            }

            // A fill-and-kill stranded at the head of either top level
            // has no counterparty left at an acceptable price.
            if let Some(order_id) = self.stranded_fill_and_kill(Side::Buy) {
                self.cancel(order_id);
            }
            if let Some(order_id) = self.stranded_fill_and_kill(Side::Sell) {
                self.cancel(order_id);
            }
        }

        trades
    }

    /// Fill the resting order at `key` by `quantity` and return its half
    /// of the trade record. Fully filled orders leave the queue, the
    /// directory, and the arena; their level is erased if it emptied.
    fn fill_resting(&mut self, key: usize, quantity: Quantity) -> TradeInfo {
        let node = &mut self.arena[key];
        node.order.fill(quantity);
        let side = node.order.side();
        let half = TradeInfo {
            order_id: node.order_id(),
            price: node.price(),
            quantity,
        };

        if self.arena[key].order.is_filled() {
            self.directory.remove(&half.order_id);
            self.remove_resting(key);
        } else {
            match side {
                Side::Buy => self
                    .bids
                    .get_mut(&Reverse(half.price))
                    .expect("partially filled bid without a price level")
                    .reduce_quantity(quantity),
                Side::Sell => self
                    .asks
                    .get_mut(&half.price)
                    .expect("partially filled ask without a price level")
                    .reduce_quantity(quantity),
            }
        }

        half
    }

    /// Id of the fill-and-kill order at the head of `side`'s best level,
    /// if that is what rests there.
    fn stranded_fill_and_kill(&self, side: Side) -> Option<OrderId> {
        let key = match side {
            Side::Buy => self.bids.values().next()?.front()?,
            Side::Sell => self.asks.values().next()?.front()?,
        };
        let order = &self.arena[key].order;
        (order.order_type() == OrderType::FillAndKill).then_some(order.id())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
