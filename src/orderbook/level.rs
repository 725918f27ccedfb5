//! One price level: a FIFO queue of resting orders.
//!
//! The queue is an intrusive doubly linked list threaded through the
//! order arena; this struct only holds the endpoints and the maintained
//! aggregates. New orders join at the tail, the matching loop consumes
//! from the head, and any order can be unlinked in O(1) given its arena
//! key.

use slab::Slab;

use super::node::OrderNode;
use crate::types::{Price, Quantity};

/// All resting orders at a single price on one side of the book.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Price,
    /// Sum of remaining quantity over the queue; kept in step with every
    /// append, unlink, and partial fill.
    total_quantity: Quantity,
    order_count: usize,
    head: Option<usize>,
    tail: Option<usize>,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            total_quantity: 0,
            order_count: 0,
            head: None,
            tail: None,
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    pub fn order_count(&self) -> usize {
        self.order_count
    }

    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Arena key of the oldest order, the next to match.
    pub fn front(&self) -> Option<usize> {
        self.head
    }

    /// Append the node at `key` to the tail of the queue.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not present in the arena.
    pub fn append(&mut self, key: usize, arena: &mut Slab<OrderNode>) {
        let node = arena.get_mut(key).expect("appended key not in the arena");
        let quantity = node.remaining();
        node.prev = self.tail;
        node.next = None;

        match self.tail {
            Some(tail_key) => {
                arena
                    .get_mut(tail_key)
                    .expect("level tail not in the arena")
                    .next = Some(key);
            }
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.total_quantity += quantity;
    }

    /// Splice the node at `key` out of the queue, wherever it sits, and
    /// return its remaining quantity.
    ///
    /// # Panics
    ///
    /// Panics if `key` (or a neighbour it links to) is not in the arena.
    pub fn unlink(&mut self, key: usize, arena: &mut Slab<OrderNode>) -> Quantity {
        let node = arena.get(key).expect("unlinked key not in the arena");
        let quantity = node.remaining();
        let prev_key = node.prev;
        let next_key = node.next;

        match prev_key {
            Some(prev) => {
                arena
                    .get_mut(prev)
                    .expect("stale prev link in price level")
                    .next = next_key;
            }
            None => self.head = next_key,
        }

        match next_key {
            Some(next) => {
                arena
                    .get_mut(next)
                    .expect("stale next link in price level")
                    .prev = prev_key;
            }
            None => self.tail = prev_key,
        }

        let node = arena.get_mut(key).expect("unlinked key not in the arena");
        node.prev = None;
        node.next = None;

        self.order_count -= 1;
        self.total_quantity = self
            .total_quantity
            .checked_sub(quantity)
            .expect("price level quantity underflow");

        quantity
    }

    /// Account for a partial fill of an order still in the queue.
    pub fn reduce_quantity(&mut self, quantity: Quantity) {
        self.total_quantity = self
            .total_quantity
            .checked_sub(quantity)
            .expect("price level quantity underflow");
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
