//! Order value types.
//!
//! ## Prices and quantities
//!
//! Prices are signed tick counts. The only admissible negative price is
//! the [`INVALID_PRICE`] sentinel carried by a market order between
//! acceptance and pegging. Quantities are unsigned and strictly positive
//! at order creation; `remaining_quantity` only ever moves down, through
//! [`Order::fill`].
//!
//! ## Lifecycle
//!
//! An order is created by the submitter and mutated only by the book:
//! partial fills decrement the remainder, and a market order is re-priced
//! exactly once via [`Order::to_good_till_cancel`] when it is pegged to
//! the best opposite quote.

use std::fmt;

/// Price in tick units.
pub type Price = i64;

/// Quantity in lots.
pub type Quantity = u64;

/// Caller-supplied order identifier, unique across the order's lifetime.
pub type OrderId = u64;

/// Sentinel price carried by a market order before it is pegged.
pub const INVALID_PRICE: Price = -1;

// ============================================================================
// Side
// ============================================================================

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Buying interest (a bid).
    Buy,
    /// Selling interest (an ask).
    Sell,
}

impl Side {
    /// The side this order trades against.
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("Buy"),
            Side::Sell => f.write_str("Sell"),
        }
    }
}

// ============================================================================
// OrderType
// ============================================================================

/// Time-in-force semantics understood by the matching core.
///
/// The action-file format additionally names `GoodForDay` and
/// `FillOrKill`; those are rejected at the parse boundary and never reach
/// the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    /// Rest in the book until filled or cancelled.
    GoodTillCancel,
    /// Execute whatever can match immediately; discard the residue.
    FillAndKill,
    /// Buy or sell at the best available opposite quote. Carries
    /// [`INVALID_PRICE`] until the book pegs it, at which point it
    /// becomes [`OrderType::GoodTillCancel`].
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::GoodTillCancel => f.write_str("GoodTillCancel"),
            OrderType::FillAndKill => f.write_str("FillAndKill"),
            OrderType::Market => f.write_str("Market"),
        }
    }
}

// ============================================================================
// Order
// ============================================================================

/// A single order, resting or incoming.
///
/// # Example
///
/// ```
/// use matchbook::{Order, OrderType, Side};
///
/// let mut order = Order::new(OrderType::GoodTillCancel, 1, Side::Buy, 100, 50);
/// order.fill(20);
/// assert_eq!(order.remaining_quantity(), 30);
/// assert_eq!(order.filled_quantity(), 20);
/// assert!(!order.is_filled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    order_type: OrderType,
    id: OrderId,
    side: Side,
    price: Price,
    initial_quantity: Quantity,
    remaining_quantity: Quantity,
}

impl Order {
    /// Create a limit order.
    pub fn new(
        order_type: OrderType,
        id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            order_type,
            id,
            side,
            price,
            initial_quantity: quantity,
            remaining_quantity: quantity,
        }
    }

    /// Create a market order. It carries [`INVALID_PRICE`] until the book
    /// pegs it to the best opposite quote.
    pub fn market(id: OrderId, side: Side, quantity: Quantity) -> Self {
        Self::new(OrderType::Market, id, side, INVALID_PRICE, quantity)
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn initial_quantity(&self) -> Quantity {
        self.initial_quantity
    }

    pub fn remaining_quantity(&self) -> Quantity {
        self.remaining_quantity
    }

    pub fn filled_quantity(&self) -> Quantity {
        self.initial_quantity - self.remaining_quantity
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Decrement the remainder by `quantity`.
    ///
    /// # Panics
    ///
    /// Panics if `quantity` exceeds the remaining quantity. The matching
    /// loop only ever fills the minimum of the two remainders, so hitting
    /// this is a bug in the caller.
    pub fn fill(&mut self, quantity: Quantity) {
        if quantity > self.remaining_quantity {
            panic!(
                "order {} cannot be filled for more than its remaining quantity ({} > {})",
                self.id, quantity, self.remaining_quantity
            );
        }
        self.remaining_quantity -= quantity;
    }

    /// Re-price a market order to `price` and convert it to
    /// [`OrderType::GoodTillCancel`].
    ///
    /// # Panics
    ///
    /// Panics if the order is not a market order; only market orders may
    /// have their price adjusted.
    pub fn to_good_till_cancel(&mut self, price: Price) {
        if self.order_type != OrderType::Market {
            panic!(
                "order {} cannot have its price adjusted, only market orders can",
                self.id
            );
        }
        self.price = price;
        self.order_type = OrderType::GoodTillCancel;
    }
}

// ============================================================================
// OrderModify
// ============================================================================

/// A modify request: cancel the resting order with this id, then re-enter
/// it with the requested side, price, and quantity.
///
/// The order type is not part of the request; the book preserves the
/// resting order's type across the modify. The re-entered order joins the
/// tail of its new level, so a modify always forfeits time priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderModify {
    pub order_id: OrderId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

impl OrderModify {
    pub fn new(order_id: OrderId, side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            order_id,
            side,
            price,
            quantity,
        }
    }

    /// Build the replacement order, carrying over `order_type` from the
    /// order being replaced.
    pub fn into_order(self, order_type: OrderType) -> Order {
        Order::new(
            order_type,
            self.order_id,
            self.side,
            self.price,
            self.quantity,
        )
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn new_order_starts_unfilled() {
        let order = Order::new(OrderType::GoodTillCancel, 7, Side::Sell, 205, 40);

        assert_eq!(order.id(), 7);
        assert_eq!(order.side(), Side::Sell);
        assert_eq!(order.price(), 205);
        assert_eq!(order.order_type(), OrderType::GoodTillCancel);
        assert_eq!(order.initial_quantity(), 40);
        assert_eq!(order.remaining_quantity(), 40);
        assert_eq!(order.filled_quantity(), 0);
        assert!(!order.is_filled());
    }

    #[test]
    fn market_order_carries_sentinel_price() {
        let order = Order::market(3, Side::Buy, 25);

        assert_eq!(order.order_type(), OrderType::Market);
        assert_eq!(order.price(), INVALID_PRICE);
    }

    #[test]
    fn fill_decrements_remainder() {
        let mut order = Order::new(OrderType::GoodTillCancel, 1, Side::Buy, 100, 50);

        order.fill(30);
        assert_eq!(order.remaining_quantity(), 20);
        assert_eq!(order.filled_quantity(), 30);
        assert!(!order.is_filled());

        order.fill(20);
        assert_eq!(order.remaining_quantity(), 0);
        assert!(order.is_filled());
    }

    #[test]
    #[should_panic(expected = "cannot be filled for more than its remaining quantity")]
    fn overfill_panics() {
        let mut order = Order::new(OrderType::GoodTillCancel, 1, Side::Buy, 100, 50);
        order.fill(51);
    }

    #[test]
    fn pegging_converts_market_to_good_till_cancel() {
        let mut order = Order::market(9, Side::Sell, 10);

        order.to_good_till_cancel(98);
        assert_eq!(order.order_type(), OrderType::GoodTillCancel);
        assert_eq!(order.price(), 98);
    }

    #[test]
    #[should_panic(expected = "only market orders can")]
    fn pegging_a_limit_order_panics() {
        let mut order = Order::new(OrderType::GoodTillCancel, 2, Side::Buy, 100, 10);
        order.to_good_till_cancel(101);
    }

    #[test]
    fn modify_preserves_the_given_type() {
        let request = OrderModify::new(4, Side::Sell, 120, 15);
        let order = request.into_order(OrderType::FillAndKill);

        assert_eq!(order.id(), 4);
        assert_eq!(order.side(), Side::Sell);
        assert_eq!(order.price(), 120);
        assert_eq!(order.initial_quantity(), 15);
        assert_eq!(order.order_type(), OrderType::FillAndKill);
    }
}
