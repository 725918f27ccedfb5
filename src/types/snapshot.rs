//! Read-only depth snapshots.

use crate::types::order::{Price, Quantity};

/// Aggregate of one price level: the price and the sum of remaining
/// quantity over every order resting there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub price: Price,
    pub quantity: Quantity,
}

/// Depth of both sides of the book at one instant.
///
/// Bids are listed from highest to lowest price, asks from lowest to
/// highest, so the first entry of each side is the best quote.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub bids: Vec<LevelInfo>,
    pub asks: Vec<LevelInfo>,
}

impl Snapshot {
    pub fn new(bids: Vec<LevelInfo>, asks: Vec<LevelInfo>) -> Self {
        Self { bids, asks }
    }

    pub fn best_bid(&self) -> Option<&LevelInfo> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&LevelInfo> {
        self.asks.first()
    }
}
