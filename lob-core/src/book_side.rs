//! One side (bids or asks) of an order book: an ordered collection of
//! price levels, best-level peek, and cheap best-first iteration.

use crate::price_level::PriceLevel;
use crate::types::{OrderId, Price, Side};
use std::collections::BTreeMap;

/// A price key whose `Ord` impl encodes the side's iteration direction:
/// descending for bids, ascending for asks. Price only, since FIFO
/// tie-break lives inside `PriceLevel` rather than the sort key.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct LevelKey {
    price: Price,
    side: Side,
}

impl Ord for LevelKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.side {
            Side::Buy => self.price.cmp(&other.price).reverse(),
            Side::Sell => self.price.cmp(&other.price),
        }
    }
}

impl PartialOrd for LevelKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// One side of the book. `side` names the side of the *resting* orders
/// held here: the bids side holds resting buys, the asks side resting
/// sells.
pub struct BookSide {
    pub side: Side,
    levels: BTreeMap<LevelKey, PriceLevel>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    fn key(&self, price: Price) -> LevelKey {
        LevelKey {
            price,
            side: self.side,
        }
    }

    /// Create a level at `price` if none exists, and hand back a mutable
    /// reference to it. O(log P) in the number of distinct active levels.
    pub fn level_mut(&mut self, price: Price) -> &mut PriceLevel {
        self.levels
            .entry(self.key(price))
            .or_insert_with(|| PriceLevel::new(price))
    }

    pub fn get_level_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&self.key(price))
    }

    pub fn drop_level_if_empty(&mut self, price: Price) {
        let key = self.key(price);
        if self.levels.get(&key).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&key);
        }
    }

    /// Remove a resting order at a known price. O(log P) + O(1).
    pub fn remove(&mut self, order_id: OrderId, price: Price) -> bool {
        let key = self.key(price);
        let removed = self
            .levels
            .get_mut(&key)
            .and_then(|level| level.remove(order_id))
            .is_some();
        if removed {
            self.drop_level_if_empty(price);
        }
        removed
    }

    /// The level a taker first matches against, if any exists.
    pub fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        self.levels.values_mut().next()
    }

    pub fn best_level(&self) -> Option<&PriceLevel> {
        self.levels.values().next()
    }

    /// True if the best resting level satisfies a taker on the opposite
    /// side with limit price `limit` (market orders pass `None` and match
    /// any price).
    pub fn top_is_matchable(&self, limit: Option<Price>) -> bool {
        let Some(level) = self.best_level() else {
            return false;
        };
        match limit {
            None => true,
            Some(limit) => match self.side {
                Side::Sell => level.price <= limit,
                Side::Buy => level.price >= limit,
            },
        }
    }

    /// Sum of matchable liquidity at prices satisfying `limit`, used by
    /// the FOK pre-check. Iterates best-first and stops at the first
    /// non-matchable level, since levels are ordered by matchability.
    pub fn matchable_liquidity(&self, limit: Option<Price>) -> crate::types::Quantity {
        let mut total = crate::types::Quantity::ZERO;
        for level in self.levels.values() {
            let matchable = match limit {
                None => true,
                Some(limit) => match self.side {
                    Side::Sell => level.price <= limit,
                    Side::Buy => level.price >= limit,
                },
            };
            if !matchable {
                break;
            }
            total = total.wrapping_add(&level.total_quantity());
        }
        total
    }

    /// Best-first iteration for snapshotting: up to `depth` levels.
    pub fn top_levels(&self, depth: usize) -> Vec<crate::types::LevelView> {
        self.levels.values().take(depth).map(PriceLevel::view).collect()
    }

    /// Invariant 3: every level's incrementally maintained aggregate
    /// matches the sum of its resting orders' remaining quantities.
    pub fn aggregates_are_consistent(&self) -> bool {
        self.levels
            .values()
            .all(|level| level.total_quantity() == level.recomputed_total())
    }

    #[cfg(test)]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}
