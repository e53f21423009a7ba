//! Per-symbol order book: bid side, ask side, an order-id index for O(1)
//! cancellation lookup, and BBO derivation.

use crate::book_side::BookSide;
use crate::price_level::MatchStep;
use crate::types::{Bbo, Order, OrderId, Price, Side, Symbol};
use std::collections::HashMap;

/// A resting order's location, enough to find its `PriceLevel` in O(1):
/// the side tells us which `BookSide`, the price tells us which level.
#[derive(Clone, Copy)]
struct Location {
    side: Side,
    price: Price,
}

pub struct OrderBook {
    pub symbol: Symbol,
    pub bids: BookSide,
    pub asks: BookSide,
    id_index: HashMap<OrderId, Location>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    Found,
    NotFound,
}

impl OrderBook {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            id_index: HashMap::new(),
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// The side resting orders of `taker_side` match against.
    pub fn opposite_side_mut(&mut self, taker_side: Side) -> &mut BookSide {
        self.side_mut(taker_side.opposite())
    }

    pub fn opposite_side(&self, taker_side: Side) -> &BookSide {
        match taker_side.opposite() {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Rest a taker's unmatched remainder on its own side. Only called by
    /// the engine for order types that may rest (limit) after the match
    /// loop leaves `remaining_quantity > 0`.
    pub fn add_resting(&mut self, order: Order) {
        let side = order.side;
        let price = order
            .price
            .expect("resting orders always carry a limit price");
        let order_id = order.order_id;
        self.side_mut(side).level_mut(price).append(order);
        self.id_index.insert(order_id, Location { side, price });
    }

    /// Cancel a resting order by id.
    pub fn cancel(&mut self, order_id: OrderId) -> (CancelOutcome, Option<Order>) {
        let Some(location) = self.id_index.remove(&order_id) else {
            return (CancelOutcome::NotFound, None);
        };
        let side_book = self.side_mut(location.side);
        let removed = side_book
            .get_level_mut(location.price)
            .and_then(|level| level.remove(order_id));
        side_book.drop_level_if_empty(location.price);
        match removed {
            Some(mut order) => {
                order.status = crate::types::OrderStatus::Cancelled;
                (CancelOutcome::Found, Some(order))
            }
            None => (CancelOutcome::NotFound, None),
        }
    }

    /// Apply one match step against a resting maker and keep the id index
    /// consistent — if the maker was fully filled it is no longer in any
    /// level, so its index entry must go too.
    pub fn apply_match_step(&mut self, taker_side: Side, step: &MatchStep) {
        if step.maker_filled {
            self.id_index.remove(&step.maker_order_id);
        }
        let price = step.maker_price;
        self.opposite_side_mut(taker_side).drop_level_if_empty(price);
    }

    pub fn bbo(&self) -> Bbo {
        Bbo {
            best_bid: self.bids.best_level().map(|l| l.view()),
            best_ask: self.asks.best_level().map(|l| l.view()),
        }
    }

    /// Depth-limited snapshot: (bids descending, asks ascending).
    pub fn snapshot(
        &self,
        depth: usize,
    ) -> (Vec<crate::types::LevelView>, Vec<crate::types::LevelView>) {
        (self.bids.top_levels(depth), self.asks.top_levels(depth))
    }

    /// Invariant 1: the book is never crossed at rest.
    pub fn is_crossed(&self) -> bool {
        self.bbo().is_crossed()
    }

    /// Invariant 3: every price level's aggregate matches the sum of its
    /// resting orders, on both sides.
    pub fn has_consistent_level_aggregates(&self) -> bool {
        self.bids.aggregates_are_consistent() && self.asks.aggregates_are_consistent()
    }

    #[cfg(test)]
    pub fn resting_order_count(&self) -> usize {
        self.id_index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderStatus, OrderType, Quantity};
    use std::sync::Arc;

    fn limit_order(id: OrderId, side: Side, price: u64, qty: u64, seq: u64) -> Order {
        Order {
            order_id: id,
            symbol: Arc::from("BTC-USDT"),
            side,
            order_type: OrderType::Limit,
            original_quantity: Quantity::from(qty),
            remaining_quantity: Quantity::from(qty),
            price: Some(Price::from(price)),
            sequence_number: seq,
            timestamp: seq,
            status: OrderStatus::Open,
        }
    }

    #[test]
    fn add_then_cancel_round_trips_index() {
        let mut book = OrderBook::new(Arc::from("BTC-USDT"));
        book.add_resting(limit_order(1, Side::Buy, 100, 5, 1));
        assert_eq!(book.resting_order_count(), 1);

        let (outcome, order) = book.cancel(1);
        assert_eq!(outcome, CancelOutcome::Found);
        assert_eq!(order.unwrap().status, OrderStatus::Cancelled);
        assert_eq!(book.resting_order_count(), 0);
    }

    #[test]
    fn cancel_unknown_order_is_not_found() {
        let mut book = OrderBook::new(Arc::from("BTC-USDT"));
        let (outcome, order) = book.cancel(999);
        assert_eq!(outcome, CancelOutcome::NotFound);
        assert!(order.is_none());
    }

    #[test]
    fn bbo_reflects_best_levels_each_side() {
        let mut book = OrderBook::new(Arc::from("BTC-USDT"));
        book.add_resting(limit_order(1, Side::Buy, 100, 5, 1));
        book.add_resting(limit_order(2, Side::Sell, 105, 3, 2));

        let bbo = book.bbo();
        assert_eq!(bbo.best_bid.unwrap().price, Price::from(100u64));
        assert_eq!(bbo.best_ask.unwrap().price, Price::from(105u64));
        assert!(!book.is_crossed());
    }
}
