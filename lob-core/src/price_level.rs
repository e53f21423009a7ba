//! A single price level: a FIFO queue of resting orders plus an aggregate
//! quantity cache.

use crate::types::{Order, OrderId, Price, Quantity};
use std::collections::{HashMap, VecDeque};

/// Resting orders at one price, ordered ascending by `sequence_number`.
///
/// Cancellation is O(1): the order is dropped from `orders` immediately,
/// and its id is left behind in `queue` as a tombstone that gets skipped
/// (and popped) the next time the level is walked for a head. This avoids
/// an intrusive linked list while keeping both append and cancel O(1)
/// amortized, at the cost of `queue` holding a handful of dead ids between
/// cancels and the next match.
#[derive(Debug)]
pub struct PriceLevel {
    pub price: Price,
    queue: VecDeque<OrderId>,
    orders: HashMap<OrderId, Order>,
    total_quantity: Quantity,
}

/// Outcome of matching one unit of taker demand against this level's head.
pub struct MatchStep {
    pub maker_order_id: OrderId,
    pub maker_price: Price,
    pub fill_quantity: Quantity,
    pub maker_filled: bool,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            queue: VecDeque::new(),
            orders: HashMap::new(),
            total_quantity: Quantity::ZERO,
        }
    }

    /// Place the order at the tail of the FIFO queue.
    pub fn append(&mut self, order: Order) {
        debug_assert_eq!(order.price, Some(self.price));
        self.total_quantity = self.total_quantity.wrapping_add(&order.remaining_quantity);
        self.queue.push_back(order.order_id);
        self.orders.insert(order.order_id, order);
    }

    /// Unlink an order by id, e.g. for cancellation. Returns the removed
    /// order (with its remaining quantity at the time of removal) if it
    /// was still resting here.
    pub fn remove(&mut self, order_id: OrderId) -> Option<Order> {
        let removed = self.orders.remove(&order_id)?;
        self.total_quantity = self.total_quantity.wrapping_sub(&removed.remaining_quantity);
        Some(removed)
    }

    /// Drop tombstoned ids from the front of the queue until the head is
    /// either live or the queue is empty.
    fn purge_stale_head(&mut self) {
        while let Some(front) = self.queue.front() {
            if self.orders.contains_key(front) {
                break;
            }
            self.queue.pop_front();
        }
    }

    /// The next order to fill at this price, if any.
    pub fn head(&mut self) -> Option<&Order> {
        self.purge_stale_head();
        self.queue.front().and_then(|id| self.orders.get(id))
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Recompute the aggregate from scratch, without trusting the
    /// incrementally maintained cache. Used by the post-mutation level
    /// aggregate check.
    pub fn recomputed_total(&self) -> Quantity {
        self.orders
            .values()
            .fold(Quantity::ZERO, |acc, o| acc.wrapping_add(&o.remaining_quantity))
    }

    /// Fill the head order by `want` (or less, if the head has less
    /// remaining), updating the level's aggregate and removing the order
    /// from the live map if it becomes fully filled. The tombstone id is
    /// left in the queue and purged on the next `head()`/`match_head()`
    /// call.
    pub fn match_head(&mut self, want: Quantity) -> Option<MatchStep> {
        self.purge_stale_head();
        let id = *self.queue.front()?;
        let maker = self.orders.get_mut(&id)?;
        let maker_price = self.price;
        let fill_quantity = if want < maker.remaining_quantity {
            want
        } else {
            maker.remaining_quantity
        };
        maker.remaining_quantity = maker.remaining_quantity.wrapping_sub(&fill_quantity);
        self.total_quantity = self.total_quantity.wrapping_sub(&fill_quantity);
        let maker_filled = maker.remaining_quantity == Quantity::ZERO;
        if maker_filled {
            maker.status = crate::types::OrderStatus::Filled;
            self.orders.remove(&id);
        } else {
            maker.status = crate::types::OrderStatus::PartiallyFilled;
        }
        Some(MatchStep {
            maker_order_id: id,
            maker_price,
            fill_quantity,
            maker_filled,
        })
    }

    pub fn view(&self) -> crate::types::LevelView {
        crate::types::LevelView {
            price: self.price,
            quantity: self.total_quantity,
        }
    }
}
