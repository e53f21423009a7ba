//! Core data types: price/quantity representation, sides, order types,
//! the `Order` and `Trade` records, and the live best-bid-offer view.

use crypto_bigint::U256;
use mimalloc::MiMalloc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global allocator
/// Requires the `mimalloc` feature to be enabled in the `Cargo.toml` file.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Price is a fixed-point tick count. Never a binary float: comparisons,
/// aggregation, and storage all happen on exact integers.
pub type Price = U256;

/// Quantity uses the same tick representation as `Price`.
pub type Quantity = U256;

/// Globally unique order identifier, assigned on acceptance.
pub type OrderId = u64;

/// Globally unique trade identifier, assigned when a fill occurs.
pub type TradeId = u64;

/// Monotonic sequence number, unique per symbol, assigned on acceptance.
pub type SequenceNumber = u64;

/// A symbol tag, e.g. `"BTC-USDT"`. Cheap to clone and share across events.
pub type Symbol = Arc<str>;

/// Side indicates the direction of an order.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side resting orders must be on to match against this side's takers.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// OrderType determines price requirement and rest-on-remainder policy.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// No price; never rests; unmatched remainder is cancelled.
    Market,
    /// Price required; unmatched remainder rests on the book.
    Limit,
    /// Immediate-or-cancel: price required; never rests.
    Ioc,
    /// Fill-or-kill: price required; never rests; all-or-nothing pre-check.
    Fok,
}

impl OrderType {
    /// Whether this order type is allowed to rest on the book.
    pub fn may_rest(self) -> bool {
        matches!(self, OrderType::Limit)
    }

    /// Whether this order type requires an explicit limit price.
    pub fn requires_price(self) -> bool {
        !matches!(self, OrderType::Market)
    }
}

/// OrderStatus reflects the terminal or in-flight state of an order.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
}

/// A single order. Mutated only by the owning `SymbolEngine`'s match loop
/// and cancellation path, which together hold the per-symbol critical
/// section — no internal mutability or atomics are needed here, unlike a
/// design where multiple threads could observe one resting order.
#[derive(Clone, Debug)]
pub struct Order {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub original_quantity: Quantity,
    pub remaining_quantity: Quantity,
    pub price: Option<Price>,
    pub sequence_number: SequenceNumber,
    pub timestamp: u64,
    pub status: OrderStatus,
}

impl Order {
    pub fn filled_quantity(&self) -> Quantity {
        self.original_quantity
            .wrapping_sub(&self.remaining_quantity)
    }
}

/// An immutable trade record. Never mutated after creation.
#[derive(Clone, Debug)]
pub struct Trade {
    pub trade_id: TradeId,
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: Quantity,
    pub aggressor_side: Side,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub timestamp: u64,
    pub sequence_number: SequenceNumber,
}

/// A price level's externally-visible aggregate: price and total resting
/// quantity, with no detail about the individual orders inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelView {
    pub price: Price,
    pub quantity: Quantity,
}

/// Best-bid-offer snapshot. Any side may be absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bbo {
    pub best_bid: Option<LevelView>,
    pub best_ask: Option<LevelView>,
}

impl Bbo {
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => bid.price >= ask.price,
            _ => false,
        }
    }
}

/// Process-wide monotonic id allocator: a process epoch plus an atomic
/// counter is sufficient, since no cross-process coordination is needed
/// inside the core.
pub struct IdGenerator {
    epoch: u64,
    counter: AtomicU64,
}

impl IdGenerator {
    pub fn new(epoch: u64) -> Self {
        Self {
            epoch,
            counter: AtomicU64::new(0),
        }
    }

    /// Allocate the next id. The high bits carry the process epoch so ids
    /// from different process lifetimes never collide.
    pub fn next(&self) -> u64 {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        self.epoch.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ n
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0))
    }
}

/// Monotonic clock abstraction. The default reads the system clock; tests
/// can swap in a deterministic counter.
pub trait MonotonicClock: Send + Sync {
    fn now_micros(&self) -> u64;
}

/// Wall-clock backed implementation. Never observed to go backward in
/// practice since `Instant`-style monotonic sources underlie it.
#[derive(Default)]
pub struct SystemClock;

impl MonotonicClock for SystemClock {
    fn now_micros(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0)
    }
}
