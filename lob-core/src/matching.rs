//! The matching state machine: order-type semantics, the match loop, and
//! the FOK all-or-nothing pre-check.

use crate::book_side::BookSide;
use crate::error::{CancelError, SubmitError, ValidationError};
use crate::event::PublishBatch;
use crate::order_book::{CancelOutcome, OrderBook};
use crate::types::{
    MonotonicClock, Order, OrderId, OrderStatus, OrderType, Price, Quantity, Side, Symbol,
    Trade, TradeId,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Inbound submission.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Quantity,
    pub price: Option<Price>,
}

/// Outbound submission result.
#[derive(Debug, Clone)]
pub struct SubmitResult {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub filled_quantity: Quantity,
    pub remaining_quantity: Quantity,
    pub trades: Vec<Trade>,
    pub reject_reason: Option<&'static str>,
}

fn validate_request(request: &OrderRequest) -> Result<(), ValidationError> {
    if request.symbol.is_empty() {
        return Err(ValidationError::UnknownSymbol(request.symbol.clone()));
    }
    if request.quantity == Quantity::ZERO {
        return Err(ValidationError::NonPositiveQuantity);
    }
    if request.order_type.requires_price() {
        match request.price {
            None => return Err(ValidationError::MissingPrice(request.order_type)),
            Some(p) if p == Price::ZERO => return Err(ValidationError::NonPositivePrice),
            Some(_) => {}
        }
    } else if request.price.is_some() {
        return Err(ValidationError::UnexpectedPrice);
    }
    Ok(())
}

/// Process-wide trade id allocator, separate from order ids so trade and
/// order id spaces never collide.
pub struct TradeIdGenerator(AtomicU64);

impl TradeIdGenerator {
    pub fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    pub fn next(&self) -> TradeId {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for TradeIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything one symbol's matching owns: its book, its per-symbol
/// sequence counter, its recent-trades ring, and a quarantine flag. All
/// of it is mutated only while a caller holds the `Mutex<SymbolEngine>`
/// that the registry wraps this in — the single-threaded critical
/// section.
pub struct SymbolEngine {
    book: OrderBook,
    next_sequence: u64,
    recent_trades: VecDeque<Trade>,
    recent_trades_capacity: usize,
    quarantined: Option<crate::error::InvariantViolation>,
}

impl SymbolEngine {
    pub fn new(symbol: Symbol, recent_trades_capacity: usize) -> Self {
        Self {
            book: OrderBook::new(symbol),
            next_sequence: 1,
            recent_trades: VecDeque::with_capacity(recent_trades_capacity),
            recent_trades_capacity,
            quarantined: None,
        }
    }

    pub fn symbol(&self) -> Symbol {
        self.book.symbol.clone()
    }

    pub fn bbo(&self) -> crate::types::Bbo {
        self.book.bbo()
    }

    pub fn snapshot(
        &self,
        depth: usize,
    ) -> (Vec<crate::types::LevelView>, Vec<crate::types::LevelView>) {
        self.book.snapshot(depth)
    }

    pub fn recent_trades(&self, limit: usize) -> Vec<Trade> {
        self.recent_trades.iter().rev().take(limit).cloned().collect()
    }

    fn next_sequence_number(&mut self) -> u64 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }

    fn record_trade(&mut self, trade: Trade) {
        if self.recent_trades.len() == self.recent_trades_capacity
            && self.recent_trades_capacity > 0
        {
            self.recent_trades.pop_front();
        }
        if self.recent_trades_capacity > 0 {
            self.recent_trades.push_back(trade);
        }
    }

    pub fn cancel(&mut self, order_id: OrderId) -> Result<Order, CancelError> {
        if let Some(violation) = &self.quarantined {
            return Err(CancelError::Quarantined(
                match violation {
                    crate::error::InvariantViolation::CrossedBook { symbol }
                    | crate::error::InvariantViolation::LevelAggregateMismatch { symbol }
                    | crate::error::InvariantViolation::ConservationViolated { symbol, .. } => {
                        symbol.clone()
                    }
                },
            ));
        }
        match self.book.cancel(order_id) {
            (CancelOutcome::Found, Some(order)) => Ok(order),
            _ => Err(CancelError::NotFound(order_id)),
        }
    }

    /// The FOK pre-check, strictly non-mutating: sum matchable liquidity
    /// against the incoming limit and compare to the requested quantity.
    fn fok_would_fill(&self, side: Side, price: Option<Price>, quantity: Quantity) -> bool {
        let opposite = self.opposite_side(side);
        opposite.matchable_liquidity(price) >= quantity
    }

    fn opposite_side(&self, taker_side: Side) -> &BookSide {
        self.book.opposite_side(taker_side)
    }

    /// Run the match loop for `taker` until it is filled or no matchable
    /// liquidity remains at its limit. Mutates `taker.remaining_quantity`
    /// and the book in place; returns the trades produced, in match
    /// order.
    fn run_match_loop(
        &mut self,
        taker: &mut Order,
        clock: &dyn MonotonicClock,
        trade_ids: &TradeIdGenerator,
    ) -> Vec<Trade> {
        let mut trades = Vec::new();
        loop {
            if taker.remaining_quantity == Quantity::ZERO {
                break;
            }
            let opposite = self.book.opposite_side_mut(taker.side);
            if !opposite.top_is_matchable(taker.price) {
                break;
            }
            let price = match opposite.best_level() {
                Some(level) => level.price,
                None => break,
            };
            let Some(level) = opposite.get_level_mut(price) else {
                break;
            };
            let Some(step) = level.match_head(taker.remaining_quantity) else {
                opposite.drop_level_if_empty(price);
                continue;
            };

            taker.remaining_quantity = taker.remaining_quantity.wrapping_sub(&step.fill_quantity);

            let trade = Trade {
                trade_id: trade_ids.next(),
                symbol: self.book.symbol.clone(),
                price: step.maker_price,
                quantity: step.fill_quantity,
                aggressor_side: taker.side,
                maker_order_id: step.maker_order_id,
                taker_order_id: taker.order_id,
                timestamp: clock.now_micros(),
                sequence_number: taker.sequence_number,
            };
            trades.push(trade.clone());
            self.record_trade(trade);
            self.book.apply_match_step(taker.side, &step);
        }
        trades
    }

    /// Submit a new order. Returns the caller-facing result plus, on
    /// anything other than an FOK rejection, the batch the event
    /// multiplexer should publish once this symbol's lock is released.
    pub fn submit(
        &mut self,
        request: OrderRequest,
        order_id: OrderId,
        clock: &dyn MonotonicClock,
        trade_ids: &TradeIdGenerator,
        snapshot_depth: usize,
    ) -> Result<(SubmitResult, Option<PublishBatch>), SubmitError> {
        if let Some(violation) = &self.quarantined {
            let symbol = match violation {
                crate::error::InvariantViolation::CrossedBook { symbol }
                | crate::error::InvariantViolation::LevelAggregateMismatch { symbol }
                | crate::error::InvariantViolation::ConservationViolated { symbol, .. } => {
                    symbol.clone()
                }
            };
            return Err(SubmitError::Quarantined(symbol));
        }
        validate_request(&request)?;

        let sequence_number = self.next_sequence_number();
        let timestamp = clock.now_micros();
        let mut order = Order {
            order_id,
            symbol: request.symbol.clone(),
            side: request.side,
            order_type: request.order_type,
            original_quantity: request.quantity,
            remaining_quantity: request.quantity,
            price: request.price,
            sequence_number,
            timestamp,
            status: OrderStatus::New,
        };

        if order.order_type == OrderType::Fok
            && !self.fok_would_fill(order.side, order.price, order.original_quantity)
        {
            return Ok((
                SubmitResult {
                    order_id,
                    status: OrderStatus::Rejected,
                    filled_quantity: Quantity::ZERO,
                    remaining_quantity: order.original_quantity,
                    trades: Vec::new(),
                    reject_reason: Some("fok_unfillable"),
                },
                None,
            ));
        }

        let bbo_before = self.book.bbo();
        let trades = self.run_match_loop(&mut order, clock, trade_ids);

        let may_rest = order.order_type.may_rest();
        if order.remaining_quantity == Quantity::ZERO {
            order.status = OrderStatus::Filled;
        } else if may_rest {
            order.status = if trades.is_empty() {
                OrderStatus::Open
            } else {
                OrderStatus::PartiallyFilled
            };
            self.book.add_resting(order.clone());
        } else {
            order.status = OrderStatus::Cancelled;
        }

        let mut terminal = None;
        if let Some(violation) = self.check_invariants() {
            self.quarantined = Some(violation.clone());
            tracing::error!(symbol = %self.book.symbol, ?violation, "invariant violation, quarantining symbol");
            terminal = Some((self.book.symbol.clone(), violation.to_string()));
        }

        let bbo_after = self.book.bbo();
        let (bids, asks) = self.book.snapshot(snapshot_depth);
        let book_update = Some((self.book.symbol.clone(), bids, asks, sequence_number));
        let bbo_update = if bbo_before != bbo_after {
            Some((self.book.symbol.clone(), bbo_after, sequence_number))
        } else {
            None
        };

        let result = SubmitResult {
            order_id,
            status: order.status,
            filled_quantity: order.filled_quantity(),
            remaining_quantity: order.remaining_quantity,
            trades: trades.clone(),
            reject_reason: None,
        };

        Ok((
            result,
            Some(PublishBatch {
                trades,
                book_update,
                bbo_update,
                terminal,
            }),
        ))
    }

    /// Check invariants 1 and 3 after a mutation. Invariant 2
    /// (conservation) and 4 (index consistency) are structurally
    /// guaranteed by construction (the match loop only ever moves
    /// quantity between taker and maker, and `OrderBook` only ever has
    /// one index entry per resting order), so they are exercised by
    /// tests rather than checked at runtime on every submission.
    fn check_invariants(&self) -> Option<crate::error::InvariantViolation> {
        if self.book.is_crossed() {
            return Some(crate::error::InvariantViolation::CrossedBook {
                symbol: self.book.symbol.clone(),
            });
        }
        if !self.book.has_consistent_level_aggregates() {
            return Some(crate::error::InvariantViolation::LevelAggregateMismatch {
                symbol: self.book.symbol.clone(),
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SystemClock;
    use std::sync::Arc;

    fn symbol() -> Symbol {
        Arc::from("BTC-USDT")
    }

    fn engine() -> SymbolEngine {
        SymbolEngine::new(symbol(), 200)
    }

    fn request(side: Side, order_type: OrderType, qty: u64, price: Option<u64>) -> OrderRequest {
        OrderRequest {
            symbol: symbol(),
            side,
            order_type,
            quantity: Quantity::from(qty),
            price: price.map(Price::from),
        }
    }

    #[test]
    fn resting_limit_order_opens_with_no_trades() {
        let mut eng = engine();
        let clock = SystemClock;
        let ids = TradeIdGenerator::new();

        let (result, _batch) = eng
            .submit(request(Side::Buy, OrderType::Limit, 1, Some(100)), 1, &clock, &ids, 20)
            .unwrap();

        assert_eq!(result.status, OrderStatus::Open);
        assert_eq!(result.filled_quantity, Quantity::ZERO);
        assert_eq!(result.remaining_quantity, Quantity::from(1u64));
        assert!(result.trades.is_empty());
    }

    #[test]
    fn crossing_limit_fully_fills_both_sides() {
        let mut eng = engine();
        let clock = SystemClock;
        let ids = TradeIdGenerator::new();

        eng.submit(request(Side::Buy, OrderType::Limit, 5, Some(100)), 1, &clock, &ids, 20)
            .unwrap();
        let (result, batch) = eng
            .submit(request(Side::Sell, OrderType::Limit, 5, Some(99)), 2, &clock, &ids, 20)
            .unwrap();

        assert_eq!(result.status, OrderStatus::Filled);
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].price, Price::from(100u64));
        assert_eq!(result.trades[0].quantity, Quantity::from(5u64));
        assert!(!eng.book.is_crossed());
        let batch = batch.unwrap();
        assert_eq!(batch.trades.len(), 1);
        assert!(batch.terminal.is_none(), "a healthy book must not quarantine");
    }

    #[test]
    fn fok_unfillable_rejects_without_mutating_book() {
        let mut eng = engine();
        let clock = SystemClock;
        let ids = TradeIdGenerator::new();

        eng.submit(request(Side::Sell, OrderType::Limit, 2, Some(100)), 1, &clock, &ids, 20)
            .unwrap();
        let (result, batch) = eng
            .submit(request(Side::Buy, OrderType::Fok, 5, Some(100)), 2, &clock, &ids, 20)
            .unwrap();

        assert_eq!(result.status, OrderStatus::Rejected);
        assert_eq!(result.reject_reason, Some("fok_unfillable"));
        assert!(batch.is_none());
        assert_eq!(eng.book.resting_order_count(), 1);
    }

    #[test]
    fn ioc_partial_fill_cancels_remainder_without_resting() {
        let mut eng = engine();
        let clock = SystemClock;
        let ids = TradeIdGenerator::new();

        eng.submit(request(Side::Sell, OrderType::Limit, 2, Some(100)), 1, &clock, &ids, 20)
            .unwrap();
        let (result, _) = eng
            .submit(request(Side::Buy, OrderType::Ioc, 5, Some(100)), 2, &clock, &ids, 20)
            .unwrap();

        assert_eq!(result.status, OrderStatus::Cancelled);
        assert_eq!(result.filled_quantity, Quantity::from(2u64));
        assert_eq!(eng.book.resting_order_count(), 0);
    }

    #[test]
    fn market_order_with_no_liquidity_is_cancelled_immediately() {
        let mut eng = engine();
        let clock = SystemClock;
        let ids = TradeIdGenerator::new();

        let (result, batch) = eng
            .submit(request(Side::Buy, OrderType::Market, 1, None), 1, &clock, &ids, 20)
            .unwrap();

        assert_eq!(result.status, OrderStatus::Cancelled);
        assert!(result.trades.is_empty());
        assert!(batch.unwrap().trades.is_empty());
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let mut eng = engine();
        let clock = SystemClock;
        let ids = TradeIdGenerator::new();

        let err = eng
            .submit(request(Side::Buy, OrderType::Limit, 0, Some(100)), 1, &clock, &ids, 20)
            .unwrap_err();
        assert_eq!(err, SubmitError::Validation(ValidationError::NonPositiveQuantity));
    }
}
