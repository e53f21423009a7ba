//! Error taxonomy. Validation and FOK failures surface
//! synchronously on the submission response; cancel failures are
//! returned to the caller; publish failures are scoped to one
//! subscriber; invariant violations quarantine a symbol.

use crate::types::{OrderId, Symbol};
use thiserror::Error;

/// Rejected before any state change: the request itself was malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("quantity must be positive")]
    NonPositiveQuantity,
    #[error("price must be positive for non-market orders")]
    NonPositivePrice,
    #[error("price is required for order type {0:?}")]
    MissingPrice(crate::types::OrderType),
    #[error("price must be absent for market orders")]
    UnexpectedPrice,
    #[error("unknown symbol {0:?}")]
    UnknownSymbol(Symbol),
}

/// Why a cancel request failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CancelError {
    #[error("order {0} not found or not resting")]
    NotFound(OrderId),
    #[error("symbol {0:?} is quarantined after an invariant violation")]
    Quarantined(Symbol),
}

/// A detected violation of a core invariant (e.g. a level aggregate
/// mismatch). Fatal for the affected symbol: it is quarantined and
/// refuses further submissions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("book for {symbol:?} is crossed: best_bid >= best_ask")]
    CrossedBook { symbol: Symbol },
    #[error("price level aggregate mismatch at price level in {symbol:?}")]
    LevelAggregateMismatch { symbol: Symbol },
    #[error("quantity conservation violated for order {order_id} in {symbol:?}")]
    ConservationViolated { symbol: Symbol, order_id: OrderId },
}

/// Top-level submission error: either the request was invalid, or the
/// symbol has been quarantined by a prior invariant violation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("symbol {0:?} is quarantined after an invariant violation")]
    Quarantined(Symbol),
}
