//! Serde-enabled wire shapes for the external interfaces.
//! These are thin, serializable mirrors of the internal types: an
//! embedding service decodes a `SubmitOrderDto` off the wire, converts it
//! into an `OrderRequest`, and re-encodes whatever the registry returns.
//! Kept separate from `types.rs` so the internal representation (e.g.
//! `U256` prices) is free to stay non-serde if a future change wants that,
//! without touching the wire contract.

use crate::error::{CancelError, SubmitError, ValidationError};
use crate::matching::{OrderRequest, SubmitResult};
use crate::types::{Bbo, OrderId, OrderStatus, OrderType, Price, Quantity, Side, Symbol, Trade};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOrderDto {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Quantity,
    #[serde(default)]
    pub price: Option<Price>,
}

impl From<SubmitOrderDto> for OrderRequest {
    fn from(dto: SubmitOrderDto) -> Self {
        OrderRequest {
            symbol: Symbol::from(dto.symbol.as_str()),
            side: dto.side,
            order_type: dto.order_type,
            quantity: dto.quantity,
            price: dto.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeDto {
    pub trade_id: u64,
    pub symbol: String,
    pub price: Price,
    pub quantity: Quantity,
    pub aggressor_side: Side,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub timestamp: u64,
    pub sequence_number: u64,
}

impl From<&Trade> for TradeDto {
    fn from(trade: &Trade) -> Self {
        Self {
            trade_id: trade.trade_id,
            symbol: trade.symbol.to_string(),
            price: trade.price,
            quantity: trade.quantity,
            aggressor_side: trade.aggressor_side,
            maker_order_id: trade.maker_order_id,
            taker_order_id: trade.taker_order_id,
            timestamp: trade.timestamp,
            sequence_number: trade.sequence_number,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResultDto {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub filled_quantity: Quantity,
    pub remaining_quantity: Quantity,
    pub trades: Vec<TradeDto>,
    pub reject_reason: Option<&'static str>,
}

impl From<SubmitResult> for SubmitResultDto {
    fn from(result: SubmitResult) -> Self {
        Self {
            order_id: result.order_id,
            status: result.status,
            filled_quantity: result.filled_quantity,
            remaining_quantity: result.remaining_quantity,
            trades: result.trades.iter().map(TradeDto::from).collect(),
            reject_reason: result.reject_reason,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelDto {
    pub price: Price,
    pub quantity: Quantity,
}

impl From<crate::types::LevelView> for LevelDto {
    fn from(level: crate::types::LevelView) -> Self {
        Self {
            price: level.price,
            quantity: level.quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookSnapshotDto {
    pub symbol: String,
    pub bids: Vec<LevelDto>,
    pub asks: Vec<LevelDto>,
}

impl OrderBookSnapshotDto {
    pub fn new(symbol: &Symbol, bids: Vec<crate::types::LevelView>, asks: Vec<crate::types::LevelView>) -> Self {
        Self {
            symbol: symbol.to_string(),
            bids: bids.into_iter().map(LevelDto::from).collect(),
            asks: asks.into_iter().map(LevelDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BboDto {
    pub symbol: String,
    pub best_bid: Option<LevelDto>,
    pub best_ask: Option<LevelDto>,
}

impl BboDto {
    pub fn new(symbol: &Symbol, bbo: Bbo) -> Self {
        Self {
            symbol: symbol.to_string(),
            best_bid: bbo.best_bid.map(LevelDto::from),
            best_ask: bbo.best_ask.map(LevelDto::from),
        }
    }
}

/// Wire-level reply for any request this crate can reject before or
/// during processing. Keeps `SubmitError`/`CancelError` out of the
/// serialization surface directly, since `Symbol`/`OrderId` already
/// serialize fine but the enums themselves do not derive `Serialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDto {
    pub code: &'static str,
    pub message: String,
}

impl From<&SubmitError> for ErrorDto {
    fn from(err: &SubmitError) -> Self {
        let code = match err {
            SubmitError::Validation(ValidationError::NonPositiveQuantity) => "non_positive_quantity",
            SubmitError::Validation(ValidationError::NonPositivePrice) => "non_positive_price",
            SubmitError::Validation(ValidationError::MissingPrice(_)) => "missing_price",
            SubmitError::Validation(ValidationError::UnexpectedPrice) => "unexpected_price",
            SubmitError::Validation(ValidationError::UnknownSymbol(_)) => "unknown_symbol",
            SubmitError::Quarantined(_) => "symbol_quarantined",
        };
        Self {
            code,
            message: err.to_string(),
        }
    }
}

impl From<&CancelError> for ErrorDto {
    fn from(err: &CancelError) -> Self {
        let code = match err {
            CancelError::NotFound(_) => "order_not_found",
            CancelError::Quarantined(_) => "symbol_quarantined",
        };
        Self {
            code,
            message: err.to_string(),
        }
    }
}
