//! Convenience re-export surface for consumers of this crate.

pub use crate::book_side::BookSide;
pub use crate::config::EngineConfig;
pub use crate::dto::{
    BboDto, ErrorDto, LevelDto, OrderBookSnapshotDto, SubmitOrderDto, SubmitResultDto, TradeDto,
};
pub use crate::error::{CancelError, InvariantViolation, SubmitError, ValidationError};
pub use crate::event::{Event, EventMultiplexer, PublishBatch, Topic};
pub use crate::matching::{OrderRequest, SubmitResult, SymbolEngine};
pub use crate::order_book::{CancelOutcome, OrderBook};
pub use crate::price_level::{MatchStep, PriceLevel};
pub use crate::registry::EngineRegistry;
pub use crate::types::{
    Bbo, IdGenerator, LevelView, MonotonicClock, Order, OrderId, OrderStatus, OrderType, Price,
    Quantity, SequenceNumber, Side, Symbol, SystemClock, Trade, TradeId,
};
