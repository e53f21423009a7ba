use lob_core::prelude::*;
use std::sync::Arc;

/// Quickly build a limit `OrderRequest` for benchmarking.
pub fn make_limit_order(symbol: &Symbol, side: Side, price: u64, qty: u64) -> OrderRequest {
    OrderRequest {
        symbol: Arc::clone(symbol),
        side,
        order_type: OrderType::Limit,
        quantity: Quantity::from(qty),
        price: Some(Price::from(price)),
    }
}

/// Quickly build a market `OrderRequest` for benchmarking.
pub fn make_market_order(symbol: &Symbol, side: Side, qty: u64) -> OrderRequest {
    OrderRequest {
        symbol: Arc::clone(symbol),
        side,
        order_type: OrderType::Market,
        quantity: Quantity::from(qty),
        price: None,
    }
}
