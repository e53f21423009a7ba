use lob_core::prelude::*;
use std::sync::Arc;

/// Build a default-config registry for one test.
pub fn registry() -> EngineRegistry {
    EngineRegistry::new(EngineConfig::default())
}

pub fn symbol(name: &str) -> Symbol {
    Arc::from(name)
}

/// Quickly build a limit order request.
pub fn limit(symbol: &Symbol, side: Side, price: u64, qty: u64) -> OrderRequest {
    OrderRequest {
        symbol: symbol.clone(),
        side,
        order_type: OrderType::Limit,
        quantity: Quantity::from(qty),
        price: Some(Price::from(price)),
    }
}

pub fn market(symbol: &Symbol, side: Side, qty: u64) -> OrderRequest {
    OrderRequest {
        symbol: symbol.clone(),
        side,
        order_type: OrderType::Market,
        quantity: Quantity::from(qty),
        price: None,
    }
}

pub fn ioc(symbol: &Symbol, side: Side, price: u64, qty: u64) -> OrderRequest {
    OrderRequest {
        order_type: OrderType::Ioc,
        ..limit(symbol, side, price, qty)
    }
}

pub fn fok(symbol: &Symbol, side: Side, price: u64, qty: u64) -> OrderRequest {
    OrderRequest {
        order_type: OrderType::Fok,
        ..limit(symbol, side, price, qty)
    }
}
