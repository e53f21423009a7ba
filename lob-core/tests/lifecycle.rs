mod common;

use crate::common::*;
use lob_core::prelude::*;

#[test]
fn new_limit_order_rests_open_with_no_fills() {
    let registry = registry();
    let btc = symbol("BTC-USDT");

    let result = registry.submit(limit(&btc, Side::Buy, 100, 10)).unwrap();

    assert_eq!(result.status, OrderStatus::Open);
    assert_eq!(result.filled_quantity, Quantity::ZERO);
}

#[test]
fn crossing_orders_remove_both_from_the_book_on_full_fill() {
    let registry = registry();
    let btc = symbol("BTC-USDT");

    registry.submit(limit(&btc, Side::Sell, 100, 10)).unwrap();
    let buy = registry.submit(limit(&btc, Side::Buy, 100, 10)).unwrap();

    assert_eq!(buy.status, OrderStatus::Filled, "taker should be fully filled");
    let (bids, asks) = registry.snapshot(&btc, None);
    assert!(bids.is_empty(), "maker side should be empty after full fill");
    assert!(asks.is_empty(), "taker never rested, nothing to find here either");
}

#[test]
fn partial_fill_leaves_the_remainder_resting() {
    let registry = registry();
    let btc = symbol("BTC-USDT");

    registry.submit(limit(&btc, Side::Sell, 100, 4)).unwrap();
    let buy = registry.submit(limit(&btc, Side::Buy, 100, 10)).unwrap();

    assert_eq!(buy.status, OrderStatus::PartiallyFilled);
    assert_eq!(buy.filled_quantity, Quantity::from(4u64));
    assert_eq!(buy.remaining_quantity, Quantity::from(6u64));

    let bbo = registry.bbo(&btc);
    assert_eq!(bbo.best_bid.unwrap().quantity, Quantity::from(6u64));
}

#[test]
fn cancel_removes_a_resting_order_from_the_book() {
    let registry = registry();
    let btc = symbol("BTC-USDT");

    let buy = registry.submit(limit(&btc, Side::Buy, 100, 10)).unwrap();
    registry.cancel(&btc, buy.order_id).unwrap();

    let bbo = registry.bbo(&btc);
    assert!(bbo.best_bid.is_none(), "cancelled order should be gone from the book");
}

#[test]
fn cancelling_an_unknown_order_id_is_not_found() {
    let registry = registry();
    let btc = symbol("BTC-USDT");
    registry.submit(limit(&btc, Side::Buy, 100, 10)).unwrap();

    let err = registry.cancel(&btc, 999_999).unwrap_err();
    assert!(matches!(err, CancelError::NotFound(_)));
}

#[test]
fn cancelling_an_already_filled_order_is_not_found() {
    let registry = registry();
    let btc = symbol("BTC-USDT");

    let sell = registry.submit(limit(&btc, Side::Sell, 100, 5)).unwrap();
    registry.submit(limit(&btc, Side::Buy, 100, 5)).unwrap();

    let err = registry.cancel(&btc, sell.order_id).unwrap_err();
    assert!(matches!(err, CancelError::NotFound(_)));
}
