//! Reservation creation tests

use rust_decimal::Decimal;

use crate::db::models::OrderStatus;
use crate::orders::code::is_valid_code;
use crate::orders::error::OrderError;

use super::{order_input, seed_product, test_shop};

#[tokio::test]
async fn test_create_reserves_stock_and_issues_code() {
    let shop = test_shop();
    let lays = seed_product(&shop.catalog, "Lays Classic", 20, 50);

    let order = shop
        .engine
        .create_order(order_input("9876543210", vec![(lays, 3)]))
        .await
        .unwrap();

    assert!(is_valid_code(&order.order_id), "bad code: {}", order.order_id);
    assert_eq!(order.status, OrderStatus::Reserved);
    assert_eq!(order.total_amount, Decimal::from(60));
    assert_eq!(order.expires_at, order.created_at + super::TEST_HOLD_MILLIS);
    assert_eq!(shop.catalog.get(lays).unwrap().stock, 47);

    assert_eq!(shop.hook.events(), vec![format!("created:{}", order.order_id)]);

    let active = shop.ledger.list_active().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].order_id, order.order_id);
}


#[tokio::test]
async fn test_multi_line_totals_and_snapshots() {
    let shop = test_shop();
    let maggi = seed_product(&shop.catalog, "Maggi Noodles", 12, 80);
    let coke = seed_product(&shop.catalog, "Coca Cola", 40, 30);

    let order = shop
        .engine
        .create_order(order_input("9876543210", vec![(maggi, 3), (coke, 2)]))
        .await
        .unwrap();

    assert_eq!(order.items.len(), 2);
    assert_eq!(order.total_amount, Decimal::from(116));
    assert_eq!(order.items[0].name, "Maggi Noodles");
    assert_eq!(order.items[0].price, Decimal::from(12));
    assert_eq!(shop.catalog.get(maggi).unwrap().stock, 77);
    assert_eq!(shop.catalog.get(coke).unwrap().stock, 28);
}


#[tokio::test]
async fn test_notification_reference_is_persisted() {
    let shop = test_shop();
    let lays = seed_product(&shop.catalog, "Lays Classic", 20, 50);
    *shop.hook.created_ref.lock().unwrap() = Some("msg-42".to_string());

    let order = shop
        .engine
        .create_order(order_input("9876543210", vec![(lays, 1)]))
        .await
        .unwrap();

    assert_eq!(order.notification_ref.as_deref(), Some("msg-42"));
    let reread = shop.ledger.get(&order.order_id).unwrap();
    assert_eq!(reread.notification_ref.as_deref(), Some("msg-42"));
}


#[tokio::test]
async fn test_hook_failure_does_not_fail_order() {
    let shop = test_shop();
    let lays = seed_product(&shop.catalog, "Lays Classic", 20, 50);
    shop.hook
        .fail_created
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let order = shop
        .engine
        .create_order(order_input("9876543210", vec![(lays, 2)]))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Reserved);
    assert_eq!(order.notification_ref, None);
    assert_eq!(shop.catalog.get(lays).unwrap().stock, 48);
    assert!(shop.hook.events().is_empty());
}


#[tokio::test]
async fn test_get_unknown_order() {
    let shop = test_shop();
    assert!(matches!(
        shop.engine.get_order("ZZ09"),
        Err(OrderError::OrderNotFound(_))
    ));
}


#[tokio::test]
async fn test_unknown_product_rejected_without_side_effects() {
    let shop = test_shop();
    let lays = seed_product(&shop.catalog, "Lays Classic", 20, 50);

    let err = shop
        .engine
        .create_order(order_input("9876543210", vec![(lays, 1), (999, 1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::ProductNotFound(999)));
    assert_eq!(shop.catalog.get(lays).unwrap().stock, 50);
    assert!(shop.ledger.list_all().unwrap().is_empty());
}


#[tokio::test]
async fn test_inactive_product_rejected() {
    let shop = test_shop();
    let bull = seed_product(&shop.catalog, "Red Bull", 120, 20);
    shop.catalog.set_active(bull, false).unwrap();

    let err = shop
        .engine
        .create_order(order_input("9876543210", vec![(bull, 1)]))
        .await
        .unwrap_err();

    match err {
        OrderError::ProductInactive { name } => assert_eq!(name, "Red Bull"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(shop.catalog.get(bull).unwrap().stock, 20);
}
