//! 营业概览 / Shop summary reports
//!
//! Single-pass rollup over the order ledger plus the low-stock shortlist,
//! logged at startup and available to whatever surface wants a dashboard.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::CatalogStore;
use crate::db::models::OrderStatus;
use crate::orders::error::OrderResult;
use crate::orders::ledger::OrderLedger;
use crate::utils::time::{day_start_millis, now_millis};

#[derive(Debug, Clone, Serialize)]
pub struct LowStockItem {
    pub product_id: u32,
    pub name: String,
    pub stock: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopSummary {
    pub total_products: usize,
    pub active_orders: usize,
    pub completed_orders: usize,
    pub cancelled_orders: usize,
    pub orders_today: usize,
    pub revenue_today: Decimal,
    pub low_stock: Vec<LowStockItem>,
}

/// Roll the ledger up into one summary. Revenue counts orders completed
/// since local midnight; `orders_today` counts orders placed since then.
pub fn shop_summary(
    catalog: &CatalogStore,
    ledger: &OrderLedger,
    low_stock_threshold: i32,
) -> OrderResult<ShopSummary> {
    let today = day_start_millis(now_millis());

    let mut active_orders = 0;
    let mut completed_orders = 0;
    let mut cancelled_orders = 0;
    let mut orders_today = 0;
    let mut revenue_today = Decimal::ZERO;

    for order in ledger.list_all()? {
        match order.status {
            OrderStatus::Reserved | OrderStatus::Picked => active_orders += 1,
            OrderStatus::Completed => completed_orders += 1,
            OrderStatus::Cancelled => cancelled_orders += 1,
        }
        if order.created_at >= today {
            orders_today += 1;
        }
        if let Some(completed_at) = order.completed_at
            && completed_at >= today
        {
            revenue_today += order.total_amount;
        }
    }

    let total_products = catalog.list_all()?.len();
    let low_stock = catalog
        .low_stock(low_stock_threshold)?
        .into_iter()
        .map(|p| LowStockItem {
            product_id: p.id,
            name: p.name,
            stock: p.stock,
        })
        .collect();

    Ok(ShopSummary {
        total_products,
        active_orders,
        completed_orders,
        cancelled_orders,
        orders_today,
        revenue_today,
        low_stock,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{LineItem, OrderDraft, ProductCreate};
    use crate::db::store::ShopStore;

    fn draft(code: &str, phone: &str, product_id: u32, price: i64) -> OrderDraft {
        OrderDraft {
            order_id: code.to_string(),
            customer_name: "Asha".to_string(),
            phone_number: phone.to_string(),
            room_number: "B-214".to_string(),
            notes: None,
            items: vec![LineItem {
                product_id,
                name: "Lays Classic".to_string(),
                price: Decimal::from(price),
                qty: 1,
            }],
            total_amount: Decimal::from(price),
        }
    }

    #[test]
    fn test_summary_rollup() {
        let store = ShopStore::open_in_memory().unwrap();
        let catalog = CatalogStore::new(store.clone());
        let ledger = OrderLedger::new(store, catalog.clone(), 15 * 60 * 1000);

        let lays = catalog
            .create(ProductCreate {
                name: "Lays Classic".to_string(),
                category: "Snacks".to_string(),
                price: Decimal::from(20),
                stock: 3,
                active: true,
            })
            .unwrap();

        ledger.create(draft("AA11", "9000000001", lays.id, 20)).unwrap();
        ledger.create(draft("BB22", "9000000002", lays.id, 35)).unwrap();
        ledger.create(draft("CC33", "9000000003", lays.id, 50)).unwrap();
        ledger.mark_completed("BB22").unwrap();
        ledger.cancel("CC33").unwrap();

        let summary = shop_summary(&catalog, &ledger, 5).unwrap();
        assert_eq!(summary.total_products, 1);
        assert_eq!(summary.active_orders, 1);
        assert_eq!(summary.completed_orders, 1);
        assert_eq!(summary.cancelled_orders, 1);
        assert_eq!(summary.orders_today, 3);
        assert_eq!(summary.revenue_today, Decimal::from(35));

        // Cancel restored one unit on top of the seeded 3; 4 is under the threshold
        assert_eq!(summary.low_stock.len(), 1);
        assert_eq!(summary.low_stock[0].stock, 4);
    }


    #[test]
    fn test_summary_on_empty_shop() {
        let store = ShopStore::open_in_memory().unwrap();
        let catalog = CatalogStore::new(store.clone());
        let ledger = OrderLedger::new(store, catalog.clone(), 15 * 60 * 1000);

        let summary = shop_summary(&catalog, &ledger, 5).unwrap();
        assert_eq!(summary.total_products, 0);
        assert_eq!(summary.active_orders, 0);
        assert_eq!(summary.orders_today, 0);
        assert_eq!(summary.revenue_today, Decimal::ZERO);
        assert!(summary.low_stock.is_empty());
    }
}
