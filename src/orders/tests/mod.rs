//! Order module tests: shared fixtures and hooks

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::catalog::CatalogStore;
use crate::db::models::{Order, ProductCreate};
use crate::db::store::ShopStore;
use crate::notify::NotificationHook;
use crate::orders::engine::{ItemRequest, OrderInput, ReservationEngine};
use crate::orders::ledger::OrderLedger;

pub const TEST_HOLD_MILLIS: i64 = 15 * 60 * 1000;

/// Hook that records every event and can be told to fail
pub struct RecordingHook {
    events: Mutex<Vec<String>>,
    pub fail_created: AtomicBool,
    pub created_ref: Mutex<Option<String>>,
}

impl RecordingHook {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_created: AtomicBool::new(false),
            created_ref: Mutex::new(None),
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationHook for RecordingHook {
    async fn order_created(&self, order: &Order) -> anyhow::Result<Option<String>> {
        if self.fail_created.load(Ordering::SeqCst) {
            anyhow::bail!("signage offline");
        }
        self.events
            .lock()
            .unwrap()
            .push(format!("created:{}", order.order_id));
        Ok(self.created_ref.lock().unwrap().clone())
    }

    async fn order_picked(&self, order: &Order) -> anyhow::Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("picked:{}", order.order_id));
        Ok(())
    }
}

pub struct TestShop {
    pub store: ShopStore,
    pub catalog: CatalogStore,
    pub ledger: OrderLedger,
    pub engine: ReservationEngine,
    pub hook: Arc<RecordingHook>,
}

pub fn test_shop() -> TestShop {
    let store = ShopStore::open_in_memory().unwrap();
    let catalog = CatalogStore::new(store.clone());
    let ledger = OrderLedger::new(store.clone(), catalog.clone(), TEST_HOLD_MILLIS);
    let hook = Arc::new(RecordingHook::new());
    let engine = ReservationEngine::new(catalog.clone(), ledger.clone(), hook.clone());
    TestShop {
        store,
        catalog,
        ledger,
        engine,
        hook,
    }
}

pub fn seed_product(catalog: &CatalogStore, name: &str, price: i64, stock: i32) -> u32 {
    catalog
        .create(ProductCreate {
            name: name.to_string(),
            category: "Snacks".to_string(),
            price: Decimal::from(price),
            stock,
            active: true,
        })
        .unwrap()
        .id
}

pub fn order_input(phone: &str, items: Vec<(u32, i32)>) -> OrderInput {
    OrderInput {
        customer_name: "Asha".to_string(),
        phone_number: phone.to_string(),
        room_number: "B-214".to_string(),
        notes: None,
        items: items
            .into_iter()
            .map(|(product_id, qty)| ItemRequest { product_id, qty })
            .collect(),
    }
}

mod test_core;
