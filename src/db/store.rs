//! redb-based storage layer
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `product_id` | `Product` | 商品目录 |
//! | `orders` | `order_id` | `Order` | 订单总账 |
//! | `active_orders` | `order_id` | `()` | 活跃订单索引 |
//! | `active_phones` | `phone` | `order_id` | 活跃手机号唯一约束 |
//! | `meta` | `key` | `u64` | 持久计数器 |
//!
//! # Durability
//!
//! redb uses `Durability::Immediate` by default: once `commit()` returns the
//! write survives power loss and the file stays consistent. `begin_write()`
//! is exclusive, which makes every transaction here one serialized
//! read-verify-write step. Callers keep those transactions short — one stock
//! adjustment or one order transition, never a whole multi-item reservation.
//!
//! The `active_phones` table is the storage-enforced version of the
//! one-active-order-per-phone rule: the claim is inserted in the same
//! transaction as the order and removed in the same transaction as the
//! terminal transition, so two racing requests can never both hold it.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::db::models::{Order, Product};

/// Product catalog: key = product id, value = JSON-serialized Product
const PRODUCTS_TABLE: TableDefinition<u32, &[u8]> = TableDefinition::new("products");

/// Order ledger: key = order id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Index of orders in an active status: key = order id, value = empty
const ACTIVE_ORDERS_TABLE: TableDefinition<&str, ()> = TableDefinition::new("active_orders");

/// One active order per phone: key = phone number, value = order id
const ACTIVE_PHONES_TABLE: TableDefinition<&str, &str> = TableDefinition::new("active_phones");

/// Persistent counters: key = counter name, value = last issued value
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");

const PRODUCT_SEQ_KEY: &str = "product_seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Shop storage backed by redb
#[derive(Clone)]
pub struct ShopStore {
    db: Arc<Database>,
}

impl ShopStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Create all tables up front so read transactions never hit a missing table
    fn init_tables(&self) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let _ = txn.open_table(PRODUCTS_TABLE)?;
            let _ = txn.open_table(ORDERS_TABLE)?;
            let _ = txn.open_table(ACTIVE_ORDERS_TABLE)?;
            let _ = txn.open_table(ACTIVE_PHONES_TABLE)?;

            let mut meta = txn.open_table(META_TABLE)?;
            if meta.get(PRODUCT_SEQ_KEY)?.is_none() {
                meta.insert(PRODUCT_SEQ_KEY, 0u64)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Commit a write transaction
    pub fn commit(&self, txn: WriteTransaction) -> StoreResult<()> {
        Ok(txn.commit()?)
    }

    // ========== Product Operations ==========

    /// Issue the next product id from the persistent counter (within transaction)
    pub fn next_product_id(&self, txn: &WriteTransaction) -> StoreResult<u32> {
        let mut table = txn.open_table(META_TABLE)?;
        let current = table
            .get(PRODUCT_SEQ_KEY)?
            .map(|g| g.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(PRODUCT_SEQ_KEY, next)?;
        Ok(next as u32)
    }

    /// Write a product (within transaction)
    pub fn write_product_txn(&self, txn: &WriteTransaction, product: &Product) -> StoreResult<()> {
        let mut table = txn.open_table(PRODUCTS_TABLE)?;
        let value = serde_json::to_vec(product)?;
        table.insert(product.id, value.as_slice())?;
        Ok(())
    }

    /// Read a product (within transaction)
    pub fn read_product_txn(&self, txn: &WriteTransaction, id: u32) -> StoreResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;
        match table.get(id)? {
            Some(value) => {
                let product: Product = serde_json::from_slice(value.value())?;
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }

    /// Read a product (read-only)
    pub fn get_product(&self, id: u32) -> StoreResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        match table.get(id)? {
            Some(value) => {
                let product: Product = serde_json::from_slice(value.value())?;
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }

    /// All products, in id order
    pub fn list_products(&self) -> StoreResult<Vec<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;

        let mut products = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let product: Product = serde_json::from_slice(value.value())?;
            products.push(product);
        }
        Ok(products)
    }

    /// Remove a product row (test helper for the missing-product restore path)
    #[cfg(test)]
    pub fn delete_product(&self, id: u32) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            table.remove(id)?;
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Order Operations ==========

    /// Write an order (within transaction); inserts or overwrites
    pub fn write_order_txn(&self, txn: &WriteTransaction, order: &Order) -> StoreResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Read an order (within transaction)
    pub fn read_order_txn(&self, txn: &WriteTransaction, order_id: &str) -> StoreResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => {
                let order: Order = serde_json::from_slice(value.value())?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// Read an order (read-only)
    pub fn get_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => {
                let order: Order = serde_json::from_slice(value.value())?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// All orders, in code order
    pub fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            orders.push(order);
        }
        Ok(orders)
    }

    // ========== Active Order Index ==========

    /// Mark an order as active (within transaction)
    pub fn mark_order_active_txn(&self, txn: &WriteTransaction, order_id: &str) -> StoreResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.insert(order_id, ())?;
        Ok(())
    }

    /// Remove an order from the active index (within transaction)
    pub fn clear_order_active_txn(&self, txn: &WriteTransaction, order_id: &str) -> StoreResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    /// All active order ids
    pub fn active_order_ids(&self) -> StoreResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;

        let mut order_ids = Vec::new();
        for result in table.iter()? {
            let (key, _value) = result?;
            order_ids.push(key.value().to_string());
        }
        Ok(order_ids)
    }

    /// All active orders (index join, single read transaction)
    pub fn active_orders(&self) -> StoreResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let active_table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let orders_table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in active_table.iter()? {
            let (key, _value) = result?;
            if let Some(value) = orders_table.get(key.value())? {
                let order: Order = serde_json::from_slice(value.value())?;
                orders.push(order);
            }
        }
        Ok(orders)
    }

    // ========== Phone Uniqueness Constraint ==========

    /// Claim a phone number for an order (within transaction).
    ///
    /// Returns the already-claiming order id instead of inserting when the
    /// phone is taken, which is what makes the one-active-order-per-phone
    /// rule race-free: claim and order insert commit together.
    pub fn claim_phone_txn(
        &self,
        txn: &WriteTransaction,
        phone: &str,
        order_id: &str,
    ) -> StoreResult<Option<String>> {
        let mut table = txn.open_table(ACTIVE_PHONES_TABLE)?;

        let existing = table.get(phone)?.map(|g| g.value().to_string());
        if let Some(existing) = existing {
            return Ok(Some(existing));
        }

        table.insert(phone, order_id)?;
        Ok(None)
    }

    /// Release a phone claim (within transaction); no-op when absent
    pub fn release_phone_txn(&self, txn: &WriteTransaction, phone: &str) -> StoreResult<()> {
        let mut table = txn.open_table(ACTIVE_PHONES_TABLE)?;
        table.remove(phone)?;
        Ok(())
    }

    /// Current claim for a phone, if any (read-only)
    pub fn phone_claim(&self, phone: &str) -> StoreResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVE_PHONES_TABLE)?;
        Ok(table.get(phone)?.map(|g| g.value().to_string()))
    }
}
