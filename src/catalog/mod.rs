//! 商品目录模块 / Product catalog module
//!
//! Owns the product table and the single stock-mutation primitive,
//! [`CatalogStore::adjust_stock`]: one write transaction that re-reads the
//! row, applies the delta, and refuses to let stock go negative. All
//! reservation and restore traffic funnels through it (or its in-transaction
//! sibling [`CatalogStore::adjust_stock_in`]), so stock can never be oversold
//! no matter how many requests race.

pub mod seed;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::db::models::{Product, ProductCreate};
use crate::db::store::{ShopStore, StoreError};
use crate::utils::time::now_millis;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    NotFound(u32),

    #[error("Insufficient stock for {name}: {available} available")]
    InsufficientStock { name: String, available: i32 },

    #[error("Invalid product data: {0}")]
    Invalid(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Product catalog backed by [`ShopStore`]
#[derive(Clone)]
pub struct CatalogStore {
    store: ShopStore,
}

impl CatalogStore {
    pub fn new(store: ShopStore) -> Self {
        Self { store }
    }

    // ========== Queries ==========

    /// Fetch a product by id
    pub fn get(&self, id: u32) -> CatalogResult<Product> {
        self.store
            .get_product(id)?
            .ok_or(CatalogError::NotFound(id))
    }

    /// All products, including deactivated ones
    pub fn list_all(&self) -> CatalogResult<Vec<Product>> {
        Ok(self.store.list_products()?)
    }

    /// Products visible to customers, sorted by category then name
    pub fn list_active(&self) -> CatalogResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .store
            .list_products()?
            .into_iter()
            .filter(|p| p.active)
            .collect();
        products.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(products)
    }

    /// Active products at or below the restock threshold, lowest stock first
    pub fn low_stock(&self, threshold: i32) -> CatalogResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .store
            .list_products()?
            .into_iter()
            .filter(|p| p.active && p.stock <= threshold)
            .collect();
        products.sort_by_key(|p| p.stock);
        Ok(products)
    }

    // ========== Mutations ==========

    /// Create a product with a freshly issued id
    pub fn create(&self, input: ProductCreate) -> CatalogResult<Product> {
        if input.name.trim().is_empty() {
            return Err(CatalogError::Invalid("name cannot be empty".to_string()));
        }
        if input.stock < 0 {
            return Err(CatalogError::Invalid("stock cannot be negative".to_string()));
        }
        if input.price < Decimal::ZERO {
            return Err(CatalogError::Invalid("price cannot be negative".to_string()));
        }

        let now = now_millis();
        let txn = self.store.begin_write()?;
        let product = {
            let id = self.store.next_product_id(&txn)?;
            let product = Product {
                id,
                name: input.name.trim().to_string(),
                category: input.category.trim().to_string(),
                price: input.price,
                stock: input.stock,
                active: input.active,
                created_at: now,
                updated_at: now,
            };
            self.store.write_product_txn(&txn, &product)?;
            product
        };
        self.store.commit(txn)?;

        tracing::info!(
            product_id = product.id,
            name = %product.name,
            stock = product.stock,
            "Product created"
        );
        Ok(product)
    }

    /// Show or hide a product without touching its stock
    pub fn set_active(&self, id: u32, active: bool) -> CatalogResult<Product> {
        let txn = self.store.begin_write()?;
        let product = {
            let mut product = self
                .store
                .read_product_txn(&txn, id)?
                .ok_or(CatalogError::NotFound(id))?;
            product.active = active;
            product.updated_at = now_millis();
            self.store.write_product_txn(&txn, &product)?;
            product
        };
        self.store.commit(txn)?;
        Ok(product)
    }

    /// Apply a stock delta in one atomic read-verify-write step.
    ///
    /// The row is re-read inside the write transaction, so the check runs
    /// against current stock even when callers raced to get here. A delta
    /// that would take stock below zero aborts with `InsufficientStock` and
    /// leaves the row untouched. Returns the new stock level.
    pub fn adjust_stock(&self, id: u32, delta: i32) -> CatalogResult<i32> {
        let txn = self.store.begin_write()?;
        let (name, next) = {
            let mut product = self
                .store
                .read_product_txn(&txn, id)?
                .ok_or(CatalogError::NotFound(id))?;

            let next = product.stock + delta;
            if next < 0 {
                // Early return drops the transaction, aborting it
                return Err(CatalogError::InsufficientStock {
                    name: product.name,
                    available: product.stock,
                });
            }

            product.stock = next;
            product.updated_at = now_millis();
            self.store.write_product_txn(&txn, &product)?;
            (product.name, next)
        };
        self.store.commit(txn)?;

        tracing::debug!(product_id = id, name = %name, delta, stock = next, "Stock adjusted");
        Ok(next)
    }

    /// Stock adjustment joined to a caller-owned transaction.
    ///
    /// Used by order cancellation so the restore commits atomically with the
    /// status flip. A missing product returns `Ok(None)` rather than an
    /// error; the caller logs and skips that line.
    pub(crate) fn adjust_stock_in(
        &self,
        txn: &redb::WriteTransaction,
        id: u32,
        delta: i32,
    ) -> Result<Option<i32>, StoreError> {
        let Some(mut product) = self.store.read_product_txn(txn, id)? else {
            return Ok(None);
        };
        product.stock += delta;
        product.updated_at = now_millis();
        self.store.write_product_txn(txn, &product)?;
        Ok(Some(product.stock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_catalog() -> CatalogStore {
        CatalogStore::new(ShopStore::open_in_memory().unwrap())
    }

    fn product_input(name: &str, price: i64, stock: i32) -> ProductCreate {
        ProductCreate {
            name: name.to_string(),
            category: "Snacks".to_string(),
            price: Decimal::from(price),
            stock,
            active: true,
        }
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let catalog = test_catalog();

        let first = catalog.create(product_input("Lays Classic", 20, 50)).unwrap();
        let second = catalog.create(product_input("Kurkure", 10, 60)).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(first.created_at > 0);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let catalog = test_catalog();

        assert!(matches!(
            catalog.create(product_input("  ", 20, 50)),
            Err(CatalogError::Invalid(_))
        ));
        assert!(matches!(
            catalog.create(product_input("Lays Classic", 20, -1)),
            Err(CatalogError::Invalid(_))
        ));
        assert!(matches!(
            catalog.create(product_input("Lays Classic", -5, 50)),
            Err(CatalogError::Invalid(_))
        ));
    }

    #[test]
    fn test_adjust_stock_moves_both_ways() {
        let catalog = test_catalog();
        let product = catalog.create(product_input("Maggi Noodles", 12, 80)).unwrap();

        assert_eq!(catalog.adjust_stock(product.id, -3).unwrap(), 77);
        assert_eq!(catalog.adjust_stock(product.id, 3).unwrap(), 80);
        assert_eq!(catalog.get(product.id).unwrap().stock, 80);
    }

    #[test]
    fn test_adjust_stock_refuses_to_go_negative() {
        let catalog = test_catalog();
        let product = catalog.create(product_input("Red Bull", 120, 2)).unwrap();

        let err = catalog.adjust_stock(product.id, -3).unwrap_err();
        match err {
            CatalogError::InsufficientStock { name, available } => {
                assert_eq!(name, "Red Bull");
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Failed adjustment leaves stock untouched
        assert_eq!(catalog.get(product.id).unwrap().stock, 2);
    }

    #[test]
    fn test_adjust_stock_unknown_product() {
        let catalog = test_catalog();
        assert!(matches!(
            catalog.adjust_stock(42, -1),
            Err(CatalogError::NotFound(42))
        ));
    }

    #[test]
    fn test_set_active_hides_from_listing() {
        let catalog = test_catalog();
        let product = catalog.create(product_input("Sprite", 40, 30)).unwrap();

        catalog.set_active(product.id, false).unwrap();
        assert!(catalog.list_active().unwrap().is_empty());
        assert_eq!(catalog.list_all().unwrap().len(), 1);

        catalog.set_active(product.id, true).unwrap();
        assert_eq!(catalog.list_active().unwrap().len(), 1);
    }

    #[test]
    fn test_list_active_sorted_by_category_then_name() {
        let catalog = test_catalog();
        catalog
            .create(ProductCreate {
                name: "Pen Set".to_string(),
                category: "Stationery".to_string(),
                price: Decimal::from(30),
                stock: 35,
                active: true,
            })
            .unwrap();
        catalog.create(product_input("Parle-G", 5, 100)).unwrap();
        catalog.create(product_input("Bingo Mad Angles", 15, 40)).unwrap();

        let names: Vec<String> = catalog
            .list_active()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Bingo Mad Angles", "Parle-G", "Pen Set"]);
    }

    #[test]
    fn test_low_stock_filters_and_sorts() {
        let catalog = test_catalog();
        catalog.create(product_input("Lays Classic", 20, 50)).unwrap();
        let scarce = catalog.create(product_input("Red Bull", 120, 3)).unwrap();
        catalog.create(product_input("Cup Noodles", 30, 5)).unwrap();
        let hidden = catalog.create(product_input("Oats Pack", 45, 1)).unwrap();
        catalog.set_active(hidden.id, false).unwrap();

        let low = catalog.low_stock(5).unwrap();
        let names: Vec<String> = low.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Red Bull", "Cup Noodles"]);
        assert_eq!(catalog.get(scarce.id).unwrap().stock, 3);
    }
}
