//! 演示商品数据 / Demo catalog seeding
//!
//! Loads a starter catalog on first boot so a fresh install has something to
//! sell. Skipped entirely once any product exists.

use rust_decimal::Decimal;

use crate::catalog::{CatalogResult, CatalogStore};
use crate::db::models::ProductCreate;

/// (name, category, price, stock)
const DEMO_CATALOG: &[(&str, &str, i64, i32)] = &[
    ("Lays Classic", "Snacks", 20, 50),
    ("Kurkure", "Snacks", 10, 60),
    ("Bingo Mad Angles", "Snacks", 15, 40),
    ("Parle-G", "Snacks", 5, 100),
    ("Coca Cola", "Beverages", 40, 30),
    ("Sprite", "Beverages", 40, 30),
    ("Red Bull", "Beverages", 120, 20),
    ("Water Bottle", "Beverages", 20, 100),
    ("Classmate Notebook", "Stationery", 50, 25),
    ("Pen Set", "Stationery", 30, 35),
    ("Pencil Box", "Stationery", 80, 15),
    ("Maggi Noodles", "Instant Food", 12, 80),
    ("Cup Noodles", "Instant Food", 30, 40),
    ("Oats Pack", "Instant Food", 45, 30),
    ("Hand Sanitizer", "Hygiene", 50, 40),
    ("Tissues Pack", "Hygiene", 25, 50),
];

/// Seed the demo catalog into an empty store. Returns how many products
/// were created (0 when the catalog already has data).
pub fn seed_demo_catalog(catalog: &CatalogStore) -> CatalogResult<usize> {
    if !catalog.list_all()?.is_empty() {
        tracing::debug!("Catalog already populated, skipping demo seed");
        return Ok(0);
    }

    for (name, category, price, stock) in DEMO_CATALOG {
        catalog.create(ProductCreate {
            name: name.to_string(),
            category: category.to_string(),
            price: Decimal::from(*price),
            stock: *stock,
            active: true,
        })?;
    }

    tracing::info!(count = DEMO_CATALOG.len(), "Demo catalog seeded");
    Ok(DEMO_CATALOG.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::ShopStore;

    #[test]
    fn test_seed_populates_empty_catalog_once() {
        let catalog = CatalogStore::new(ShopStore::open_in_memory().unwrap());

        assert_eq!(seed_demo_catalog(&catalog).unwrap(), DEMO_CATALOG.len());
        assert_eq!(catalog.list_active().unwrap().len(), DEMO_CATALOG.len());

        // Second run is a no-op
        assert_eq!(seed_demo_catalog(&catalog).unwrap(), 0);
        assert_eq!(catalog.list_all().unwrap().len(), DEMO_CATALOG.len());
    }
}
