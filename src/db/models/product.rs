//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 商品 - 货架上的一种库存条目
///
/// `stock` 只能通过 `CatalogStore::adjust_stock` 修改，保证不为负。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Assigned from the persistent counter at creation, stable afterwards
    pub id: u32,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    /// Units currently available for reservation
    pub stock: i32,
    /// Whether the product appears in the public catalog
    #[serde(default = "default_true")]
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

/// Creation payload; id and timestamps are assigned by the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub stock: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_json_roundtrip() {
        let product = Product {
            id: 7,
            name: "Maggi Noodles".to_string(),
            category: "Instant Food".to_string(),
            price: Decimal::from(12),
            stock: 80,
            active: true,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        };

        let json = serde_json::to_vec(&product).unwrap();
        let back: Product = serde_json::from_slice(&json).unwrap();
        assert_eq!(back.id, 7);
        assert_eq!(back.price, Decimal::from(12));
        assert_eq!(back.stock, 80);
    }

    #[test]
    fn test_active_defaults_to_true() {
        // Rows written before the `active` flag existed keep appearing in the catalog
        let json = r#"{"id":1,"name":"Parle-G","category":"Snacks","price":"5","stock":100,"created_at":0,"updated_at":0}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.active);
    }
}
