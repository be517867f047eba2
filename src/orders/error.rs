//! 订单错误类型 / Order error types
//!
//! Most of these are normal business outcomes, not faults: a sold-out
//! product, a second tap on the cancel button, a pick attempt on an expired
//! order. Callers match on them to produce user-facing messages; only
//! `Storage` indicates something actually broke.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::db::models::OrderStatus;
use crate::db::store::StoreError;

#[derive(Debug, Error)]
pub enum OrderError {
    // ========== Input & Catalog ==========
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Product not found: {0}")]
    ProductNotFound(u32),

    #[error("Product not available: {name}")]
    ProductInactive { name: String },

    #[error("Insufficient stock for {name}: {available} available")]
    InsufficientStock { name: String, available: i32 },

    #[error("Phone {phone} already has active order {existing}")]
    DuplicateActiveOrder { phone: String, existing: String },

    // ========== Lifecycle ==========
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Cannot {attempted} order {order_id} in status {status}")]
    InvalidTransition {
        order_id: String,
        status: OrderStatus,
        attempted: &'static str,
    },

    #[error("Order {order_id} already finalized as {status}")]
    AlreadyTerminal {
        order_id: String,
        status: OrderStatus,
    },

    // ========== Id Allocation ==========
    #[error("Order id already exists: {0}")]
    DuplicateId(String),

    #[error("Could not allocate a free order id after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    // ========== Infrastructure ==========
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl OrderError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<CatalogError> for OrderError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => Self::ProductNotFound(id),
            CatalogError::InsufficientStock { name, available } => {
                Self::InsufficientStock { name, available }
            }
            CatalogError::Invalid(msg) => Self::Validation(msg),
            CatalogError::Storage(e) => Self::Storage(e),
        }
    }
}
