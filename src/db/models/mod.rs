//! Data models

pub mod order;
pub mod product;

pub use order::{LineItem, Order, OrderDraft, OrderStatus};
pub use product::{Product, ProductCreate};
