//! 数据库模块 / Database module

pub mod models;
pub mod store;

pub use store::{ShopStore, StoreError, StoreResult};
