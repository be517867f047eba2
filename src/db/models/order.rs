//! Order Model
//!
//! 订单状态机：
//!
//! ```text
//! reserved ──> picked ──> completed
//!     │           │
//!     └───────────┴─────> cancelled
//! ```
//!
//! `completed` 和 `cancelled` 是终态，任何后续转换都会被拒绝。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// 库存已扣减，等待取货
    #[default]
    Reserved,
    /// 顾客已到店取货，待结算
    Picked,
    /// 交易完成（终态）
    Completed,
    /// 已取消，库存已恢复（终态）
    Cancelled,
}

impl OrderStatus {
    /// 活跃状态：仍占用库存和手机号
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Reserved | OrderStatus::Picked)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Reserved => "reserved",
            OrderStatus::Picked => "picked",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line snapshot frozen at creation time
///
/// Name and price are copied from the product so later catalog edits never
/// change what the customer agreed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: u32,
    pub name: String,
    pub price: Decimal,
    pub qty: i32,
}

impl LineItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}

/// 订单 - 一次预约到取货的完整记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// 4-char code, two uppercase letters + two digits, immutable
    pub order_id: String,
    pub customer_name: String,
    /// Exactly 10 ASCII digits
    pub phone_number: String,
    pub room_number: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<LineItem>,
    /// Σ(price × qty), computed once at creation
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: i64,
    /// created_at + hold window; sweeper cancels reserved orders past this
    pub expires_at: i64,
    #[serde(default)]
    pub picked_at: Option<i64>,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub cancelled_at: Option<i64>,
    /// Opaque handle returned by the notification hook (e.g. a message id)
    #[serde(default)]
    pub notification_ref: Option<String>,
}

/// Pre-insert payload; the ledger stamps status and all time fields
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub order_id: String,
    pub customer_name: String,
    pub phone_number: String,
    pub room_number: String,
    pub notes: Option<String>,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
}
