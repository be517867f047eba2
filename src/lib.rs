//! 校园小卖部预订服务器 / Campus shop reservation server
//!
//! Customers reserve items by phone number and pick them up at the counter
//! with a short order code. The server owns the catalog, reserves stock
//! atomically, walks each order through its lifecycle and sweeps lapsed
//! reservations back onto the shelf.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                ServerState                  │
//! │  ┌──────────┐  ┌──────────┐  ┌───────────┐  │
//! │  │ catalog  │  │  orders  │  │  reports  │  │
//! │  │ products │  │ engine   │  │ summary   │  │
//! │  │ stock    │  │ ledger   │  │ low stock │  │
//! │  │ seed     │  │ sweeper  │  └───────────┘  │
//! │  └────┬─────┘  └────┬─────┘                 │
//! │       └───────┬─────┘                       │
//! │          ┌────┴────┐      ┌──────────────┐  │
//! │          │   db    │      │    notify    │  │
//! │          │  redb   │      │ hook (best   │  │
//! │          │ storage │      │   effort)    │  │
//! │          └─────────┘      └──────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod core;
pub mod db;
pub mod notify;
pub mod orders;
pub mod reports;
pub mod utils;

pub use crate::core::{BackgroundTasks, Config, ServerState, TaskKind};
pub use catalog::seed::seed_demo_catalog;
pub use catalog::{CatalogError, CatalogResult, CatalogStore};
pub use db::models;
pub use db::{ShopStore, StoreError, StoreResult};
pub use notify::{LogNotifier, NoopNotifier, NotificationHook};
pub use orders::{
    ExpirySweeper, ItemRequest, OrderError, OrderInput, OrderLedger, OrderResult,
    ReservationEngine,
};
pub use reports::{LowStockItem, ShopSummary, shop_summary};
pub use utils::logger::{init_logger, init_logger_with_file};

/// 打印启动横幅 / Print the startup banner
pub fn print_banner() {
    println!(
        r#"
   _____ __
  / ___// /_  ____  ____
  \__ \/ __ \/ __ \/ __ \
 ___/ / / / / /_/ / /_/ /
/____/_/ /_/\____/ .___/
                /_/
  Campus Shop Reservation Server v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
