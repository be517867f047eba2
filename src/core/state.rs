//! 服务器状态 / Server state
//!
//! Wires storage, catalog, ledger and engine together. Every component is
//! cheap to clone (an `Arc` around the database underneath), so the state
//! can be handed to any surface that needs it.

use std::sync::Arc;

use anyhow::Context;

use crate::catalog::CatalogStore;
use crate::core::config::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::db::store::ShopStore;
use crate::notify::NotificationHook;
use crate::orders::engine::ReservationEngine;
use crate::orders::error::OrderResult;
use crate::orders::ledger::OrderLedger;
use crate::orders::sweeper::ExpirySweeper;
use crate::reports::{ShopSummary, shop_summary};

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: ShopStore,
    pub catalog: CatalogStore,
    pub ledger: OrderLedger,
    pub engine: ReservationEngine,
}

impl ServerState {
    /// Open storage and build the component graph
    pub fn initialize(config: &Config, hook: Arc<dyn NotificationHook>) -> anyhow::Result<Self> {
        config
            .ensure_work_dir()
            .with_context(|| format!("Failed to create work dir {}", config.work_dir))?;

        let db_path = config.database_path();
        let store = ShopStore::open(&db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
        let catalog = CatalogStore::new(store.clone());
        let ledger = OrderLedger::new(store.clone(), catalog.clone(), config.hold_window_millis());
        let engine = ReservationEngine::new(catalog.clone(), ledger.clone(), hook);

        tracing::info!(
            work_dir = %config.work_dir,
            environment = %config.environment,
            "Server state initialized"
        );

        Ok(Self {
            config: config.clone(),
            store,
            catalog,
            ledger,
            engine,
        })
    }

    /// Register the long-running tasks on the shared shutdown token
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let sweeper = ExpirySweeper::new(
            self.ledger.clone(),
            self.config.sweep_interval(),
            tasks.shutdown_token(),
        );
        tasks.spawn("expiry_sweeper", TaskKind::Periodic, sweeper.run());
    }

    pub fn shop_summary(&self) -> OrderResult<ShopSummary> {
        shop_summary(&self.catalog, &self.ledger, self.config.low_stock_threshold)
    }
}
