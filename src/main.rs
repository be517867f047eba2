use std::sync::Arc;

use shop_server::{
    BackgroundTasks, Config, LogNotifier, ServerState, init_logger_with_file, print_banner,
    seed_demo_catalog,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(None, config.log_dir.as_deref());
    print_banner();
    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        "Shop reservation server starting"
    );

    let state = ServerState::initialize(&config, Arc::new(LogNotifier))?;

    if config.seed_demo_catalog {
        let seeded = seed_demo_catalog(&state.catalog)?;
        if seeded > 0 {
            tracing::info!(products = seeded, "Demo catalog loaded");
        }
    }

    match state.shop_summary() {
        Ok(summary) => {
            tracing::info!(
                products = summary.total_products,
                active = summary.active_orders,
                completed = summary.completed_orders,
                low_stock = summary.low_stock.len(),
                "Shop summary at startup"
            );
        }
        Err(err) => tracing::warn!(error = %err, "Could not compute startup summary"),
    }

    let mut tasks = BackgroundTasks::new();
    state.start_background_tasks(&mut tasks);
    tasks.log_summary();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    tasks.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}
