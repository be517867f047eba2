//! 通知模块 / Notification module
//!
//! Side-channel announcements of order events (door signage, a staff group
//! chat, whatever the deployment wires in). Strictly best effort: the order
//! flow never fails or blocks on a hook, and errors are logged then
//! forgotten. A hook may return an external message reference, which gets
//! stored on the order for later correlation.

use async_trait::async_trait;

use crate::db::models::Order;
use crate::utils::time::format_millis;

#[async_trait]
pub trait NotificationHook: Send + Sync {
    /// A reservation was created. May return an external message reference.
    async fn order_created(&self, order: &Order) -> anyhow::Result<Option<String>>;

    /// A reservation was picked up by staff.
    async fn order_picked(&self, order: &Order) -> anyhow::Result<()>;
}

/// Hook that does nothing; for tests and headless deployments
pub struct NoopNotifier;

#[async_trait]
impl NotificationHook for NoopNotifier {
    async fn order_created(&self, _order: &Order) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    async fn order_picked(&self, _order: &Order) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Hook that announces events to the server log
pub struct LogNotifier;

#[async_trait]
impl NotificationHook for LogNotifier {
    async fn order_created(&self, order: &Order) -> anyhow::Result<Option<String>> {
        let items: Vec<String> = order
            .items
            .iter()
            .map(|i| format!("{} x{}", i.name, i.qty))
            .collect();
        tracing::info!(
            order_id = %order.order_id,
            customer = %order.customer_name,
            room = %order.room_number,
            items = %items.join(", "),
            total = %order.total_amount,
            pickup_by = %format_millis(order.expires_at),
            "New reservation"
        );
        Ok(None)
    }

    async fn order_picked(&self, order: &Order) -> anyhow::Result<()> {
        tracing::info!(
            order_id = %order.order_id,
            customer = %order.customer_name,
            "Reservation picked up"
        );
        Ok(())
    }
}
