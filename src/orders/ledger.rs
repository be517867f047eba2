//! 订单总账 / Order ledger
//!
//! Persistence and lifecycle rules for orders. Every transition here is one
//! write transaction that re-reads the order, checks the current status, and
//! commits the new state together with its side effects (stock restore,
//! phone release, active-index maintenance). Because `begin_write` is
//! exclusive, two racing transitions serialize: the first one wins and the
//! second sees the already-updated status and reports a lifecycle error
//! instead of repeating the side effects.

use crate::catalog::CatalogStore;
use crate::db::models::{Order, OrderDraft, OrderStatus};
use crate::db::store::{ShopStore, StoreError};
use crate::orders::error::{OrderError, OrderResult};
use crate::utils::time::now_millis;

/// Order ledger backed by [`ShopStore`]
#[derive(Clone)]
pub struct OrderLedger {
    store: ShopStore,
    catalog: CatalogStore,
    /// How long a reservation is held before the sweeper may cancel it
    hold_millis: i64,
}

impl OrderLedger {
    pub fn new(store: ShopStore, catalog: CatalogStore, hold_millis: i64) -> Self {
        Self {
            store,
            catalog,
            hold_millis,
        }
    }

    // ========== Creation ==========

    /// Persist a new reservation.
    ///
    /// The order row, the active-index entry and the phone claim commit in
    /// one transaction. A code collision aborts with `DuplicateId` (the
    /// caller redraws), and a phone that already holds an active order
    /// aborts with `DuplicateActiveOrder` even when two requests race past
    /// the engine's advisory check.
    pub fn create(&self, draft: OrderDraft) -> OrderResult<Order> {
        let now = now_millis();
        let order = Order {
            order_id: draft.order_id,
            customer_name: draft.customer_name,
            phone_number: draft.phone_number,
            room_number: draft.room_number,
            notes: draft.notes,
            items: draft.items,
            total_amount: draft.total_amount,
            status: OrderStatus::Reserved,
            created_at: now,
            expires_at: now + self.hold_millis,
            picked_at: None,
            completed_at: None,
            cancelled_at: None,
            notification_ref: None,
        };

        let txn = self.store.begin_write()?;
        if self.store.read_order_txn(&txn, &order.order_id)?.is_some() {
            return Err(OrderError::DuplicateId(order.order_id));
        }
        if let Some(existing) = self
            .store
            .claim_phone_txn(&txn, &order.phone_number, &order.order_id)?
        {
            return Err(OrderError::DuplicateActiveOrder {
                phone: order.phone_number,
                existing,
            });
        }
        self.store.write_order_txn(&txn, &order)?;
        self.store.mark_order_active_txn(&txn, &order.order_id)?;
        self.store.commit(txn)?;

        tracing::info!(
            order_id = %order.order_id,
            phone = %order.phone_number,
            items = order.items.len(),
            total = %order.total_amount,
            "Order created"
        );
        Ok(order)
    }

    // ========== Transitions ==========

    /// reserved → picked
    pub fn mark_picked(&self, order_id: &str) -> OrderResult<Order> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .read_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        if order.status != OrderStatus::Reserved {
            return Err(OrderError::InvalidTransition {
                order_id: order.order_id,
                status: order.status,
                attempted: "pick",
            });
        }

        order.status = OrderStatus::Picked;
        order.picked_at = Some(now_millis());
        self.store.write_order_txn(&txn, &order)?;
        self.store.commit(txn)?;

        tracing::info!(order_id = %order.order_id, "Order picked");
        Ok(order)
    }

    /// reserved|picked → completed; releases the phone for the next order
    pub fn mark_completed(&self, order_id: &str) -> OrderResult<Order> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .read_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        if !order.status.is_active() {
            return Err(OrderError::InvalidTransition {
                order_id: order.order_id,
                status: order.status,
                attempted: "complete",
            });
        }

        order.status = OrderStatus::Completed;
        order.completed_at = Some(now_millis());
        self.store.write_order_txn(&txn, &order)?;
        self.store.release_phone_txn(&txn, &order.phone_number)?;
        self.store.clear_order_active_txn(&txn, &order.order_id)?;
        self.store.commit(txn)?;

        tracing::info!(order_id = %order.order_id, "Order completed");
        Ok(order)
    }

    /// reserved|picked → cancelled, restoring each line's stock.
    ///
    /// Status check, restores and status flip share one transaction, so the
    /// restore happens exactly once: a repeated cancel finds the order
    /// already terminal and stops at `AlreadyTerminal` before touching
    /// stock. A line whose product row has since been deleted is logged and
    /// skipped; it must not block the cancellation of the rest.
    pub fn cancel(&self, order_id: &str) -> OrderResult<Order> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .read_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        if order.status.is_terminal() {
            return Err(OrderError::AlreadyTerminal {
                order_id: order.order_id,
                status: order.status,
            });
        }

        for item in &order.items {
            match self.catalog.adjust_stock_in(&txn, item.product_id, item.qty)? {
                Some(stock) => {
                    tracing::debug!(
                        order_id = %order.order_id,
                        product_id = item.product_id,
                        qty = item.qty,
                        stock,
                        "Stock restored"
                    );
                }
                None => {
                    tracing::warn!(
                        order_id = %order.order_id,
                        product_id = item.product_id,
                        qty = item.qty,
                        "Product missing during stock restore, line skipped"
                    );
                }
            }
        }

        order.status = OrderStatus::Cancelled;
        order.cancelled_at = Some(now_millis());
        self.store.write_order_txn(&txn, &order)?;
        self.store.release_phone_txn(&txn, &order.phone_number)?;
        self.store.clear_order_active_txn(&txn, &order.order_id)?;
        self.store.commit(txn)?;

        tracing::info!(
            order_id = %order.order_id,
            items = order.items.len(),
            "Order cancelled, stock restored"
        );
        Ok(order)
    }

    // ========== Queries ==========

    pub fn get(&self, order_id: &str) -> OrderResult<Order> {
        self.store
            .get_order(order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    /// Whether an order id is already in use
    pub fn exists(&self, order_id: &str) -> Result<bool, StoreError> {
        Ok(self.store.get_order(order_id)?.is_some())
    }

    /// Active order currently claiming this phone, if any
    pub fn find_active_by_phone(&self, phone: &str) -> OrderResult<Option<Order>> {
        match self.store.phone_claim(phone)? {
            Some(order_id) => Ok(self.store.get_order(&order_id)?),
            None => Ok(None),
        }
    }

    /// Reserved orders whose hold window has lapsed
    pub fn find_expired(&self, now: i64) -> OrderResult<Vec<Order>> {
        let expired = self
            .store
            .active_orders()?
            .into_iter()
            .filter(|o| o.status == OrderStatus::Reserved && o.expires_at < now)
            .collect();
        Ok(expired)
    }

    /// Active orders, newest first
    pub fn list_active(&self) -> OrderResult<Vec<Order>> {
        let mut orders = self.store.active_orders()?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    pub fn list_all(&self) -> OrderResult<Vec<Order>> {
        Ok(self.store.list_orders()?)
    }

    // ========== Post-creation Metadata ==========

    /// Attach the notification reference returned by the hook
    pub fn set_notification_ref(&self, order_id: &str, reference: &str) -> OrderResult<()> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .read_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        order.notification_ref = Some(reference.to_string());
        self.store.write_order_txn(&txn, &order)?;
        self.store.commit(txn)?;
        Ok(())
    }

    /// Force an order's expiry into the past (test helper)
    #[cfg(test)]
    pub fn backdate_expiry(&self, order_id: &str, expires_at: i64) -> OrderResult<()> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .read_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        order.expires_at = expires_at;
        self.store.write_order_txn(&txn, &order)?;
        self.store.commit(txn)?;
        Ok(())
    }
}
