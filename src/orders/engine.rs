//! 预订引擎 / Reservation engine
//!
//! Front door of the order system. A reservation runs in stages:
//!
//! 1. validate the request shape
//! 2. advisory duplicate-phone check (the storage constraint is the real
//!    guard; this one just fails fast with a friendlier path)
//! 3. snapshot each product and pre-check stock
//! 4. decrement stock line by line, each an atomic check-and-decrement;
//!    any failure rolls the already-applied lines back
//! 5. allocate an order id and persist, redrawing on a code collision
//! 6. fire the notification hook, best effort
//!
//! Stock decrements are serialized per line rather than wrapped in one
//! giant transaction, so a busy counter never blocks behind a multi-item
//! reservation. The price for that is the manual rollback in stage 4.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogError, CatalogStore};
use crate::db::models::{LineItem, Order, OrderDraft};
use crate::notify::NotificationHook;
use crate::orders::code::{CodeAllocator, MAX_ALLOCATION_ATTEMPTS};
use crate::orders::error::{OrderError, OrderResult};
use crate::orders::ledger::OrderLedger;
use crate::utils::validation::validate_order_input;

/// One requested line: which product, how many
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRequest {
    pub product_id: u32,
    pub qty: i32,
}

/// A reservation request as submitted by the customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderInput {
    pub customer_name: String,
    pub phone_number: String,
    pub room_number: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<ItemRequest>,
}

/// Reservation engine wiring catalog, ledger, id allocator and hook
#[derive(Clone)]
pub struct ReservationEngine {
    catalog: CatalogStore,
    ledger: OrderLedger,
    allocator: CodeAllocator,
    hook: Arc<dyn NotificationHook>,
}

impl ReservationEngine {
    pub fn new(catalog: CatalogStore, ledger: OrderLedger, hook: Arc<dyn NotificationHook>) -> Self {
        Self {
            catalog,
            ledger,
            allocator: CodeAllocator,
            hook,
        }
    }

    /// Reserve stock and create an order.
    ///
    /// Either every line is decremented and the order exists, or no stock
    /// moves at all; partial failures undo the lines already applied before
    /// the error is returned.
    pub async fn create_order(&self, input: OrderInput) -> OrderResult<Order> {
        validate_order_input(&input)?;

        if let Some(existing) = self.ledger.find_active_by_phone(&input.phone_number)? {
            return Err(OrderError::DuplicateActiveOrder {
                phone: input.phone_number,
                existing: existing.order_id,
            });
        }

        // Snapshot products and pre-check stock before touching anything.
        // Stock may still move between here and the decrement; the decrement
        // re-checks atomically, this pass just rejects hopeless requests
        // without side effects.
        let mut items = Vec::with_capacity(input.items.len());
        let mut total = Decimal::ZERO;
        for request in &input.items {
            let product = self.catalog.get(request.product_id)?;
            if !product.active {
                return Err(OrderError::ProductInactive { name: product.name });
            }
            if product.stock < request.qty {
                return Err(OrderError::InsufficientStock {
                    name: product.name,
                    available: product.stock,
                });
            }
            total += product.price * Decimal::from(request.qty);
            items.push(LineItem {
                product_id: product.id,
                name: product.name,
                price: product.price,
                qty: request.qty,
            });
        }

        // Decrement line by line, remembering what went through so a
        // failure can put it back.
        let mut applied: Vec<(u32, i32)> = Vec::with_capacity(items.len());
        for item in &items {
            match self.catalog.adjust_stock(item.product_id, -item.qty) {
                Ok(_) => applied.push((item.product_id, item.qty)),
                Err(err) => {
                    self.release_applied(&applied);
                    return Err(err.into());
                }
            }
        }

        let mut order = match self.insert_with_fresh_code(&input, &items, total) {
            Ok(order) => order,
            Err(err) => {
                self.release_applied(&applied);
                return Err(err);
            }
        };

        // Hook failures never fail the order; the reservation already holds.
        match self.hook.order_created(&order).await {
            Ok(Some(reference)) => {
                if let Err(err) = self.ledger.set_notification_ref(&order.order_id, &reference) {
                    tracing::warn!(
                        order_id = %order.order_id,
                        error = %err,
                        "Failed to persist notification reference"
                    );
                } else {
                    order.notification_ref = Some(reference);
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(
                    order_id = %order.order_id,
                    error = %err,
                    "Order-created notification failed"
                );
            }
        }

        Ok(order)
    }

    /// Mark an order picked and fire the pickup notification
    pub async fn pick_order(&self, order_id: &str) -> OrderResult<Order> {
        let order = self.ledger.mark_picked(order_id)?;

        if let Err(err) = self.hook.order_picked(&order).await {
            tracing::warn!(
                order_id = %order.order_id,
                error = %err,
                "Order-picked notification failed"
            );
        }

        Ok(order)
    }

    /// Mark an order handed over
    pub fn complete_order(&self, order_id: &str) -> OrderResult<Order> {
        self.ledger.mark_completed(order_id)
    }

    /// Cancel an order and restore its stock
    pub fn cancel_order(&self, order_id: &str) -> OrderResult<Order> {
        self.ledger.cancel(order_id)
    }

    pub fn get_order(&self, order_id: &str) -> OrderResult<Order> {
        self.ledger.get(order_id)
    }

    /// Persist the order under a freshly drawn id, redrawing when another
    /// request raced us to the same code.
    fn insert_with_fresh_code(
        &self,
        input: &OrderInput,
        items: &[LineItem],
        total: Decimal,
    ) -> OrderResult<Order> {
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let code = self.allocator.allocate(|code| self.ledger.exists(code))?;
            let draft = OrderDraft {
                order_id: code,
                customer_name: input.customer_name.trim().to_string(),
                phone_number: input.phone_number.trim().to_string(),
                room_number: input.room_number.trim().to_string(),
                notes: input.notes.clone(),
                items: items.to_vec(),
                total_amount: total,
            };
            match self.ledger.create(draft) {
                Ok(order) => return Ok(order),
                Err(OrderError::DuplicateId(code)) => {
                    tracing::debug!(code = %code, "Order id raced, drawing a fresh one");
                }
                Err(err) => return Err(err),
            }
        }
        Err(OrderError::AllocationExhausted {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }

    /// Undo decrements applied before a failed reservation. Restore errors
    /// are logged and skipped so the remaining lines still go back.
    fn release_applied(&self, applied: &[(u32, i32)]) {
        for (product_id, qty) in applied {
            if let Err(err) = self.catalog.adjust_stock(*product_id, *qty) {
                match err {
                    CatalogError::NotFound(_) => {
                        tracing::warn!(
                            product_id,
                            qty,
                            "Product missing during rollback, line skipped"
                        );
                    }
                    other => {
                        tracing::error!(
                            product_id,
                            qty,
                            error = %other,
                            "Failed to roll back stock decrement"
                        );
                    }
                }
            }
        }
    }
}
