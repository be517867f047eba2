//! 过期清理任务 / Expiration sweeper
//!
//! Background task that cancels reserved orders whose hold window lapsed,
//! returning their stock to the shelf. It reuses the ledger's cancel path,
//! so a sweep racing a staff cancellation is harmless: whoever commits
//! second sees a terminal order and skips it.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::orders::error::{OrderError, OrderResult};
use crate::orders::ledger::OrderLedger;
use crate::utils::time::now_millis;

pub struct ExpirySweeper {
    ledger: OrderLedger,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ExpirySweeper {
    pub fn new(ledger: OrderLedger, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            ledger,
            interval,
            shutdown,
        }
    }

    /// Run until shutdown. Sweeps once at startup to catch holds that
    /// lapsed while the server was down, then on every interval tick.
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Expiry sweeper started");
        self.tick();

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    self.tick();
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Expiry sweeper stopped");
                    return;
                }
            }
        }
    }

    fn tick(&self) {
        match self.sweep_once() {
            Ok(0) => tracing::debug!("Sweep found no expired reservations"),
            Ok(count) => tracing::info!(cancelled = count, "Expired reservations swept"),
            Err(err) => tracing::error!(error = %err, "Sweep failed"),
        }
    }

    /// One sweep pass. Returns how many reservations were cancelled;
    /// individual cancel failures are logged and do not stop the pass.
    pub fn sweep_once(&self) -> OrderResult<usize> {
        let now = now_millis();
        let mut cancelled = 0;

        for order in self.ledger.find_expired(now)? {
            match self.ledger.cancel(&order.order_id) {
                Ok(_) => {
                    tracing::info!(
                        order_id = %order.order_id,
                        expired_at = order.expires_at,
                        "Expired reservation cancelled"
                    );
                    cancelled += 1;
                }
                // Staff finalized it between the scan and our cancel
                Err(OrderError::AlreadyTerminal { .. }) => {
                    tracing::debug!(order_id = %order.order_id, "Order already finalized, skipping");
                }
                Err(err) => {
                    tracing::warn!(
                        order_id = %order.order_id,
                        error = %err,
                        "Failed to cancel expired reservation"
                    );
                }
            }
        }

        Ok(cancelled)
    }
}
