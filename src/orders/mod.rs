//! 订单模块 / Order module
//!
//! Order lifecycle: reservation with atomic stock decrement, short pickup
//! codes, the reserved → picked → completed state machine, cancellation
//! with stock restore, and the expiry sweeper.

pub mod code;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod sweeper;

pub use code::{CodeAllocator, MAX_ALLOCATION_ATTEMPTS, is_valid_code};
pub use engine::{ItemRequest, OrderInput, ReservationEngine};
pub use error::{OrderError, OrderResult};
pub use ledger::OrderLedger;
pub use sweeper::ExpirySweeper;

#[cfg(test)]
mod tests;
