//! 输入验证 / Input validation
//!
//! Shape checks on customer-submitted data. Everything here is about the
//! request itself; stock and product existence are checked later, against
//! storage.

use crate::orders::engine::OrderInput;
use crate::orders::error::{OrderError, OrderResult};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_ROOM_LEN: usize = 20;
pub const MAX_NOTE_LEN: usize = 500;
pub const PHONE_LEN: usize = 10;
pub const MAX_LINE_QTY: i32 = 99;
pub const MAX_ORDER_LINES: usize = 50;

/// Non-empty after trimming, within the length cap
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> OrderResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(OrderError::validation(format!("{field} cannot be empty")));
    }
    if value.len() > max_len {
        return Err(OrderError::validation(format!(
            "{field} cannot exceed {max_len} characters"
        )));
    }
    Ok(())
}

/// Length cap only; absent is fine
pub fn validate_optional_text(value: Option<&str>, field: &str, max_len: usize) -> OrderResult<()> {
    if let Some(value) = value
        && value.len() > max_len
    {
        return Err(OrderError::validation(format!(
            "{field} cannot exceed {max_len} characters"
        )));
    }
    Ok(())
}

/// Exactly ten digits
pub fn validate_phone(phone: &str) -> OrderResult<()> {
    let phone = phone.trim();
    if phone.len() != PHONE_LEN || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(OrderError::validation(format!(
            "phone number must be exactly {PHONE_LEN} digits"
        )));
    }
    Ok(())
}

/// Full shape check for a reservation request
pub fn validate_order_input(input: &OrderInput) -> OrderResult<()> {
    validate_required_text(&input.customer_name, "customer name", MAX_NAME_LEN)?;
    validate_phone(&input.phone_number)?;
    validate_required_text(&input.room_number, "room number", MAX_ROOM_LEN)?;
    validate_optional_text(input.notes.as_deref(), "notes", MAX_NOTE_LEN)?;

    if input.items.is_empty() {
        return Err(OrderError::validation("order must contain at least one item"));
    }
    if input.items.len() > MAX_ORDER_LINES {
        return Err(OrderError::validation(format!(
            "order cannot exceed {MAX_ORDER_LINES} lines"
        )));
    }
    for item in &input.items {
        if item.qty < 1 {
            return Err(OrderError::validation("quantity must be at least 1"));
        }
        if item.qty > MAX_LINE_QTY {
            return Err(OrderError::validation(format!(
                "quantity cannot exceed {MAX_LINE_QTY} per line"
            )));
        }
    }
    Ok(())
}
