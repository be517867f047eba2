//! 订单编号分配 / Order id allocation
//!
//! Order ids are four characters, two uppercase letters then two digits
//! (`AB12`), short enough to read out loud at the pickup counter. The space
//! holds 67,600 codes; with a few dozen active orders a random draw almost
//! always lands on a free one, so the allocator just redraws on collision
//! and gives up after a bounded number of attempts instead of scanning for
//! gaps.

use rand::Rng;

use crate::db::store::StoreError;
use crate::orders::error::{OrderError, OrderResult};

/// Redraw limit before reporting the id space as saturated
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 20;

/// Random order id allocator
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeAllocator;

impl CodeAllocator {
    /// Draw codes until `taken` reports a free one.
    ///
    /// `taken` is queried once per draw; when every draw within the attempt
    /// limit is occupied the allocator returns `AllocationExhausted` rather
    /// than looping forever.
    pub fn allocate<F>(&self, mut taken: F) -> OrderResult<String>
    where
        F: FnMut(&str) -> Result<bool, StoreError>,
    {
        let mut rng = rand::thread_rng();
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let code = random_code(&mut rng);
            if !taken(&code)? {
                return Ok(code);
            }
            tracing::debug!(code = %code, attempt, "Order id taken, redrawing");
        }
        Err(OrderError::AllocationExhausted {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }
}

fn random_code(rng: &mut impl Rng) -> String {
    let mut code = String::with_capacity(4);
    code.push(rng.gen_range(b'A'..=b'Z') as char);
    code.push(rng.gen_range(b'A'..=b'Z') as char);
    code.push(rng.gen_range(b'0'..=b'9') as char);
    code.push(rng.gen_range(b'0'..=b'9') as char);
    code
}

/// Whether a string is a well-formed order id (`[A-Z]{2}[0-9]{2}`)
pub fn is_valid_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 4
        && bytes[..2].iter().all(|b| b.is_ascii_uppercase())
        && bytes[2..].iter().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocated_codes_are_well_formed() {
        let allocator = CodeAllocator;
        for _ in 0..200 {
            let code = allocator.allocate(|_| Ok(false)).unwrap();
            assert!(is_valid_code(&code), "bad code: {code}");
        }
    }

    #[test]
    fn test_allocation_skips_taken_codes() {
        let allocator = CodeAllocator;
        let mut seen = Vec::new();
        let code = allocator
            .allocate(|candidate| {
                seen.push(candidate.to_string());
                // First two draws are "taken"
                Ok(seen.len() <= 2)
            })
            .unwrap();

        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2], code);
    }

    #[test]
    fn test_allocation_gives_up_after_bounded_attempts() {
        let allocator = CodeAllocator;
        let mut attempts = 0u32;
        let err = allocator
            .allocate(|_| {
                attempts += 1;
                Ok(true)
            })
            .unwrap_err();

        assert_eq!(attempts, MAX_ALLOCATION_ATTEMPTS);
        match err {
            OrderError::AllocationExhausted { attempts } => {
                assert_eq!(attempts, MAX_ALLOCATION_ATTEMPTS)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_code_format_validation() {
        assert!(is_valid_code("AB12"));
        assert!(is_valid_code("ZZ99"));
        assert!(!is_valid_code("ab12"));
        assert!(!is_valid_code("A123"));
        assert!(!is_valid_code("ABCD"));
        assert!(!is_valid_code("AB1"));
        assert!(!is_valid_code("AB123"));
        assert!(!is_valid_code(""));
    }
}
