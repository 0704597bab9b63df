//! Checked quantity arithmetic.
//!
//! Balances and allowances are only ever changed through these two
//! functions, so a mutation that would wrap is rejected instead of applied.

use crate::error::{LedgerError, LedgerResult};

/// `a + b`, or [`LedgerError::ArithmeticOverflow`] if the sum exceeds `u64::MAX`.
pub fn checked_add(a: u64, b: u64) -> LedgerResult<u64> {
    a.checked_add(b)
        .ok_or(LedgerError::ArithmeticOverflow { a, b })
}

/// `a - b`, or [`LedgerError::ArithmeticUnderflow`] if `b > a`.
pub fn checked_sub(a: u64, b: u64) -> LedgerResult<u64> {
    a.checked_sub(b)
        .ok_or(LedgerError::ArithmeticUnderflow { a, b })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn add_within_range() {
        assert_eq!(checked_add(99_999_000, 1_000), Ok(100_000_000));
        assert_eq!(checked_add(u64::MAX, 0), Ok(u64::MAX));
    }

    #[test]
    fn add_overflow_is_rejected() {
        assert_eq!(
            checked_add(u64::MAX, 1),
            Err(LedgerError::ArithmeticOverflow { a: u64::MAX, b: 1 })
        );
    }

    #[test]
    fn sub_to_zero() {
        assert_eq!(checked_sub(500, 500), Ok(0));
    }

    #[test]
    fn sub_underflow_is_rejected() {
        assert_eq!(
            checked_sub(0, 1),
            Err(LedgerError::ArithmeticUnderflow { a: 0, b: 1 })
        );
    }

    proptest! {
        #[test]
        fn sub_fails_exactly_when_b_exceeds_a(a in any::<u64>(), b in any::<u64>()) {
            prop_assert_eq!(checked_sub(a, b).is_err(), b > a);
        }

        #[test]
        fn add_fails_exactly_when_sum_wraps(a in any::<u64>(), b in any::<u64>()) {
            let wide = a as u128 + b as u128;
            prop_assert_eq!(checked_add(a, b).is_err(), wide > u64::MAX as u128);
        }
    }
}
