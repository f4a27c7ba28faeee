//! Mathematical Utilities for the BoMH Protocol
//!
//! Checked arithmetic used by every ledger. Products are formed in `u128`
//! and narrowed back to `u64` with an explicit overflow check.

use crate::constants::fees;
use crate::errors::{BomhError, BomhResult};

/// `a * b / denominator`, rounded down
pub fn mul_div_floor(a: u64, b: u64, denominator: u64) -> BomhResult<u64> {
    if denominator == 0 {
        return Err(BomhError::DivisionByZero);
    }
    let product = (a as u128)
        .checked_mul(b as u128)
        .ok_or(BomhError::Overflow)?;
    narrow(product / denominator as u128)
}

/// `a * b / denominator` over `u128` operands, rounded down
pub fn mul_div_floor_u128(a: u128, b: u128, denominator: u128) -> BomhResult<u128> {
    if denominator == 0 {
        return Err(BomhError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(BomhError::Overflow)?;
    Ok(product / denominator)
}

/// Apply a basis-point rate to an amount, rounded down
pub fn apply_bps(amount: u64, bps: u64) -> BomhResult<u64> {
    mul_div_floor(amount, bps, fees::BPS_DENOMINATOR)
}

/// Narrow a `u128` intermediate back to `u64`
pub fn narrow(value: u128) -> BomhResult<u64> {
    u64::try_from(value).map_err(|_| BomhError::Overflow)
}

/// Safe addition with overflow check
pub fn safe_add(a: u64, b: u64) -> BomhResult<u64> {
    a.checked_add(b).ok_or(BomhError::Overflow)
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u64, b: u64) -> BomhResult<u64> {
    a.checked_sub(b).ok_or(BomhError::Underflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_floor() {
        assert_eq!(mul_div_floor(100, 100, 10_000).unwrap(), 1);
        assert_eq!(mul_div_floor(u64::MAX, 2, 2).unwrap(), u64::MAX);
        assert_eq!(mul_div_floor(7, 1, 2).unwrap(), 3);
    }

    #[test]
    fn test_mul_div_errors() {
        assert_eq!(mul_div_floor(1, 1, 0), Err(BomhError::DivisionByZero));
        assert_eq!(mul_div_floor(u64::MAX, 2, 1), Err(BomhError::Overflow));
        assert_eq!(mul_div_floor_u128(u128::MAX, 2, 1), Err(BomhError::Overflow));
    }

    #[test]
    fn test_apply_bps() {
        // 0.1% of 99 units with 8 decimals
        assert_eq!(apply_bps(99_00000000, 10).unwrap(), 9_900_000);
        assert_eq!(apply_bps(5, 10).unwrap(), 0);
    }

    #[test]
    fn test_safe_ops() {
        assert_eq!(safe_add(1, 2).unwrap(), 3);
        assert_eq!(safe_add(u64::MAX, 1), Err(BomhError::Overflow));
        assert_eq!(safe_sub(1, 2), Err(BomhError::Underflow));
    }
}
