//! Core Types for the BoMH Protocol
//!
//! Fundamental data structures shared by the vault, the auction and the
//! token ledger.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::reserve;
use crate::errors::{BomhError, BomhResult};
use crate::math::mul_div_floor;

/// Type alias for account addresses (32-byte hash)
pub type Address = [u8; 32];

/// Type alias for token identifiers
pub type TokenId = [u8; 32];

/// The null address. Never a valid account or token.
pub const ZERO_ADDRESS: Address = [0u8; 32];

/// Returns true for the null address
pub fn is_zero_address(address: &Address) -> bool {
    *address == ZERO_ADDRESS
}

/// Reject the null address for the named parameter
pub fn require_address(address: &Address, param: &'static str) -> BomhResult<()> {
    if is_zero_address(address) {
        return Err(BomhError::InvalidInput {
            param,
            reason: "need a non-zero address",
        });
    }
    Ok(())
}

/// Reject a zero amount for the named parameter
pub fn require_nonzero(amount: u64, param: &'static str) -> BomhResult<()> {
    if amount == 0 {
        return Err(BomhError::InvalidInput {
            param,
            reason: "need a non-zero amount",
        });
    }
    Ok(())
}

// ============ Reserve Types ============

/// Fraction of each deposit kept liquid, in basis points of
/// [`reserve::MAX_FRACTION`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, BorshSerialize,
    BorshDeserialize,
)]
pub struct ReserveFraction(u64);

impl ReserveFraction {
    /// Creates a fraction, rejecting values above `MAX_FRACTION`
    pub fn new(bps: u64) -> BomhResult<Self> {
        if bps > reserve::MAX_FRACTION {
            return Err(BomhError::InvalidInput {
                param: "reserve_fraction",
                reason: "must not exceed MAX_FRACTION",
            });
        }
        Ok(Self(bps))
    }

    /// Numerator over `MAX_FRACTION`
    pub fn bps(&self) -> u64 {
        self.0
    }

    /// `amount * fraction / MAX_FRACTION`, rounded down
    pub fn apply(&self, amount: u64) -> BomhResult<u64> {
        mul_div_floor(amount, self.0, reserve::MAX_FRACTION)
    }
}

impl Default for ReserveFraction {
    fn default() -> Self {
        Self(reserve::DEFAULT_RESERVE_FRACTION_BPS)
    }
}

/// One leg of a redemption: pay `amount` of `token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Payout {
    pub token: TokenId,
    pub amount: u64,
}

impl Payout {
    pub fn new(token: TokenId, amount: u64) -> Self {
        Self { token, amount }
    }
}

/// Sum of a payout list
pub fn total_payout(payouts: &[Payout]) -> BomhResult<u64> {
    payouts
        .iter()
        .try_fold(0u64, |acc, p| acc.checked_add(p.amount).ok_or(BomhError::Overflow))
}

// ============ Auction Types ============

/// Lifecycle of an auction
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize,
    BorshDeserialize,
)]
pub enum AuctionStatus {
    /// Accepting bids until the end time
    #[default]
    Open,
    /// Settled; immutable
    Ended,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_fraction_apply_rounds_down() {
        let one_percent = ReserveFraction::new(100).unwrap();
        assert_eq!(one_percent.apply(100).unwrap(), 1);
        assert_eq!(one_percent.apply(199).unwrap(), 1);
        assert_eq!(one_percent.apply(50).unwrap(), 0);
    }

    #[test]
    fn test_reserve_fraction_bounds() {
        assert!(ReserveFraction::new(0).is_ok());
        assert_eq!(ReserveFraction::new(10_000).unwrap().apply(77).unwrap(), 77);
        assert!(matches!(
            ReserveFraction::new(10_001),
            Err(BomhError::InvalidInput { param: "reserve_fraction", .. })
        ));
    }

    #[test]
    fn test_require_helpers() {
        assert!(require_address(&ZERO_ADDRESS, "token").is_err());
        assert!(require_address(&[1u8; 32], "token").is_ok());
        assert!(require_nonzero(0, "amount").is_err());
        assert!(require_nonzero(1, "amount").is_ok());
    }

    #[test]
    fn test_total_payout() {
        let payouts = [Payout::new([1u8; 32], 40), Payout::new([2u8; 32], 60)];
        assert_eq!(total_payout(&payouts).unwrap(), 100);
        assert_eq!(total_payout(&[]).unwrap(), 0);
    }
}
