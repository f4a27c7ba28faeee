//! Fungible Token Capability
//!
//! The vault and the auction move value only through this trait. Concrete
//! token types (claim token, risk token, reserve stablecoins, the pool's
//! reference unit) are configuration data behind it.
//!
//! ## Semantics
//!
//! - **Transfers**: zero-amount transfers succeed and change nothing
//! - **Allowances**: `transfer_from` consumes the spender's allowance
//! - **Supply**: `mint`/`burn` are gated by the token's own supply policy
//! - **Failure**: a failing call leaves the token unchanged

use core::fmt;

use crate::errors::BomhResult;
use crate::types::{Address, TokenId};

/// Capability interface implemented by every token the protocol touches
pub trait FungibleToken: fmt::Debug {
    /// Token identifier
    fn id(&self) -> TokenId;

    /// Ticker symbol
    fn symbol(&self) -> &str;

    /// Decimal places
    fn decimals(&self) -> u8;

    /// Total supply in base units
    fn total_supply(&self) -> u64;

    /// Balance held by `owner`
    fn balance_of(&self, owner: &Address) -> u64;

    /// Amount `spender` may still move on behalf of `owner`
    fn allowance(&self, owner: &Address, spender: &Address) -> u64;

    /// Move `amount` from `from` to `to`
    fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> BomhResult<()>;

    /// Move `amount` from `from` to `to` using `spender`'s allowance
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> BomhResult<()>;

    /// Set `spender`'s allowance over `owner`'s balance
    fn approve(&mut self, owner: &Address, spender: &Address, amount: u64) -> BomhResult<()>;

    /// Create `amount` new units for `to`; `minter` must be authorized
    fn mint(&mut self, minter: &Address, to: &Address, amount: u64) -> BomhResult<()>;

    /// Destroy `amount` units held by `from`; `burner` must be authorized
    fn burn(&mut self, burner: &Address, from: &Address, amount: u64) -> BomhResult<()>;

    /// Clone into a new box (lets the bank checkpoint heterogeneous tokens)
    fn box_clone(&self) -> Box<dyn FungibleToken>;
}

impl Clone for Box<dyn FungibleToken> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}
