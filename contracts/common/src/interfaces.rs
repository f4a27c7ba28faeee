//! External Collaborator Interfaces
//!
//! The vault consumes a yield source and a reserve-token registry through
//! these traits. Implementations receive the [`TokenBank`] explicitly for
//! every call that moves value, so all of their token effects are covered
//! by the caller's checkpoint.

use crate::bank::TokenBank;
use crate::errors::BomhResult;
use crate::types::{Address, Payout, TokenId};

/// Yield-bearing aggregator that accounts positions in credits
pub trait YieldAdapter {
    /// The reference-unit token this adapter accepts and pays out
    fn underlying(&self) -> TokenId;

    /// Pull `amount` of the underlying from `depositor` and credit its
    /// position; returns the credits issued
    fn deposit(&mut self, bank: &mut TokenBank, depositor: &Address, amount: u64)
        -> BomhResult<u64>;

    /// Credits held by `holder`
    fn credit_balance(&self, holder: &Address) -> u64;

    /// Value of `credits` in the underlying at the current rate, before any
    /// redemption fee. Non-decreasing in `credits`.
    fn credits_to_value(&self, credits: u64) -> BomhResult<u64>;

    /// Current value of `holder`'s credits in the underlying
    fn value_of(&self, holder: &Address) -> BomhResult<u64> {
        self.credits_to_value(self.credit_balance(holder))
    }

    /// Credits needed to redeem `target_value`.
    ///
    /// The conversion is not an exact inverse of [`YieldAdapter::value_of`]
    /// and may ask for one credit more than a holder owns.
    fn credits_for_redeem(&self, target_value: u64) -> u64;

    /// Burn `credits` of `holder`'s position and pay the resulting value in
    /// the underlying to `holder`; returns the value paid
    fn redeem(&mut self, bank: &mut TokenBank, holder: &Address, credits: u64) -> BomhResult<u64>;
}

/// Authoritative basket of reserve tokens, plus the pool that converts
/// between basket tokens and the reference unit
pub trait ReserveTokenRegistry {
    /// Whitelisted basket, in registry order
    fn current_basket(&self) -> Vec<TokenId>;

    /// Reference unit minted against basket tokens
    fn reference_token(&self) -> TokenId;

    /// Which basket tokens, and how much of each, to return for `value`
    /// reference units. The amounts sum to `value`.
    fn recommend_redemption(&self, bank: &TokenBank, value: u64) -> BomhResult<Vec<Payout>>;

    /// Swap `amount` of basket `token` held by `holder` into reference units
    /// credited to `holder`; returns the reference units minted
    fn mint_reference(
        &mut self,
        bank: &mut TokenBank,
        holder: &Address,
        token: &TokenId,
        amount: u64,
    ) -> BomhResult<u64>;

    /// Burn `payout.amount` reference units from `holder` and send the same
    /// amount of `payout.token` to `recipient`; returns the amount sent
    fn redeem_reference(
        &mut self,
        bank: &mut TokenBank,
        holder: &Address,
        payout: &Payout,
        recipient: &Address,
    ) -> BomhResult<u64>;

    /// Whether `token` is currently in the basket
    fn is_supported(&self, token: &TokenId) -> bool {
        self.current_basket().contains(token)
    }
}
