//! Savings Adapter
//!
//! Yield source that accounts positions in credits. A saver deposits the
//! reference unit and receives `amount / exchange_rate` credits; interest
//! raises the exchange rate, so the same credits are later worth more.
//!
//! ## Rounding
//!
//! Both conversions round down. [`SavingsAdapter::credits_for_redeem`] adds
//! one credit on top of the floored quotient, so asking for the full value
//! of a position can request one credit more than the position holds.
//! Callers clamp the request to their credit balance.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bomh_common::{
    apply_bps,
    constants::savings::{EXCHANGE_RATE_SCALE, INITIAL_EXCHANGE_RATE, MAX_REDEMPTION_FEE_BPS},
    mul_div_floor_u128, narrow, require_address, require_nonzero, safe_add, safe_sub, Address,
    BomhError, BomhResult, TokenBank, TokenId, YieldAdapter,
};

/// Credit-based savings position ledger with custody of the underlying
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct SavingsAdapter {
    /// Custody account holding every deposited unit
    address: Address,
    underlying: TokenId,
    /// Value per credit, scaled by `EXCHANGE_RATE_SCALE`
    exchange_rate: u128,
    total_credits: u64,
    credit_balances: BTreeMap<Address, u64>,
    redemption_fee_bps: u64,
    /// Fees retained in custody
    fees_collected: u64,
}

impl SavingsAdapter {
    pub fn new(address: Address, underlying: TokenId, redemption_fee_bps: u64) -> BomhResult<Self> {
        require_address(&address, "adapter")?;
        require_address(&underlying, "underlying")?;
        if redemption_fee_bps > MAX_REDEMPTION_FEE_BPS {
            return Err(BomhError::InvalidInput {
                param: "redemption_fee_bps",
                reason: "fee above maximum",
            });
        }
        Ok(Self {
            address,
            underlying,
            exchange_rate: INITIAL_EXCHANGE_RATE,
            total_credits: 0,
            credit_balances: BTreeMap::new(),
            redemption_fee_bps,
            fees_collected: 0,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn exchange_rate(&self) -> u128 {
        self.exchange_rate
    }

    pub fn total_credits(&self) -> u64 {
        self.total_credits
    }

    pub fn redemption_fee_bps(&self) -> u64 {
        self.redemption_fee_bps
    }

    pub fn fees_collected(&self) -> u64 {
        self.fees_collected
    }

    /// Credits bought by `value` at the current rate, rounded down
    pub fn value_to_credits(&self, value: u64) -> BomhResult<u64> {
        narrow(mul_div_floor_u128(
            value as u128,
            EXCHANGE_RATE_SCALE,
            self.exchange_rate,
        )?)
    }

    /// Pay `amount` of the underlying from `from` into custody and raise the
    /// exchange rate pro rata over all outstanding credits.
    pub fn distribute_interest(
        &mut self,
        bank: &mut TokenBank,
        from: &Address,
        amount: u64,
    ) -> BomhResult<()> {
        require_nonzero(amount, "amount")?;
        if self.total_credits == 0 {
            return Err(BomhError::InvalidInput {
                param: "total_credits",
                reason: "no savers to distribute to",
            });
        }
        let rate_increase = mul_div_floor_u128(
            amount as u128,
            EXCHANGE_RATE_SCALE,
            self.total_credits as u128,
        )?;
        self.exchange_rate = self
            .exchange_rate
            .checked_add(rate_increase)
            .ok_or(BomhError::Overflow)?;

        bank.transfer(&self.underlying, from, &self.address, amount)?;

        info!(amount, exchange_rate = %self.exchange_rate, "interest distributed");
        Ok(())
    }
}

impl YieldAdapter for SavingsAdapter {
    fn underlying(&self) -> TokenId {
        self.underlying
    }

    fn deposit(&mut self, bank: &mut TokenBank, depositor: &Address, amount: u64) -> BomhResult<u64> {
        require_nonzero(amount, "amount")?;
        let credits = self.value_to_credits(amount)?;
        if credits == 0 {
            return Err(BomhError::InvalidInput {
                param: "amount",
                reason: "must deposit something",
            });
        }

        let balance = self.credit_balance(depositor);
        self.credit_balances.insert(*depositor, safe_add(balance, credits)?);
        self.total_credits = safe_add(self.total_credits, credits)?;

        bank.transfer(&self.underlying, depositor, &self.address, amount)?;

        debug!(amount, credits, "savings deposit");
        Ok(credits)
    }

    fn credit_balance(&self, holder: &Address) -> u64 {
        self.credit_balances.get(holder).copied().unwrap_or(0)
    }

    /// Value of `credits` at the current rate, rounded down
    fn credits_to_value(&self, credits: u64) -> BomhResult<u64> {
        narrow(mul_div_floor_u128(
            credits as u128,
            self.exchange_rate,
            EXCHANGE_RATE_SCALE,
        )?)
    }

    fn credits_for_redeem(&self, target_value: u64) -> u64 {
        self.value_to_credits(target_value)
            .map(|credits| credits.saturating_add(1))
            .unwrap_or(u64::MAX)
    }

    fn redeem(&mut self, bank: &mut TokenBank, holder: &Address, credits: u64) -> BomhResult<u64> {
        require_nonzero(credits, "credits")?;
        let balance = self.credit_balance(holder);
        if balance == 0 {
            return Err(BomhError::NoCredits { holder: *holder });
        }
        if credits > balance {
            return Err(BomhError::InsufficientCredits {
                available: balance,
                requested: credits,
            });
        }

        let value = self.credits_to_value(credits)?;
        let fee = apply_bps(value, self.redemption_fee_bps)?;
        let payout = safe_sub(value, fee)?;

        self.credit_balances.insert(*holder, balance - credits);
        self.total_credits = safe_sub(self.total_credits, credits)?;
        self.fees_collected = safe_add(self.fees_collected, fee)?;

        bank.transfer(&self.underlying, &self.address, holder, payout)?;

        debug!(credits, value, fee, "savings redeem");
        Ok(payout)
    }
}
