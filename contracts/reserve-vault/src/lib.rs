//! Reserve Vault - Bank of Moral Hazard
//!
//! Pooled-deposit vault that issues the mhUSD claim token 1:1 against
//! whitelisted stablecoins, keeps a fraction liquid, lends the rest to a
//! yield adapter and auctions accrued yield for RiskCoin, which it burns.
//!
//! ## Core Operations
//!
//! - **deposit**: pull a basket token, keep the reserve fraction, lend the
//!   rest through the basket pool into the adapter, mint mhUSD
//! - **withdraw**: burn mhUSD, pay from the liquid reserve and from
//!   adapter redemptions routed back through the pool
//! - **cash_out**: redeem the yield above outstanding claims and put it up
//!   for auction
//! - **risk_coin_burn**: burn every RiskCoin the vault has received
//!
//! ## Atomicity
//!
//! Each operation runs through [`atomic_call`]: the vault, the token bank
//! and the event log are restored if any step fails, and a nested call into
//! a vault that is mid-operation fails with `Reentrancy`.
//!
//! ## Rounding
//!
//! Credit counts are sized against the adapter's own credit-to-value
//! conversion: a withdrawal burns the fewest credits worth its lent target,
//! and a cash-out keeps the fewest credits worth the outstanding backing.
//! The adapter's value-to-credit estimate, which may ask for one credit
//! more than needed, only narrows that search.
//! Redemptions are clamped to the actual credit balance, and a withdrawal
//! may come up short of its lent target by at most `ROUNDING_TOLERANCE`.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use bomh_auction::{derive_auction_address, Auction, AuctionRegistry};
use bomh_common::{
    atomic_call,
    constants::{
        auction::{DEFAULT_DURATION_SECS, MAX_DURATION_SECS},
        reserve::{DEFAULT_RESERVE_FRACTION_BPS, ROUNDING_TOLERANCE},
    },
    errors::{BomhError, BomhResult},
    events::BomhEvent,
    require_address, require_nonzero, safe_add, safe_sub, Address, CallContext, FungibleToken,
    Guarded, Payout, ReentrancyGuard, ReserveFraction, ReserveTokenRegistry, TokenBank, TokenId,
    YieldAdapter,
};
use bomh_token::LedgerToken;


// ============ Configuration ============

/// Deploy-time vault parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Share of each deposit kept liquid, in basis points
    pub reserve_fraction_bps: u64,
    /// Bidding window of each profit auction
    pub auction_duration_secs: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            reserve_fraction_bps: DEFAULT_RESERVE_FRACTION_BPS,
            auction_duration_secs: DEFAULT_DURATION_SECS,
        }
    }
}

impl VaultConfig {
    pub fn validate(&self) -> BomhResult<ReserveFraction> {
        if self.auction_duration_secs == 0 || self.auction_duration_secs > MAX_DURATION_SECS {
            return Err(BomhError::InvalidInput {
                param: "auction_duration_secs",
                reason: "must be within (0, MAX_DURATION_SECS]",
            });
        }
        ReserveFraction::new(self.reserve_fraction_bps)
    }
}

// ============ Vault State ============

/// Ledger owned by one vault instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct VaultState {
    /// The vault's own account
    pub address: Address,
    pub reserve_fraction: ReserveFraction,
    pub auction_duration_secs: u64,
    /// mhUSD
    pub claim_token: TokenId,
    /// RiskCoin
    pub risk_token: TokenId,
    /// Unit accepted by the adapter and sold in auctions
    pub reference_token: TokenId,
    /// Mirror of the registry basket
    pub supported_tokens: Vec<TokenId>,
    /// Liquid reserve per token, kept back on deposit
    pub reserve_balances: BTreeMap<TokenId, u64>,
    pub auctions: AuctionRegistry,
    pub guard: ReentrancyGuard,
}

/// Backing of outstanding claims at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvencyReport {
    pub claim_supply: u64,
    pub liquid_reserve: u64,
    pub position_value: u64,
}

impl SolvencyReport {
    pub fn backing(&self) -> u64 {
        self.liquid_reserve.saturating_add(self.position_value)
    }

    /// Claims not covered by reserve plus position
    pub fn shortfall(&self) -> u64 {
        self.claim_supply.saturating_sub(self.backing())
    }

    /// Backing above outstanding claims
    pub fn surplus(&self) -> u64 {
        self.backing().saturating_sub(self.claim_supply)
    }

    pub fn is_solvent(&self) -> bool {
        self.shortfall() == 0
    }

    /// Solvent up to the per-withdrawal rounding allowance
    pub fn is_within_tolerance(&self) -> bool {
        self.shortfall() <= ROUNDING_TOLERANCE
    }
}

// ============ Reserve Vault ============

#[derive(Debug, Clone)]
pub struct ReserveVault<A, R> {
    state: VaultState,
    adapter: A,
    registry: R,
}

impl<A, R> Guarded for ReserveVault<A, R>
where
    A: YieldAdapter + Clone,
    R: ReserveTokenRegistry + Clone,
{
    fn guard_mut(&mut self) -> &mut ReentrancyGuard {
        &mut self.state.guard
    }
}

impl<A, R> ReserveVault<A, R>
where
    A: YieldAdapter + Clone,
    R: ReserveTokenRegistry + Clone,
{
    /// Deploy a vault at `address`.
    ///
    /// Registers mhUSD and RiskCoin in `bank`; the RiskCoin genesis supply
    /// goes to `deployer`.
    pub fn new(
        bank: &mut TokenBank,
        address: Address,
        deployer: Address,
        config: VaultConfig,
        adapter: A,
        registry: R,
    ) -> BomhResult<Self> {
        // 1. Inputs
        require_address(&address, "vault")?;
        require_address(&deployer, "deployer")?;
        let reserve_fraction = config.validate()?;

        // 2. Collaborators must agree on the reference unit
        let reference_token = registry.reference_token();
        if adapter.underlying() != reference_token {
            return Err(BomhError::InvalidInput {
                param: "adapter",
                reason: "adapter underlying must be the registry reference unit",
            });
        }

        // 3. Vault tokens
        let claim = LedgerToken::claim_token(&address)?;
        let risk = LedgerToken::risk_coin(&address, &deployer)?;
        for token in [&claim, &risk] {
            let id = token.id();
            if bank.contains(&id) {
                return Err(BomhError::TokenAlreadyRegistered { token: id });
            }
        }
        let claim_token = bank.register(Box::new(claim))?;
        let risk_token = bank.register(Box::new(risk))?;

        let supported_tokens = registry.current_basket();
        info!(
            reserve_fraction_bps = reserve_fraction.bps(),
            basket_size = supported_tokens.len(),
            "reserve vault deployed"
        );

        Ok(Self {
            state: VaultState {
                address,
                reserve_fraction,
                auction_duration_secs: config.auction_duration_secs,
                claim_token,
                risk_token,
                reference_token,
                supported_tokens,
                reserve_balances: BTreeMap::new(),
                auctions: AuctionRegistry::new(),
                guard: ReentrancyGuard::new(),
            },
            adapter,
            registry,
        })
    }

    // ============ Getters ============

    pub fn address(&self) -> Address {
        self.state.address
    }

    pub fn claim_token(&self) -> TokenId {
        self.state.claim_token
    }

    pub fn risk_token(&self) -> TokenId {
        self.state.risk_token
    }

    pub fn reference_token(&self) -> TokenId {
        self.state.reference_token
    }

    pub fn reserve_fraction(&self) -> ReserveFraction {
        self.state.reserve_fraction
    }

    pub fn supported_tokens(&self) -> &[TokenId] {
        &self.state.supported_tokens
    }

    pub fn is_supported(&self, token: &TokenId) -> bool {
        self.state.supported_tokens.contains(token)
    }

    /// Liquid reserve held for `token`
    pub fn reserve_balance(&self, token: &TokenId) -> u64 {
        self.state.reserve_balances.get(token).copied().unwrap_or(0)
    }

    /// Liquid reserve across all tokens
    pub fn liquid_reserve(&self) -> BomhResult<u64> {
        self.state
            .reserve_balances
            .values()
            .try_fold(0u64, |acc, b| safe_add(acc, *b))
    }

    /// Current value of the vault's adapter position
    pub fn position_value(&self) -> BomhResult<u64> {
        self.adapter.value_of(&self.state.address)
    }

    pub fn credit_balance(&self) -> u64 {
        self.adapter.credit_balance(&self.state.address)
    }

    pub fn auction(&self, index: u64) -> BomhResult<&Auction> {
        self.state.auctions.get(index)
    }

    /// Auctions are driven by bidders through this handle
    pub fn auction_mut(&mut self, index: u64) -> BomhResult<&mut Auction> {
        self.state.auctions.get_mut(index)
    }

    pub fn auctions(&self) -> &AuctionRegistry {
        &self.state.auctions
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn state(&self) -> &VaultState {
        &self.state
    }

    pub fn solvency(&self, bank: &TokenBank) -> BomhResult<SolvencyReport> {
        Ok(SolvencyReport {
            claim_supply: bank.total_supply(&self.state.claim_token)?,
            liquid_reserve: self.liquid_reserve()?,
            position_value: self.position_value()?,
        })
    }

    // ============ Basket ============

    /// Mirror the registry basket; returns the supported tokens
    pub fn sync_reserve_tokens(&mut self, ctx: &mut CallContext) -> &[TokenId] {
        self.refresh_supported_tokens(ctx);
        &self.state.supported_tokens
    }

    fn refresh_supported_tokens(&mut self, ctx: &mut CallContext) -> bool {
        let basket = self.registry.current_basket();
        if basket == self.state.supported_tokens {
            return false;
        }
        info!(
            previous = self.state.supported_tokens.len(),
            current = basket.len(),
            "reserve tokens synced"
        );
        self.state.supported_tokens = basket.clone();
        ctx.events.emit(BomhEvent::ReserveTokensSynced {
            tokens: basket,
            timestamp: ctx.timestamp,
        });
        true
    }

    // ============ Deposit ============

    /// Deposit `amount` of basket `token` as `ctx.caller` and receive the
    /// same amount of mhUSD. The caller must have approved the vault.
    pub fn deposit(
        &mut self,
        bank: &mut TokenBank,
        ctx: &mut CallContext,
        token: TokenId,
        amount: u64,
    ) -> BomhResult<u64> {
        atomic_call(self, bank, ctx, |vault, bank, ctx| {
            vault.apply_deposit(bank, ctx, &token, amount)
        })
    }

    fn apply_deposit(
        &mut self,
        bank: &mut TokenBank,
        ctx: &mut CallContext,
        token: &TokenId,
        amount: u64,
    ) -> BomhResult<u64> {
        let depositor = ctx.caller;
        let vault = self.state.address;

        // 1. Inputs
        require_address(token, "token")?;
        require_nonzero(amount, "amount")?;
        self.refresh_supported_tokens(ctx);
        if !self.is_supported(token) {
            return Err(BomhError::InvalidInput {
                param: "token",
                reason: "token is not supported",
            });
        }

        // 2. Split
        let reserve_kept = self.state.reserve_fraction.apply(amount)?;
        let to_lend = safe_sub(amount, reserve_kept)?;

        // 3. Ledger
        let kept = safe_add(self.reserve_balance(token), reserve_kept)?;
        self.state.reserve_balances.insert(*token, kept);

        // 4. Token movements
        bank.transfer_from(token, &vault, &depositor, &vault, amount)?;
        let credits = if to_lend > 0 {
            let reference = self.registry.mint_reference(bank, &vault, token, to_lend)?;
            self.adapter.deposit(bank, &vault, reference)?
        } else {
            0
        };
        bank.mint(&self.state.claim_token, &vault, &depositor, amount)?;

        info!(amount, reserve_kept, to_lend, credits, "deposit");
        ctx.events.emit(BomhEvent::Deposited {
            depositor,
            token: *token,
            amount,
            reserve_kept,
            credits,
            timestamp: ctx.timestamp,
        });
        Ok(amount)
    }

    // ============ Withdraw ============

    /// Burn `claim_amount` mhUSD of `ctx.caller` and pay out basket tokens.
    /// Returns the value paid.
    pub fn withdraw(
        &mut self,
        bank: &mut TokenBank,
        ctx: &mut CallContext,
        claim_amount: u64,
    ) -> BomhResult<u64> {
        atomic_call(self, bank, ctx, |vault, bank, ctx| {
            vault.apply_withdraw(bank, ctx, claim_amount)
        })
    }

    fn apply_withdraw(
        &mut self,
        bank: &mut TokenBank,
        ctx: &mut CallContext,
        claim_amount: u64,
    ) -> BomhResult<u64> {
        let withdrawer = ctx.caller;
        let vault = self.state.address;

        // 1. Claim
        require_nonzero(claim_amount, "amount")?;
        let held = bank.balance_of(&self.state.claim_token, &withdrawer)?;
        if held < claim_amount {
            return Err(BomhError::InsufficientBalance {
                available: held,
                requested: claim_amount,
            });
        }
        self.refresh_supported_tokens(ctx);

        // 2. Split between the liquid reserve and the adapter position
        let position = self.position_value()?;
        let local_available = self.liquid_reserve()?;
        let mut local_share = self
            .state
            .reserve_fraction
            .apply(claim_amount)?
            .min(local_available);
        let mut lent_target = claim_amount - local_share;
        if lent_target > position {
            let extra = (lent_target - position).min(local_available - local_share);
            local_share += extra;
            lent_target -= extra;
        }

        // 3. Position must cover the lent target
        if lent_target > 0 && self.credit_balance() == 0 {
            return Err(BomhError::NoCredits { holder: vault });
        }
        if lent_target > position.saturating_add(ROUNDING_TOLERANCE) {
            return Err(BomhError::InsufficientBalance {
                available: position.saturating_add(local_available),
                requested: claim_amount,
            });
        }

        // 4. Ledger
        bank.burn(&self.state.claim_token, &vault, &withdrawer, claim_amount)?;
        let local_payouts = self.take_reserve(local_share)?;

        // 5. Token movements
        let mut value_paid = 0;
        if lent_target > 0 {
            value_paid = self.redeem_position(bank, &withdrawer, lent_target)?;
        }
        for payout in &local_payouts {
            bank.transfer(&payout.token, &vault, &withdrawer, payout.amount)?;
            value_paid = safe_add(value_paid, payout.amount)?;
        }

        info!(claim_amount, local_share, lent_target, value_paid, "withdraw");
        ctx.events.emit(BomhEvent::Withdrawn {
            withdrawer,
            claim_amount,
            value_paid,
            timestamp: ctx.timestamp,
        });
        Ok(value_paid)
    }

    /// Debit `amount` from the reserve ledger in token order
    fn take_reserve(&mut self, amount: u64) -> BomhResult<Vec<Payout>> {
        let mut remaining = amount;
        let mut payouts = Vec::new();
        for (token, balance) in self.state.reserve_balances.iter_mut() {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(*balance);
            if take > 0 {
                *balance -= take;
                remaining -= take;
                payouts.push(Payout::new(*token, take));
            }
        }
        if remaining > 0 {
            return Err(BomhError::InsufficientBalance {
                available: amount - remaining,
                requested: amount,
            });
        }
        Ok(payouts)
    }

    /// Fewest of the vault's credits whose value covers `value`, or `None`
    /// when the whole balance is worth less
    fn fewest_credits_worth(&self, value: u64) -> BomhResult<Option<u64>> {
        let balance = self.credit_balance();
        if self.adapter.credits_to_value(balance)? < value {
            return Ok(None);
        }

        // Invariant: `hi` credits are worth at least `value`
        let estimate = self.adapter.credits_for_redeem(value).min(balance);
        let mut hi = if self.adapter.credits_to_value(estimate)? >= value {
            estimate
        } else {
            balance
        };
        let mut lo = 0;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.adapter.credits_to_value(mid)? >= value {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        Ok(Some(hi))
    }

    /// Redeem credits worth `target` and pay the basket tokens to
    /// `recipient`. Returns the value paid.
    fn redeem_position(
        &mut self,
        bank: &mut TokenBank,
        recipient: &Address,
        target: u64,
    ) -> BomhResult<u64> {
        let vault = self.state.address;
        let credits = match self.fewest_credits_worth(target)? {
            Some(credits) => credits,
            None => {
                let available = self.credit_balance();
                warn!(available, target, "clamping credit redemption to balance");
                available
            }
        };

        let redeemed = self.adapter.redeem(bank, &vault, credits)?;
        let payouts = self.registry.recommend_redemption(bank, redeemed)?;
        let mut paid = 0;
        for payout in &payouts {
            let sent = self.registry.redeem_reference(bank, &vault, payout, recipient)?;
            paid = safe_add(paid, sent)?;
        }
        debug!(credits, redeemed, legs = payouts.len(), "position redeemed");
        Ok(paid)
    }

    // ============ Cash Out ============

    /// Redeem the yield above outstanding claims and open an auction for
    /// it. Returns the new auction's index.
    pub fn cash_out(&mut self, bank: &mut TokenBank, ctx: &mut CallContext) -> BomhResult<u64> {
        atomic_call(self, bank, ctx, |vault, bank, ctx| vault.apply_cash_out(bank, ctx))
    }

    fn apply_cash_out(&mut self, bank: &mut TokenBank, ctx: &mut CallContext) -> BomhResult<u64> {
        let vault = self.state.address;

        // 1. Position
        let credits = self.credit_balance();
        if credits == 0 {
            return Err(BomhError::NoCredits { holder: vault });
        }
        let position = self.position_value()?;
        let claim_supply = bank.total_supply(&self.state.claim_token)?;
        let backing_required = claim_supply.saturating_sub(self.liquid_reserve()?);
        if position <= backing_required {
            return Err(BomhError::NoProfit {
                position_value: position,
                backing_required,
            });
        }
        let profit = position - backing_required;

        // 2. Sell everything above the credits that still cover the backing
        let to_keep = self.fewest_credits_worth(backing_required)?.unwrap_or(credits);
        let to_redeem = credits - to_keep;
        if to_redeem == 0 {
            return Err(BomhError::NoProfit {
                position_value: position,
                backing_required,
            });
        }

        // 3. Auction
        let index = self.state.auctions.len();
        let address = derive_auction_address(&vault, index);
        let auction = Auction::new(
            address,
            vault,
            self.state.reference_token,
            self.state.risk_token,
            self.state.auction_duration_secs,
            ctx.timestamp,
        )?;
        self.state.auctions.push(auction);

        // 4. Token movements
        let redeemed = self.adapter.redeem(bank, &vault, to_redeem)?;
        bank.transfer(&self.state.reference_token, &vault, &address, redeemed)?;

        info!(profit, redeemed, credits = to_redeem, index, "cashed out");
        ctx.events.emit(BomhEvent::CashedOut {
            profit: redeemed,
            auction: address,
            index,
            timestamp: ctx.timestamp,
        });
        Ok(index)
    }

    // ============ RiskCoin Burn ============

    /// Burn all RiskCoin the vault holds. Returns the amount burned.
    pub fn risk_coin_burn(&mut self, bank: &mut TokenBank, ctx: &mut CallContext) -> BomhResult<u64> {
        atomic_call(self, bank, ctx, |vault, bank, ctx| vault.apply_risk_coin_burn(bank, ctx))
    }

    fn apply_risk_coin_burn(
        &mut self,
        bank: &mut TokenBank,
        ctx: &mut CallContext,
    ) -> BomhResult<u64> {
        let vault = self.state.address;
        let risk = self.state.risk_token;

        let amount = bank.balance_of(&risk, &vault)?;
        if amount == 0 {
            return Err(BomhError::InvalidInput {
                param: "risk_coin",
                reason: "need to burn non-zero amount",
            });
        }
        bank.burn(&risk, &vault, &vault, amount)?;
        let new_total_supply = bank.total_supply(&risk)?;

        info!(amount, new_total_supply, "risk coin burned");
        ctx.events.emit(BomhEvent::RiskCoinBurned {
            amount,
            new_total_supply,
            timestamp: ctx.timestamp,
        });
        Ok(amount)
    }
}
