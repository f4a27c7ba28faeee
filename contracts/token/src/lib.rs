//! BoMH Token Ledger
//!
//! Account-based fungible token used for every asset the vault touches:
//! the mhUSD claim token, RiskCoin, the basket pool's reference unit and the
//! reserve stablecoins.
//!
//! A [`LedgerToken`] tracks balances, allowances and total supply, and gates
//! supply changes through a [`SupplyPolicy`]:
//!
//! - **Fixed**: no minting or burning after construction
//! - **OwnerMintBurn**: only the owner mints and burns (mhUSD, reference unit)
//! - **OwnerBurnOwn**: nobody mints; the owner burns from its own balance
//!   (RiskCoin)

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use bomh_common::{
    constants::{claim_token, risk_token, token},
    errors::{BomhError, BomhResult},
    require_address,
    token::FungibleToken,
    types::{Address, TokenId, ZERO_ADDRESS},
};

// ============ Supply Policy ============

/// Who may change a token's supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum SupplyPolicy {
    /// Supply fixed at construction
    Fixed,
    /// `owner` mints to anyone and burns from anyone
    OwnerMintBurn { owner: Address },
    /// No minting; `owner` may burn only its own balance
    OwnerBurnOwn { owner: Address },
}

impl SupplyPolicy {
    fn authorize_mint(&self, minter: &Address) -> BomhResult<()> {
        match self {
            Self::OwnerMintBurn { owner } if owner == minter => Ok(()),
            Self::OwnerMintBurn { owner } => Err(BomhError::Unauthorized {
                expected: *owner,
                actual: *minter,
            }),
            Self::Fixed | Self::OwnerBurnOwn { .. } => Err(BomhError::Unauthorized {
                expected: ZERO_ADDRESS,
                actual: *minter,
            }),
        }
    }

    fn authorize_burn(&self, burner: &Address, from: &Address) -> BomhResult<()> {
        match self {
            Self::OwnerMintBurn { owner } if owner == burner => Ok(()),
            Self::OwnerBurnOwn { owner } if owner == burner && owner == from => Ok(()),
            Self::OwnerMintBurn { owner } | Self::OwnerBurnOwn { owner } => {
                Err(BomhError::Unauthorized {
                    expected: *owner,
                    actual: *burner,
                })
            }
            Self::Fixed => Err(BomhError::Unauthorized {
                expected: ZERO_ADDRESS,
                actual: *burner,
            }),
        }
    }
}

// ============ Token State ============

/// Ledger-backed fungible token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LedgerToken {
    id: TokenId,
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: u64,
    policy: SupplyPolicy,
    balances: BTreeMap<Address, u64>,
    /// owner -> spender -> remaining allowance
    allowances: BTreeMap<Address, BTreeMap<Address, u64>>,
}

/// Deterministic token id from the deploying account and the ticker
pub fn derive_token_id(owner: &Address, symbol: &str) -> TokenId {
    let mut hasher = Sha256::new();
    hasher.update(owner);
    hasher.update(symbol.as_bytes());
    let result = hasher.finalize();
    let mut id = [0u8; 32];
    id.copy_from_slice(&result);
    id
}

impl LedgerToken {
    /// Create an empty token
    pub fn new(
        id: TokenId,
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        policy: SupplyPolicy,
    ) -> BomhResult<Self> {
        require_address(&id, "token")?;
        Ok(Self {
            id,
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply: 0,
            policy,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        })
    }

    /// The mhUSD claim token; the vault is its only minter and burner
    pub fn claim_token(vault: &Address) -> BomhResult<Self> {
        require_address(vault, "vault")?;
        Self::new(
            derive_token_id(vault, claim_token::SYMBOL),
            claim_token::NAME,
            claim_token::SYMBOL,
            token::DECIMALS,
            SupplyPolicy::OwnerMintBurn { owner: *vault },
        )
    }

    /// RiskCoin: the whole genesis supply goes to `deployer`, only the vault
    /// may burn and only from its own balance
    pub fn risk_coin(vault: &Address, deployer: &Address) -> BomhResult<Self> {
        require_address(vault, "vault")?;
        require_address(deployer, "deployer")?;
        let mut coin = Self::new(
            derive_token_id(vault, risk_token::SYMBOL),
            risk_token::NAME,
            risk_token::SYMBOL,
            token::DECIMALS,
            SupplyPolicy::OwnerBurnOwn { owner: *vault },
        )?;
        coin.credit(deployer, risk_token::GENESIS_SUPPLY)?;
        Ok(coin)
    }

    /// Basket pool reference unit; minted and burned by `pool`
    pub fn reference_unit(pool: &Address, symbol: &str) -> BomhResult<Self> {
        require_address(pool, "pool")?;
        Self::new(
            derive_token_id(pool, symbol),
            symbol,
            symbol,
            token::DECIMALS,
            SupplyPolicy::OwnerMintBurn { owner: *pool },
        )
    }

    /// Fixed-supply stablecoin with its initial allocations
    pub fn stablecoin(issuer: &Address, symbol: &str, allocations: &[(Address, u64)]) -> BomhResult<Self> {
        require_address(issuer, "issuer")?;
        let mut coin = Self::new(
            derive_token_id(issuer, symbol),
            symbol,
            symbol,
            token::DECIMALS,
            SupplyPolicy::Fixed,
        )?;
        for (holder, amount) in allocations {
            coin.credit(holder, *amount)?;
        }
        Ok(coin)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> &SupplyPolicy {
        &self.policy
    }

    /// Number of accounts with a non-zero balance
    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|b| **b > 0).count()
    }

    /// Add to a balance and to supply
    fn credit(&mut self, to: &Address, amount: u64) -> BomhResult<()> {
        require_address(to, "to")?;
        let new_supply = self.total_supply.checked_add(amount).ok_or(BomhError::Overflow)?;
        let balance = self.balances.entry(*to).or_default();
        *balance = balance.checked_add(amount).ok_or(BomhError::Overflow)?;
        self.total_supply = new_supply;
        Ok(())
    }

    fn debit(&mut self, from: &Address, amount: u64) -> BomhResult<()> {
        let available = FungibleToken::balance_of(self, from);
        if available < amount {
            return Err(BomhError::InsufficientBalance {
                available,
                requested: amount,
            });
        }
        self.balances.insert(*from, available - amount);
        Ok(())
    }
}

impl FungibleToken for LedgerToken {
    fn id(&self) -> TokenId {
        self.id
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn total_supply(&self) -> u64 {
        self.total_supply
    }

    fn balance_of(&self, owner: &Address) -> u64 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u64 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> BomhResult<()> {
        require_address(to, "to")?;
        if amount == 0 || from == to {
            // Still report an overdraw on a self-transfer
            let available = self.balance_of(from);
            if available < amount {
                return Err(BomhError::InsufficientBalance {
                    available,
                    requested: amount,
                });
            }
            return Ok(());
        }
        let received = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(BomhError::Overflow)?;
        self.debit(from, amount)?;
        self.balances.insert(*to, received);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> BomhResult<()> {
        if spender != from && amount > 0 {
            let available = self.allowance(from, spender);
            if available < amount {
                return Err(BomhError::InsufficientAllowance {
                    available,
                    requested: amount,
                });
            }
            self.transfer(from, to, amount)?;
            self.allowances
                .entry(*from)
                .or_default()
                .insert(*spender, available - amount);
            return Ok(());
        }
        self.transfer(from, to, amount)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u64) -> BomhResult<()> {
        require_address(spender, "spender")?;
        self.allowances.entry(*owner).or_default().insert(*spender, amount);
        Ok(())
    }

    fn mint(&mut self, minter: &Address, to: &Address, amount: u64) -> BomhResult<()> {
        self.policy.authorize_mint(minter)?;
        self.credit(to, amount)?;
        debug!(symbol = %self.symbol, amount, new_total_supply = self.total_supply, "minted");
        Ok(())
    }

    fn burn(&mut self, burner: &Address, from: &Address, amount: u64) -> BomhResult<()> {
        self.policy.authorize_burn(burner, from)?;
        self.debit(from, amount)?;
        self.total_supply = self.total_supply.checked_sub(amount).ok_or(BomhError::Underflow)?;
        debug!(symbol = %self.symbol, amount, new_total_supply = self.total_supply, "burned");
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn FungibleToken> {
        Box::new(self.clone())
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use bomh_common::TokenBank;

    const VAULT: Address = [9u8; 32];
    const ALICE: Address = [1u8; 32];
    const BOB: Address = [2u8; 32];

    fn usdc() -> LedgerToken {
        LedgerToken::stablecoin(&[7u8; 32], "USDC", &[(ALICE, 1_000)]).unwrap()
    }

    #[test]
    fn test_transfer_success() {
        let mut coin = usdc();
        coin.transfer(&ALICE, &BOB, 600).unwrap();

        assert_eq!(coin.balance_of(&ALICE), 400);
        assert_eq!(coin.balance_of(&BOB), 600);
        assert_eq!(coin.total_supply(), 1_000);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut coin = usdc();
        let result = coin.transfer(&BOB, &ALICE, 1);
        assert_eq!(
            result,
            Err(BomhError::InsufficientBalance {
                available: 0,
                requested: 1
            })
        );
    }

    #[test]
    fn test_zero_transfer_is_noop() {
        let mut coin = usdc();
        let before = coin.clone();
        coin.transfer(&BOB, &ALICE, 0).unwrap();
        assert_eq!(coin, before);
    }

    #[test]
    fn test_transfer_to_zero_address_rejected() {
        let mut coin = usdc();
        assert!(matches!(
            coin.transfer(&ALICE, &ZERO_ADDRESS, 1),
            Err(BomhError::InvalidInput { param: "to", .. })
        ));
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut coin = usdc();
        coin.approve(&ALICE, &VAULT, 300).unwrap();

        coin.transfer_from(&VAULT, &ALICE, &VAULT, 200).unwrap();
        assert_eq!(coin.allowance(&ALICE, &VAULT), 100);
        assert_eq!(coin.balance_of(&VAULT), 200);

        let result = coin.transfer_from(&VAULT, &ALICE, &VAULT, 101);
        assert_eq!(
            result,
            Err(BomhError::InsufficientAllowance {
                available: 100,
                requested: 101
            })
        );
        assert_eq!(coin.balance_of(&ALICE), 800);
    }

    #[test]
    fn test_transfer_from_failure_keeps_allowance() {
        let mut coin = usdc();
        coin.approve(&BOB, &VAULT, 50).unwrap();
        assert!(coin.transfer_from(&VAULT, &BOB, &VAULT, 50).is_err());
        assert_eq!(coin.allowance(&BOB, &VAULT), 50);
    }

    #[test]
    fn test_claim_token_only_vault_mints_and_burns() {
        let mut mh = LedgerToken::claim_token(&VAULT).unwrap();
        assert_eq!(mh.symbol(), "mhUSD");
        assert_eq!(mh.decimals(), 8);

        assert!(matches!(
            mh.mint(&ALICE, &ALICE, 10),
            Err(BomhError::Unauthorized { .. })
        ));
        mh.mint(&VAULT, &ALICE, 10).unwrap();
        assert_eq!(mh.total_supply(), 10);

        assert!(mh.burn(&ALICE, &ALICE, 10).is_err());
        mh.burn(&VAULT, &ALICE, 4).unwrap();
        assert_eq!(mh.total_supply(), 6);
        assert_eq!(mh.balance_of(&ALICE), 6);
    }

    #[test]
    fn test_risk_coin_genesis_and_burn_policy() {
        let deployer = [3u8; 32];
        let mut risk = LedgerToken::risk_coin(&VAULT, &deployer).unwrap();
        assert_eq!(risk.total_supply(), risk_token::GENESIS_SUPPLY);
        assert_eq!(risk.balance_of(&deployer), risk_token::GENESIS_SUPPLY);

        // Nobody can mint more
        assert!(risk.mint(&VAULT, &VAULT, 1).is_err());

        // The vault cannot burn someone else's coins
        assert!(risk.burn(&VAULT, &deployer, 1).is_err());

        risk.transfer(&deployer, &VAULT, 25).unwrap();
        risk.burn(&VAULT, &VAULT, 25).unwrap();
        assert_eq!(risk.total_supply(), risk_token::GENESIS_SUPPLY - 25);
        assert_eq!(risk.holder_count(), 1);
    }

    #[test]
    fn test_fixed_supply_rejects_mint() {
        let mut coin = usdc();
        assert!(coin.mint(&[7u8; 32], &ALICE, 1).is_err());
        assert!(coin.burn(&[7u8; 32], &ALICE, 1).is_err());
    }

    #[test]
    fn test_token_ids_are_distinct() {
        let claim = LedgerToken::claim_token(&VAULT).unwrap();
        let risk = LedgerToken::risk_coin(&VAULT, &ALICE).unwrap();
        assert_ne!(claim.id(), risk.id());
        assert_eq!(claim.id(), derive_token_id(&VAULT, "mhUSD"));
        assert_ne!(derive_token_id(&VAULT, "mhUSD"), derive_token_id(&ALICE, "mhUSD"));
    }

    #[test]
    fn test_bank_round_trip_through_trait_object() {
        let mut bank = TokenBank::new();
        let id = bank.register(Box::new(usdc())).unwrap();
        bank.transfer(&id, &ALICE, &BOB, 10).unwrap();
        assert_eq!(bank.balance_of(&id, &BOB).unwrap(), 10);
        assert_eq!(bank.token(&id).unwrap().symbol(), "USDC");
    }

    #[test]
    fn test_cbor_encoding() {
        let mut coin = usdc();
        coin.approve(&ALICE, &VAULT, 5).unwrap();

        let mut bytes = Vec::new();
        ciborium::into_writer(&coin, &mut bytes).unwrap();
        let decoded: LedgerToken = ciborium::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(decoded, coin);

        let borsh_bytes = borsh::to_vec(&coin).unwrap();
        assert_eq!(LedgerToken::try_from_slice(&borsh_bytes).unwrap(), coin);
    }
}
