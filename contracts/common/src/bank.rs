//! Token Bank
//!
//! Owns every token instance the protocol interacts with, keyed by
//! [`TokenId`]. All value movement between the vault, the auctions, the
//! yield adapter and users goes through the bank.
//!
//! The bank can be checkpointed and restored, which is how a failing
//! operation rolls back token transfers it already performed.

use std::collections::BTreeMap;

use tracing::trace;

use crate::errors::{BomhError, BomhResult};
use crate::token::FungibleToken;
use crate::types::{Address, TokenId};

/// Multi-token ledger
#[derive(Debug, Clone, Default)]
pub struct TokenBank {
    tokens: BTreeMap<TokenId, Box<dyn FungibleToken>>,
}

/// Saved copy of every token's state
#[derive(Debug, Clone)]
pub struct BankCheckpoint {
    tokens: BTreeMap<TokenId, Box<dyn FungibleToken>>,
}

impl TokenBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token; its id must be unique
    pub fn register(&mut self, token: Box<dyn FungibleToken>) -> BomhResult<TokenId> {
        let id = token.id();
        if self.tokens.contains_key(&id) {
            return Err(BomhError::TokenAlreadyRegistered { token: id });
        }
        trace!(symbol = token.symbol(), "token registered");
        self.tokens.insert(id, token);
        Ok(id)
    }

    /// Whether a token is registered
    pub fn contains(&self, token: &TokenId) -> bool {
        self.tokens.contains_key(token)
    }

    /// Number of registered tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no token is registered
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Borrow a token
    pub fn token(&self, token: &TokenId) -> BomhResult<&dyn FungibleToken> {
        self.tokens
            .get(token)
            .map(|t| t.as_ref())
            .ok_or(BomhError::TokenNotFound { token: *token })
    }

    fn token_mut(&mut self, token: &TokenId) -> BomhResult<&mut Box<dyn FungibleToken>> {
        self.tokens
            .get_mut(token)
            .ok_or(BomhError::TokenNotFound { token: *token })
    }

    /// Balance of `owner` in `token`
    pub fn balance_of(&self, token: &TokenId, owner: &Address) -> BomhResult<u64> {
        Ok(self.token(token)?.balance_of(owner))
    }

    /// Total supply of `token`
    pub fn total_supply(&self, token: &TokenId) -> BomhResult<u64> {
        Ok(self.token(token)?.total_supply())
    }

    /// Remaining allowance of `spender` over `owner`'s `token`
    pub fn allowance(&self, token: &TokenId, owner: &Address, spender: &Address) -> BomhResult<u64> {
        Ok(self.token(token)?.allowance(owner, spender))
    }

    pub fn transfer(
        &mut self,
        token: &TokenId,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> BomhResult<()> {
        trace!(amount, "transfer");
        self.token_mut(token)?.transfer(from, to, amount)
    }

    pub fn transfer_from(
        &mut self,
        token: &TokenId,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> BomhResult<()> {
        trace!(amount, "transfer_from");
        self.token_mut(token)?.transfer_from(spender, from, to, amount)
    }

    pub fn approve(
        &mut self,
        token: &TokenId,
        owner: &Address,
        spender: &Address,
        amount: u64,
    ) -> BomhResult<()> {
        self.token_mut(token)?.approve(owner, spender, amount)
    }

    pub fn mint(
        &mut self,
        token: &TokenId,
        minter: &Address,
        to: &Address,
        amount: u64,
    ) -> BomhResult<()> {
        trace!(amount, "mint");
        self.token_mut(token)?.mint(minter, to, amount)
    }

    pub fn burn(
        &mut self,
        token: &TokenId,
        burner: &Address,
        from: &Address,
        amount: u64,
    ) -> BomhResult<()> {
        trace!(amount, "burn");
        self.token_mut(token)?.burn(burner, from, amount)
    }

    /// Save the state of every token
    pub fn checkpoint(&self) -> BankCheckpoint {
        BankCheckpoint {
            tokens: self.tokens.clone(),
        }
    }

    /// Restore the state saved by [`TokenBank::checkpoint`]
    pub fn restore(&mut self, checkpoint: BankCheckpoint) {
        self.tokens = checkpoint.tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Minimal token for exercising the bank without the token crate
    #[derive(Debug, Clone, Default)]
    struct PlainToken {
        id: TokenId,
        supply: u64,
        balances: BTreeMap<Address, u64>,
    }

    impl FungibleToken for PlainToken {
        fn id(&self) -> TokenId {
            self.id
        }
        fn symbol(&self) -> &str {
            "PLN"
        }
        fn decimals(&self) -> u8 {
            8
        }
        fn total_supply(&self) -> u64 {
            self.supply
        }
        fn balance_of(&self, owner: &Address) -> u64 {
            self.balances.get(owner).copied().unwrap_or(0)
        }
        fn allowance(&self, _owner: &Address, _spender: &Address) -> u64 {
            0
        }
        fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> BomhResult<()> {
            let available = self.balance_of(from);
            if available < amount {
                return Err(BomhError::InsufficientBalance { available, requested: amount });
            }
            *self.balances.entry(*from).or_default() -= amount;
            *self.balances.entry(*to).or_default() += amount;
            Ok(())
        }
        fn transfer_from(
            &mut self,
            _spender: &Address,
            from: &Address,
            to: &Address,
            amount: u64,
        ) -> BomhResult<()> {
            self.transfer(from, to, amount)
        }
        fn approve(&mut self, _owner: &Address, _spender: &Address, _amount: u64) -> BomhResult<()> {
            Ok(())
        }
        fn mint(&mut self, _minter: &Address, to: &Address, amount: u64) -> BomhResult<()> {
            self.supply += amount;
            *self.balances.entry(*to).or_default() += amount;
            Ok(())
        }
        fn burn(&mut self, _burner: &Address, from: &Address, amount: u64) -> BomhResult<()> {
            self.supply -= amount;
            *self.balances.entry(*from).or_default() -= amount;
            Ok(())
        }
        fn box_clone(&self) -> Box<dyn FungibleToken> {
            Box::new(self.clone())
        }
    }

    fn plain(id: u8) -> Box<dyn FungibleToken> {
        Box::new(PlainToken { id: [id; 32], ..Default::default() })
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut bank = TokenBank::new();
        bank.register(plain(1)).unwrap();
        assert!(matches!(
            bank.register(plain(1)),
            Err(BomhError::TokenAlreadyRegistered { .. })
        ));
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn test_unknown_token() {
        let bank = TokenBank::new();
        assert_eq!(
            bank.balance_of(&[7u8; 32], &[1u8; 32]),
            Err(BomhError::TokenNotFound { token: [7u8; 32] })
        );
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut bank = TokenBank::new();
        let id = bank.register(plain(1)).unwrap();
        let alice = [2u8; 32];
        let bob = [3u8; 32];

        bank.mint(&id, &alice, &alice, 100).unwrap();
        let checkpoint = bank.checkpoint();

        bank.transfer(&id, &alice, &bob, 60).unwrap();
        assert_eq!(bank.balance_of(&id, &bob).unwrap(), 60);

        bank.restore(checkpoint);
        assert_eq!(bank.balance_of(&id, &alice).unwrap(), 100);
        assert_eq!(bank.balance_of(&id, &bob).unwrap(), 0);
    }
}
