//! Stable Basket
//!
//! Registry of whitelisted reserve tokens ("bAssets") plus the pool that
//! converts them 1:1 into a reference unit and back. The vault reads its
//! supported-token list from here and routes lent funds through the pool.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bomh_common::{
    require_address, require_nonzero, Address, BomhError, BomhResult, Payout,
    ReserveTokenRegistry, TokenBank, TokenId,
};
use bomh_token::LedgerToken;

/// Basket membership and the pool account holding the bAssets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct StableBasket {
    /// Pool account; custody of bAssets and minter of the reference unit
    address: Address,
    reference: TokenId,
    bassets: Vec<TokenId>,
}

impl StableBasket {
    /// Create the basket and register its reference unit in `bank`
    pub fn new(
        bank: &mut TokenBank,
        address: Address,
        reference_symbol: &str,
        bassets: Vec<TokenId>,
    ) -> BomhResult<Self> {
        let reference = bank.register(Box::new(LedgerToken::reference_unit(
            &address,
            reference_symbol,
        )?))?;
        let mut basket = Self {
            address,
            reference,
            bassets: Vec::with_capacity(bassets.len()),
        };
        for token in bassets {
            basket.add_basset(bank, token)?;
        }
        Ok(basket)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Whitelist a token registered in `bank`
    pub fn add_basset(&mut self, bank: &TokenBank, token: TokenId) -> BomhResult<()> {
        require_address(&token, "token")?;
        bank.token(&token)?;
        if token == self.reference {
            return Err(BomhError::InvalidInput {
                param: "token",
                reason: "reference unit cannot be a bAsset",
            });
        }
        if self.bassets.contains(&token) {
            return Err(BomhError::InvalidInput {
                param: "token",
                reason: "bAsset already exists",
            });
        }
        self.bassets.push(token);
        info!(count = self.bassets.len(), "bAsset added");
        Ok(())
    }

    /// Drop a token from the basket. Units already held by the pool stay
    /// there but are no longer minted against or paid out.
    pub fn remove_basset(&mut self, token: &TokenId) -> BomhResult<()> {
        let position = self
            .bassets
            .iter()
            .position(|t| t == token)
            .ok_or(BomhError::InvalidInput {
                param: "token",
                reason: "bAsset does not exist",
            })?;
        self.bassets.remove(position);
        info!(count = self.bassets.len(), "bAsset removed");
        Ok(())
    }

    fn require_basset(&self, token: &TokenId) -> BomhResult<()> {
        if !self.bassets.contains(token) {
            return Err(BomhError::InvalidInput {
                param: "token",
                reason: "bAsset does not exist",
            });
        }
        Ok(())
    }
}

impl ReserveTokenRegistry for StableBasket {
    fn current_basket(&self) -> Vec<TokenId> {
        self.bassets.clone()
    }

    fn reference_token(&self) -> TokenId {
        self.reference
    }

    fn recommend_redemption(&self, bank: &TokenBank, value: u64) -> BomhResult<Vec<Payout>> {
        let mut holdings = Vec::with_capacity(self.bassets.len());
        for token in &self.bassets {
            holdings.push((*token, bank.balance_of(token, &self.address)?));
        }
        // Largest holdings first; ties keep basket order
        holdings.sort_by(|a, b| b.1.cmp(&a.1));

        let mut remaining = value;
        let mut payouts = Vec::new();
        for (token, held) in holdings {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(held);
            if take > 0 {
                payouts.push(Payout::new(token, take));
                remaining -= take;
            }
        }

        if remaining > 0 {
            return Err(BomhError::InsufficientBalance {
                available: value - remaining,
                requested: value,
            });
        }
        Ok(payouts)
    }

    fn mint_reference(
        &mut self,
        bank: &mut TokenBank,
        holder: &Address,
        token: &TokenId,
        amount: u64,
    ) -> BomhResult<u64> {
        self.require_basset(token)?;
        require_nonzero(amount, "amount")?;

        bank.transfer(token, holder, &self.address, amount)?;
        bank.mint(&self.reference, &self.address, holder, amount)?;

        debug!(amount, "reference minted");
        Ok(amount)
    }

    fn redeem_reference(
        &mut self,
        bank: &mut TokenBank,
        holder: &Address,
        payout: &Payout,
        recipient: &Address,
    ) -> BomhResult<u64> {
        self.require_basset(&payout.token)?;
        require_address(recipient, "recipient")?;
        if payout.amount == 0 {
            return Ok(0);
        }

        bank.burn(&self.reference, &self.address, holder, payout.amount)?;
        bank.transfer(&payout.token, &self.address, recipient, payout.amount)?;

        debug!(amount = payout.amount, "reference redeemed");
        Ok(payout.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomh_common::FungibleToken;

    const POOL: Address = [0xB0; 32];
    const USER: Address = [1u8; 32];

    fn setup() -> (TokenBank, StableBasket, TokenId, TokenId) {
        let mut bank = TokenBank::new();
        let usdc = bank
            .register(Box::new(
                LedgerToken::stablecoin(&[7u8; 32], "USDC", &[(USER, 1_000)]).unwrap(),
            ))
            .unwrap();
        let dai = bank
            .register(Box::new(
                LedgerToken::stablecoin(&[8u8; 32], "DAI", &[(USER, 1_000)]).unwrap(),
            ))
            .unwrap();
        let basket = StableBasket::new(&mut bank, POOL, "mUSD", vec![usdc, dai]).unwrap();
        (bank, basket, usdc, dai)
    }

    #[test]
    fn test_mint_reference_one_to_one() {
        let (mut bank, mut basket, usdc, _) = setup();
        let minted = basket.mint_reference(&mut bank, &USER, &usdc, 250).unwrap();

        assert_eq!(minted, 250);
        assert_eq!(bank.balance_of(&basket.reference_token(), &USER).unwrap(), 250);
        assert_eq!(bank.balance_of(&usdc, &POOL).unwrap(), 250);
        assert_eq!(bank.token(&basket.reference_token()).unwrap().symbol(), "mUSD");
    }

    #[test]
    fn test_mint_reference_rejects_unknown_token() {
        let (mut bank, mut basket, _, _) = setup();
        assert_eq!(
            basket.mint_reference(&mut bank, &USER, &[5u8; 32], 1),
            Err(BomhError::InvalidInput {
                param: "token",
                reason: "bAsset does not exist"
            })
        );
    }

    #[test]
    fn test_recommend_redemption_prefers_largest_holding() {
        let (mut bank, mut basket, usdc, dai) = setup();
        basket.mint_reference(&mut bank, &USER, &usdc, 30).unwrap();
        basket.mint_reference(&mut bank, &USER, &dai, 80).unwrap();

        let payouts = basket.recommend_redemption(&bank, 100).unwrap();
        assert_eq!(payouts, vec![Payout::new(dai, 80), Payout::new(usdc, 20)]);

        assert!(matches!(
            basket.recommend_redemption(&bank, 111),
            Err(BomhError::InsufficientBalance { available: 110, requested: 111 })
        ));
        assert!(basket.recommend_redemption(&bank, 0).unwrap().is_empty());
    }

    #[test]
    fn test_redeem_reference_burns_and_pays() {
        let (mut bank, mut basket, usdc, _) = setup();
        let reference = basket.reference_token();
        basket.mint_reference(&mut bank, &USER, &usdc, 100).unwrap();

        let recipient = [4u8; 32];
        let paid = basket
            .redeem_reference(&mut bank, &USER, &Payout::new(usdc, 40), &recipient)
            .unwrap();

        assert_eq!(paid, 40);
        assert_eq!(bank.balance_of(&usdc, &recipient).unwrap(), 40);
        assert_eq!(bank.balance_of(&reference, &USER).unwrap(), 60);
        assert_eq!(bank.total_supply(&reference).unwrap(), 60);
    }

    #[test]
    fn test_basket_membership_changes() {
        let (bank, mut basket, usdc, dai) = setup();
        assert!(basket.is_supported(&usdc));

        basket.remove_basset(&usdc).unwrap();
        assert_eq!(basket.current_basket(), vec![dai]);
        assert!(!basket.is_supported(&usdc));
        assert!(basket.remove_basset(&usdc).is_err());

        basket.add_basset(&bank, usdc).unwrap();
        assert_eq!(basket.current_basket(), vec![dai, usdc]);
        assert!(basket.add_basset(&bank, usdc).is_err());
        assert!(basket.add_basset(&bank, [6u8; 32]).is_err());
    }
}
