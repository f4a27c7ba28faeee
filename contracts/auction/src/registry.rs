//! Auction Registry
//!
//! Append-only list of every auction a vault has created. Indices are
//! assigned in creation order and never reused.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use bomh_common::{Address, BomhError, BomhResult};

use crate::Auction;

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct AuctionRegistry {
    auctions: Vec<Auction>,
}

impl AuctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an auction; returns its index
    pub fn push(&mut self, auction: Auction) -> u64 {
        self.auctions.push(auction);
        (self.auctions.len() - 1) as u64
    }

    pub fn get(&self, index: u64) -> BomhResult<&Auction> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.auctions.get(i))
            .ok_or(BomhError::AuctionNotFound { index })
    }

    pub fn get_mut(&mut self, index: u64) -> BomhResult<&mut Auction> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.auctions.get_mut(i))
            .ok_or(BomhError::AuctionNotFound { index })
    }

    pub fn len(&self) -> u64 {
        self.auctions.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.auctions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Auction> {
        self.auctions.iter()
    }

    /// Most recently created auction
    pub fn latest(&self) -> Option<&Auction> {
        self.auctions.last()
    }

    /// Index of the auction at `address`
    pub fn index_of(&self, address: &Address) -> Option<u64> {
        self.auctions
            .iter()
            .position(|a| a.address() == *address)
            .map(|i| i as u64)
    }

    /// Latest auction still accepting bids at `now`
    pub fn open_auction(&self, now: u64) -> Option<(u64, &Auction)> {
        self.auctions
            .iter()
            .enumerate()
            .rev()
            .find(|(_, a)| a.is_open(now))
            .map(|(i, a)| (i as u64, a))
    }
}
