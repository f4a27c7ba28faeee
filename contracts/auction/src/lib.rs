//! BoMH Profit Auction
//!
//! Open ascending auction that sells a prize (vault profit in the reference
//! unit) for bid tokens (RiskCoin). Bids are escrowed; a higher bid refunds
//! the previous leader. After the deadline anyone may settle: the prize goes
//! to the leader and the escrow goes to the beneficiary.
//!
//! ## State Machine
//!
//! ```text
//! Open --bid--> Open --end_auction (now >= end_time)--> Ended
//! ```
//!
//! `Ended` is terminal. An auction cannot be cancelled or extended.
//!
//! ## Unsolicited Transfers
//!
//! Bid tokens can be sent to the auction outside `bid`. They always end up
//! with the beneficiary: on the first bid every unit already held is
//! forwarded, later bids refund only the recorded previous bid, and
//! settlement sweeps whatever is left.

pub mod registry;

pub use registry::AuctionRegistry;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use bomh_common::{
    atomic_call,
    constants::auction::MAX_DURATION_SECS,
    errors::{BomhError, BomhResult},
    events::BomhEvent,
    require_address, Address, AuctionStatus, CallContext, Guarded, ReentrancyGuard, TokenBank,
    TokenId,
};

// ============ Auction State ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Auction {
    /// Account holding the escrow and the prize
    address: Address,
    beneficiary: Address,
    prize_token: TokenId,
    bid_token: TokenId,
    start_time: u64,
    end_time: u64,
    highest_bidder: Address,
    highest_bid: u64,
    status: AuctionStatus,
    guard: ReentrancyGuard,
}

/// Deterministic auction account from its creator and registry index
pub fn derive_auction_address(creator: &Address, index: u64) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(creator);
    hasher.update(index.to_le_bytes());
    let result = hasher.finalize();
    let mut address = [0u8; 32];
    address.copy_from_slice(&result);
    address
}

impl Auction {
    /// Open an auction ending `duration` seconds after `now`
    pub fn new(
        address: Address,
        beneficiary: Address,
        prize_token: TokenId,
        bid_token: TokenId,
        duration: u64,
        now: u64,
    ) -> BomhResult<Self> {
        require_address(&address, "auction")?;
        require_address(&beneficiary, "beneficiary")?;
        require_address(&prize_token, "prize_token")?;
        require_address(&bid_token, "bid_token")?;
        if prize_token == bid_token {
            return Err(BomhError::InvalidInput {
                param: "bid_token",
                reason: "prize and bid token must differ",
            });
        }
        if duration == 0 || duration > MAX_DURATION_SECS {
            return Err(BomhError::InvalidInput {
                param: "duration",
                reason: "must be within (0, MAX_DURATION_SECS]",
            });
        }
        let end_time = now.checked_add(duration).ok_or(BomhError::Overflow)?;

        Ok(Self {
            address,
            beneficiary,
            prize_token,
            bid_token,
            start_time: now,
            end_time,
            highest_bidder: beneficiary,
            highest_bid: 0,
            status: AuctionStatus::Open,
            guard: ReentrancyGuard::new(),
        })
    }

    // ============ Getters ============

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn beneficiary(&self) -> Address {
        self.beneficiary
    }

    pub fn prize_token(&self) -> TokenId {
        self.prize_token
    }

    pub fn bid_token(&self) -> TokenId {
        self.bid_token
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    pub fn highest_bidder(&self) -> Address {
        self.highest_bidder
    }

    pub fn highest_bid(&self) -> u64 {
        self.highest_bid
    }

    pub fn status(&self) -> AuctionStatus {
        self.status
    }

    /// Whether a bid at `now` would be inside the time box
    pub fn is_open(&self, now: u64) -> bool {
        self.status == AuctionStatus::Open && now < self.end_time
    }

    pub fn has_ended(&self) -> bool {
        self.status == AuctionStatus::Ended
    }

    /// Seconds until bidding closes
    pub fn time_remaining(&self, now: u64) -> u64 {
        self.end_time.saturating_sub(now)
    }

    /// Whether no bid has been placed yet
    fn awaiting_first_bid(&self) -> bool {
        self.highest_bidder == self.beneficiary && self.highest_bid == 0
    }

    // ============ Operations ============

    /// Place a bid of `amount` bid tokens as `ctx.caller`.
    ///
    /// The bidder must have approved the auction address for `amount`.
    pub fn bid(&mut self, bank: &mut TokenBank, ctx: &mut CallContext, amount: u64) -> BomhResult<()> {
        atomic_call(self, bank, ctx, |auction, bank, ctx| {
            auction.apply_bid(bank, ctx, amount)
        })
    }

    fn apply_bid(&mut self, bank: &mut TokenBank, ctx: &mut CallContext, amount: u64) -> BomhResult<()> {
        let bidder = ctx.caller;
        let now = ctx.timestamp;

        // 1. Time box
        if !self.is_open(now) {
            return Err(BomhError::AuctionClosed {
                end_time: self.end_time,
                now,
            });
        }
        require_address(&bidder, "bidder")?;

        // 2. Strictly higher
        if amount <= self.highest_bid {
            return Err(BomhError::BidTooLow {
                highest_bid: self.highest_bid,
                offered: amount,
            });
        }

        // 3. Effects
        let first_bid = self.awaiting_first_bid();
        let previous_bidder = self.highest_bidder;
        let previous_bid = self.highest_bid;
        self.highest_bidder = bidder;
        self.highest_bid = amount;

        // 4. Interactions
        let unsolicited = if first_bid {
            bank.balance_of(&self.bid_token, &self.address)?
        } else {
            0
        };
        bank.transfer_from(&self.bid_token, &self.address, &bidder, &self.address, amount)?;
        if first_bid {
            bank.transfer(&self.bid_token, &self.address, &self.beneficiary, unsolicited)?;
        } else {
            bank.transfer(&self.bid_token, &self.address, &previous_bidder, previous_bid)?;
        }

        debug!(amount, previous_bid, unsolicited, "highest bid increased");
        ctx.events.emit(BomhEvent::HighestBidIncreased {
            auction: self.address,
            bidder,
            amount,
            timestamp: now,
        });
        Ok(())
    }

    /// Settle after the deadline. Callable by anyone, exactly once.
    pub fn end_auction(&mut self, bank: &mut TokenBank, ctx: &mut CallContext) -> BomhResult<()> {
        atomic_call(self, bank, ctx, |auction, bank, ctx| auction.settle(bank, ctx))
    }

    fn settle(&mut self, bank: &mut TokenBank, ctx: &mut CallContext) -> BomhResult<()> {
        let now = ctx.timestamp;
        if self.has_ended() {
            return Err(BomhError::AlreadyEnded);
        }
        if now < self.end_time {
            return Err(BomhError::AuctionNotEnded {
                end_time: self.end_time,
                now,
            });
        }

        self.status = AuctionStatus::Ended;

        let prize = bank.balance_of(&self.prize_token, &self.address)?;
        bank.transfer(&self.prize_token, &self.address, &self.highest_bidder, prize)?;
        bank.transfer(&self.bid_token, &self.address, &self.beneficiary, self.highest_bid)?;
        let excess = bank.balance_of(&self.bid_token, &self.address)?;
        bank.transfer(&self.bid_token, &self.address, &self.beneficiary, excess)?;

        info!(prize, winning_bid = self.highest_bid, excess, "auction ended");
        ctx.events.emit(BomhEvent::AuctionEnded {
            auction: self.address,
            winner: self.highest_bidder,
            amount: self.highest_bid,
            timestamp: now,
        });
        Ok(())
    }
}

impl Guarded for Auction {
    fn guard_mut(&mut self) -> &mut ReentrancyGuard {
        &mut self.guard
    }
}

// ============ Tests ============
