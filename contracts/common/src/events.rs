//! Protocol Events for BoMH
//!
//! Events are emitted during execution and can be indexed off-chain.
//! An operation emits its events only after all of its effects succeeded;
//! a failed operation leaves the log as it found it.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::types::{Address, TokenId};

/// Event types for indexing and filtering
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Vault Events (0x01 - 0x1F)
    Deposited = 0x01,
    Withdrawn = 0x02,
    CashedOut = 0x03,
    RiskCoinBurned = 0x04,
    ReserveTokensSynced = 0x05,

    // Auction Events (0x20 - 0x3F)
    HighestBidIncreased = 0x20,
    AuctionEnded = 0x21,
}

/// Main event enum containing all possible protocol events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum BomhEvent {
    // ============ Vault Events ============

    /// Emitted when reserve tokens are deposited and mhUSD is minted
    Deposited {
        depositor: Address,
        token: TokenId,
        amount: u64,
        reserve_kept: u64,
        credits: u64,
        timestamp: u64,
    },

    /// Emitted when mhUSD is redeemed for reserve tokens
    Withdrawn {
        withdrawer: Address,
        claim_amount: u64,
        value_paid: u64,
        timestamp: u64,
    },

    /// Emitted when accrued yield is moved into a new auction
    CashedOut {
        profit: u64,
        auction: Address,
        index: u64,
        timestamp: u64,
    },

    /// Emitted when the vault burns the RiskCoin it received
    RiskCoinBurned {
        amount: u64,
        new_total_supply: u64,
        timestamp: u64,
    },

    /// Emitted when the supported token list changes to mirror the registry
    ReserveTokensSynced {
        tokens: Vec<TokenId>,
        timestamp: u64,
    },

    // ============ Auction Events ============

    /// Emitted when a new highest bid is accepted
    HighestBidIncreased {
        auction: Address,
        bidder: Address,
        amount: u64,
        timestamp: u64,
    },

    /// Emitted when an auction is settled
    AuctionEnded {
        auction: Address,
        winner: Address,
        amount: u64,
        timestamp: u64,
    },
}

impl BomhEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Deposited { .. } => EventType::Deposited,
            Self::Withdrawn { .. } => EventType::Withdrawn,
            Self::CashedOut { .. } => EventType::CashedOut,
            Self::RiskCoinBurned { .. } => EventType::RiskCoinBurned,
            Self::ReserveTokensSynced { .. } => EventType::ReserveTokensSynced,
            Self::HighestBidIncreased { .. } => EventType::HighestBidIncreased,
            Self::AuctionEnded { .. } => EventType::AuctionEnded,
        }
    }

    /// Get the timestamp when the event occurred
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::Deposited { timestamp, .. }
            | Self::Withdrawn { timestamp, .. }
            | Self::CashedOut { timestamp, .. }
            | Self::RiskCoinBurned { timestamp, .. }
            | Self::ReserveTokensSynced { timestamp, .. }
            | Self::HighestBidIncreased { timestamp, .. }
            | Self::AuctionEnded { timestamp, .. } => *timestamp,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting multiple events during execution
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<BomhEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: BomhEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[BomhEvent] {
        &self.events
    }

    /// Most recent event
    pub fn last(&self) -> Option<&BomhEvent> {
        self.events.last()
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<BomhEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&BomhEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every event past `len` (used to roll back a failed call)
    pub fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
