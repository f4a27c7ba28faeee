//! Error Types for the BoMH Protocol
//!
//! Every precondition violation maps to a distinct variant with a stable
//! error code, so callers can tell failures apart without parsing messages.

use thiserror::Error;

use crate::types::{Address, TokenId};

/// Result type alias for BoMH operations
pub type BomhResult<T> = Result<T, BomhError>;

/// Main error enum for all BoMH protocol errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BomhError {
    // ============ Input Errors ============
    /// Invalid input parameter (zero address, zero amount, unsupported token)
    #[error("invalid input `{param}`: {reason}")]
    InvalidInput {
        param: &'static str,
        reason: &'static str,
    },

    // ============ Balance Errors ============
    /// Caller lacks the tokens required for the operation
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: u64, requested: u64 },

    /// Spender has not been approved for enough tokens
    #[error("insufficient allowance: available {available}, requested {requested}")]
    InsufficientAllowance { available: u64, requested: u64 },

    // ============ Yield Position Errors ============
    /// Holder has no credits in the yield adapter
    #[error("saver has no credits")]
    NoCredits { holder: Address },

    /// Redemption asked for more credits than the holder owns
    #[error("saver has no credits: available {available}, requested {requested}")]
    InsufficientCredits { available: u64, requested: u64 },

    /// The yield position does not exceed the value backing outstanding claims
    #[error("no profit to cash out: position {position_value}, backing required {backing_required}")]
    NoProfit {
        position_value: u64,
        backing_required: u64,
    },

    // ============ Auction Errors ============
    /// Bid placed after the deadline or after settlement
    #[error("auction already ended (end time {end_time}, now {now})")]
    AuctionClosed { end_time: u64, now: u64 },

    /// Bid does not exceed the current highest bid
    #[error("there already is a higher bid: highest {highest_bid}, offered {offered}")]
    BidTooLow { highest_bid: u64, offered: u64 },

    /// Settlement attempted before the deadline
    #[error("auction not yet ended (end time {end_time}, now {now})")]
    AuctionNotEnded { end_time: u64, now: u64 },

    /// Settlement attempted twice
    #[error("auction end has already been called")]
    AlreadyEnded,

    /// No auction registered at the index
    #[error("no auction at index {index}")]
    AuctionNotFound { index: u64 },

    // ============ Execution Errors ============
    /// A mutating call re-entered an entity that is mid-operation
    #[error("reentrant call rejected")]
    Reentrancy,

    /// Caller is not allowed to perform this action
    #[error("unauthorized caller")]
    Unauthorized { expected: Address, actual: Address },

    // ============ Token Registry Errors ============
    /// Token is not registered in the bank
    #[error("token not found")]
    TokenNotFound { token: TokenId },

    /// Token id already registered in the bank
    #[error("token already registered")]
    TokenAlreadyRegistered { token: TokenId },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    #[error("arithmetic overflow")]
    Overflow,

    /// Arithmetic underflow occurred
    #[error("arithmetic underflow")]
    Underflow,

    /// Division by zero
    #[error("division by zero")]
    DivisionByZero,
}

impl BomhError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "E001_INVALID_INPUT",
            Self::InsufficientBalance { .. } => "E010_INSUFFICIENT_BALANCE",
            Self::InsufficientAllowance { .. } => "E011_INSUFFICIENT_ALLOWANCE",
            Self::NoCredits { .. } => "E020_NO_CREDITS",
            Self::InsufficientCredits { .. } => "E021_INSUFFICIENT_CREDITS",
            Self::NoProfit { .. } => "E022_NO_PROFIT",
            Self::AuctionClosed { .. } => "E030_AUCTION_CLOSED",
            Self::BidTooLow { .. } => "E031_BID_TOO_LOW",
            Self::AuctionNotEnded { .. } => "E032_AUCTION_NOT_ENDED",
            Self::AlreadyEnded => "E033_ALREADY_ENDED",
            Self::AuctionNotFound { .. } => "E034_AUCTION_NOT_FOUND",
            Self::Reentrancy => "E040_REENTRANCY",
            Self::Unauthorized { .. } => "E041_UNAUTHORIZED",
            Self::TokenNotFound { .. } => "E050_TOKEN_NOT_FOUND",
            Self::TokenAlreadyRegistered { .. } => "E051_TOKEN_EXISTS",
            Self::Overflow => "E080_OVERFLOW",
            Self::Underflow => "E081_UNDERFLOW",
            Self::DivisionByZero => "E082_DIV_ZERO",
        }
    }

    /// Returns true if this error is recoverable (caller can fix it and retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InsufficientBalance { .. } => true,   // Get more funds
            Self::InsufficientAllowance { .. } => true, // Approve more
            Self::BidTooLow { .. } => true,             // Bid higher
            Self::AuctionNotEnded { .. } => true,       // Wait for the deadline
            Self::NoProfit { .. } => true,              // Wait for yield
            _ => false,
        }
    }
}
