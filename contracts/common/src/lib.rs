//! BoMH Common Library
//!
//! Shared types, constants, and utilities for the Bank of Moral Hazard
//! reserve vault, its auctions and its tokens.
//!
//! ## Model
//!
//! Every account and token is a 32-byte identifier. Tokens live in a
//! [`TokenBank`] and are reached through the [`FungibleToken`] capability.
//! Each public mutating operation is atomic: it either applies all of its
//! effects or fails and leaves every entity, token and event log as it was
//! (see [`guard::atomic_call`]).
//!
//! ## Modules
//!
//! - **constants**: token metadata, reserve fraction bounds, auction and
//!   savings parameters
//! - **errors**: [`BomhError`] with stable error codes
//! - **types**: addresses, [`ReserveFraction`], [`Payout`], auction status
//! - **math**: checked integer arithmetic
//! - **events**: protocol event log
//! - **token** / **bank**: the token capability and the multi-token ledger
//! - **interfaces**: [`YieldAdapter`] and [`ReserveTokenRegistry`]
//! - **guard** / **context**: reentrancy lock and per-call context

pub mod bank;
pub mod constants;
pub mod context;
pub mod errors;
pub mod events;
pub mod guard;
pub mod interfaces;
pub mod math;
pub mod token;
pub mod types;

pub use bank::{BankCheckpoint, TokenBank};
pub use context::CallContext;
pub use errors::*;
pub use events::*;
pub use guard::{atomic_call, Guarded, ReentrancyGuard};
pub use interfaces::*;
pub use math::*;
pub use token::FungibleToken;
pub use types::*;
