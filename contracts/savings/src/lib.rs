//! BoMH Savings
//!
//! Reference collaborators for the reserve vault:
//!
//! - [`SavingsAdapter`]: a [`YieldAdapter`](bomh_common::YieldAdapter) that
//!   tracks positions in credits against a rising exchange rate and charges a
//!   redemption fee
//! - [`StableBasket`]: a [`ReserveTokenRegistry`](bomh_common::ReserveTokenRegistry)
//!   whose pool mints a reference unit 1:1 against whitelisted stablecoins

pub mod adapter;
pub mod basket;

pub use adapter::SavingsAdapter;
pub use basket::StableBasket;
