//! Protocol Constants
//!
//! All magic numbers and configuration defaults for the BoMH reserve vault.
//!
//! # Network Configuration
//!
//! Use feature flags to compile for different networks:
//! - `mainnet` - Production values (week-long auctions)
//! - Default (no feature) - Testnet values (day-long auctions)
//!
//! ```toml
//! # For mainnet deployment:
//! bomh-common = { path = "...", features = ["mainnet"] }
//! ```

/// Token Metadata shared by every ledger token
pub mod token {
    /// Decimal places for all vault-facing tokens
    pub const DECIMALS: u8 = 8;
    /// One unit with decimals (1 token = 100_000_000 base units)
    pub const ONE: u64 = 100_000_000;
}

/// Claim token (mhUSD) metadata
pub mod claim_token {
    /// Token name
    pub const NAME: &str = "TotallyLegitFiatCoinThatHasAbsolutelyNoRiskWhatsoever";
    /// Token symbol
    pub const SYMBOL: &str = "mhUSD";
}

/// Risk token (RiskCoin) metadata and supply
pub mod risk_token {
    use super::token::ONE;

    /// Token name
    pub const NAME: &str = "MoralHazardCoin";
    /// Token symbol
    pub const SYMBOL: &str = "RISK";
    /// Genesis supply minted to the deployer
    pub const GENESIS_SUPPLY: u64 = 1_000 * ONE;
}

/// Reserve policy (basis points, 100 = 1%)
pub mod reserve {
    /// Denominator for the reserve fraction
    pub const MAX_FRACTION: u64 = 10_000;

    /// Default fraction of each deposit kept liquid (1%)
    pub const DEFAULT_RESERVE_FRACTION_BPS: u64 = 100;

    /// Value the adapter position may fall short of a withdrawal target
    /// before the withdrawal is refused. Covers the adapter's integer
    /// credit math drifting by one unit.
    pub const ROUNDING_TOLERANCE: u64 = 1;
}

/// Auction Configuration (seconds)
pub mod auction {
    /// Default auction duration
    /// - Mainnet: 7 days
    /// - Testnet: 1 day
    #[cfg(feature = "mainnet")]
    pub const DEFAULT_DURATION_SECS: u64 = 7 * 86_400;
    #[cfg(not(feature = "mainnet"))]
    pub const DEFAULT_DURATION_SECS: u64 = 86_400;

    /// Upper bound accepted for an auction duration (90 days)
    pub const MAX_DURATION_SECS: u64 = 90 * 86_400;
}

/// Savings adapter configuration
pub mod savings {
    /// Fixed point scale for the exchange rate (1e18)
    pub const EXCHANGE_RATE_SCALE: u128 = 1_000_000_000_000_000_000;

    /// Exchange rate of a fresh savings contract (0.1 value per credit)
    pub const INITIAL_EXCHANGE_RATE: u128 = EXCHANGE_RATE_SCALE / 10;

    /// Default redemption fee charged on redeemed value (0.1%)
    pub const DEFAULT_REDEMPTION_FEE_BPS: u64 = 10;

    /// Maximum redemption fee (5%)
    pub const MAX_REDEMPTION_FEE_BPS: u64 = 500;
}

/// Fee Configuration
pub mod fees {
    /// Basis points denominator
    pub const BPS_DENOMINATOR: u64 = 10_000;
}
