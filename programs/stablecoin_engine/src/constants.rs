pub use price_oracle::{ADDITIONAL_FEED_PRECISION, FEED_DECIMALS, PRECISION};

/// Denominator for the percentage parameters (threshold, bonus).
pub const LIQUIDATION_PRECISION: u128 = 100;

/// 50% of collateral value counts toward solvency (200% overcollateralized).
pub const DEFAULT_LIQUIDATION_THRESHOLD: u128 = 50;

/// 10% collateral premium paid to liquidators.
pub const DEFAULT_LIQUIDATION_BONUS: u128 = 10;

/// Health factor of 1.0.
pub const MIN_HEALTH_FACTOR: u128 = PRECISION;
