//! Price oracle adapter.
//!
//! Reads external price feeds (8-decimal answers by convention) and normalizes them into a
//! single 18-decimal fixed-point scale, together with the USD conversions the engine prices
//! collateral with.

pub mod error;
pub mod feed;
pub mod math;
pub mod snapshot;

pub use error::OracleError;
pub use feed::{normalize_price, read_price, PriceFeed, RoundData};
pub use math::{amount_from_usd, usd_value, wad_to_fixed};
pub use snapshot::PriceSnapshot;

/// Fixed-point scale of every normalized value (1.0 == 1e18).
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Decimals carried by raw feed answers.
pub const FEED_DECIMALS: u32 = 8;

/// Multiplier lifting an 8-decimal feed answer to `PRECISION`.
pub const ADDITIONAL_FEED_PRECISION: u128 = 10u128.pow(18 - FEED_DECIMALS);
