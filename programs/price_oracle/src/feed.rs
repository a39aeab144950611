use anchor_lang::prelude::{borsh, Pubkey};
use anchor_lang::{AnchorDeserialize, AnchorSerialize};

use crate::error::OracleError;
use crate::ADDITIONAL_FEED_PRECISION;

/// Latest answer published by a feed.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundData {
    /// Signed price with `FEED_DECIMALS` decimals.
    pub answer: i64,
    /// Unix timestamp of the update. Carried through, not enforced.
    pub updated_at: i64,
}

impl RoundData {
    pub fn new(answer: i64, updated_at: i64) -> Self {
        Self { answer, updated_at }
    }
}

/// Source of raw price rounds, keyed by feed address.
///
/// Returning `None` means the feed could not be read at all.
pub trait PriceFeed {
    fn latest_round(&self, feed: &Pubkey) -> Option<RoundData>;
}

impl<T: PriceFeed + ?Sized> PriceFeed for &T {
    fn latest_round(&self, feed: &Pubkey) -> Option<RoundData> {
        (**self).latest_round(feed)
    }
}

/// Lift a raw 8-decimal answer to the 18-decimal `PRECISION` scale.
pub fn normalize_price(feed: &Pubkey, round: &RoundData) -> Result<u128, OracleError> {
    if round.answer <= 0 {
        return Err(OracleError::InvalidPrice {
            feed: *feed,
            answer: round.answer,
        });
    }
    (round.answer as u128)
        .checked_mul(ADDITIONAL_FEED_PRECISION)
        .ok_or(OracleError::MathOverflow)
}

/// Read a feed and normalize its answer.
pub fn read_price<F: PriceFeed + ?Sized>(source: &F, feed: &Pubkey) -> Result<u128, OracleError> {
    let round = source
        .latest_round(feed)
        .ok_or(OracleError::Unavailable { feed: *feed })?;
    normalize_price(feed, &round)
}
