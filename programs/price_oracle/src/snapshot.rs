use std::collections::BTreeMap;

use anchor_lang::prelude::{msg, Pubkey};

use crate::error::OracleError;
use crate::feed::{read_price, PriceFeed};
use crate::math::{self, wad_to_fixed};

/// Prices observed during one top-level operation.
///
/// Each feed is read at most once; later lookups reuse the frozen value so every valuation
/// inside the operation sees the same price set.
pub struct PriceSnapshot<'a, F: PriceFeed + ?Sized> {
    source: &'a F,
    frozen: BTreeMap<Pubkey, u128>,
}

impl<'a, F: PriceFeed + ?Sized> PriceSnapshot<'a, F> {
    pub fn new(source: &'a F) -> Self {
        Self {
            source,
            frozen: BTreeMap::new(),
        }
    }

    /// Normalized (18-decimal) price of `feed`.
    pub fn price(&mut self, feed: &Pubkey) -> Result<u128, OracleError> {
        if let Some(price) = self.frozen.get(feed) {
            return Ok(*price);
        }
        let price = read_price(self.source, feed)?;
        msg!("📈 Price frozen for feed {}: {}", feed, wad_to_fixed(price));
        self.frozen.insert(*feed, price);
        Ok(price)
    }

    pub fn usd_value(&mut self, feed: &Pubkey, amount: u128) -> Result<u128, OracleError> {
        let price = self.price(feed)?;
        math::usd_value(price, amount)
    }

    pub fn amount_from_usd(&mut self, feed: &Pubkey, usd_amount: u128) -> Result<u128, OracleError> {
        let price = self.price(feed)?;
        math::amount_from_usd(price, usd_amount)
    }

    /// Number of feeds read so far.
    pub fn len(&self) -> usize {
        self.frozen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frozen.is_empty()
    }
}
