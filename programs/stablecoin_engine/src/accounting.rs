//! Position valuation: collateral value, debt, health factor.
//!
//! Everything here is recomputed from the ledger and the current price snapshot on every
//! call. Nothing is cached between operations because collateral value moves with price.

use std::fmt;

use anchor_lang::prelude::{borsh, Pubkey};
use anchor_lang::{AnchorDeserialize, AnchorSerialize};
use price_oracle::math::{self, mul_div_saturating};
use price_oracle::{wad_to_fixed, PriceFeed, PriceSnapshot};

use crate::config::{AssetRegistry, ProtocolParams};
use crate::constants::{LIQUIDATION_PRECISION, PRECISION};
use crate::error::{EngineError, Result};
use crate::ledger::Ledger;

/// Ratio of threshold-adjusted collateral value to debt, 18 decimals. `1e18` is the floor.
#[derive(
    AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct HealthFactor(pub u128);

impl HealthFactor {
    /// Health of a position without debt.
    pub const MAX: HealthFactor = HealthFactor(u128::MAX);

    pub fn value(self) -> u128 {
        self.0
    }

    pub fn is_unbounded(self) -> bool {
        self == Self::MAX
    }

    pub fn is_below(self, minimum: u128) -> bool {
        self.0 < minimum
    }
}

impl fmt::Display for HealthFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "∞")
        } else {
            write!(f, "{}", wad_to_fixed(self.0))
        }
    }
}

/// Debt and collateral value of one user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccountInfo {
    pub total_debt: u128,
    pub collateral_value_usd: u128,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionStatus {
    Healthy,
    Liquidatable,
}

impl PositionStatus {
    pub fn of(health_factor: HealthFactor, minimum: u128) -> Self {
        if health_factor.is_below(minimum) {
            PositionStatus::Liquidatable
        } else {
            PositionStatus::Healthy
        }
    }
}

/// `a * b / denominator` where an out-of-range result is an arithmetic failure.
pub(crate) fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    math::mul_div(a, b, denominator).map_err(|_| EngineError::MathOverflow)
}

/// `(collateral_value_usd * threshold / 100) * PRECISION / total_debt`, or
/// [`HealthFactor::MAX`] when there is no debt. Ratios beyond `u128::MAX` (dust debt) are
/// clamped to [`HealthFactor::MAX`].
pub fn calculate_health_factor(
    total_debt: u128,
    collateral_value_usd: u128,
    liquidation_threshold: u128,
) -> Result<HealthFactor> {
    if total_debt == 0 {
        return Ok(HealthFactor::MAX);
    }
    let adjusted = mul_div(collateral_value_usd, liquidation_threshold, LIQUIDATION_PRECISION)?;
    let ratio = mul_div_saturating(adjusted, PRECISION, total_debt)
        .map_err(|_| EngineError::MathOverflow)?;
    Ok(HealthFactor(ratio))
}

/// Prices ledger balances against one [`PriceSnapshot`].
pub struct Valuation<'a, F: PriceFeed + ?Sized> {
    registry: &'a AssetRegistry,
    prices: PriceSnapshot<'a, F>,
}

impl<'a, F: PriceFeed + ?Sized> Valuation<'a, F> {
    pub fn new(registry: &'a AssetRegistry, feeds: &'a F) -> Self {
        Self {
            registry,
            prices: PriceSnapshot::new(feeds),
        }
    }

    pub fn usd_value(&mut self, asset: &Pubkey, amount: u128) -> Result<u128> {
        let feed = self.registry.price_feed(asset)?;
        Ok(self.prices.usd_value(&feed, amount)?)
    }

    pub fn amount_from_usd(&mut self, asset: &Pubkey, usd_amount: u128) -> Result<u128> {
        let feed = self.registry.price_feed(asset)?;
        Ok(self.prices.amount_from_usd(&feed, usd_amount)?)
    }

    /// USD value of `user`'s balance in every allowed asset. Every listed feed is read,
    /// including feeds of assets the user holds none of.
    pub fn collateral_value(&mut self, ledger: &Ledger, user: &Pubkey) -> Result<u128> {
        let mut total: u128 = 0;
        for listed in self.registry.iter() {
            let balance = ledger.collateral_balance(user, &listed.asset);
            let value = self.prices.usd_value(&listed.price_feed, balance)?;
            total = total.checked_add(value).ok_or(EngineError::MathOverflow)?;
        }
        Ok(total)
    }

    pub fn account_info(&mut self, ledger: &Ledger, user: &Pubkey) -> Result<AccountInfo> {
        Ok(AccountInfo {
            total_debt: ledger.debt(user),
            collateral_value_usd: self.collateral_value(ledger, user)?,
        })
    }

    pub fn health_factor(
        &mut self,
        ledger: &Ledger,
        user: &Pubkey,
        params: &ProtocolParams,
    ) -> Result<HealthFactor> {
        let info = self.account_info(ledger, user)?;
        calculate_health_factor(
            info.total_debt,
            info.collateral_value_usd,
            params.liquidation_threshold,
        )
    }
}
