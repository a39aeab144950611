//! Third-party seizure of undercollateralized positions.
//!
//! A liquidator repays part of a victim's debt with their own stablecoin and receives the
//! debt-equivalent amount of one collateral asset plus a bonus. With aggregate
//! collateralization at or below 100% there is no reserve to fund that bonus, so the seize
//! fails with `InsufficientCollateral` exactly when the position is deepest underwater.

use anchor_lang::prelude::{msg, Pubkey};
use price_oracle::PriceFeed;

use crate::accounting::{mul_div, HealthFactor};
use crate::constants::LIQUIDATION_PRECISION;
use crate::error::{EngineError, Result, ValidationError};
use crate::events::{CollateralRedeemed, EngineEvent, PositionLiquidated, StablecoinBurned};
use crate::token::{CollateralToken, StablecoinLedger};
use crate::transaction::OperationCtx;

/// Collateral owed to a liquidator for covering `debt_to_cover`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiquidationQuote {
    pub debt_to_cover: u128,
    /// Collateral worth exactly `debt_to_cover` at the snapshot price.
    pub base_collateral: u128,
    /// `base_collateral * bonus / 100`, truncated.
    pub bonus_collateral: u128,
    pub total_seized: u128,
}

/// Price `debt_to_cover` in collateral units and add the liquidation bonus.
pub fn quote(debt_to_cover: u128, base_collateral: u128, bonus_percent: u128) -> Result<LiquidationQuote> {
    let bonus_collateral = mul_div(base_collateral, bonus_percent, LIQUIDATION_PRECISION)?;
    let total_seized = base_collateral
        .checked_add(bonus_collateral)
        .ok_or(EngineError::MathOverflow)?;
    Ok(LiquidationQuote {
        debt_to_cover,
        base_collateral,
        bonus_collateral,
        total_seized,
    })
}

/// Result of a settled liquidation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiquidationOutcome {
    pub quote: LiquidationQuote,
    pub health_factor_before: HealthFactor,
    pub health_factor_after: HealthFactor,
}

pub(crate) fn quote_for<F, C, S>(
    ctx: &mut OperationCtx<'_, F, C, S>,
    collateral_asset: &Pubkey,
    debt_to_cover: u128,
) -> Result<LiquidationQuote>
where
    F: PriceFeed + ?Sized,
    C: CollateralToken,
    S: StablecoinLedger,
{
    let base_collateral = ctx.valuation.amount_from_usd(collateral_asset, debt_to_cover)?;
    quote(debt_to_cover, base_collateral, ctx.params.liquidation_bonus)
}

pub(crate) fn settle<F, C, S>(
    ctx: &mut OperationCtx<'_, F, C, S>,
    liquidator: &Pubkey,
    collateral_asset: &Pubkey,
    victim: &Pubkey,
    debt_to_cover: u128,
) -> Result<LiquidationOutcome>
where
    F: PriceFeed + ?Sized,
    C: CollateralToken,
    S: StablecoinLedger,
{
    if debt_to_cover == 0 {
        return Err(ValidationError::ZeroAmount.into());
    }
    if !ctx.registry.contains(collateral_asset) {
        return Err(ValidationError::AssetNotAllowed {
            asset: *collateral_asset,
        }
        .into());
    }

    // STEP 1: Only unhealthy positions can be liquidated
    let health_factor_before = ctx.health_factor(victim)?;
    if !health_factor_before.is_below(ctx.params.min_health_factor) {
        return Err(EngineError::HealthFactorOk {
            user: *victim,
            health_factor: health_factor_before,
        });
    }
    msg!("🔔 LIQUIDATION of {} (health factor {})", victim, health_factor_before);

    // STEP 2: Debt-equivalent collateral plus bonus
    let quote = quote_for(ctx, collateral_asset, debt_to_cover)?;
    msg!(
        "  Covering {} debt with {} collateral ({} bonus)",
        quote.debt_to_cover,
        quote.total_seized,
        quote.bonus_collateral
    );

    // STEP 3: Seize from the victim's balance of this one asset
    ctx.ledger
        .debit_collateral(victim, collateral_asset, quote.total_seized)?;

    // STEP 4: Retire the covered debt
    let remaining_debt = ctx.ledger.reduce_debt(victim, debt_to_cover)?;

    // STEP 5: The victim must end up strictly healthier
    let health_factor_after = ctx.health_factor(victim)?;
    if health_factor_after <= health_factor_before {
        return Err(EngineError::LiquidationIneffective {
            user: *victim,
            before: health_factor_before,
            after: health_factor_after,
        });
    }

    // STEP 6: The liquidator's own position stays solvent
    ctx.require_healthy(liquidator)?;

    // STEP 7: Liquidator funds the burn, then receives the seized collateral
    ctx.pull_stablecoin(liquidator, debt_to_cover)?;
    ctx.burn_stablecoin(debt_to_cover)?;
    ctx.pay_collateral(collateral_asset, liquidator, quote.total_seized)?;

    ctx.stage(EngineEvent::CollateralRedeemed(CollateralRedeemed {
        redeemed_from: *victim,
        redeemed_to: *liquidator,
        asset: *collateral_asset,
        amount: quote.total_seized,
    }));
    ctx.stage(EngineEvent::StablecoinBurned(StablecoinBurned {
        on_behalf_of: *victim,
        payer: *liquidator,
        amount: debt_to_cover,
        total_debt: remaining_debt,
    }));
    ctx.stage(EngineEvent::PositionLiquidated(PositionLiquidated {
        user: *victim,
        liquidator: *liquidator,
        collateral_asset: *collateral_asset,
        debt_covered: debt_to_cover,
        collateral_seized: quote.total_seized,
        bonus_collateral: quote.bonus_collateral,
        health_factor_before: health_factor_before.value(),
        health_factor_after: health_factor_after.value(),
    }));

    msg!(
        "✅ Liquidation complete: health factor {} -> {}",
        health_factor_before,
        health_factor_after
    );

    Ok(LiquidationOutcome {
        quote,
        health_factor_before,
        health_factor_after,
    })
}
