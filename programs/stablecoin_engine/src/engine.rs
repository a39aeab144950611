use anchor_lang::prelude::{msg, Pubkey};
use price_oracle::PriceFeed;

use crate::accounting::{self, AccountInfo, HealthFactor, PositionStatus, Valuation};
use crate::config::{AssetRegistry, EngineConfig, ProtocolParams};
use crate::constants::{ADDITIONAL_FEED_PRECISION, LIQUIDATION_PRECISION, PRECISION};
use crate::error::{Result, ValidationError};
use crate::events::{
    CollateralDeposited, CollateralRedeemed, EngineEvent, StablecoinBurned, StablecoinMinted,
};
use crate::ledger::Ledger;
use crate::liquidation::{self, LiquidationOutcome, LiquidationQuote};
use crate::token::{CollateralToken, StablecoinLedger};
use crate::transaction::OperationCtx;

/// Collateralized stablecoin engine.
///
/// Owns the position ledger and the three external collaborators. Every mutating method
/// takes `&mut self` and is all-or-nothing: on error the ledger and the collaborators are
/// back where they were before the call.
pub struct Engine<F, C, S> {
    id: Pubkey,
    stablecoin_id: Pubkey,
    params: ProtocolParams,
    registry: AssetRegistry,
    ledger: Ledger,
    feeds: F,
    collateral: C,
    stablecoin: S,
    events: Vec<EngineEvent>,
}

impl<F, C, S> Engine<F, C, S>
where
    F: PriceFeed,
    C: CollateralToken,
    S: StablecoinLedger,
{
    pub fn new(config: EngineConfig, feeds: F, collateral: C, stablecoin: S) -> Result<Self> {
        Self::with_ledger(config, Ledger::new(), feeds, collateral, stablecoin)
    }

    /// Build an engine over an existing ledger.
    pub fn with_ledger(
        config: EngineConfig,
        ledger: Ledger,
        feeds: F,
        collateral: C,
        stablecoin: S,
    ) -> Result<Self> {
        let registry = config.registry()?;
        msg!(
            "✅ Engine {} initialized with {} collateral assets (threshold {}%, bonus {}%)",
            config.engine,
            registry.len(),
            config.params.liquidation_threshold,
            config.params.liquidation_bonus
        );
        Ok(Self {
            id: config.engine,
            stablecoin_id: config.stablecoin,
            params: config.params,
            registry,
            ledger,
            feeds,
            collateral,
            stablecoin,
            events: Vec::new(),
        })
    }

    fn execute<T>(
        &mut self,
        operation: &str,
        touched: &[Pubkey],
        op: impl FnOnce(&mut OperationCtx<'_, F, C, S>) -> Result<T>,
    ) -> Result<T> {
        let checkpoint = self.ledger.checkpoint(touched);
        let mut ctx = OperationCtx::new(
            self.id,
            self.stablecoin_id,
            &self.params,
            &self.registry,
            &mut self.ledger,
            &self.feeds,
            &mut self.collateral,
            &mut self.stablecoin,
        );
        match op(&mut ctx) {
            Ok(value) => {
                let committed = ctx.commit();
                self.events.extend(committed);
                Ok(value)
            }
            Err(err) => {
                ctx.abort();
                self.ledger.restore(checkpoint);
                msg!("❌ {} rolled back ({}): {}", operation, err.kind(), err);
                Err(err)
            }
        }
    }

    // ---------------------------------------------------------------------
    // Self-service operations
    // ---------------------------------------------------------------------

    pub fn deposit_collateral(&mut self, user: &Pubkey, asset: &Pubkey, amount: u128) -> Result<()> {
        self.execute("deposit_collateral", &[*user], |ctx| {
            deposit(ctx, user, asset, amount)
        })
    }

    /// Deposit and mint as one unit.
    pub fn deposit_collateral_and_mint(
        &mut self,
        user: &Pubkey,
        asset: &Pubkey,
        collateral_amount: u128,
        mint_amount: u128,
    ) -> Result<()> {
        self.execute("deposit_collateral_and_mint", &[*user], |ctx| {
            require_positive(mint_amount)?;
            deposit(ctx, user, asset, collateral_amount)?;
            mint_debt(ctx, user, mint_amount)
        })
    }

    pub fn mint(&mut self, user: &Pubkey, amount: u128) -> Result<()> {
        self.execute("mint", &[*user], |ctx| mint_debt(ctx, user, amount))
    }

    pub fn burn(&mut self, user: &Pubkey, amount: u128) -> Result<()> {
        self.execute("burn", &[*user], |ctx| {
            burn_debt(ctx, user, user, amount)?;
            // Burning only raises the health factor; checked anyway.
            ctx.require_healthy(user)?;
            Ok(())
        })
    }

    pub fn redeem_collateral(&mut self, user: &Pubkey, asset: &Pubkey, amount: u128) -> Result<()> {
        self.execute("redeem_collateral", &[*user], |ctx| {
            redeem(ctx, asset, amount, user, user)
        })
    }

    /// Burn `burn_amount` (skipped when zero), then redeem `collateral_amount`.
    pub fn redeem_collateral_for_debt(
        &mut self,
        user: &Pubkey,
        asset: &Pubkey,
        collateral_amount: u128,
        burn_amount: u128,
    ) -> Result<()> {
        self.execute("redeem_collateral_for_debt", &[*user], |ctx| {
            require_positive(collateral_amount)?;
            require_allowed(ctx.registry, asset)?;
            if burn_amount > 0 {
                burn_debt(ctx, user, user, burn_amount)?;
            }
            redeem(ctx, asset, collateral_amount, user, user)
        })
    }

    // ---------------------------------------------------------------------
    // Third-party operations
    // ---------------------------------------------------------------------

    /// Cover `debt_to_cover` of `victim`'s debt and seize the equivalent `collateral_asset`
    /// plus the liquidation bonus.
    pub fn liquidate(
        &mut self,
        liquidator: &Pubkey,
        collateral_asset: &Pubkey,
        victim: &Pubkey,
        debt_to_cover: u128,
    ) -> Result<LiquidationOutcome> {
        self.execute("liquidate", &[*victim, *liquidator], |ctx| {
            liquidation::settle(ctx, liquidator, collateral_asset, victim, debt_to_cover)
        })
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    fn valuation(&self) -> Valuation<'_, F> {
        Valuation::new(&self.registry, &self.feeds)
    }

    pub fn account_info(&self, user: &Pubkey) -> Result<AccountInfo> {
        self.valuation().account_info(&self.ledger, user)
    }

    pub fn health_factor(&self, user: &Pubkey) -> Result<HealthFactor> {
        self.valuation()
            .health_factor(&self.ledger, user, &self.params)
    }

    pub fn position_status(&self, user: &Pubkey) -> Result<PositionStatus> {
        let health_factor = self.health_factor(user)?;
        Ok(PositionStatus::of(health_factor, self.params.min_health_factor))
    }

    pub fn account_collateral_value(&self, user: &Pubkey) -> Result<u128> {
        self.valuation().collateral_value(&self.ledger, user)
    }

    pub fn collateral_balance(&self, user: &Pubkey, asset: &Pubkey) -> u128 {
        self.ledger.collateral_balance(user, asset)
    }

    pub fn debt(&self, user: &Pubkey) -> u128 {
        self.ledger.debt(user)
    }

    pub fn usd_value(&self, asset: &Pubkey, amount: u128) -> Result<u128> {
        self.valuation().usd_value(asset, amount)
    }

    pub fn token_amount_from_usd(&self, asset: &Pubkey, usd_amount: u128) -> Result<u128> {
        self.valuation().amount_from_usd(asset, usd_amount)
    }

    pub fn calculate_health_factor(
        &self,
        total_debt: u128,
        collateral_value_usd: u128,
    ) -> Result<HealthFactor> {
        accounting::calculate_health_factor(
            total_debt,
            collateral_value_usd,
            self.params.liquidation_threshold,
        )
    }

    /// Collateral a liquidation covering `debt_to_cover` would seize at current prices.
    pub fn quote_liquidation(
        &self,
        collateral_asset: &Pubkey,
        debt_to_cover: u128,
    ) -> Result<LiquidationQuote> {
        let base = self
            .valuation()
            .amount_from_usd(collateral_asset, debt_to_cover)?;
        liquidation::quote(debt_to_cover, base, self.params.liquidation_bonus)
    }

    pub fn precision(&self) -> u128 {
        PRECISION
    }

    pub fn additional_feed_precision(&self) -> u128 {
        ADDITIONAL_FEED_PRECISION
    }

    pub fn liquidation_precision(&self) -> u128 {
        LIQUIDATION_PRECISION
    }

    pub fn liquidation_threshold(&self) -> u128 {
        self.params.liquidation_threshold
    }

    pub fn liquidation_bonus(&self) -> u128 {
        self.params.liquidation_bonus
    }

    pub fn min_health_factor(&self) -> u128 {
        self.params.min_health_factor
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    pub fn collateral_assets(&self) -> Vec<Pubkey> {
        self.registry.assets()
    }

    pub fn price_feed(&self, asset: &Pubkey) -> Result<Pubkey> {
        Ok(self.registry.price_feed(asset)?)
    }

    pub fn stablecoin(&self) -> Pubkey {
        self.stablecoin_id
    }

    pub fn engine_id(&self) -> Pubkey {
        self.id
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    // ---------------------------------------------------------------------
    // Collaborators and committed events
    // ---------------------------------------------------------------------

    pub fn feeds(&self) -> &F {
        &self.feeds
    }

    pub fn feeds_mut(&mut self) -> &mut F {
        &mut self.feeds
    }

    pub fn collateral_token(&self) -> &C {
        &self.collateral
    }

    pub fn collateral_token_mut(&mut self) -> &mut C {
        &mut self.collateral
    }

    pub fn stablecoin_ledger(&self) -> &S {
        &self.stablecoin
    }

    pub fn stablecoin_ledger_mut(&mut self) -> &mut S {
        &mut self.stablecoin
    }

    /// Events of committed operations, oldest first.
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}

fn require_positive(amount: u128) -> Result<()> {
    if amount == 0 {
        return Err(ValidationError::ZeroAmount.into());
    }
    Ok(())
}

fn require_allowed(registry: &AssetRegistry, asset: &Pubkey) -> Result<()> {
    if !registry.contains(asset) {
        return Err(ValidationError::AssetNotAllowed { asset: *asset }.into());
    }
    Ok(())
}

/// Credit the ledger, then pull the tokens into custody.
fn deposit<F, C, S>(
    ctx: &mut OperationCtx<'_, F, C, S>,
    user: &Pubkey,
    asset: &Pubkey,
    amount: u128,
) -> Result<()>
where
    F: PriceFeed + ?Sized,
    C: CollateralToken,
    S: StablecoinLedger,
{
    require_positive(amount)?;
    require_allowed(ctx.registry, asset)?;

    let balance = ctx.ledger.credit_collateral(user, asset, amount)?;
    ctx.pull_collateral(asset, user, amount)?;

    ctx.stage(EngineEvent::CollateralDeposited(CollateralDeposited {
        user: *user,
        asset: *asset,
        amount,
    }));
    msg!("✅ {} deposited {} of {} (balance {})", user, amount, asset, balance);
    Ok(())
}

/// Debit `from`, check `from` is still healthy, then pay `to` out of custody.
fn redeem<F, C, S>(
    ctx: &mut OperationCtx<'_, F, C, S>,
    asset: &Pubkey,
    amount: u128,
    from: &Pubkey,
    to: &Pubkey,
) -> Result<()>
where
    F: PriceFeed + ?Sized,
    C: CollateralToken,
    S: StablecoinLedger,
{
    require_positive(amount)?;
    require_allowed(ctx.registry, asset)?;

    let balance = ctx.ledger.debit_collateral(from, asset, amount)?;
    let health_factor = ctx.require_healthy(from)?;
    ctx.pay_collateral(asset, to, amount)?;

    ctx.stage(EngineEvent::CollateralRedeemed(CollateralRedeemed {
        redeemed_from: *from,
        redeemed_to: *to,
        asset: *asset,
        amount,
    }));
    msg!(
        "✅ Redeemed {} of {} from {} to {} (balance {}, health factor {})",
        amount,
        asset,
        from,
        to,
        balance,
        health_factor
    );
    Ok(())
}

/// Record new debt, require solvency, then mint to the user.
fn mint_debt<F, C, S>(ctx: &mut OperationCtx<'_, F, C, S>, user: &Pubkey, amount: u128) -> Result<()>
where
    F: PriceFeed + ?Sized,
    C: CollateralToken,
    S: StablecoinLedger,
{
    require_positive(amount)?;

    let total_debt = ctx.ledger.add_debt(user, amount)?;
    let health_factor = ctx.require_healthy(user)?;
    ctx.mint_stablecoin(user, amount)?;

    ctx.stage(EngineEvent::StablecoinMinted(StablecoinMinted {
        user: *user,
        amount,
        total_debt,
    }));
    msg!(
        "✅ Minted {} to {} (debt {}, health factor {})",
        amount,
        user,
        total_debt,
        health_factor
    );
    Ok(())
}

/// Retire `amount` of `on_behalf_of`'s debt with stablecoin pulled from `payer`.
fn burn_debt<F, C, S>(
    ctx: &mut OperationCtx<'_, F, C, S>,
    on_behalf_of: &Pubkey,
    payer: &Pubkey,
    amount: u128,
) -> Result<()>
where
    F: PriceFeed + ?Sized,
    C: CollateralToken,
    S: StablecoinLedger,
{
    require_positive(amount)?;

    let total_debt = ctx.ledger.reduce_debt(on_behalf_of, amount)?;
    ctx.pull_stablecoin(payer, amount)?;
    ctx.burn_stablecoin(amount)?;

    ctx.stage(EngineEvent::StablecoinBurned(StablecoinBurned {
        on_behalf_of: *on_behalf_of,
        payer: *payer,
        amount,
        total_debt,
    }));
    msg!("✅ Burned {} for {} (debt {})", amount, on_behalf_of, total_debt);
    Ok(())
}
