//! All-or-nothing execution of one engine operation.
//!
//! Internal mutations go straight to the ledger, which was checkpointed for every user the
//! operation touches. Each external call that succeeds records the call that reverses it.
//! On failure the journal is unwound newest-first and the checkpoint restored; on success
//! the staged events are emitted.
//!
//! Outbound payouts (collateral sent to a user, stablecoin minted to a user) record no
//! reversal. They must be the last external call an operation makes.

use anchor_lang::prelude::{msg, Pubkey};
use price_oracle::PriceFeed;

use crate::accounting::{HealthFactor, Valuation};
use crate::config::{AssetRegistry, ProtocolParams};
use crate::error::{EngineError, Result};
use crate::events::EngineEvent;
use crate::ledger::Ledger;
use crate::token::{CollateralToken, StablecoinLedger};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Compensation {
    /// Collateral pulled into custody goes back to its owner.
    ReturnCollateral { asset: Pubkey, to: Pubkey, amount: u128 },
    /// Stablecoin pulled into custody goes back to its payer.
    RefundStablecoin { to: Pubkey, amount: u128 },
    /// Burned custody stablecoin is re-minted to custody.
    RestoreBurned { amount: u128 },
}

#[derive(Debug, Default)]
pub(crate) struct Journal {
    compensations: Vec<Compensation>,
    staged: Vec<EngineEvent>,
}

impl Journal {
    fn unwind<C, S>(self, engine: &Pubkey, collateral: &mut C, stablecoin: &mut S)
    where
        C: CollateralToken,
        S: StablecoinLedger,
    {
        for compensation in self.compensations.into_iter().rev() {
            let reverted = match &compensation {
                Compensation::ReturnCollateral { asset, to, amount } => {
                    collateral.transfer(asset, to, *amount)
                }
                Compensation::RefundStablecoin { to, amount } => stablecoin.transfer(to, *amount),
                Compensation::RestoreBurned { amount } => stablecoin.mint(engine, *amount),
            };
            if !reverted {
                msg!("⚠️ Compensation {:?} was refused", compensation);
            }
        }
    }
}

/// Split borrows of an engine for the duration of one operation.
pub(crate) struct OperationCtx<'a, F: PriceFeed + ?Sized, C, S> {
    pub engine: Pubkey,
    pub stablecoin_id: Pubkey,
    pub params: &'a ProtocolParams,
    pub registry: &'a AssetRegistry,
    pub ledger: &'a mut Ledger,
    pub valuation: Valuation<'a, F>,
    collateral: &'a mut C,
    stablecoin: &'a mut S,
    journal: Journal,
}

impl<'a, F, C, S> OperationCtx<'a, F, C, S>
where
    F: PriceFeed + ?Sized,
    C: CollateralToken,
    S: StablecoinLedger,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: Pubkey,
        stablecoin_id: Pubkey,
        params: &'a ProtocolParams,
        registry: &'a AssetRegistry,
        ledger: &'a mut Ledger,
        feeds: &'a F,
        collateral: &'a mut C,
        stablecoin: &'a mut S,
    ) -> Self {
        Self {
            engine,
            stablecoin_id,
            params,
            registry,
            ledger,
            valuation: Valuation::new(registry, feeds),
            collateral,
            stablecoin,
            journal: Journal::default(),
        }
    }

    pub fn stage(&mut self, event: EngineEvent) {
        self.journal.staged.push(event);
    }

    pub fn health_factor(&mut self, user: &Pubkey) -> Result<HealthFactor> {
        self.valuation.health_factor(self.ledger, user, self.params)
    }

    /// Fail with `BreakHealthFactor` unless `user` is at or above the minimum.
    pub fn require_healthy(&mut self, user: &Pubkey) -> Result<HealthFactor> {
        let health_factor = self.health_factor(user)?;
        if health_factor.is_below(self.params.min_health_factor) {
            return Err(EngineError::BreakHealthFactor {
                user: *user,
                health_factor,
            });
        }
        Ok(health_factor)
    }

    /// Move `amount` of `asset` from `owner` into custody.
    pub fn pull_collateral(&mut self, asset: &Pubkey, owner: &Pubkey, amount: u128) -> Result<()> {
        if !self.collateral.transfer_from(asset, owner, &self.engine, amount) {
            return Err(EngineError::TransferFailed {
                asset: *asset,
                from: *owner,
                to: self.engine,
                amount,
            });
        }
        self.journal.compensations.push(Compensation::ReturnCollateral {
            asset: *asset,
            to: *owner,
            amount,
        });
        Ok(())
    }

    /// Send `amount` of `asset` out of custody. Irreversible.
    pub fn pay_collateral(&mut self, asset: &Pubkey, to: &Pubkey, amount: u128) -> Result<()> {
        if !self.collateral.transfer(asset, to, amount) {
            return Err(EngineError::TransferFailed {
                asset: *asset,
                from: self.engine,
                to: *to,
                amount,
            });
        }
        Ok(())
    }

    /// Move `amount` of stablecoin from `payer` into custody.
    pub fn pull_stablecoin(&mut self, payer: &Pubkey, amount: u128) -> Result<()> {
        if !self.stablecoin.transfer_from(payer, &self.engine, amount) {
            return Err(EngineError::TransferFailed {
                asset: self.stablecoin_id,
                from: *payer,
                to: self.engine,
                amount,
            });
        }
        self.journal.compensations.push(Compensation::RefundStablecoin {
            to: *payer,
            amount,
        });
        Ok(())
    }

    /// Destroy `amount` of custody stablecoin.
    pub fn burn_stablecoin(&mut self, amount: u128) -> Result<()> {
        if !self.stablecoin.burn(amount) {
            return Err(EngineError::BurnFailed { amount });
        }
        self.journal
            .compensations
            .push(Compensation::RestoreBurned { amount });
        Ok(())
    }

    /// Mint `amount` of stablecoin to `to`. Irreversible.
    pub fn mint_stablecoin(&mut self, to: &Pubkey, amount: u128) -> Result<()> {
        if !self.stablecoin.mint(to, amount) {
            return Err(EngineError::MintFailed { to: *to, amount });
        }
        Ok(())
    }

    /// Emit staged events and hand them back.
    pub fn commit(self) -> Vec<EngineEvent> {
        for event in &self.journal.staged {
            event.emit();
        }
        self.journal.staged
    }

    /// Reverse every recorded external call. The ledger checkpoint is restored by the caller.
    pub fn abort(self) {
        let Self {
            engine,
            collateral,
            stablecoin,
            journal,
            ..
        } = self;
        journal.unwind(&engine, collateral, stablecoin);
    }

    #[cfg(test)]
    pub(crate) fn pending_compensations(&self) -> &[Compensation] {
        &self.journal.compensations
    }
}
