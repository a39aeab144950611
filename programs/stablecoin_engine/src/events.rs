use anchor_lang::prelude::*;

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollateralDeposited {
    pub user: Pubkey,
    pub asset: Pubkey,
    pub amount: u128,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollateralRedeemed {
    pub redeemed_from: Pubkey,
    pub redeemed_to: Pubkey,
    pub asset: Pubkey,
    pub amount: u128,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StablecoinMinted {
    pub user: Pubkey,
    pub amount: u128,
    pub total_debt: u128,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StablecoinBurned {
    pub on_behalf_of: Pubkey,
    pub payer: Pubkey,
    pub amount: u128,
    pub total_debt: u128,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionLiquidated {
    pub user: Pubkey,
    pub liquidator: Pubkey,
    pub collateral_asset: Pubkey,
    pub debt_covered: u128,
    pub collateral_seized: u128,
    pub bonus_collateral: u128,
    pub health_factor_before: u128,
    pub health_factor_after: u128,
}

/// Any event the engine can emit, staged until its operation commits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    CollateralDeposited(CollateralDeposited),
    CollateralRedeemed(CollateralRedeemed),
    StablecoinMinted(StablecoinMinted),
    StablecoinBurned(StablecoinBurned),
    PositionLiquidated(PositionLiquidated),
}

impl EngineEvent {
    pub fn emit(&self) {
        match self {
            EngineEvent::CollateralDeposited(event) => emit!(event.clone()),
            EngineEvent::CollateralRedeemed(event) => emit!(event.clone()),
            EngineEvent::StablecoinMinted(event) => emit!(event.clone()),
            EngineEvent::StablecoinBurned(event) => emit!(event.clone()),
            EngineEvent::PositionLiquidated(event) => emit!(event.clone()),
        }
    }
}
