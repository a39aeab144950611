use anchor_lang::prelude::Pubkey;
use price_oracle::OracleError;
use thiserror::Error;

use crate::accounting::HealthFactor;

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Input rejected before any state was touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("amount must be greater than zero")]
    ZeroAmount,
    #[error("asset {asset} is not an allowed collateral")]
    AssetNotAllowed { asset: Pubkey },
    #[error("{assets} collateral assets but {feeds} price feeds")]
    ConfigLengthMismatch { assets: usize, feeds: usize },
    #[error("asset {asset} listed more than once")]
    DuplicateAsset { asset: Pubkey },
    #[error("invalid protocol parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("cannot burn {requested}, only {owed} outstanding")]
    InsufficientDebt { owed: u128, requested: u128 },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("transfer of {amount} of {asset} from {from} to {to} failed")]
    TransferFailed {
        asset: Pubkey,
        from: Pubkey,
        to: Pubkey,
        amount: u128,
    },

    #[error("stablecoin ledger refused to burn {amount}")]
    BurnFailed { amount: u128 },

    #[error("stablecoin ledger refused to mint {amount} to {to}")]
    MintFailed { to: Pubkey, amount: u128 },

    #[error("health factor of {user} would drop to {health_factor}")]
    BreakHealthFactor {
        user: Pubkey,
        health_factor: HealthFactor,
    },

    #[error("{user} holds {available} of {asset}, {requested} requested")]
    InsufficientCollateral {
        user: Pubkey,
        asset: Pubkey,
        available: u128,
        requested: u128,
    },

    #[error("position of {user} is healthy ({health_factor}), nothing to liquidate")]
    HealthFactorOk {
        user: Pubkey,
        health_factor: HealthFactor,
    },

    #[error("liquidation of {user} did not improve health factor ({before} -> {after})")]
    LiquidationIneffective {
        user: Pubkey,
        before: HealthFactor,
        after: HealthFactor,
    },

    #[error("math overflow")]
    MathOverflow,

    #[error("invalid engine config: {0}")]
    Config(#[from] serde_json::Error),
}

impl EngineError {
    /// Short class name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation(_) | EngineError::Config(_) => "validation",
            EngineError::Oracle(_) => "oracle",
            EngineError::TransferFailed { .. } | EngineError::BurnFailed { .. } => "transfer",
            EngineError::MintFailed { .. } => "mint",
            EngineError::BreakHealthFactor { .. } | EngineError::InsufficientCollateral { .. } => {
                "solvency"
            }
            EngineError::HealthFactorOk { .. } => "liquidation-precondition",
            EngineError::LiquidationIneffective { .. } => "liquidation-ineffective",
            EngineError::MathOverflow => "arithmetic",
        }
    }
}
