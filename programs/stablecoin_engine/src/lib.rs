//! Over-collateralized stablecoin engine.
//!
//! Users lock approved collateral assets and mint a USD-pegged synthetic asset against them.
//! Every position must keep a health factor of at least 1.0; positions below that can be
//! partially repaid by anyone in exchange for collateral at a bonus.

pub mod accounting;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod liquidation;
pub mod token;
mod transaction;

pub use accounting::{calculate_health_factor, AccountInfo, HealthFactor, PositionStatus};
pub use config::{AssetRegistry, CollateralAsset, EngineConfig, ProtocolParams};
pub use constants::*;
pub use engine::Engine;
pub use error::{EngineError, Result, ValidationError};
pub use events::{
    CollateralDeposited, CollateralRedeemed, EngineEvent, PositionLiquidated, StablecoinBurned,
    StablecoinMinted,
};
pub use ledger::{Ledger, Position};
pub use liquidation::{LiquidationOutcome, LiquidationQuote};
pub use price_oracle::{OracleError, PriceFeed, RoundData};
pub use token::{CollateralToken, StablecoinLedger};
