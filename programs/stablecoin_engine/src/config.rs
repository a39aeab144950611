use std::collections::BTreeSet;

use anchor_lang::prelude::Pubkey;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, ValidationError};

/// Risk parameters shared by every position.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ProtocolParams {
    /// Percent of collateral value counted toward solvency.
    pub liquidation_threshold: u128,
    /// Percent premium paid to liquidators, in seized collateral.
    pub liquidation_bonus: u128,
    /// Health factor floor, 18 decimals.
    pub min_health_factor: u128,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            liquidation_threshold: DEFAULT_LIQUIDATION_THRESHOLD,
            liquidation_bonus: DEFAULT_LIQUIDATION_BONUS,
            min_health_factor: MIN_HEALTH_FACTOR,
        }
    }
}

impl ProtocolParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.liquidation_threshold == 0 || self.liquidation_threshold > LIQUIDATION_PRECISION {
            return Err(ValidationError::InvalidParameter(
                "liquidation threshold must be within 1..=100",
            ));
        }
        if self.liquidation_bonus > LIQUIDATION_PRECISION {
            return Err(ValidationError::InvalidParameter(
                "liquidation bonus must not exceed 100",
            ));
        }
        if self.min_health_factor == 0 {
            return Err(ValidationError::InvalidParameter(
                "minimum health factor must be positive",
            ));
        }
        Ok(())
    }
}

/// An allowed collateral asset and the feed that prices it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollateralAsset {
    pub asset: Pubkey,
    pub price_feed: Pubkey,
}

/// Ordered set of allowed collateral assets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetRegistry {
    assets: Vec<CollateralAsset>,
}

impl AssetRegistry {
    /// Pair `assets[i]` with `feeds[i]`. Lists must have equal length and no repeated asset.
    pub fn new(assets: &[Pubkey], feeds: &[Pubkey]) -> Result<Self, ValidationError> {
        if assets.len() != feeds.len() {
            return Err(ValidationError::ConfigLengthMismatch {
                assets: assets.len(),
                feeds: feeds.len(),
            });
        }
        let mut seen = BTreeSet::new();
        let mut listed = Vec::with_capacity(assets.len());
        for (asset, price_feed) in assets.iter().zip(feeds) {
            if !seen.insert(*asset) {
                return Err(ValidationError::DuplicateAsset { asset: *asset });
            }
            listed.push(CollateralAsset {
                asset: *asset,
                price_feed: *price_feed,
            });
        }
        Ok(Self { assets: listed })
    }

    pub fn contains(&self, asset: &Pubkey) -> bool {
        self.assets.iter().any(|listed| listed.asset == *asset)
    }

    pub fn price_feed(&self, asset: &Pubkey) -> Result<Pubkey, ValidationError> {
        self.assets
            .iter()
            .find(|listed| listed.asset == *asset)
            .map(|listed| listed.price_feed)
            .ok_or(ValidationError::AssetNotAllowed { asset: *asset })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollateralAsset> {
        self.assets.iter()
    }

    pub fn assets(&self) -> Vec<Pubkey> {
        self.assets.iter().map(|listed| listed.asset).collect()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Construction-time configuration of an [`Engine`](crate::Engine).
///
/// Loaded from JSON with base58 addresses:
///
/// ```json
/// {
///   "engine": "<custody address>",
///   "stablecoin": "<stablecoin mint>",
///   "collateral_assets": ["<weth>", "<wbtc>"],
///   "price_feeds": ["<eth/usd>", "<btc/usd>"],
///   "params": { "liquidation_threshold": 50, "liquidation_bonus": 10 }
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Address holding deposited collateral and pulled stablecoin.
    #[serde(with = "base58")]
    pub engine: Pubkey,
    /// Address of the synthetic asset the engine mints.
    #[serde(with = "base58")]
    pub stablecoin: Pubkey,
    #[serde(with = "base58_list")]
    pub collateral_assets: Vec<Pubkey>,
    #[serde(with = "base58_list")]
    pub price_feeds: Vec<Pubkey>,
    #[serde(default)]
    pub params: ProtocolParams,
}

impl EngineConfig {
    pub fn new(
        engine: Pubkey,
        stablecoin: Pubkey,
        collateral_assets: Vec<Pubkey>,
        price_feeds: Vec<Pubkey>,
    ) -> Self {
        Self {
            engine,
            stablecoin,
            collateral_assets,
            price_feeds,
            params: ProtocolParams::default(),
        }
    }

    pub fn with_params(mut self, params: ProtocolParams) -> Self {
        self.params = params;
        self
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate parameters and build the asset registry.
    pub fn registry(&self) -> Result<AssetRegistry, ValidationError> {
        self.params.validate()?;
        AssetRegistry::new(&self.collateral_assets, &self.price_feeds)
    }
}

mod base58 {
    use std::str::FromStr;

    use anchor_lang::prelude::Pubkey;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(key)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Pubkey::from_str(&raw).map_err(de::Error::custom)
    }
}

mod base58_list {
    use std::str::FromStr;

    use anchor_lang::prelude::Pubkey;
    use serde::ser::SerializeSeq;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(keys: &[Pubkey], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(keys.len()))?;
        for key in keys {
            seq.serialize_element(&key.to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Pubkey>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|raw| Pubkey::from_str(raw).map_err(de::Error::custom))
            .collect()
    }
}
