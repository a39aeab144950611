//! External asset ledgers the engine moves value through.
//!
//! Both collaborators act on behalf of the engine's custody address: `transfer` always
//! sends from the engine, `transfer_from` spends an allowance granted to the engine. A
//! `false` return means the move did not happen.

use anchor_lang::prelude::Pubkey;

/// Fungible collateral assets, addressed by asset key.
pub trait CollateralToken {
    fn transfer(&mut self, asset: &Pubkey, to: &Pubkey, amount: u128) -> bool;

    fn transfer_from(&mut self, asset: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> bool;
}

/// The synthetic asset's balance ledger. Mint authority belongs to the engine alone.
pub trait StablecoinLedger {
    fn mint(&mut self, to: &Pubkey, amount: u128) -> bool;

    /// Destroy `amount` out of the engine's own balance.
    fn burn(&mut self, amount: u128) -> bool;

    fn transfer(&mut self, to: &Pubkey, amount: u128) -> bool;

    fn transfer_from(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> bool;
}
