use std::collections::BTreeMap;

use anchor_lang::prelude::{borsh, Pubkey};
use anchor_lang::{AnchorDeserialize, AnchorSerialize};

use crate::error::{EngineError, Result, ValidationError};

/// One user's collateral deposits and minted debt.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Position {
    /// Deposited amount per collateral asset, 18 decimals.
    pub collateral: BTreeMap<Pubkey, u128>,
    /// Stablecoin minted against the whole position.
    pub debt: u128,
}

impl Position {
    pub fn collateral_of(&self, asset: &Pubkey) -> u128 {
        self.collateral.get(asset).copied().unwrap_or(0)
    }
}

/// Owned store of every position.
///
/// Positions come into existence on first touch and are never removed.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    positions: BTreeMap<Pubkey, Position>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self, user: &Pubkey) -> Option<&Position> {
        self.positions.get(user)
    }

    pub fn positions(&self) -> impl Iterator<Item = (&Pubkey, &Position)> {
        self.positions.iter()
    }

    pub fn collateral_balance(&self, user: &Pubkey, asset: &Pubkey) -> u128 {
        self.positions
            .get(user)
            .map(|position| position.collateral_of(asset))
            .unwrap_or(0)
    }

    pub fn debt(&self, user: &Pubkey) -> u128 {
        self.positions.get(user).map(|position| position.debt).unwrap_or(0)
    }

    pub fn credit_collateral(&mut self, user: &Pubkey, asset: &Pubkey, amount: u128) -> Result<u128> {
        let balance = self
            .positions
            .entry(*user)
            .or_default()
            .collateral
            .entry(*asset)
            .or_insert(0);
        *balance = balance.checked_add(amount).ok_or(EngineError::MathOverflow)?;
        Ok(*balance)
    }

    /// Remove `amount` of `asset` from `user`. Never goes below zero.
    pub fn debit_collateral(&mut self, user: &Pubkey, asset: &Pubkey, amount: u128) -> Result<u128> {
        let available = self.collateral_balance(user, asset);
        let remaining = available
            .checked_sub(amount)
            .ok_or(EngineError::InsufficientCollateral {
                user: *user,
                asset: *asset,
                available,
                requested: amount,
            })?;
        self.positions
            .entry(*user)
            .or_default()
            .collateral
            .insert(*asset, remaining);
        Ok(remaining)
    }

    pub fn add_debt(&mut self, user: &Pubkey, amount: u128) -> Result<u128> {
        let position = self.positions.entry(*user).or_default();
        position.debt = position.debt.checked_add(amount).ok_or(EngineError::MathOverflow)?;
        Ok(position.debt)
    }

    pub fn reduce_debt(&mut self, user: &Pubkey, amount: u128) -> Result<u128> {
        let owed = self.debt(user);
        let remaining = owed
            .checked_sub(amount)
            .ok_or(ValidationError::InsufficientDebt {
                owed,
                requested: amount,
            })?;
        self.positions.entry(*user).or_default().debt = remaining;
        Ok(remaining)
    }

    /// Capture the current positions of `users` so they can be restored verbatim.
    pub fn checkpoint(&self, users: &[Pubkey]) -> LedgerCheckpoint {
        let mut saved: Vec<(Pubkey, Option<Position>)> = Vec::with_capacity(users.len());
        for user in users {
            if saved.iter().all(|(seen, _)| seen != user) {
                saved.push((*user, self.positions.get(user).cloned()));
            }
        }
        LedgerCheckpoint { saved }
    }

    pub fn restore(&mut self, checkpoint: LedgerCheckpoint) {
        for (user, position) in checkpoint.saved {
            match position {
                Some(position) => {
                    self.positions.insert(user, position);
                }
                None => {
                    self.positions.remove(&user);
                }
            }
        }
    }
}

/// Saved copies of the positions an operation is about to touch.
#[derive(Clone, Debug)]
pub struct LedgerCheckpoint {
    saved: Vec<(Pubkey, Option<Position>)>,
}
