//! Fungible points ledger
//!
//! A companion to the collectible lifecycle engine: simple mint/join/split
//! accounting for a holder-bound points balance. Minting requires the
//! treasury authority; spending fails closed when the balance is short. The
//! lifecycle engine does not depend on this ledger's internals, only on that
//! contract.

pub mod error;

pub use error::LedgerError;

use curio_core::id::ObjectId;
use log::debug;
use serde::{Deserialize, Serialize};

/// A fungible, splittable points balance bound to one holder
///
/// Not Clone: points move between balances via `split` and `join`, so the
/// total issued is conserved outside the treasury's mint path.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsBalance {
    /// The identity this balance belongs to
    pub holder: ObjectId,

    amount: u64,
}

impl PointsBalance {
    /// Current value of the balance
    pub fn value(&self) -> u64 {
        self.amount
    }

    /// Split `amount` points off into a new balance for the same holder
    pub fn split(&mut self, amount: u64) -> Result<PointsBalance, LedgerError> {
        if amount > self.amount {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available: self.amount,
            });
        }
        self.amount -= amount;
        Ok(PointsBalance {
            holder: self.holder,
            amount,
        })
    }

    /// Merge another balance into this one
    ///
    /// Both balances must belong to the same holder.
    pub fn join(&mut self, other: PointsBalance) -> Result<(), LedgerError> {
        if other.holder != self.holder {
            return Err(LedgerError::NotAuthorized(format!(
                "cannot join balance of {} into balance of {}",
                other.holder, self.holder
            )));
        }
        self.amount = self.amount.saturating_add(other.amount);
        Ok(())
    }

    /// Deduct `amount` points
    ///
    /// Fails closed with `InsufficientBalance` when the balance is short; the
    /// balance is untouched on failure.
    pub fn spend(&mut self, amount: u64) -> Result<(), LedgerError> {
        if amount > self.amount {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available: self.amount,
            });
        }
        self.amount -= amount;
        Ok(())
    }
}

/// The sole issuance point for points
#[derive(Debug, Serialize, Deserialize)]
pub struct PointsTreasury {
    /// The identity allowed to mint points
    pub authority: ObjectId,

    /// Total points ever issued
    pub total_issued: u64,
}

impl PointsTreasury {
    /// Create a treasury controlled by `authority`
    pub fn new(authority: ObjectId) -> Self {
        Self {
            authority,
            total_issued: 0,
        }
    }

    /// Mint a fresh balance of `amount` points for `recipient`
    ///
    /// Requires the treasury authority; zero-point mints are rejected.
    pub fn mint_to(
        &mut self,
        caller: ObjectId,
        amount: u64,
        recipient: ObjectId,
    ) -> Result<PointsBalance, LedgerError> {
        self.require_authority(&caller)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(
                "cannot mint zero points".to_string(),
            ));
        }

        self.total_issued = self.total_issued.saturating_add(amount);
        debug!("{} points minted for {}", amount, recipient);
        Ok(PointsBalance {
            holder: recipient,
            amount,
        })
    }

    /// Mint `amount` additional points into an existing balance
    pub fn add(
        &mut self,
        caller: ObjectId,
        balance: &mut PointsBalance,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.require_authority(&caller)?;

        self.total_issued = self.total_issued.saturating_add(amount);
        balance.amount = balance.amount.saturating_add(amount);
        debug!("{} points added for {}", amount, balance.holder);
        Ok(())
    }

    fn require_authority(&self, caller: &ObjectId) -> Result<(), LedgerError> {
        if caller != &self.authority {
            return Err(LedgerError::NotAuthorized(format!(
                "{} is not the treasury authority",
                caller
            )));
        }
        Ok(())
    }
}
