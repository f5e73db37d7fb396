use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// A fungible value held by exactly one place at a time
///
/// Balance deliberately does not implement Clone: value moves between
/// balances via `split` and `join`, so the total in circulation is conserved
/// by construction. A collection's escrow, a caller's tendered payment, and a
/// withdrawn payout are all Balances.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance(u64);

impl Balance {
    /// Create an empty balance
    pub fn zero() -> Self {
        Balance(0)
    }

    /// Create a balance carrying `amount` units
    ///
    /// This is the ledger's sole issuance point; engine code only ever moves
    /// value between existing balances.
    pub fn issue(amount: u64) -> Self {
        Balance(amount)
    }

    /// Get the current value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Check whether the balance is empty
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Split `amount` units off into a new balance
    ///
    /// Fails with `InvalidAmount` when the balance holds less than `amount`;
    /// the balance is left untouched on failure.
    pub fn split(&mut self, amount: u64) -> Result<Balance, EngineError> {
        if amount > self.0 {
            return Err(EngineError::InvalidAmount(format!(
                "cannot split {} from balance of {}",
                amount, self.0
            )));
        }
        self.0 -= amount;
        Ok(Balance(amount))
    }

    /// Merge another balance into this one
    pub fn join(&mut self, other: Balance) {
        self.0 = self.0.saturating_add(other.0);
    }

    /// Drain this balance to zero, returning everything it held
    pub fn take_all(&mut self) -> Balance {
        Balance(std::mem::take(&mut self.0))
    }
}
