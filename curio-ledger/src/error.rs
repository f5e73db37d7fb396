use thiserror::Error;

/// Errors produced by the points ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The caller does not hold the treasury authority
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// A spend or split exceeds the available balance
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    /// An amount failed validation
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
