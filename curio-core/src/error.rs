use crate::id::ObjectId;
use std::io;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with the
/// Curio lifecycle engine
///
/// Every rejected operation leaves the engine state untouched; callers decide
/// whether to retry with corrected inputs.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The presented capability is not an admin capability
    #[error("Not admin: {0}")]
    NotAdmin(String),

    /// The caller is not the owner of the target collection
    #[error("Not owner: {0}")]
    NotOwner(String),

    /// The caller lacks the required relationship to the target object
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// The entry point's expected mint type does not match the collection's
    #[error("Invalid mint type: expected {expected}, collection uses {actual}")]
    InvalidMintType { expected: String, actual: String },

    /// The tendered payment is below the required price
    #[error("Insufficient payment: required {required}, tendered {tendered}")]
    InsufficientPayment { required: u64, tendered: u64 },

    /// The collection has reached its maximum supply
    #[error("Collection full: max supply {max_supply} reached")]
    CollectionFull { max_supply: u64 },

    /// The collection does not permit post-mint metadata mutation
    #[error("Collection {0} is not dynamic")]
    CollectionNotDynamic(ObjectId),

    /// The ticket does not target the presented asset or collection
    #[error("Ticket mismatch: {0}")]
    TicketMismatch(String),

    /// The ticket has already been consumed
    #[error("Ticket {0} has already been used")]
    TicketUsed(ObjectId),

    /// An amount failed validation (zero where nonzero required, overdraw, etc.)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Errors related to missing objects
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO errors that occur when reading/writing snapshot files
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Anyhow error wrapper for error context
    #[error(transparent)]
    Context(#[from] anyhow::Error),
}

// Additional From conversions for common error types

impl From<bincode::Error> for EngineError {
    fn from(err: bincode::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}
