pub mod balance;
pub mod error;
pub mod events;
pub mod id;
pub mod metadata;
pub mod objects;

// Re-export the main types for convenience
pub use balance::Balance;
pub use error::EngineError;
pub use events::EngineEvent;
pub use id::ObjectId;
pub use metadata::{AssetMetadata, Attribute};
pub use objects::{Asset, ClaimedAsset, Collection, CollectionConfig, MintType, UpdateTicket};
