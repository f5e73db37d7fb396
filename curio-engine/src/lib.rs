pub mod caps;
pub mod engine;
pub mod snapshot;
pub mod store;

// Re-export the main types for convenience
pub use caps::{AdminCap, Capability, OwnerCap};
pub use engine::{CurioEngine, MintReceipt};
pub use store::BearerStore;

// Re-export core types used throughout the engine API
pub use curio_core::{
    Asset, AssetMetadata, Attribute, Balance, ClaimedAsset, Collection, CollectionConfig,
    EngineError, EngineEvent, MintType, ObjectId, UpdateTicket,
};
