//! Curio: capability-gated issuance and lifecycle engine for unique digital
//! collectibles, plus a companion fungible points ledger.

pub use curio_core::{
    Asset, AssetMetadata, Attribute, Balance, ClaimedAsset, Collection, CollectionConfig,
    EngineError, EngineEvent, MintType, ObjectId, UpdateTicket,
};

pub use curio_engine::{AdminCap, BearerStore, Capability, CurioEngine, MintReceipt, OwnerCap};

pub use curio_ledger::{LedgerError, PointsBalance, PointsTreasury};
