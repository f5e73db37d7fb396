use crate::id::ObjectId;
use crate::objects::MintType;
use serde::{Deserialize, Serialize};

/// Facts emitted by the engine for off-engine indexers and UIs
///
/// The event log is append-only; events are never replayed back into the
/// engine. `to_json` renders one event for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    CollectionCreated {
        collection_id: ObjectId,
        creator: ObjectId,
        name: String,
        mint_type: MintType,
    },
    AssetMinted {
        asset_id: ObjectId,
        collection_id: ObjectId,
        creator: ObjectId,
        recipient: ObjectId,
        token_number: u64,
        mint_price: u64,
    },
    MetadataUpdated {
        asset_id: ObjectId,
        collection_id: ObjectId,
        metadata_version: u64,
    },
    UpdateTicketCreated {
        ticket_id: ObjectId,
        asset_id: ObjectId,
        collection_id: ObjectId,
        recipient: ObjectId,
    },
    UpdateTicketRedeemed {
        ticket_id: ObjectId,
        asset_id: ObjectId,
        collection_id: ObjectId,
        recipient: ObjectId,
    },
    AssetClaimed {
        claimed_id: ObjectId,
        original_asset_id: ObjectId,
        collection_id: ObjectId,
        claimer: ObjectId,
    },
    AssetBurned {
        asset_id: ObjectId,
        collection_id: ObjectId,
        holder: ObjectId,
    },
}

impl EngineEvent {
    /// Render this event as a JSON string for indexer export
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
