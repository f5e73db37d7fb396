use crate::balance::Balance;
use crate::error::EngineError;
use crate::id::ObjectId;
use crate::metadata::{AssetMetadata, Attribute};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Minting policy applied by a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MintType {
    /// Mints are free; no payment is accepted
    Free,
    /// Every mint costs the collection's base price exactly
    Fixed,
    /// Every mint carries a caller-specified price
    Dynamic,
}

impl fmt::Display for MintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintType::Free => write!(f, "free"),
            MintType::Fixed => write!(f, "fixed"),
            MintType::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Configuration supplied when creating a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Display name of the collection
    pub name: String,

    /// Display description of the collection
    pub description: String,

    /// Minting policy for the collection
    pub mint_type: MintType,

    /// Price per mint for fixed-price collections; must be 0 for free ones
    pub base_price: u64,

    /// Whether the collection ignores any supply cap
    pub is_open_edition: bool,

    /// Maximum supply; enforced only when the edition is not open
    pub max_supply: Option<u64>,

    /// Whether asset metadata may be mutated after mint
    pub is_dynamic: bool,

    /// Whether assets can be exchanged for claimed-asset records
    pub is_claimable: bool,

    /// Base image reference used for collection-level display
    pub base_image: String,

    /// Base attribute list used for collection-level display
    pub base_attributes: Vec<Attribute>,
}

/// The aggregate root for one mintable series
///
/// A collection holds the minting policy, the supply counters, and the
/// payment escrow. Every mint, withdrawal, and price update mutates it; it is
/// never deleted.
#[derive(Debug, Serialize, Deserialize)]
pub struct Collection {
    /// Unique identifier for this collection
    pub id: ObjectId,

    /// Display name of the collection
    pub name: String,

    /// Display description of the collection
    pub description: String,

    /// Identity that created the collection
    pub creator: ObjectId,

    /// Identity entitled to withdraw collected funds
    pub owner: ObjectId,

    /// Minting policy for the collection
    pub mint_type: MintType,

    /// Price per mint for fixed-price collections
    pub base_price: u64,

    /// Escrowed payments accumulated from mints
    pub collected_funds: Balance,

    /// Whether the collection ignores any supply cap
    pub is_open_edition: bool,

    /// Maximum supply; enforced only when the edition is not open
    pub max_supply: Option<u64>,

    /// Number of assets minted so far; never decremented
    pub current_supply: u64,

    /// Whether asset metadata may be mutated after mint
    pub is_dynamic: bool,

    /// Whether assets can be exchanged for claimed-asset records
    pub is_claimable: bool,

    /// Base image reference used for collection-level display
    pub base_image: String,

    /// Base attribute list used for collection-level display
    pub base_attributes: Vec<Attribute>,

    /// Monotonic token number counter; never reused
    pub next_token_number: u64,

    /// Per-asset mint prices, populated only for dynamic-price collections
    pub dynamic_prices: HashMap<ObjectId, u64>,
}

impl Collection {
    /// Create a new collection from a validated config
    ///
    /// Fails with `InvalidAmount` when a free-mint collection carries a
    /// nonzero base price.
    pub fn new(
        id: ObjectId,
        creator: ObjectId,
        owner: ObjectId,
        config: CollectionConfig,
    ) -> Result<Self, EngineError> {
        if config.mint_type == MintType::Free && config.base_price != 0 {
            return Err(EngineError::InvalidAmount(format!(
                "free-mint collection cannot carry base price {}",
                config.base_price
            )));
        }

        Ok(Self {
            id,
            name: config.name,
            description: config.description,
            creator,
            owner,
            mint_type: config.mint_type,
            base_price: config.base_price,
            collected_funds: Balance::zero(),
            is_open_edition: config.is_open_edition,
            max_supply: config.max_supply,
            current_supply: 0,
            is_dynamic: config.is_dynamic,
            is_claimable: config.is_claimable,
            base_image: config.base_image,
            base_attributes: config.base_attributes,
            next_token_number: 0,
            dynamic_prices: HashMap::new(),
        })
    }

    /// Check whether another asset can be minted under the supply cap
    pub fn has_capacity(&self) -> bool {
        if self.is_open_edition {
            return true;
        }
        match self.max_supply {
            Some(max) => self.current_supply < max,
            None => true,
        }
    }

    /// Fail with `CollectionFull` when the supply cap has been reached
    pub fn ensure_capacity(&self) -> Result<(), EngineError> {
        if !self.has_capacity() {
            // has_capacity only returns false when max_supply is set
            return Err(EngineError::CollectionFull {
                max_supply: self.max_supply.unwrap_or(0),
            });
        }
        Ok(())
    }

    /// Record a committed mint: assign the next token number and bump supply
    ///
    /// For dynamic-price collections the asset's mint price is also recorded
    /// in the per-asset price table for later administrative correction.
    pub fn record_mint(&mut self, asset_id: ObjectId, mint_price: u64) -> Result<u64, EngineError> {
        self.ensure_capacity()?;

        self.next_token_number += 1;
        self.current_supply += 1;

        if self.mint_type == MintType::Dynamic {
            self.dynamic_prices.insert(asset_id, mint_price);
        }

        Ok(self.next_token_number)
    }

    /// Move a payment into the collection's escrow
    pub fn deposit(&mut self, payment: Balance) {
        self.collected_funds.join(payment);
    }

    /// Drain the escrow to zero, returning the full amount
    pub fn drain_funds(&mut self) -> Balance {
        self.collected_funds.take_all()
    }

    /// Escrowed value currently held
    pub fn total_funds(&self) -> u64 {
        self.collected_funds.value()
    }

    /// Number of assets minted against this collection
    pub fn asset_count(&self) -> u64 {
        self.current_supply
    }

    /// Update the recorded mint price for an asset
    ///
    /// Returns false (a no-op) when the asset is unknown to the price table.
    pub fn set_dynamic_price(&mut self, asset_id: &ObjectId, new_price: u64) -> bool {
        match self.dynamic_prices.get_mut(asset_id) {
            Some(price) => {
                *price = new_price;
                true
            }
            None => false,
        }
    }

    /// Recorded mint price for an asset, if any
    pub fn dynamic_price(&self, asset_id: &ObjectId) -> Option<u64> {
        self.dynamic_prices.get(asset_id).copied()
    }

    /// Snapshot of the collection-level display fields
    ///
    /// Claim records copy these base values, not an asset's own metadata.
    pub fn base_metadata(&self) -> AssetMetadata {
        AssetMetadata::new(
            self.name.clone(),
            self.description.clone(),
            self.base_image.clone(),
            self.base_attributes.clone(),
        )
    }
}

/// A unique, bearer-owned collectible belonging to a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier for this asset
    pub id: ObjectId,

    /// Display metadata
    pub metadata: AssetMetadata,

    /// The collection this asset was minted under (back-reference)
    pub collection_id: ObjectId,

    /// Identity of the collection creator at mint time
    pub creator: ObjectId,

    /// Position in the collection's mint sequence; unique and increasing
    pub token_number: u64,

    /// Price paid at mint time; 0 for free and admin mints
    pub mint_price: u64,

    /// Starts at 1 and increments on every accepted update
    pub metadata_version: u64,
}

impl Asset {
    /// Build a freshly minted asset record
    pub fn new(
        id: ObjectId,
        collection_id: ObjectId,
        creator: ObjectId,
        token_number: u64,
        mint_price: u64,
        metadata: AssetMetadata,
    ) -> Self {
        Self {
            id,
            metadata,
            collection_id,
            creator,
            token_number,
            mint_price,
            metadata_version: 1,
        }
    }

    /// Replace the display metadata and bump the metadata version
    pub fn apply_update(&mut self, new_metadata: AssetMetadata) {
        self.metadata = new_metadata;
        self.metadata_version += 1;
    }
}

/// Single-use delegation of one metadata change to one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTicket {
    /// Unique identifier for this ticket
    pub id: ObjectId,

    /// The asset this ticket applies to
    pub nft_id: ObjectId,

    /// The collection the target asset belongs to
    pub collection_id: ObjectId,

    /// The only identity allowed to redeem the ticket
    pub recipient: ObjectId,

    /// The full replacement metadata applied on redemption
    pub payload: AssetMetadata,

    /// Identity that issued the ticket
    pub issuer: ObjectId,

    /// Unix timestamp of issuance
    pub issued_at: i64,

    /// Set transiently inside the redeem operation that destroys the ticket;
    /// a ticket is never observable as used but alive
    pub is_used: bool,
}

impl UpdateTicket {
    pub fn new(
        id: ObjectId,
        nft_id: ObjectId,
        collection_id: ObjectId,
        recipient: ObjectId,
        payload: AssetMetadata,
        issuer: ObjectId,
        issued_at: i64,
    ) -> Self {
        Self {
            id,
            nft_id,
            collection_id,
            recipient,
            payload,
            issuer,
            issued_at,
            is_used: false,
        }
    }
}

/// Terminal record produced by claiming an asset
///
/// Never mutated and never destroyed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedAsset {
    /// Unique identifier for this record
    pub id: ObjectId,

    /// Id of the asset that was retired; invalid for all future operations
    pub original_asset_id: ObjectId,

    /// Snapshot of the collection's base display fields at claim time
    pub metadata: AssetMetadata,

    /// Identity that performed the claim
    pub claimer: ObjectId,

    /// Unix timestamp of the claim
    pub claimed_at: i64,
}

impl ClaimedAsset {
    pub fn new(
        id: ObjectId,
        original_asset_id: ObjectId,
        metadata: AssetMetadata,
        claimer: ObjectId,
        claimed_at: i64,
    ) -> Self {
        Self {
            id,
            original_asset_id,
            metadata,
            claimer,
            claimed_at,
        }
    }
}
