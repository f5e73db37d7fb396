use crate::caps::{AdminCap, Capability, OwnerCap};
use crate::store::BearerStore;
use chrono::Utc;
use curio_core::balance::Balance;
use curio_core::error::EngineError;
use curio_core::events::EngineEvent;
use curio_core::id::ObjectId;
use curio_core::metadata::AssetMetadata;
use curio_core::objects::{Asset, ClaimedAsset, Collection, CollectionConfig, MintType, UpdateTicket};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of a committed mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    /// Id of the freshly minted asset
    pub asset_id: ObjectId,

    /// Position in the collection's mint sequence
    pub token_number: u64,

    /// Price recorded on the asset; 0 for free and admin mints
    pub mint_price: u64,
}

/// The collectible lifecycle engine
///
/// One engine value owns every collection, bearer object, and emitted fact.
/// All operations take `&mut self` and either commit fully or fail with no
/// state change: every precondition is checked before the first mutation.
/// The execution environment is expected to serialize operations against a
/// given engine value; operations against different engines are independent.
#[derive(Debug, Serialize, Deserialize)]
pub struct CurioEngine {
    collections: HashMap<ObjectId, Collection>,
    caps: BearerStore<Capability>,
    assets: BearerStore<Asset>,
    tickets: BearerStore<UpdateTicket>,
    claimed: BearerStore<ClaimedAsset>,
    events: Vec<EngineEvent>,
    id_nonce: u64,
}

impl CurioEngine {
    /// One-time platform bootstrap
    ///
    /// Creates the engine together with the single AdminCap, held by `admin`.
    /// No other path mints an AdminCap.
    pub fn bootstrap(admin: ObjectId) -> (Self, ObjectId) {
        let mut engine = Self {
            collections: HashMap::new(),
            caps: BearerStore::new(),
            assets: BearerStore::new(),
            tickets: BearerStore::new(),
            claimed: BearerStore::new(),
            events: Vec::new(),
            id_nonce: 0,
        };

        let cap_id = engine.fresh_id(b"admin_cap");
        engine
            .caps
            .insert(cap_id, admin, Capability::Admin(AdminCap::new(cap_id)));

        debug!("platform bootstrapped, admin cap {} issued to {}", cap_id, admin);
        (engine, cap_id)
    }

    /// Issue an OwnerCap bound to `target`, held by `target`
    ///
    /// Admin-gated: the caller must hold the presented AdminCap.
    pub fn issue_owner_cap(
        &mut self,
        caller: ObjectId,
        admin_cap: ObjectId,
        target: ObjectId,
    ) -> Result<ObjectId, EngineError> {
        self.require_admin(&caller, &admin_cap)?;

        let cap_id = self.fresh_id(b"owner_cap");
        self.caps
            .insert(cap_id, target, Capability::Owner(OwnerCap::new(cap_id, target)));

        debug!("owner cap {} issued to {}", cap_id, target);
        Ok(cap_id)
    }

    /// Create a new collection
    ///
    /// The presented capability must be held by the caller and be either the
    /// AdminCap or an OwnerCap bound to the caller. The caller becomes both
    /// creator and owner of the collection.
    pub fn create_collection(
        &mut self,
        caller: ObjectId,
        cap: ObjectId,
        config: CollectionConfig,
    ) -> Result<ObjectId, EngineError> {
        match self.caps.held(&cap, &caller)? {
            Capability::Admin(_) => {}
            Capability::Owner(owner_cap) => {
                if owner_cap.creator() != &caller {
                    return Err(EngineError::NotAuthorized(format!(
                        "owner cap {} is not bound to caller {}",
                        cap, caller
                    )));
                }
            }
        }

        let collection_id = self.fresh_id(b"collection");
        let name = config.name.clone();
        let mint_type = config.mint_type;
        let collection = Collection::new(collection_id, caller, caller, config)?;
        self.collections.insert(collection_id, collection);

        self.events.push(EngineEvent::CollectionCreated {
            collection_id,
            creator: caller,
            name,
            mint_type,
        });

        debug!("collection {} created by {}", collection_id, caller);
        Ok(collection_id)
    }

    // ------------------------------------------------------------------
    // Minting
    // ------------------------------------------------------------------

    /// Mint from a free collection; no payment is accepted
    pub fn mint_free(
        &mut self,
        _caller: ObjectId,
        collection_id: ObjectId,
        metadata: AssetMetadata,
        recipient: ObjectId,
    ) -> Result<MintReceipt, EngineError> {
        self.mint_with(collection_id, MintType::Free, metadata, recipient, |_| Ok(0))
    }

    /// Mint from a fixed-price collection
    ///
    /// Exactly `base_price` is split out of the tendered balance into escrow;
    /// any excess never leaves the caller, which is the change-return
    /// behavior. Fails with `InsufficientPayment` when the tendered value is
    /// below the price, leaving the balance untouched.
    pub fn mint_fixed(
        &mut self,
        _caller: ObjectId,
        collection_id: ObjectId,
        payment: &mut Balance,
        metadata: AssetMetadata,
        recipient: ObjectId,
    ) -> Result<MintReceipt, EngineError> {
        self.mint_with(collection_id, MintType::Fixed, metadata, recipient, |collection| {
            let price = collection.base_price;
            let tendered = payment.value();
            if tendered < price {
                return Err(EngineError::InsufficientPayment {
                    required: price,
                    tendered,
                });
            }
            let exact = payment.split(price)?;
            collection.deposit(exact);
            Ok(price)
        })
    }

    /// Mint from a dynamic-price collection
    ///
    /// The caller-specified `requested_price` is trusted as-is. The tendered
    /// balance is drained in full with no change computation; the recorded
    /// mint price is `requested_price`. Fails with `InsufficientPayment` when
    /// the tendered value is below the requested price.
    pub fn mint_dynamic(
        &mut self,
        _caller: ObjectId,
        collection_id: ObjectId,
        payment: &mut Balance,
        requested_price: u64,
        metadata: AssetMetadata,
        recipient: ObjectId,
    ) -> Result<MintReceipt, EngineError> {
        self.mint_with(collection_id, MintType::Dynamic, metadata, recipient, |collection| {
            let tendered = payment.value();
            if tendered < requested_price {
                return Err(EngineError::InsufficientPayment {
                    required: requested_price,
                    tendered,
                });
            }
            collection.deposit(payment.take_all());
            Ok(requested_price)
        })
    }

    /// Admin variant of `mint_free`
    pub fn admin_mint_free(
        &mut self,
        caller: ObjectId,
        admin_cap: ObjectId,
        collection_id: ObjectId,
        metadata: AssetMetadata,
        recipient: ObjectId,
    ) -> Result<MintReceipt, EngineError> {
        self.require_admin(&caller, &admin_cap)?;
        self.mint_with(collection_id, MintType::Free, metadata, recipient, |_| Ok(0))
    }

    /// Admin variant of `mint_fixed`: no payment, mint price recorded as 0
    pub fn admin_mint_fixed(
        &mut self,
        caller: ObjectId,
        admin_cap: ObjectId,
        collection_id: ObjectId,
        metadata: AssetMetadata,
        recipient: ObjectId,
    ) -> Result<MintReceipt, EngineError> {
        self.require_admin(&caller, &admin_cap)?;
        self.mint_with(collection_id, MintType::Fixed, metadata, recipient, |_| Ok(0))
    }

    /// Admin variant of `mint_dynamic`: no payment, mint price recorded as 0
    pub fn admin_mint_dynamic(
        &mut self,
        caller: ObjectId,
        admin_cap: ObjectId,
        collection_id: ObjectId,
        metadata: AssetMetadata,
        recipient: ObjectId,
    ) -> Result<MintReceipt, EngineError> {
        self.require_admin(&caller, &admin_cap)?;
        self.mint_with(collection_id, MintType::Dynamic, metadata, recipient, |_| Ok(0))
    }

    // ------------------------------------------------------------------
    // Metadata updates
    // ------------------------------------------------------------------

    /// Direct update path: the asset's current holder replaces its metadata
    ///
    /// Returns the new metadata version. Fails with `NotAuthorized` when the
    /// asset does not belong to the presented collection, and with
    /// `CollectionNotDynamic` when the collection forbids post-mint mutation.
    pub fn update_direct(
        &mut self,
        caller: ObjectId,
        collection_id: ObjectId,
        asset_id: ObjectId,
        new_metadata: AssetMetadata,
    ) -> Result<u64, EngineError> {
        let collection = self
            .collections
            .get(&collection_id)
            .ok_or_else(|| EngineError::NotFound(format!("collection {}", collection_id)))?;
        let asset = self.assets.held_mut(&asset_id, &caller)?;

        if asset.collection_id != collection.id {
            return Err(EngineError::NotAuthorized(format!(
                "asset {} does not belong to collection {}",
                asset_id, collection_id
            )));
        }
        if !collection.is_dynamic {
            return Err(EngineError::CollectionNotDynamic(collection_id));
        }

        asset.apply_update(new_metadata);
        let metadata_version = asset.metadata_version;

        self.events.push(EngineEvent::MetadataUpdated {
            asset_id,
            collection_id,
            metadata_version,
        });

        debug!("asset {} updated to version {}", asset_id, metadata_version);
        Ok(metadata_version)
    }

    /// Issue a single-use update ticket for one asset to one recipient
    ///
    /// Admin-gated. The ticket embeds the full replacement payload and is
    /// held by the recipient until redeemed.
    pub fn issue_update_ticket(
        &mut self,
        caller: ObjectId,
        admin_cap: ObjectId,
        asset_id: ObjectId,
        collection_id: ObjectId,
        recipient: ObjectId,
        payload: AssetMetadata,
    ) -> Result<ObjectId, EngineError> {
        self.require_admin(&caller, &admin_cap)?;

        let ticket_id = self.fresh_id(b"update_ticket");
        let ticket = UpdateTicket::new(
            ticket_id,
            asset_id,
            collection_id,
            recipient,
            payload,
            caller,
            Utc::now().timestamp(),
        );
        self.tickets.insert(ticket_id, recipient, ticket);

        self.events.push(EngineEvent::UpdateTicketCreated {
            ticket_id,
            asset_id,
            collection_id,
            recipient,
        });

        debug!("update ticket {} issued for asset {}", ticket_id, asset_id);
        Ok(ticket_id)
    }

    /// Delegated update path: redeem a ticket against its target asset
    ///
    /// Validation order: ticket targets the presented asset, ticket targets
    /// the presented collection, caller is the authorized recipient, ticket
    /// unused. On success the ticket's payload is applied and the ticket is
    /// destroyed in the same step; no used-but-alive ticket is observable.
    pub fn redeem_update_ticket(
        &mut self,
        caller: ObjectId,
        collection_id: ObjectId,
        asset_id: ObjectId,
        ticket_id: ObjectId,
    ) -> Result<u64, EngineError> {
        let collection = self
            .collections
            .get(&collection_id)
            .ok_or_else(|| EngineError::NotFound(format!("collection {}", collection_id)))?;
        let ticket = self.tickets.held(&ticket_id, &caller)?;

        if ticket.nft_id != asset_id {
            return Err(EngineError::TicketMismatch(format!(
                "ticket {} targets asset {}, not {}",
                ticket_id, ticket.nft_id, asset_id
            )));
        }
        if ticket.collection_id != collection.id {
            return Err(EngineError::TicketMismatch(format!(
                "ticket {} targets collection {}, not {}",
                ticket_id, ticket.collection_id, collection_id
            )));
        }
        if ticket.recipient != caller {
            return Err(EngineError::NotAuthorized(format!(
                "ticket {} is not redeemable by {}",
                ticket_id, caller
            )));
        }
        if ticket.is_used {
            return Err(EngineError::TicketUsed(ticket_id));
        }
        if !collection.is_dynamic {
            return Err(EngineError::CollectionNotDynamic(collection_id));
        }
        if !self.assets.contains(&asset_id) {
            return Err(EngineError::NotFound(format!("asset {}", asset_id)));
        }

        // All validations passed: consume the ticket and apply its payload
        // as one indivisible step.
        let mut ticket = self.tickets.take_held(&ticket_id, &caller)?;
        ticket.is_used = true;
        let asset = self
            .assets
            .get_mut(&asset_id)
            .expect("asset presence checked above");
        asset.apply_update(ticket.payload);
        let metadata_version = asset.metadata_version;

        self.events.push(EngineEvent::MetadataUpdated {
            asset_id,
            collection_id,
            metadata_version,
        });
        self.events.push(EngineEvent::UpdateTicketRedeemed {
            ticket_id,
            asset_id,
            collection_id,
            recipient: caller,
        });

        debug!("ticket {} redeemed against asset {}", ticket_id, asset_id);
        Ok(metadata_version)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Exchange a held asset for a terminal claimed-asset record
    ///
    /// The record snapshots the collection's current base display fields, not
    /// the asset's own metadata. The asset is permanently destroyed; its id
    /// becomes invalid. `current_supply` is not decremented: claimed assets
    /// stay counted against the supply cap.
    pub fn claim(
        &mut self,
        caller: ObjectId,
        collection_id: ObjectId,
        asset_id: ObjectId,
    ) -> Result<ObjectId, EngineError> {
        let claimed_id = self.fresh_id(b"claimed_asset");

        let collection = self
            .collections
            .get(&collection_id)
            .ok_or_else(|| EngineError::NotFound(format!("collection {}", collection_id)))?;
        if !collection.is_claimable {
            return Err(EngineError::NotAuthorized(format!(
                "collection {} is not claimable",
                collection_id
            )));
        }

        let asset = self.assets.held(&asset_id, &caller)?;
        if asset.collection_id != collection_id {
            return Err(EngineError::NotAuthorized(format!(
                "asset {} does not belong to collection {}",
                asset_id, collection_id
            )));
        }

        let snapshot = collection.base_metadata();
        let asset = self.assets.take_held(&asset_id, &caller)?;

        let record = ClaimedAsset::new(
            claimed_id,
            asset.id,
            snapshot,
            caller,
            Utc::now().timestamp(),
        );
        self.claimed.insert(claimed_id, caller, record);

        self.events.push(EngineEvent::AssetClaimed {
            claimed_id,
            original_asset_id: asset_id,
            collection_id,
            claimer: caller,
        });

        debug!("asset {} claimed as {}", asset_id, claimed_id);
        Ok(claimed_id)
    }

    /// Destroy a held asset without producing a claimed-asset record
    ///
    /// Like `claim`, the supply counter is not decremented.
    pub fn burn(&mut self, caller: ObjectId, asset_id: ObjectId) -> Result<(), EngineError> {
        let asset = self.assets.take_held(&asset_id, &caller)?;

        self.events.push(EngineEvent::AssetBurned {
            asset_id,
            collection_id: asset.collection_id,
            holder: caller,
        });

        debug!("asset {} burned by {}", asset_id, caller);
        Ok(())
    }

    /// Drain a collection's escrow to zero and hand the full amount out
    ///
    /// Only the collection owner may withdraw; there is no partial
    /// withdrawal.
    pub fn withdraw_funds(
        &mut self,
        caller: ObjectId,
        collection_id: ObjectId,
    ) -> Result<Balance, EngineError> {
        let collection = self
            .collections
            .get_mut(&collection_id)
            .ok_or_else(|| EngineError::NotFound(format!("collection {}", collection_id)))?;
        if collection.owner != caller {
            return Err(EngineError::NotOwner(format!(
                "{} does not own collection {}",
                caller, collection_id
            )));
        }

        let funds = collection.drain_funds();
        debug!(
            "{} withdrew {} from collection {}",
            caller,
            funds.value(),
            collection_id
        );
        Ok(funds)
    }

    /// Administratively correct the recorded mint price of a dynamic asset
    ///
    /// A no-op when the asset is unknown to the collection's price table.
    pub fn set_dynamic_price(
        &mut self,
        caller: ObjectId,
        admin_cap: ObjectId,
        collection_id: ObjectId,
        asset_id: ObjectId,
        new_price: u64,
    ) -> Result<(), EngineError> {
        self.require_admin(&caller, &admin_cap)?;

        let collection = self
            .collections
            .get_mut(&collection_id)
            .ok_or_else(|| EngineError::NotFound(format!("collection {}", collection_id)))?;
        if collection.set_dynamic_price(&asset_id, new_price) {
            debug!("mint price of asset {} corrected to {}", asset_id, new_price);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transfers
    // ------------------------------------------------------------------

    /// Transfer a held asset to another identity
    pub fn transfer_asset(
        &mut self,
        caller: ObjectId,
        asset_id: ObjectId,
        to: ObjectId,
    ) -> Result<(), EngineError> {
        self.assets.transfer(&asset_id, &caller, to)
    }

    /// Transfer a held update ticket to another identity
    ///
    /// Tickets remain redeemable only by their authorized recipient; the
    /// transferee of a mismatched ticket cannot use it.
    pub fn transfer_ticket(
        &mut self,
        caller: ObjectId,
        ticket_id: ObjectId,
        to: ObjectId,
    ) -> Result<(), EngineError> {
        self.tickets.transfer(&ticket_id, &caller, to)
    }

    /// Transfer a held capability token to another identity
    pub fn transfer_cap(
        &mut self,
        caller: ObjectId,
        cap_id: ObjectId,
        to: ObjectId,
    ) -> Result<(), EngineError> {
        self.caps.transfer(&cap_id, &caller, to)
    }

    // ------------------------------------------------------------------
    // Read-only surface
    // ------------------------------------------------------------------

    /// Number of assets minted against a collection
    pub fn asset_count(&self, collection_id: &ObjectId) -> Result<u64, EngineError> {
        Ok(self.require_collection(collection_id)?.asset_count())
    }

    /// Escrowed value currently held by a collection
    pub fn total_funds(&self, collection_id: &ObjectId) -> Result<u64, EngineError> {
        Ok(self.require_collection(collection_id)?.total_funds())
    }

    /// Whether a ticket exists and is still redeemable
    pub fn ticket_is_valid(&self, ticket_id: &ObjectId) -> bool {
        self.tickets
            .get(ticket_id)
            .map(|ticket| !ticket.is_used)
            .unwrap_or(false)
    }

    /// The asset a ticket targets
    pub fn ticket_target_asset(&self, ticket_id: &ObjectId) -> Result<ObjectId, EngineError> {
        Ok(self.require_ticket(ticket_id)?.nft_id)
    }

    /// The identity authorized to redeem a ticket
    pub fn ticket_recipient(&self, ticket_id: &ObjectId) -> Result<ObjectId, EngineError> {
        Ok(self.require_ticket(ticket_id)?.recipient)
    }

    /// Borrow a collection
    pub fn collection(&self, collection_id: &ObjectId) -> Result<&Collection, EngineError> {
        self.require_collection(collection_id)
    }

    /// Borrow a live asset
    pub fn asset(&self, asset_id: &ObjectId) -> Result<&Asset, EngineError> {
        self.assets
            .get(asset_id)
            .ok_or_else(|| EngineError::NotFound(format!("asset {}", asset_id)))
    }

    /// Borrow a claimed-asset record
    pub fn claimed_asset(&self, claimed_id: &ObjectId) -> Result<&ClaimedAsset, EngineError> {
        self.claimed
            .get(claimed_id)
            .ok_or_else(|| EngineError::NotFound(format!("claimed asset {}", claimed_id)))
    }

    /// Current holder of a live asset
    pub fn asset_holder(&self, asset_id: &ObjectId) -> Option<&ObjectId> {
        self.assets.holder_of(asset_id)
    }

    /// Facts emitted so far
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Drain the emitted facts for an off-engine indexer
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Shared mint path: gate on mint type and capacity, collect payment via
    /// `pay`, allocate the asset, and emit the creation fact.
    ///
    /// `pay` validates and deposits the payment against the collection and
    /// returns the mint price to record; it runs only after the mint-type and
    /// capacity checks, and every fallible step precedes the first deposit,
    /// so a failed mint leaves collection, escrow, and tendered balance
    /// untouched.
    fn mint_with<F>(
        &mut self,
        collection_id: ObjectId,
        expected: MintType,
        metadata: AssetMetadata,
        recipient: ObjectId,
        pay: F,
    ) -> Result<MintReceipt, EngineError>
    where
        F: FnOnce(&mut Collection) -> Result<u64, EngineError>,
    {
        let asset_id = self.fresh_id(b"asset");

        let collection = self
            .collections
            .get_mut(&collection_id)
            .ok_or_else(|| EngineError::NotFound(format!("collection {}", collection_id)))?;
        if collection.mint_type != expected {
            return Err(EngineError::InvalidMintType {
                expected: expected.to_string(),
                actual: collection.mint_type.to_string(),
            });
        }
        collection.ensure_capacity()?;

        let mint_price = pay(&mut *collection)?;
        let token_number = collection.record_mint(asset_id, mint_price)?;
        let creator = collection.creator;

        let asset = Asset::new(asset_id, collection_id, creator, token_number, mint_price, metadata);
        self.assets.insert(asset_id, recipient, asset);

        self.events.push(EngineEvent::AssetMinted {
            asset_id,
            collection_id,
            creator,
            recipient,
            token_number,
            mint_price,
        });

        debug!(
            "asset {} (token #{}) minted in collection {} for {}",
            asset_id, token_number, collection_id, recipient
        );
        Ok(MintReceipt {
            asset_id,
            token_number,
            mint_price,
        })
    }

    /// Verify the caller holds the presented capability and that it is the
    /// AdminCap
    fn require_admin(&self, caller: &ObjectId, cap_id: &ObjectId) -> Result<(), EngineError> {
        let cap = self.caps.held(cap_id, caller)?;
        if !cap.is_admin() {
            return Err(EngineError::NotAdmin(format!(
                "capability {} is not an admin capability",
                cap_id
            )));
        }
        Ok(())
    }

    fn require_collection(&self, collection_id: &ObjectId) -> Result<&Collection, EngineError> {
        self.collections
            .get(collection_id)
            .ok_or_else(|| EngineError::NotFound(format!("collection {}", collection_id)))
    }

    fn require_ticket(&self, ticket_id: &ObjectId) -> Result<&UpdateTicket, EngineError> {
        self.tickets
            .get(ticket_id)
            .ok_or_else(|| EngineError::NotFound(format!("ticket {}", ticket_id)))
    }

    /// Allocate a fresh, engine-unique object id
    ///
    /// The nonce advances even when the surrounding operation later fails, so
    /// ids are never reused.
    fn fresh_id(&mut self, domain: &[u8]) -> ObjectId {
        self.id_nonce += 1;
        ObjectId::derive(&[domain, &self.id_nonce.to_le_bytes()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curio_core::metadata::Attribute;

    fn unique_id() -> ObjectId {
        ObjectId::unique_id_for_tests()
    }

    fn metadata(name: &str) -> AssetMetadata {
        AssetMetadata::new(name, "an asset", "ipfs://asset.png", vec![])
    }

    fn config(mint_type: MintType, base_price: u64, max_supply: Option<u64>) -> CollectionConfig {
        CollectionConfig {
            name: "Series One".to_string(),
            description: "The first series".to_string(),
            mint_type,
            base_price,
            is_open_edition: false,
            max_supply,
            is_dynamic: true,
            is_claimable: true,
            base_image: "ipfs://series-one/base.png".to_string(),
            base_attributes: vec![Attribute::new("series", "one")],
        }
    }

    /// Bootstrapped engine plus admin identity, admin cap, and a creator with
    /// an owner cap.
    fn setup() -> (CurioEngine, ObjectId, ObjectId, ObjectId, ObjectId) {
        let admin = unique_id();
        let creator = unique_id();
        let (mut engine, admin_cap) = CurioEngine::bootstrap(admin);
        let owner_cap = engine.issue_owner_cap(admin, admin_cap, creator).unwrap();
        (engine, admin, admin_cap, creator, owner_cap)
    }

    #[test]
    fn test_bootstrap_issues_admin_cap() {
        let admin = unique_id();
        let (engine, admin_cap) = CurioEngine::bootstrap(admin);
        assert_eq!(engine.caps.holder_of(&admin_cap), Some(&admin));
    }

    #[test]
    fn test_issue_owner_cap_requires_admin_cap() {
        let (mut engine, _admin, _admin_cap, creator, owner_cap) = setup();

        // An owner cap is not an admin cap
        let result = engine.issue_owner_cap(creator, owner_cap, unique_id());
        assert!(matches!(result, Err(EngineError::NotAdmin(_))));

        // A forged cap id is simply unknown
        let result = engine.issue_owner_cap(creator, unique_id(), unique_id());
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_create_collection_authorization() {
        let (mut engine, admin, admin_cap, creator, owner_cap) = setup();

        // Creator with a bound owner cap succeeds
        let id = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, None))
            .unwrap();
        assert_eq!(engine.collection(&id).unwrap().owner, creator);

        // Admin cap also works
        engine
            .create_collection(admin, admin_cap, config(MintType::Free, 0, None))
            .unwrap();

        // A stranger presenting someone else's cap is rejected by the store
        let stranger = unique_id();
        let result =
            engine.create_collection(stranger, owner_cap, config(MintType::Free, 0, None));
        assert!(matches!(result, Err(EngineError::NotAuthorized(_))));
    }

    #[test]
    fn test_fixed_mint_scenario() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Fixed, 100, Some(2)))
            .unwrap();

        let buyer = unique_id();
        let mut wallet = Balance::issue(400);

        // Two successful mints receive token numbers 1 and 2
        let first = engine
            .mint_fixed(buyer, collection_id, &mut wallet, metadata("one"), buyer)
            .unwrap();
        let second = engine
            .mint_fixed(buyer, collection_id, &mut wallet, metadata("two"), buyer)
            .unwrap();
        assert_eq!(first.token_number, 1);
        assert_eq!(second.token_number, 2);
        assert_eq!(wallet.value(), 200);
        assert_eq!(engine.total_funds(&collection_id).unwrap(), 200);

        // Third mint fails with CollectionFull; escrow and wallet untouched
        let result = engine.mint_fixed(buyer, collection_id, &mut wallet, metadata("three"), buyer);
        assert!(matches!(result, Err(EngineError::CollectionFull { max_supply: 2 })));
        assert_eq!(wallet.value(), 200);
        assert_eq!(engine.total_funds(&collection_id).unwrap(), 200);
        assert_eq!(engine.asset_count(&collection_id).unwrap(), 2);
    }

    #[test]
    fn test_fixed_mint_change_returned() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Fixed, 100, None))
            .unwrap();

        let buyer = unique_id();
        let mut wallet = Balance::issue(137);

        let receipt = engine
            .mint_fixed(buyer, collection_id, &mut wallet, metadata("one"), buyer)
            .unwrap();
        assert_eq!(receipt.mint_price, 100);

        // Exactly base_price escrowed, exactly the excess kept by the buyer
        assert_eq!(engine.total_funds(&collection_id).unwrap(), 100);
        assert_eq!(wallet.value(), 37);
    }

    #[test]
    fn test_fixed_mint_insufficient_payment() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Fixed, 100, Some(2)))
            .unwrap();

        let buyer = unique_id();
        let mut wallet = Balance::issue(50);

        let result = engine.mint_fixed(buyer, collection_id, &mut wallet, metadata("one"), buyer);
        assert!(matches!(
            result,
            Err(EngineError::InsufficientPayment {
                required: 100,
                tendered: 50
            })
        ));

        // No partial state: escrow empty, wallet untouched, nothing minted
        assert_eq!(engine.total_funds(&collection_id).unwrap(), 0);
        assert_eq!(wallet.value(), 50);
        assert_eq!(engine.asset_count(&collection_id).unwrap(), 0);
    }

    #[test]
    fn test_dynamic_mint_takes_full_tender() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Dynamic, 0, None))
            .unwrap();

        let buyer = unique_id();
        let mut wallet = Balance::issue(150);

        let receipt = engine
            .mint_dynamic(buyer, collection_id, &mut wallet, 100, metadata("one"), buyer)
            .unwrap();

        // The dynamic path computes no change: the whole tender is escrowed
        assert_eq!(wallet.value(), 0);
        assert_eq!(engine.total_funds(&collection_id).unwrap(), 150);
        assert_eq!(receipt.mint_price, 100);

        // Requested price lands in the per-asset table
        let collection = engine.collection(&collection_id).unwrap();
        assert_eq!(collection.dynamic_price(&receipt.asset_id), Some(100));
    }

    #[test]
    fn test_dynamic_mint_insufficient_payment() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Dynamic, 0, None))
            .unwrap();

        let buyer = unique_id();
        let mut wallet = Balance::issue(80);

        let result =
            engine.mint_dynamic(buyer, collection_id, &mut wallet, 100, metadata("one"), buyer);
        assert!(matches!(result, Err(EngineError::InsufficientPayment { .. })));
        assert_eq!(wallet.value(), 80);
    }

    #[test]
    fn test_mint_type_gating() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Fixed, 100, None))
            .unwrap();

        let buyer = unique_id();
        let result = engine.mint_free(buyer, collection_id, metadata("one"), buyer);
        assert!(matches!(result, Err(EngineError::InvalidMintType { .. })));
    }

    #[test]
    fn test_admin_mint_skips_payment() {
        let (mut engine, admin, admin_cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Fixed, 100, None))
            .unwrap();

        let recipient = unique_id();
        let receipt = engine
            .admin_mint_fixed(admin, admin_cap, collection_id, metadata("comp"), recipient)
            .unwrap();

        // Complimentary: nothing escrowed, price recorded as 0
        assert_eq!(receipt.mint_price, 0);
        assert_eq!(engine.total_funds(&collection_id).unwrap(), 0);
        assert_eq!(engine.asset(&receipt.asset_id).unwrap().mint_price, 0);

        // Still capability-gated
        let result = engine.admin_mint_fixed(
            creator,
            owner_cap,
            collection_id,
            metadata("comp"),
            recipient,
        );
        assert!(matches!(result, Err(EngineError::NotAdmin(_))));
    }

    #[test]
    fn test_admin_mint_respects_supply_cap() {
        let (mut engine, admin, admin_cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, Some(1)))
            .unwrap();

        engine
            .admin_mint_free(admin, admin_cap, collection_id, metadata("one"), unique_id())
            .unwrap();
        let result =
            engine.admin_mint_free(admin, admin_cap, collection_id, metadata("two"), unique_id());
        assert!(matches!(result, Err(EngineError::CollectionFull { .. })));
    }

    #[test]
    fn test_update_direct() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, None))
            .unwrap();

        let holder = unique_id();
        let receipt = engine
            .mint_free(holder, collection_id, metadata("before"), holder)
            .unwrap();

        let version = engine
            .update_direct(holder, collection_id, receipt.asset_id, metadata("after"))
            .unwrap();
        assert_eq!(version, 2);
        assert_eq!(engine.asset(&receipt.asset_id).unwrap().metadata.name, "after");

        // A non-holder cannot update
        let stranger = unique_id();
        let result =
            engine.update_direct(stranger, collection_id, receipt.asset_id, metadata("x"));
        assert!(matches!(result, Err(EngineError::NotAuthorized(_))));
    }

    #[test]
    fn test_update_direct_requires_dynamic_collection() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let mut cfg = config(MintType::Free, 0, None);
        cfg.is_dynamic = false;
        let collection_id = engine.create_collection(creator, owner_cap, cfg).unwrap();

        let holder = unique_id();
        let receipt = engine
            .mint_free(holder, collection_id, metadata("frozen"), holder)
            .unwrap();

        let result = engine.update_direct(holder, collection_id, receipt.asset_id, metadata("x"));
        assert!(matches!(result, Err(EngineError::CollectionNotDynamic(_))));
        assert_eq!(engine.asset(&receipt.asset_id).unwrap().metadata_version, 1);
    }

    #[test]
    fn test_update_direct_wrong_collection() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_a = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, None))
            .unwrap();
        let collection_b = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, None))
            .unwrap();

        let holder = unique_id();
        let receipt = engine
            .mint_free(holder, collection_a, metadata("a"), holder)
            .unwrap();

        let result = engine.update_direct(holder, collection_b, receipt.asset_id, metadata("x"));
        assert!(matches!(result, Err(EngineError::NotAuthorized(_))));
    }

    #[test]
    fn test_ticket_redemption_scenario() {
        let (mut engine, admin, admin_cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, None))
            .unwrap();

        let user = unique_id();
        let receipt = engine
            .mint_free(user, collection_id, metadata("old name"), user)
            .unwrap();

        let ticket_id = engine
            .issue_update_ticket(
                admin,
                admin_cap,
                receipt.asset_id,
                collection_id,
                user,
                metadata("X"),
            )
            .unwrap();
        assert!(engine.ticket_is_valid(&ticket_id));
        assert_eq!(engine.ticket_target_asset(&ticket_id).unwrap(), receipt.asset_id);
        assert_eq!(engine.ticket_recipient(&ticket_id).unwrap(), user);

        let version = engine
            .redeem_update_ticket(user, collection_id, receipt.asset_id, ticket_id)
            .unwrap();
        assert_eq!(version, 2);

        let asset = engine.asset(&receipt.asset_id).unwrap();
        assert_eq!(asset.metadata.name, "X");
        assert_eq!(asset.metadata_version, 2);

        // The ticket is gone: a second redemption cannot succeed
        assert!(!engine.ticket_is_valid(&ticket_id));
        let result = engine.redeem_update_ticket(user, collection_id, receipt.asset_id, ticket_id);
        assert!(matches!(result, Err(EngineError::NotFound(_))));
        assert_eq!(engine.asset(&receipt.asset_id).unwrap().metadata_version, 2);
    }

    #[test]
    fn test_ticket_mismatch() {
        let (mut engine, admin, admin_cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, None))
            .unwrap();

        let user = unique_id();
        let first = engine
            .mint_free(user, collection_id, metadata("one"), user)
            .unwrap();
        let second = engine
            .mint_free(user, collection_id, metadata("two"), user)
            .unwrap();

        let ticket_id = engine
            .issue_update_ticket(admin, admin_cap, first.asset_id, collection_id, user, metadata("X"))
            .unwrap();

        // Presenting the wrong asset fails before any mutation
        let result = engine.redeem_update_ticket(user, collection_id, second.asset_id, ticket_id);
        assert!(matches!(result, Err(EngineError::TicketMismatch(_))));
        assert!(engine.ticket_is_valid(&ticket_id));
        assert_eq!(engine.asset(&first.asset_id).unwrap().metadata_version, 1);
    }

    #[test]
    fn test_ticket_wrong_recipient_after_transfer() {
        let (mut engine, admin, admin_cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, None))
            .unwrap();

        let user = unique_id();
        let other = unique_id();
        let receipt = engine
            .mint_free(user, collection_id, metadata("one"), user)
            .unwrap();

        let ticket_id = engine
            .issue_update_ticket(admin, admin_cap, receipt.asset_id, collection_id, user, metadata("X"))
            .unwrap();

        // The ticket is a bearer object and can move, but only the bound
        // recipient may redeem it.
        engine.transfer_ticket(user, ticket_id, other).unwrap();
        let result = engine.redeem_update_ticket(other, collection_id, receipt.asset_id, ticket_id);
        assert!(matches!(result, Err(EngineError::NotAuthorized(_))));
        assert!(engine.ticket_is_valid(&ticket_id));
    }

    #[test]
    fn test_claim() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, Some(5)))
            .unwrap();

        let holder = unique_id();
        let receipt = engine
            .mint_free(holder, collection_id, metadata("custom name"), holder)
            .unwrap();

        // Customize the asset first; the claim must snapshot the collection's
        // base fields regardless.
        engine
            .update_direct(holder, collection_id, receipt.asset_id, metadata("very custom"))
            .unwrap();

        let claimed_id = engine.claim(holder, collection_id, receipt.asset_id).unwrap();
        let record = engine.claimed_asset(&claimed_id).unwrap();
        assert_eq!(record.original_asset_id, receipt.asset_id);
        assert_eq!(record.metadata.name, "Series One");
        assert_eq!(record.metadata.image, "ipfs://series-one/base.png");
        assert_eq!(record.claimer, holder);

        // The original asset is permanently gone
        assert!(engine.asset(&receipt.asset_id).is_err());
        assert_eq!(engine.asset_holder(&receipt.asset_id), None);

        // Claimed assets stay counted against the supply cap
        assert_eq!(engine.asset_count(&collection_id).unwrap(), 1);
    }

    #[test]
    fn test_claim_non_claimable_collection() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let mut cfg = config(MintType::Free, 0, None);
        cfg.is_claimable = false;
        let collection_id = engine.create_collection(creator, owner_cap, cfg).unwrap();

        let holder = unique_id();
        let receipt = engine
            .mint_free(holder, collection_id, metadata("keep"), holder)
            .unwrap();

        let result = engine.claim(holder, collection_id, receipt.asset_id);
        assert!(matches!(result, Err(EngineError::NotAuthorized(_))));

        // Asset unmodified and un-destroyed
        let asset = engine.asset(&receipt.asset_id).unwrap();
        assert_eq!(asset.metadata.name, "keep");
        assert_eq!(asset.metadata_version, 1);
        assert_eq!(engine.asset_holder(&receipt.asset_id), Some(&holder));
    }

    #[test]
    fn test_claim_requires_holding_the_asset() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, None))
            .unwrap();

        let holder = unique_id();
        let stranger = unique_id();
        let receipt = engine
            .mint_free(holder, collection_id, metadata("mine"), holder)
            .unwrap();

        let result = engine.claim(stranger, collection_id, receipt.asset_id);
        assert!(matches!(result, Err(EngineError::NotAuthorized(_))));
        assert!(engine.asset(&receipt.asset_id).is_ok());
    }

    #[test]
    fn test_burn() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, None))
            .unwrap();

        let holder = unique_id();
        let receipt = engine
            .mint_free(holder, collection_id, metadata("ash"), holder)
            .unwrap();

        engine.burn(holder, receipt.asset_id).unwrap();
        assert!(engine.asset(&receipt.asset_id).is_err());

        // Burn does not return capacity to the pool
        assert_eq!(engine.asset_count(&collection_id).unwrap(), 1);
    }

    #[test]
    fn test_withdraw_funds() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Fixed, 100, None))
            .unwrap();

        let buyer = unique_id();
        let mut wallet = Balance::issue(300);
        engine
            .mint_fixed(buyer, collection_id, &mut wallet, metadata("one"), buyer)
            .unwrap();
        engine
            .mint_fixed(buyer, collection_id, &mut wallet, metadata("two"), buyer)
            .unwrap();

        // Non-owner is rejected
        let result = engine.withdraw_funds(buyer, collection_id);
        assert!(matches!(result, Err(EngineError::NotOwner(_))));
        assert_eq!(engine.total_funds(&collection_id).unwrap(), 200);

        // Owner drains escrow to exactly zero
        let funds = engine.withdraw_funds(creator, collection_id).unwrap();
        assert_eq!(funds.value(), 200);
        assert_eq!(engine.total_funds(&collection_id).unwrap(), 0);
    }

    #[test]
    fn test_set_dynamic_price() {
        let (mut engine, admin, admin_cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Dynamic, 0, None))
            .unwrap();

        let buyer = unique_id();
        let mut wallet = Balance::issue(100);
        let receipt = engine
            .mint_dynamic(buyer, collection_id, &mut wallet, 100, metadata("one"), buyer)
            .unwrap();

        engine
            .set_dynamic_price(admin, admin_cap, collection_id, receipt.asset_id, 250)
            .unwrap();
        let collection = engine.collection(&collection_id).unwrap();
        assert_eq!(collection.dynamic_price(&receipt.asset_id), Some(250));

        // Unknown asset id is a silent no-op
        engine
            .set_dynamic_price(admin, admin_cap, collection_id, unique_id(), 1)
            .unwrap();
    }

    #[test]
    fn test_transfer_asset_moves_update_rights() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, None))
            .unwrap();

        let alice = unique_id();
        let bob = unique_id();
        let receipt = engine
            .mint_free(alice, collection_id, metadata("one"), alice)
            .unwrap();

        engine.transfer_asset(alice, receipt.asset_id, bob).unwrap();

        // Alice can no longer mutate or claim; Bob can
        let result = engine.update_direct(alice, collection_id, receipt.asset_id, metadata("x"));
        assert!(matches!(result, Err(EngineError::NotAuthorized(_))));
        engine
            .update_direct(bob, collection_id, receipt.asset_id, metadata("bob's"))
            .unwrap();
    }

    #[test]
    fn test_token_numbers_are_sequential() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, None))
            .unwrap();

        for expected in 1..=10u64 {
            let receipt = engine
                .mint_free(unique_id(), collection_id, metadata("n"), unique_id())
                .unwrap();
            assert_eq!(receipt.token_number, expected);
        }
    }

    #[test]
    fn test_events_emitted() {
        let (mut engine, _admin, _cap, creator, owner_cap) = setup();
        let collection_id = engine
            .create_collection(creator, owner_cap, config(MintType::Free, 0, None))
            .unwrap();

        let holder = unique_id();
        let receipt = engine
            .mint_free(holder, collection_id, metadata("one"), holder)
            .unwrap();

        let events = engine.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::CollectionCreated { collection_id: c, .. } if *c == collection_id
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::AssetMinted { asset_id, token_number: 1, mint_price: 0, .. }
                if *asset_id == receipt.asset_id
        )));

        // The log was drained
        assert!(engine.events().is_empty());
    }
}
