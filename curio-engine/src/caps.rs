use curio_core::id::ObjectId;
use serde::{Deserialize, Serialize};

/// Root capability: authorizes every admin-gated operation
///
/// Exactly one AdminCap exists, minted during engine bootstrap. Fields are
/// private and construction is crate-internal, so the token cannot be forged
/// by holding a reference to this crate; possession (being the recorded
/// bearer in the engine's store) is the sole proof of authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCap {
    id: ObjectId,
}

impl AdminCap {
    pub(crate) fn new(id: ObjectId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }
}

/// Creator capability bound to one identity
///
/// Issued per owner by an admin action; authorizes collection creation for
/// the bound creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerCap {
    id: ObjectId,
    creator: ObjectId,
}

impl OwnerCap {
    pub(crate) fn new(id: ObjectId, creator: ObjectId) -> Self {
        Self { id, creator }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn creator(&self) -> &ObjectId {
        &self.creator
    }
}

/// The capability kinds the engine's bearer store can hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    Admin(AdminCap),
    Owner(OwnerCap),
}

impl Capability {
    pub fn id(&self) -> &ObjectId {
        match self {
            Capability::Admin(cap) => cap.id(),
            Capability::Owner(cap) => cap.id(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Capability::Admin(_))
    }
}
