use curio_core::error::EngineError;
use curio_core::id::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ownership-tracked object store
///
/// Bearer objects (assets, tickets, capabilities, claimed-asset records) are
/// exclusively held values: at most one holder per object at a time, and only
/// the current holder may present the object as an operation input. The store
/// records the holder alongside each object; `held`/`held_mut`/`take_held`
/// verify the presenting caller before handing the object over. Double-use of
/// a ticket or double-claim of an asset is therefore structural, not
/// something callers of this store detect.
#[derive(Debug, Serialize, Deserialize)]
pub struct BearerStore<T> {
    objects: HashMap<ObjectId, T>,
    holders: HashMap<ObjectId, ObjectId>,
}

impl<T> Default for BearerStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BearerStore<T> {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            holders: HashMap::new(),
        }
    }

    /// Record a new object under the given holder
    pub fn insert(&mut self, id: ObjectId, holder: ObjectId, object: T) {
        self.objects.insert(id, object);
        self.holders.insert(id, holder);
    }

    /// Check whether an object exists
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Look up an object without an ownership check (read-only surface)
    pub fn get(&self, id: &ObjectId) -> Option<&T> {
        self.objects.get(id)
    }

    /// Mutably look up an object without an ownership check
    ///
    /// For operations whose authorization comes from a different object, such
    /// as a ticket authorizing a mutation of its target asset.
    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut T> {
        self.objects.get_mut(id)
    }

    /// Current holder of an object, if it exists
    pub fn holder_of(&self, id: &ObjectId) -> Option<&ObjectId> {
        self.holders.get(id)
    }

    /// Borrow an object presented by its current holder
    ///
    /// Fails with `NotFound` for unknown ids and `NotAuthorized` when the
    /// presenter is not the recorded holder.
    pub fn held(&self, id: &ObjectId, presenter: &ObjectId) -> Result<&T, EngineError> {
        self.check_holder(id, presenter)?;
        Ok(self.objects.get(id).expect("holder entry implies object"))
    }

    /// Mutably borrow an object presented by its current holder
    pub fn held_mut(&mut self, id: &ObjectId, presenter: &ObjectId) -> Result<&mut T, EngineError> {
        self.check_holder(id, presenter)?;
        Ok(self.objects.get_mut(id).expect("holder entry implies object"))
    }

    /// Remove an object presented by its current holder
    ///
    /// The id becomes invalid for all future operations.
    pub fn take_held(&mut self, id: &ObjectId, presenter: &ObjectId) -> Result<T, EngineError> {
        self.check_holder(id, presenter)?;
        self.holders.remove(id);
        Ok(self.objects.remove(id).expect("holder entry implies object"))
    }

    /// Reassign an object to a new holder
    ///
    /// Only the current holder may transfer.
    pub fn transfer(
        &mut self,
        id: &ObjectId,
        from: &ObjectId,
        to: ObjectId,
    ) -> Result<(), EngineError> {
        self.check_holder(id, from)?;
        self.holders.insert(*id, to);
        Ok(())
    }

    /// Number of objects currently stored
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn check_holder(&self, id: &ObjectId, presenter: &ObjectId) -> Result<(), EngineError> {
        match self.holders.get(id) {
            None => Err(EngineError::NotFound(format!("object {}", id))),
            Some(holder) if holder == presenter => Ok(()),
            Some(_) => Err(EngineError::NotAuthorized(format!(
                "{} does not hold object {}",
                presenter, id
            ))),
        }
    }
}
