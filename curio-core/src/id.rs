use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::ops::Deref;

// ObjectId uniquely identifies an engine-managed object: a collection, an
// asset, a capability token, an update ticket, or a claimed-asset record.
// Caller identities use the same 32-byte space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId([u8; 32]);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format as a hex string with a prefix of the first 6 bytes
        let prefix = hex::encode(&self.0[0..6]);
        write!(f, "obj:{}", prefix)
    }
}

impl Ord for ObjectId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for ObjectId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId([0; 32])
    }
}

impl Deref for ObjectId {
    type Target = [u8; 32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ObjectId {
    pub fn new(uid: [u8; 32]) -> Self {
        ObjectId(uid)
    }

    /// Create an ObjectId from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        ObjectId(bytes)
    }

    /// Get a reference to the internal bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Derive an ObjectId from a list of seeds
    ///
    /// Derivation is deterministic: the same seeds always produce the same id.
    /// A domain separator keeps ids from colliding with other hash usages.
    pub fn derive(seeds: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();

        // Domain separator
        hasher.update(b"CURIO_Object");

        for seed in seeds {
            hasher.update(seed);
        }

        ObjectId(hasher.finalize().into())
    }

    /// Generate a unique ObjectId for testing purposes - exposed for testing in other crates
    pub fn unique_id_for_tests() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let counter = COUNTER.fetch_add(1, Ordering::Relaxed).to_le_bytes();
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("Time went backwards")
            .as_nanos()
            .to_le_bytes();

        Self::derive(&[&timestamp, &counter])
    }

    /// Create a random ObjectId for testing
    pub fn random() -> Self {
        // Generate a random ID using system time
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
            .to_le_bytes();

        Self::derive(&[&now, &[1, 2, 3, 4]])
    }
}
