use crate::engine::CurioEngine;
use curio_core::error::EngineError;
use log::debug;
use std::fs;
use std::path::Path;

/// Binary state snapshots
///
/// The whole engine (collections, bearer stores, event log, id counter) is
/// one serializable value; a snapshot taken between operations captures a
/// consistent state because operations are atomic.
impl CurioEngine {
    /// Serialize the engine state to bytes
    pub fn snapshot(&self) -> Result<Vec<u8>, EngineError> {
        Ok(bincode::serialize(self)?)
    }

    /// Rebuild an engine from snapshot bytes
    pub fn restore(bytes: &[u8]) -> Result<Self, EngineError> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Write a snapshot to a file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let bytes = self.snapshot()?;
        fs::write(&path, &bytes)?;
        debug!("engine snapshot written ({} bytes)", bytes.len());
        Ok(())
    }

    /// Load an engine from a snapshot file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let bytes = fs::read(&path)?;
        Self::restore(&bytes)
    }
}
