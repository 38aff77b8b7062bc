//! In-memory persistence
//!
//! Every entity collection sits behind the [`Repository`] trait so a database
//! backed implementation can replace [`MemoryStore`] without touching the
//! handlers. Nothing here survives a restart.

pub mod memory;
pub mod merge;
pub mod records;
pub mod settings;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;
pub use merge::{deep_merge, merge_onto, sanitize_patch, strip_masked_secret};
pub use settings::SettingsStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The record would not be valid after the change
    #[error("{0}")]
    InvalidRecord(String),

    /// Patch body was not a JSON object
    #[error("Patch must be a JSON object")]
    InvalidPatch,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A value that can live in a [`Repository`]
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Label used in messages, e.g. "Phone number"
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Refresh the modification timestamp, if the record carries one
    fn touch(&mut self, _now: DateTime<Utc>) {}

    /// Domain checks serde cannot express
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Keyed collection of records
///
/// Individual operations are atomic per record. There are no multi-record
/// transactions; concurrent writers to the same record are last-write-wins.
pub trait Repository<T: Record>: Send + Sync {
    fn list(&self) -> Vec<T>;

    fn get(&self, id: &str) -> Option<T>;

    fn contains(&self, id: &str) -> bool;

    /// Store a record under its id, returning the record it replaced
    fn insert(&self, record: T) -> Option<T>;

    /// Deep-merge a JSON patch onto the stored record.
    ///
    /// Returns `Ok(None)` when the id is unknown. A patch that leaves the record
    /// invalid fails and the stored record is unchanged.
    fn update(&self, id: &str, patch: &Value) -> StoreResult<Option<T>>;

    /// Apply a typed in-place change and refresh the modification timestamp
    fn modify(&self, id: &str, change: &mut dyn FnMut(&mut T)) -> Option<T>;

    fn remove(&self, id: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Generate a record id with the given prefix, e.g. `pn-3f2a...`
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_prefix_and_uniqueness() {
        let a = new_id("pn");
        let b = new_id("pn");
        assert!(a.starts_with("pn-"));
        assert_ne!(a, b);
    }
}
