//! Document snapshot codec.
//!
//! The engine never looks inside the document it synchronizes; it only needs
//! a deterministic, comparable encoding of the full editable state. A
//! canonical JSON value gives exactly that: serde struct serialization is
//! deterministic, and [`serde_json::Value`] equality is structural, so two
//! snapshots of equal logical states compare equal regardless of map
//! iteration order or other identity artifacts.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, SyncError};

/// An opaque, deeply-comparable encoding of the entire editable document
/// state.
///
/// The document is always treated as a monolithic replace unit; there is no
/// partial or diff structure.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot(Value);

impl DocumentSnapshot {
    /// Encode the current state of a document.
    ///
    /// Deterministic: the same logical state always produces an equal
    /// snapshot. Fails only if the document serializes data JSON cannot
    /// represent, which is a bug in the document type rather than a runtime
    /// condition.
    pub fn capture<T: Serialize>(document: &T) -> Result<Self> {
        let value =
            serde_json::to_value(document).map_err(|source| SyncError::Encode { source })?;
        Ok(Self(value))
    }

    /// The encoded value, as submitted to the persistence collaborator.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the snapshot, yielding the encoded value.
    pub fn into_value(self) -> Value {
        self.0
    }
}
