//! Synchronization error types.

use thiserror::Error;

/// Synchronization engine error.
///
/// Persistence failures are deliberately absent: the save executor converts
/// them into [`SaveState::Error`](crate::SaveState::Error) status instead of
/// returning them, so the caller's edit path never has to handle a failed
/// save inline. See [`StoreError`](crate::StoreError) for the error type the
/// persistence collaborator reports.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The live document could not be encoded into a snapshot.
    ///
    /// Only reachable when the document type serializes data that JSON
    /// cannot represent (e.g. a map with non-string keys); for plain
    /// editor state this never fires.
    #[error("Failed to encode document snapshot")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for synchronization operations.
pub type Result<T> = std::result::Result<T, SyncError>;
