//! Persistence collaborator interface.

use async_trait::async_trait;

use crate::identity::DocumentId;
use crate::snapshot::DocumentSnapshot;

/// Error type the collaborator reports.
///
/// The engine never interprets the cause; transient network failures and
/// server-side validation rejections are handled identically (surfaced as
/// error status, retried on the next cycle).
pub type StoreError = anyhow::Error;

/// The remote store the engine persists documents to.
///
/// Implementations are expected to apply **full-replace semantics** for
/// nested child collections: an update replaces the stored children with the
/// submitted ones in submitted order, rather than diffing. The engine always
/// submits the whole document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a document that has no server identity yet, returning the
    /// assigned identity.
    async fn create(&self, document: &DocumentSnapshot) -> Result<DocumentId, StoreError>;

    /// Replace the persisted state of an existing document.
    async fn update(&self, id: DocumentId, document: &DocumentSnapshot) -> Result<(), StoreError>;
}
