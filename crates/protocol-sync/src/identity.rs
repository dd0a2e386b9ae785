//! Server-assigned document identity and its one-time promotion.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-assigned identity of a persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh identity.
    ///
    /// Normally only the persistence backend does this.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Tracks whether the editing session's document has been persisted yet.
///
/// `None` means the document is a client-only draft. Exactly one successful
/// save promotes it to `Some(id)`; the identity is stable for the rest of
/// the session.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdentityCell {
    id: Option<DocumentId>,
}

impl IdentityCell {
    pub(crate) fn new(id: Option<DocumentId>) -> Self {
        Self { id }
    }

    pub(crate) fn current(&self) -> Option<DocumentId> {
        self.id.clone()
    }

    /// Record the identity returned by the first successful save.
    ///
    /// Idempotent for the same id.
    ///
    /// # Panics
    ///
    /// Panics if called with a different id once one is set. Within a
    /// session the server identity never changes, so a conflicting
    /// promotion is a logic error upstream.
    pub(crate) fn promote(&mut self, id: DocumentId) -> bool {
        match &self.id {
            None => {
                self.id = Some(id);
                true
            }
            Some(current) if *current == id => false,
            Some(current) => {
                panic!("conflicting identity promotion: session has {current}, got {id}")
            }
        }
    }

    /// Replace the identity wholesale, e.g. when a different document is
    /// loaded into the editor.
    pub(crate) fn reset(&mut self, id: Option<DocumentId>) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unpersisted() {
        let cell = IdentityCell::new(None);
        assert!(cell.current().is_none());
    }

    #[test]
    fn test_promote_once() {
        let mut cell = IdentityCell::new(None);
        let id = DocumentId::new();
        assert!(cell.promote(id.clone()));
        assert_eq!(cell.current(), Some(id));
    }

    #[test]
    fn test_promote_same_id_is_noop() {
        let mut cell = IdentityCell::new(None);
        let id = DocumentId::new();
        cell.promote(id.clone());
        assert!(!cell.promote(id.clone()));
        assert_eq!(cell.current(), Some(id));
    }

    #[test]
    #[should_panic(expected = "conflicting identity promotion")]
    fn test_promote_conflicting_id_panics() {
        let mut cell = IdentityCell::new(None);
        cell.promote(DocumentId::new());
        cell.promote(DocumentId::new());
    }

    #[test]
    fn test_reset_replaces_identity() {
        let mut cell = IdentityCell::new(None);
        cell.promote(DocumentId::new());
        cell.reset(None);
        assert!(cell.current().is_none());
    }
}
