//! In-memory persistence backend.
//!
//! Stands in for the remote protocol API in tests and offline use. Applies
//! the same full-replace semantics the real API has: an update replaces the
//! stored document wholesale, children included, in submitted order.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use protocol_sync::{DocumentId, DocumentSnapshot, DocumentStore, StoreError};

/// A [`DocumentStore`] over a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryProtocolStore {
    documents: Mutex<HashMap<DocumentId, DocumentSnapshot>>,
}

impl InMemoryProtocolStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted documents.
    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.lock().unwrap().is_empty()
    }

    /// The persisted state of a document, if it exists.
    pub fn get(&self, id: &DocumentId) -> Option<DocumentSnapshot> {
        self.documents.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl DocumentStore for InMemoryProtocolStore {
    async fn create(&self, document: &DocumentSnapshot) -> Result<DocumentId, StoreError> {
        let id = DocumentId::new();
        self.documents
            .lock()
            .unwrap()
            .insert(id.clone(), document.clone());
        tracing::debug!(%id, "Created protocol");
        Ok(id)
    }

    async fn update(&self, id: DocumentId, document: &DocumentSnapshot) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().unwrap();
        match documents.get_mut(&id) {
            Some(stored) => {
                *stored = document.clone();
                tracing::debug!(%id, "Updated protocol");
                Ok(())
            }
            None => Err(anyhow::anyhow!("unknown protocol: {id}")),
        }
    }
}
