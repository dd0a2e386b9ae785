//! Auto-save synchronization engine for Protocol Desk editors.
//!
//! Takes a continuously-mutating in-memory document and keeps it persisted
//! through a remote store while the user keeps typing:
//!
//! - **Debounced**: bursts of edits coalesce into one save after an idle
//!   window, with a max-delay bound so a user who never pauses still gets
//!   saved.
//! - **Single-flight**: at most one persistence call is ever in flight per
//!   session; redundant triggers return immediately.
//! - **No stale writes**: the document is re-encoded at save time, never
//!   from a capture made when the save was scheduled.
//! - **Identity promotion**: a client-only draft becomes a persisted entity
//!   exactly once; every later save targets the assigned identity, so no
//!   duplicate records are created.
//! - **No loss on failure**: a failed save leaves the baseline untouched, so
//!   the document stays dirty and the next cycle (or a manual retry)
//!   resubmits it.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use protocol_sync::{AutoSaveConfig, SyncEngine};
//! use tokio::sync::RwLock;
//!
//! let document = Arc::new(RwLock::new(ProtocolDocument::default()));
//! let engine = SyncEngine::builder(Arc::clone(&document), store)
//!     .config(AutoSaveConfig::default())
//!     .on_identity_promoted(|id| tracing::info!(%id, "protocol created"))
//!     .build()
//!     .await?;
//!
//! // On every edit:
//! document.write().await.title = "Q3 board meeting".into();
//! engine.document_changed();
//!
//! // Status feed for the save indicator:
//! let mut status = engine.subscribe_status();
//! ```
//!
//! # Architecture
//!
//! - `snapshot` - canonical, comparable encoding of the document state
//! - `clock` - edit timing bookkeeping behind the debounce delays
//! - `debounce` - cancellable one-shot save timer
//! - `engine` - single-flight save executor and session state
//! - `identity` - server identity and its one-time promotion
//! - `status` - the `idle/dirty/saving/saved/error` machine, as a watch feed
//! - `store` - the persistence collaborator trait
//! - `error` - error types

mod clock;
mod config;
mod debounce;
mod engine;
mod error;
mod identity;
mod snapshot;
mod status;
mod store;

pub use config::AutoSaveConfig;
pub use engine::{IdentityPromotedFn, SyncEngine, SyncEngineBuilder};
pub use error::{Result, SyncError};
pub use identity::DocumentId;
pub use snapshot::DocumentSnapshot;
pub use status::{SaveState, SaveStatus};
pub use store::{DocumentStore, StoreError};
