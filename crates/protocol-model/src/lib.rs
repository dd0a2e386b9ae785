//! Meeting-protocol document model for Protocol Desk.
//!
//! Provides the editable document type the auto-save engine synchronizes
//! (`ProtocolDocument` with its ordered child collections) and an in-memory
//! [`DocumentStore`](protocol_sync::DocumentStore) backend used by tests and
//! offline embeddings.

mod memory;
mod protocol;

pub use memory::InMemoryProtocolStore;
pub use protocol::{Attendee, Decision, ProtocolDocument, Section};
