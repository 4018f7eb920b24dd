//! Document context storage
//!
//! Maps an opaque session id to the extracted text of one uploaded document,
//! with a fixed time-to-live per entry. The store is behind a trait so an
//! external cache service can replace the in-memory implementation without
//! touching the session controller.

pub mod memory;

pub use memory::InMemoryStore;

use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Snapshot of a live session entry.
///
/// The document text is shared, never copied per request; it is immutable
/// for the lifetime of the session.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    /// Opaque session id, the sole external reference to the entry
    pub id: Uuid,

    /// Full extracted text of the uploaded document
    pub document_text: Arc<str>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Expiry time, fixed at `created_at + TTL` (never sliding)
    pub expires_at: DateTime<Utc>,
}

/// Key-value session store with bounded entry lifetime.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Insert a new entry for `document_text` under a freshly generated id and
    /// schedule its expiry. Returns the created context.
    async fn create(&self, document_text: String) -> Result<DocumentContext>;

    /// Look up a live entry. Returns `None` for unknown or expired ids; a miss
    /// is a normal outcome, not an error. Does not renew the TTL.
    async fn get(&self, id: Uuid) -> Result<Option<DocumentContext>>;

    /// Remove an entry if still present. Idempotent; returns whether an entry
    /// was actually removed. Invoked both by the scheduled expiry task and by
    /// explicit invalidation.
    async fn expire(&self, id: Uuid) -> bool;

    /// Number of live entries (expired-but-unreaped entries may be counted)
    async fn len(&self) -> usize;
}
