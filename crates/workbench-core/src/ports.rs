//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `workbench-core` (pure Rust).
//! Implementations live in `workbench-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use std::fmt;
use std::pin::Pin;
use async_trait::async_trait;
use futures::Stream;
use workbench_types::{
    Result,
    knowledge::{KnowledgeItem, RequestContext},
};

// ─── Transport Port ──────────────────────────────────────────

/// Raw response body, in whatever pieces the transport reads them
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>>>>;

/// Status line and body of an answering request
pub struct TransportResponse {
    pub status: u16,
    /// `None` when the response carries no readable body
    pub body: Option<ByteStream>,
}

impl TransportResponse {
    pub fn new(status: u16, body: Option<ByteStream>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

#[async_trait(?Send)]
pub trait TransportPort {
    /// Issue one request for `context`. Resolves once the status is known;
    /// the body is read lazily through the returned stream.
    async fn send(&self, context: &RequestContext) -> Result<TransportResponse>;

    /// Name of this transport (for logging/debug)
    fn name(&self) -> &str;
}

// ─── Knowledge Source ────────────────────────────────────────

/// Read-only view of the knowledge items that may be referenced.
pub trait KnowledgeSource {
    /// Current items, in display order
    fn list(&self) -> Vec<KnowledgeItem>;
}

// ─── Storage Port ────────────────────────────────────────────

#[async_trait(?Send)]
pub trait StoragePort {
    /// Get a value by key
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set a value, replacing any previous one
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}
