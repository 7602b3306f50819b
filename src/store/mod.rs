//! Template store: the remote persistence boundary.
//!
//! DESIGN
//! ======
//! The store keeps one template row plus one row per section. The engine
//! never talks to it directly: workflows in `crate::publish` take a
//! `&dyn TemplateStore`, so the HTTP adapter can be swapped for the
//! in-memory one in tests and offline tooling.

pub mod http;
pub mod memory;

use template_canvas::wire::{NewSection, TemplateMeta, TemplateSummary, WireTemplate};

pub use http::HttpStore;
pub use memory::MemoryStore;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response (connect, timeout, I/O).
    #[error("store request failed: {0}")]
    Request(String),

    /// The store answered with a non-success HTTP status.
    #[error("store returned status {status}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("store response decode failed: {0}")]
    Decode(String),

    /// No template with this id exists.
    #[error("template {0} not found")]
    NotFound(String),
}

impl StoreError {
    /// Whether repeating the same request may succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Async access to stored templates. Enables mocking in tests.
#[async_trait::async_trait]
pub trait TemplateStore: Send + Sync {
    /// One page of template summaries. Pages start at 1.
    async fn list_templates(&self, page: u32, limit: u32) -> Result<Vec<TemplateSummary>, StoreError>;

    /// A template with all of its section rows, in stored (unsorted) order.
    async fn get_template_by_id(&self, id: &str) -> Result<WireTemplate, StoreError>;

    /// Create a template row and return its id.
    async fn create_template(&self, meta: &TemplateMeta) -> Result<String, StoreError>;

    /// Overwrite a template's name, description, access tier and thumbnail.
    async fn update_template(&self, id: &str, meta: &TemplateMeta) -> Result<(), StoreError>;

    async fn delete_template_by_id(&self, id: &str) -> Result<(), StoreError>;

    /// Copy a template and its sections; returns the new id.
    async fn duplicate_template(&self, id: &str) -> Result<String, StoreError>;

    /// Append one section row to an existing template.
    async fn create_section(&self, section: &NewSection) -> Result<(), StoreError>;

    /// Store image bytes and return the public URL.
    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, StoreError>;
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
