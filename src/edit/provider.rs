//! Edit provider trait.

use crate::edit::types::{EditRequest, EditedImage};
use crate::error::Result;
use async_trait::async_trait;

/// Trait for remote image-editing services.
#[async_trait]
pub trait EditProvider: Send + Sync {
    /// Edits an image according to the request's prompt.
    ///
    /// Exactly one awaited network exchange; no retries, no streaming.
    async fn edit(&self, request: &EditRequest) -> Result<EditedImage>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;

    /// Checks that the service is reachable and the credential is accepted.
    async fn health_check(&self) -> Result<()>;
}
