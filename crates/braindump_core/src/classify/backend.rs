//! Transport seam between the classifier and the external model.

use super::error::ClassifyError;
use async_trait::async_trait;
use std::sync::Arc;

/// One framed classification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

/// Sends a framed request and returns the model's raw message content.
///
/// Implementations report non-success statuses and transport failures as
/// `ClassifyError::Upstream` and unreadable envelopes as `ClassifyError::Parse`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Checks credentials before any request is attempted.
    fn ensure_configured(&self) -> Result<(), ClassifyError> {
        Ok(())
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ClassifyError>;
}

#[async_trait]
impl<B: CompletionBackend + ?Sized> CompletionBackend for Arc<B> {
    fn ensure_configured(&self) -> Result<(), ClassifyError> {
        (**self).ensure_configured()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ClassifyError> {
        (**self).complete(request).await
    }
}
