//! Port for handing admission events to the examination pipeline.

use crate::project::domain::AdmissionEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for event publication.
pub type PublishResult<T> = Result<T, EventPublisherError>;

/// Outbound event bus contract.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes an admission event.
    ///
    /// Returning `Ok` means the broker accepted the event.
    async fn publish(&self, event: &AdmissionEvent) -> PublishResult<()>;
}

/// Errors returned by event publishers.
#[derive(Debug, Clone, Error)]
pub enum EventPublisherError {
    /// The event could not be encoded.
    #[error("failed to encode admission event: {0}")]
    Encoding(String),

    /// The broker or transport rejected the event.
    #[error("failed to publish admission event: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl EventPublisherError {
    /// Wraps a broker or transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
