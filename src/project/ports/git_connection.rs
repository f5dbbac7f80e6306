//! Lookup port for users' stored git provider credentials.

use crate::project::domain::{GitConnection, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for git connection lookups.
pub type GitConnectionResult<T> = Result<T, GitConnectionLookupError>;

/// Read-only access to git connections.
#[async_trait]
pub trait GitConnectionLookup: Send + Sync {
    /// Finds the git connection owned by `user_id`.
    ///
    /// Returns `None` when the user has not connected a provider.
    async fn find_by_user_id(&self, user_id: &UserId)
    -> GitConnectionResult<Option<GitConnection>>;
}

/// Errors returned by git connection lookups.
#[derive(Debug, Clone, Error)]
pub enum GitConnectionLookupError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl GitConnectionLookupError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
