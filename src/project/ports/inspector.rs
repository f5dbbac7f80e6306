//! Port for reading the current state of a project's repository.

use crate::project::domain::{GitConnection, Project, RepositoryFullName, RepositorySnapshot};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for repository inspection.
pub type InspectorResult<T> = Result<T, RepositoryInspectorError>;

/// Provider-facing repository inspection contract.
#[async_trait]
pub trait RepositoryInspector: Send + Sync {
    /// Returns the repository name, default branch, and latest commit.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryInspectorError::EmptyRepository`] when the
    /// repository has no commits yet.
    async fn inspect(
        &self,
        project: &Project,
        connection: &GitConnection,
    ) -> InspectorResult<RepositorySnapshot>;
}

/// Errors returned by repository inspectors.
#[derive(Debug, Clone, Error)]
pub enum RepositoryInspectorError {
    /// The repository exists but has no commits.
    #[error("repository {0} has no commits")]
    EmptyRepository(RepositoryFullName),

    /// The provider rejected or could not serve the request.
    #[error("repository inspection failed: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl RepositoryInspectorError {
    /// Wraps a provider or transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
