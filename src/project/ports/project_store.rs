//! Persistence port for projects and their examination state.

use crate::project::domain::{CommitHash, ExaminationStatus, Project, ProjectId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for project store operations.
pub type ProjectStoreResult<T> = Result<T, ProjectStoreError>;

/// Project persistence contract.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectStoreError::DuplicateProject`] when the project ID
    /// already exists.
    async fn store(&self, project: &Project) -> ProjectStoreResult<()>;

    /// Finds a project by identifier.
    ///
    /// Returns `None` when the project does not exist.
    async fn find_by_id(&self, id: &ProjectId) -> ProjectStoreResult<Option<Project>>;

    /// Returns whether any project owned by `user_id` is in progress.
    async fn is_user_examination_in_progress(&self, user_id: &UserId) -> ProjectStoreResult<bool>;

    /// Returns the last commit hash recorded for a project.
    ///
    /// Returns `None` when no hash has been recorded yet.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectStoreError::NotFound`] when the project does not
    /// exist.
    async fn get_last_commit_hash(&self, id: &ProjectId)
    -> ProjectStoreResult<Option<CommitHash>>;

    /// Records a commit hash against a project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectStoreError::NotFound`] when the project does not
    /// exist.
    async fn set_commit_hash(&self, id: &ProjectId, hash: &CommitHash) -> ProjectStoreResult<()>;

    /// Moves the project to `status` and returns the updated project.
    ///
    /// The change must be permitted by
    /// [`ExaminationStatus::can_transition_to`], and a move to
    /// [`ExaminationStatus::InProgress`] is refused while a sibling project
    /// of the same owner is in progress.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectStoreError::NotFound`] when the project does not
    /// exist, [`ProjectStoreError::InvalidTransition`] when the stored
    /// status does not permit the change, or
    /// [`ProjectStoreError::UserExaminationInProgress`] when a sibling is
    /// already in progress.
    async fn set_examination_status(
        &self,
        id: &ProjectId,
        status: ExaminationStatus,
    ) -> ProjectStoreResult<Project>;

    /// Persists an admitted project as one conditional write.
    ///
    /// `project` must already be [`ExaminationStatus::InProgress`] with its
    /// new commit hash. The write is applied only if the stored status still
    /// equals `expected` and no other project of the same owner is in
    /// progress; both conditions and the write form a single atomic step.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectStoreError::UserExaminationInProgress`] when a sibling
    /// project is in progress, [`ProjectStoreError::StatusConflict`] when the
    /// stored status no longer matches `expected`, or
    /// [`ProjectStoreError::NotFound`] when the project does not exist.
    async fn begin_examination(
        &self,
        project: &Project,
        expected: ExaminationStatus,
    ) -> ProjectStoreResult<Project>;
}

/// Errors returned by project store implementations.
#[derive(Debug, Clone, Error)]
pub enum ProjectStoreError {
    /// A project with the same identifier already exists.
    #[error("duplicate project identifier: {0}")]
    DuplicateProject(ProjectId),

    /// The project was not found.
    #[error("project not found: {0}")]
    NotFound(ProjectId),

    /// Another project of the same user is already in progress.
    #[error("user {0} already has a project under examination")]
    UserExaminationInProgress(UserId),

    /// The stored status changed since it was read.
    #[error("examination status of project {project_id} is {actual}, expected {expected}")]
    StatusConflict {
        /// Project being written.
        project_id: ProjectId,
        /// Status the writer observed.
        expected: ExaminationStatus,
        /// Status currently stored.
        actual: ExaminationStatus,
    },

    /// The stored status does not permit the requested status change.
    #[error("project {project_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Project being written.
        project_id: ProjectId,
        /// Status currently stored.
        from: ExaminationStatus,
        /// Requested status.
        to: ExaminationStatus,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProjectStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
