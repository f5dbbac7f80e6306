//! Project aggregate root and its examination lifecycle.

use super::{
    CommitHash, ExaminationStatus, ProjectDomainError, ProjectId, RepositoryFullName,
    RepositoryId, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Project aggregate root.
///
/// A project binds one user to one external repository and owns the
/// examination status of that repository. All status changes go through
/// [`Project::begin_examination`] or [`Project::transition_to`], which
/// validate against [`ExaminationStatus::can_transition_to`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    user_id: UserId,
    repo_id: RepositoryId,
    repo_name: RepositoryFullName,
    examination_status: ExaminationStatus,
    commit_hash: Option<CommitHash>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted owner.
    pub user_id: UserId,
    /// Persisted repository identifier.
    pub repo_id: RepositoryId,
    /// Persisted repository name.
    pub repo_name: RepositoryFullName,
    /// Persisted examination status.
    pub examination_status: ExaminationStatus,
    /// Last recorded commit hash, if any.
    pub commit_hash: Option<CommitHash>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new pending project bound to a repository.
    #[must_use]
    pub fn new(
        user_id: UserId,
        repo_id: RepositoryId,
        repo_name: RepositoryFullName,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ProjectId::generate(),
            user_id,
            repo_id,
            repo_name,
            examination_status: ExaminationStatus::Pending,
            commit_hash: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            repo_id: data.repo_id,
            repo_name: data.repo_name,
            examination_status: data.examination_status,
            commit_hash: data.commit_hash,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the persisted form of this project.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedProjectData {
        PersistedProjectData {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            repo_id: self.repo_id,
            repo_name: self.repo_name.clone(),
            examination_status: self.examination_status,
            commit_hash: self.commit_hash.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> &ProjectId {
        &self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the bound repository identifier.
    #[must_use]
    pub const fn repo_id(&self) -> RepositoryId {
        self.repo_id
    }

    /// Returns the bound repository name.
    #[must_use]
    pub const fn repo_name(&self) -> &RepositoryFullName {
        &self.repo_name
    }

    /// Returns the examination status.
    #[must_use]
    pub const fn examination_status(&self) -> ExaminationStatus {
        self.examination_status
    }

    /// Returns the last recorded commit hash, if any.
    #[must_use]
    pub const fn commit_hash(&self) -> Option<&CommitHash> {
        self.commit_hash.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether `user_id` owns this project.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }

    /// Rejects projects that already have an examination in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::AlreadyUnderExamination`] when the status
    /// is [`ExaminationStatus::InProgress`].
    pub fn ensure_not_under_examination(&self) -> Result<(), ProjectDomainError> {
        if self.examination_status.is_in_progress() {
            return Err(ProjectDomainError::AlreadyUnderExamination(self.id.clone()));
        }
        Ok(())
    }

    /// Returns whether a completed examination already covers `fresh`.
    ///
    /// Only [`ExaminationStatus::Completed`] projects are considered; pending
    /// and failed projects are always eligible for another scan.
    #[must_use]
    pub fn is_unchanged_since_last_scan(
        &self,
        previous: Option<&CommitHash>,
        fresh: &CommitHash,
    ) -> bool {
        self.examination_status == ExaminationStatus::Completed && previous == Some(fresh)
    }

    /// Admits the project for examination at `commit_hash`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::AlreadyUnderExamination`] when an
    /// examination is already in flight. The project is left unchanged.
    pub fn begin_examination(
        &mut self,
        commit_hash: CommitHash,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        self.ensure_not_under_examination()?;
        self.transition_to(ExaminationStatus::InProgress, clock)?;
        self.commit_hash = Some(commit_hash);
        Ok(())
    }

    /// Moves the project to `target` when the transition table allows it.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvalidStatusTransition`] when the move
    /// is not permitted. The project is left unchanged.
    pub fn transition_to(
        &mut self,
        target: ExaminationStatus,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        if !self.examination_status.can_transition_to(target) {
            return Err(ProjectDomainError::InvalidStatusTransition {
                project_id: self.id.clone(),
                from: self.examination_status,
                to: target,
            });
        }
        self.examination_status = target;
        self.touch(clock);
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
