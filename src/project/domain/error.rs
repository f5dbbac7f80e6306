//! Error types for project domain validation and parsing.

use super::{ExaminationStatus, ProjectId};
use thiserror::Error;

/// Errors returned while constructing or mutating project domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectDomainError {
    /// The project identifier is empty after trimming.
    #[error("project identifier must not be empty")]
    EmptyProjectId,

    /// The user identifier is empty after trimming.
    #[error("user identifier must not be empty")]
    EmptyUserId,

    /// The repository identifier is zero or out of range.
    #[error("invalid repository identifier {0}, expected a positive integer")]
    InvalidRepositoryId(u64),

    /// The repository name does not follow `owner/repo` format.
    #[error("invalid repository name '{0}', expected owner/repo")]
    InvalidRepository(String),

    /// The branch name is empty, too long, or contains forbidden characters.
    #[error("invalid branch name '{0}'")]
    InvalidBranchName(String),

    /// The commit hash is not a 7 to 64 character hexadecimal string.
    #[error("invalid commit hash '{0}', expected 7 to 64 hexadecimal characters")]
    InvalidCommitHash(String),

    /// The git provider value is unsupported.
    #[error("unsupported git provider: {0}")]
    InvalidGitProvider(String),

    /// The access token is empty after trimming.
    #[error("access token must not be empty")]
    EmptyAccessToken,

    /// The project is already being examined.
    #[error("project {0} is already under examination")]
    AlreadyUnderExamination(ProjectId),

    /// The requested status transition is not permitted.
    #[error("invalid examination status transition for project {project_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Project whose status was being changed.
        project_id: ProjectId,
        /// Current examination status.
        from: ExaminationStatus,
        /// Requested examination status.
        to: ExaminationStatus,
    },
}

/// Error returned while parsing examination statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown examination status: {0}")]
pub struct ParseExaminationStatusError(pub String);
