//! Domain event emitted when a project is admitted for examination.
//!
//! The serialized field names form the contract consumed by the downstream
//! examination pipeline and must not change.

use super::{
    AccessToken, BranchName, CommitHash, ExaminationStatus, GitConnection, Project, ProjectId,
    RepositoryFullName, RepositoryId, RepositorySnapshot, UserId,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Immutable record of a successful admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionEvent {
    project_id: ProjectId,
    user_id: UserId,
    access_token: AccessToken,
    previous_status: ExaminationStatus,
    new_status: ExaminationStatus,
    admitted_by: UserId,
    #[serde(serialize_with = "serialize_iso8601")]
    admitted_at: DateTime<Utc>,
    repo_id: RepositoryId,
    repo_full_name: RepositoryFullName,
    repo_branch_name: BranchName,
    repo_commit_hash: CommitHash,
}

/// Inputs captured while admitting a project.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionEventParams<'a> {
    /// Project as read before the transition.
    pub project: &'a Project,
    /// Credential resolved for the admitting user.
    pub connection: &'a GitConnection,
    /// Repository state observed during admission.
    pub snapshot: &'a RepositorySnapshot,
    /// User who requested the admission.
    pub admitted_by: &'a UserId,
    /// Admission timestamp.
    pub admitted_at: DateTime<Utc>,
}

impl AdmissionEvent {
    /// Builds the event for a project that is entering examination.
    ///
    /// `previous_status` is taken from `params.project`, so the project must
    /// be passed as it was before [`Project::begin_examination`].
    #[must_use]
    pub fn new(params: AdmissionEventParams<'_>) -> Self {
        let AdmissionEventParams {
            project,
            connection,
            snapshot,
            admitted_by,
            admitted_at,
        } = params;
        Self {
            project_id: project.id().clone(),
            user_id: project.user_id().clone(),
            access_token: connection.access_token().clone(),
            previous_status: project.examination_status(),
            new_status: ExaminationStatus::InProgress,
            admitted_by: admitted_by.clone(),
            admitted_at,
            repo_id: project.repo_id(),
            repo_full_name: snapshot.full_name().clone(),
            repo_branch_name: snapshot.branch().clone(),
            repo_commit_hash: snapshot.commit_hash().clone(),
        }
    }

    /// Returns the admitted project.
    #[must_use]
    pub const fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Returns the project owner.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the credential the pipeline uses to fetch the repository.
    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Returns the status read before admission.
    #[must_use]
    pub const fn previous_status(&self) -> ExaminationStatus {
        self.previous_status
    }

    /// Returns the status after admission.
    #[must_use]
    pub const fn new_status(&self) -> ExaminationStatus {
        self.new_status
    }

    /// Returns the user who requested the admission.
    #[must_use]
    pub const fn admitted_by(&self) -> &UserId {
        &self.admitted_by
    }

    /// Returns the admission timestamp.
    #[must_use]
    pub const fn admitted_at(&self) -> DateTime<Utc> {
        self.admitted_at
    }

    /// Returns the repository identifier.
    #[must_use]
    pub const fn repo_id(&self) -> RepositoryId {
        self.repo_id
    }

    /// Returns the repository name reported by the inspector.
    #[must_use]
    pub const fn repo_full_name(&self) -> &RepositoryFullName {
        &self.repo_full_name
    }

    /// Returns the inspected branch.
    #[must_use]
    pub const fn repo_branch_name(&self) -> &BranchName {
        &self.repo_branch_name
    }

    /// Returns the commit to be examined.
    #[must_use]
    pub const fn repo_commit_hash(&self) -> &CommitHash {
        &self.repo_commit_hash
    }
}

fn serialize_iso8601<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}
