//! Service layer for admitting projects into examination.

use super::validation::{AdmissionValidationError, AdmitProjectRequest};
use crate::project::{
    domain::{
        AdmissionEvent, AdmissionEventParams, CommitHash, GitConnection, Project,
        ProjectDomainError, ProjectId, RepositoryFullName, RepositorySnapshot, UserId,
    },
    ports::{
        EventPublisher, GitConnectionLookup, ProjectStore, ProjectStoreError, RepositoryInspector,
        RepositoryInspectorError,
    },
};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Collaborator call during which an admission failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdmissionStage {
    /// Reading the project.
    LoadProject,
    /// Checking the owner's in-flight examinations.
    CheckUserLimit,
    /// Resolving the owner's git connection.
    ResolveConnection,
    /// Inspecting the remote repository.
    InspectRepository,
    /// Reading the last recorded commit hash.
    ReadCommitHash,
    /// Writing the admitted project.
    PersistAdmission,
    /// Publishing the admission event.
    PublishEvent,
}

impl AdmissionStage {
    /// Returns a short human-readable stage label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoadProject => "load project",
            Self::CheckUserLimit => "check user limit",
            Self::ResolveConnection => "resolve git connection",
            Self::InspectRepository => "inspect repository",
            Self::ReadCommitHash => "read commit hash",
            Self::PersistAdmission => "persist admission",
            Self::PublishEvent => "publish event",
        }
    }
}

impl fmt::Display for AdmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`AdmissionService::admit`].
#[derive(Debug, Clone, Error)]
pub enum AdmissionError {
    /// The request identifiers are malformed.
    #[error(transparent)]
    Validation(#[from] AdmissionValidationError),

    /// No project with the identifier is visible to the requesting user.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The user has no stored git credential.
    #[error("no git connection found for user {0}")]
    GitConnectionNotFound(UserId),

    /// The project is already in progress.
    #[error("project {0} is already under examination")]
    ProjectAlreadyUnderExamination(ProjectId),

    /// Another project of the same user is in progress.
    #[error("user {0} already has a project under examination")]
    UserExaminationLimitReached(UserId),

    /// The project was completed at the same commit.
    #[error("project {project_id} was already scanned at commit {commit_hash}")]
    ProjectAlreadyScanned {
        /// Project that was rejected.
        project_id: ProjectId,
        /// Commit hash covered by the last completed examination.
        commit_hash: CommitHash,
    },

    /// The repository has no commits to examine.
    #[error("repository {repository} of project {project_id} has no commits")]
    RepositoryEmpty {
        /// Project that was rejected.
        project_id: ProjectId,
        /// Repository reported as empty.
        repository: RepositoryFullName,
    },

    /// A collaborator failed.
    #[error("admission failed during {stage}: {source}")]
    AdmissionFailed {
        /// Stage whose collaborator failed.
        stage: AdmissionStage,
        /// Underlying collaborator error.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

/// Fieldless discriminant of [`AdmissionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdmissionErrorKind {
    /// See [`AdmissionError::Validation`].
    Validation,
    /// See [`AdmissionError::ProjectNotFound`].
    ProjectNotFound,
    /// See [`AdmissionError::GitConnectionNotFound`].
    GitConnectionNotFound,
    /// See [`AdmissionError::ProjectAlreadyUnderExamination`].
    ProjectAlreadyUnderExamination,
    /// See [`AdmissionError::UserExaminationLimitReached`].
    UserExaminationLimitReached,
    /// See [`AdmissionError::ProjectAlreadyScanned`].
    ProjectAlreadyScanned,
    /// See [`AdmissionError::RepositoryEmpty`].
    RepositoryEmpty,
    /// See [`AdmissionError::AdmissionFailed`].
    AdmissionFailed,
}

impl AdmissionErrorKind {
    /// Returns the stable error name exposed to callers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::ProjectNotFound => "ProjectNotFoundError",
            Self::GitConnectionNotFound => "GitConnectionNotFoundError",
            Self::ProjectAlreadyUnderExamination => "ProjectAlreadyUnderExaminationError",
            Self::UserExaminationLimitReached => "UserExaminationLimitReachedError",
            Self::ProjectAlreadyScanned => "ProjectAlreadyScannedError",
            Self::RepositoryEmpty => "RepositoryEmptyError",
            Self::AdmissionFailed => "AdmissionFailedError",
        }
    }
}

impl fmt::Display for AdmissionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AdmissionError {
    fn failed(stage: AdmissionStage, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::AdmissionFailed {
            stage,
            source: Arc::new(err),
        }
    }

    /// Returns the error's kind.
    #[must_use]
    pub const fn kind(&self) -> AdmissionErrorKind {
        match self {
            Self::Validation(_) => AdmissionErrorKind::Validation,
            Self::ProjectNotFound(_) => AdmissionErrorKind::ProjectNotFound,
            Self::GitConnectionNotFound(_) => AdmissionErrorKind::GitConnectionNotFound,
            Self::ProjectAlreadyUnderExamination(_) => {
                AdmissionErrorKind::ProjectAlreadyUnderExamination
            }
            Self::UserExaminationLimitReached(_) => AdmissionErrorKind::UserExaminationLimitReached,
            Self::ProjectAlreadyScanned { .. } => AdmissionErrorKind::ProjectAlreadyScanned,
            Self::RepositoryEmpty { .. } => AdmissionErrorKind::RepositoryEmpty,
            Self::AdmissionFailed { .. } => AdmissionErrorKind::AdmissionFailed,
        }
    }

    /// Returns the failed stage for [`AdmissionError::AdmissionFailed`].
    #[must_use]
    pub const fn stage(&self) -> Option<AdmissionStage> {
        match self {
            Self::AdmissionFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns whether the project was already admitted in the store.
    ///
    /// This is only the case when the event could not be published after
    /// the status and commit hash were written.
    #[must_use]
    pub const fn state_committed(&self) -> bool {
        matches!(
            self,
            Self::AdmissionFailed {
                stage: AdmissionStage::PublishEvent,
                ..
            }
        )
    }
}

/// Result type for admission service operations.
pub type AdmissionResult<T> = Result<T, AdmissionError>;

/// Admission orchestration service.
///
/// Decides whether a project may enter examination, records the admission,
/// and announces it to the examination pipeline.
pub struct AdmissionService<S, G, I, P, C>
where
    S: ProjectStore,
    G: GitConnectionLookup,
    I: RepositoryInspector,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    projects: Arc<S>,
    connections: Arc<G>,
    inspector: Arc<I>,
    publisher: Arc<P>,
    clock: Arc<C>,
}

impl<S, G, I, P, C> Clone for AdmissionService<S, G, I, P, C>
where
    S: ProjectStore,
    G: GitConnectionLookup,
    I: RepositoryInspector,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            projects: Arc::clone(&self.projects),
            connections: Arc::clone(&self.connections),
            inspector: Arc::clone(&self.inspector),
            publisher: Arc::clone(&self.publisher),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, G, I, P, C> AdmissionService<S, G, I, P, C>
where
    S: ProjectStore,
    G: GitConnectionLookup,
    I: RepositoryInspector,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates a new admission service.
    #[must_use]
    pub const fn new(
        projects: Arc<S>,
        connections: Arc<G>,
        inspector: Arc<I>,
        publisher: Arc<P>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            projects,
            connections,
            inspector,
            publisher,
            clock,
        }
    }

    /// Admits a project for examination on behalf of its owner.
    ///
    /// On success the stored project is `IN_PROGRESS` at the repository's
    /// latest commit and one [`AdmissionEvent`] has been published.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError`] when the request is malformed, a lifecycle
    /// rule rejects the admission, or a collaborator fails. Only
    /// [`AdmissionStage::PublishEvent`] failures leave the store changed; see
    /// [`AdmissionError::state_committed`].
    pub async fn admit(&self, request: AdmitProjectRequest) -> AdmissionResult<Project> {
        let (user_id, project_id) = request.validate()?.into_parts();

        let project = self.load_owned_project(&project_id, &user_id).await?;
        if project.examination_status().is_in_progress() {
            debug!(project_id = %project_id, "admission rejected: project already in progress");
            return Err(AdmissionError::ProjectAlreadyUnderExamination(project_id));
        }
        self.ensure_user_is_idle(&user_id).await?;

        let connection = self.resolve_connection(&user_id).await?;
        let snapshot = self.inspect_repository(&project, &connection).await?;
        let previous_hash = self
            .projects
            .get_last_commit_hash(&project_id)
            .await
            .map_err(|err| collaborator_failure(AdmissionStage::ReadCommitHash, err))?;

        if project.is_unchanged_since_last_scan(previous_hash.as_ref(), snapshot.commit_hash()) {
            debug!(
                project_id = %project_id,
                commit_hash = %snapshot.commit_hash(),
                "admission rejected: commit already scanned"
            );
            return Err(AdmissionError::ProjectAlreadyScanned {
                project_id,
                commit_hash: snapshot.commit_hash().clone(),
            });
        }

        let admitted = self.persist_admission(&project, &snapshot).await?;
        let event = AdmissionEvent::new(AdmissionEventParams {
            project: &project,
            connection: &connection,
            snapshot: &snapshot,
            admitted_by: &user_id,
            admitted_at: admitted.updated_at(),
        });

        if let Err(err) = self.publisher.publish(&event).await {
            warn!(
                project_id = %project_id,
                commit_hash = %snapshot.commit_hash(),
                error = %err,
                "admission persisted but event publication failed"
            );
            return Err(AdmissionError::failed(AdmissionStage::PublishEvent, err));
        }

        info!(
            project_id = %project_id,
            user_id = %user_id,
            commit_hash = %snapshot.commit_hash(),
            previous_status = %project.examination_status(),
            "project admitted for examination"
        );
        Ok(admitted)
    }

    async fn load_owned_project(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> AdmissionResult<Project> {
        let found = self
            .projects
            .find_by_id(project_id)
            .await
            .map_err(|err| collaborator_failure(AdmissionStage::LoadProject, err))?;
        match found {
            Some(project) if project.is_owned_by(user_id) => Ok(project),
            _ => {
                debug!(project_id = %project_id, user_id = %user_id, "project not visible");
                Err(AdmissionError::ProjectNotFound(project_id.clone()))
            }
        }
    }

    async fn ensure_user_is_idle(&self, user_id: &UserId) -> AdmissionResult<()> {
        let busy = self
            .projects
            .is_user_examination_in_progress(user_id)
            .await
            .map_err(|err| collaborator_failure(AdmissionStage::CheckUserLimit, err))?;
        if busy {
            debug!(user_id = %user_id, "admission rejected: user limit reached");
            return Err(AdmissionError::UserExaminationLimitReached(user_id.clone()));
        }
        Ok(())
    }

    async fn resolve_connection(&self, user_id: &UserId) -> AdmissionResult<GitConnection> {
        self.connections
            .find_by_user_id(user_id)
            .await
            .map_err(|err| collaborator_failure(AdmissionStage::ResolveConnection, err))?
            .ok_or_else(|| AdmissionError::GitConnectionNotFound(user_id.clone()))
    }

    async fn inspect_repository(
        &self,
        project: &Project,
        connection: &GitConnection,
    ) -> AdmissionResult<RepositorySnapshot> {
        match self.inspector.inspect(project, connection).await {
            Ok(snapshot) => Ok(snapshot),
            Err(RepositoryInspectorError::EmptyRepository(repository)) => {
                debug!(project_id = %project.id(), repository = %repository, "repository is empty");
                Err(AdmissionError::RepositoryEmpty {
                    project_id: project.id().clone(),
                    repository,
                })
            }
            Err(err) => Err(collaborator_failure(AdmissionStage::InspectRepository, err)),
        }
    }

    async fn persist_admission(
        &self,
        project: &Project,
        snapshot: &RepositorySnapshot,
    ) -> AdmissionResult<Project> {
        let expected = project.examination_status();
        let mut candidate = project.clone();
        candidate
            .begin_examination(snapshot.commit_hash().clone(), &*self.clock)
            .map_err(|err| match err {
                ProjectDomainError::AlreadyUnderExamination(id) => {
                    AdmissionError::ProjectAlreadyUnderExamination(id)
                }
                other => collaborator_failure(AdmissionStage::PersistAdmission, other),
            })?;

        self.projects
            .begin_examination(&candidate, expected)
            .await
            .map_err(|err| match err {
                ProjectStoreError::UserExaminationInProgress(owner) => {
                    debug!(user_id = %owner, "admission lost race: user limit reached");
                    AdmissionError::UserExaminationLimitReached(owner)
                }
                ProjectStoreError::StatusConflict {
                    project_id, actual, ..
                } if actual.is_in_progress() => {
                    debug!(project_id = %project_id, "admission lost race: project in progress");
                    AdmissionError::ProjectAlreadyUnderExamination(project_id)
                }
                other => collaborator_failure(AdmissionStage::PersistAdmission, other),
            })
    }
}

fn collaborator_failure(
    stage: AdmissionStage,
    err: impl std::error::Error + Send + Sync + 'static,
) -> AdmissionError {
    warn!(stage = %stage, error = %err, "admission collaborator failed");
    AdmissionError::failed(stage, err)
}
