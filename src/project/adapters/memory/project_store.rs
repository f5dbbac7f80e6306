//! In-memory project store for tests and deterministic local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::project::{
    domain::{
        CommitHash, ExaminationStatus, PersistedProjectData, Project, ProjectDomainError,
        ProjectId, UserId,
    },
    ports::{ProjectStore, ProjectStoreError, ProjectStoreResult},
};

/// Thread-safe in-memory project store.
///
/// Conditional writes are evaluated and applied under a single write lock,
/// so [`ProjectStore::begin_examination`] and
/// [`ProjectStore::set_examination_status`] are atomic with respect to
/// every other operation on the same store. Timestamps come from the
/// store's clock.
pub struct InMemoryProjectStore<C = DefaultClock> {
    state: Arc<RwLock<InMemoryProjectState>>,
    clock: Arc<C>,
}

#[derive(Debug, Default)]
struct InMemoryProjectState {
    projects: HashMap<ProjectId, Project>,
}

impl InMemoryProjectStore {
    /// Creates an empty in-memory store stamped by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl Default for InMemoryProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> InMemoryProjectStore<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty in-memory store stamped by `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryProjectState::default())),
            clock,
        }
    }

    fn read(&self) -> ProjectStoreResult<RwLockReadGuard<'_, InMemoryProjectState>> {
        self.state
            .read()
            .map_err(|err| ProjectStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> ProjectStoreResult<RwLockWriteGuard<'_, InMemoryProjectState>> {
        self.state
            .write()
            .map_err(|err| ProjectStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

impl<C> Clone for InMemoryProjectStore<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> fmt::Debug for InMemoryProjectStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryProjectStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl InMemoryProjectState {
    fn get(&self, id: &ProjectId) -> ProjectStoreResult<&Project> {
        self.projects
            .get(id)
            .ok_or_else(|| ProjectStoreError::NotFound(id.clone()))
    }

    fn has_sibling_in_progress(&self, user_id: &UserId, excluding: &ProjectId) -> bool {
        self.projects.values().any(|project| {
            project.id() != excluding
                && project.is_owned_by(user_id)
                && project.examination_status().is_in_progress()
        })
    }

    fn ensure_owner_is_idle(&self, project: &Project) -> ProjectStoreResult<()> {
        if self.has_sibling_in_progress(project.user_id(), project.id()) {
            return Err(ProjectStoreError::UserExaminationInProgress(
                project.user_id().clone(),
            ));
        }
        Ok(())
    }

    /// Rebuilds a stored project with `update` applied to its persisted form.
    fn rewrite(
        &mut self,
        id: &ProjectId,
        updated_at: DateTime<Utc>,
        update: impl FnOnce(&mut PersistedProjectData),
    ) -> ProjectStoreResult<Project> {
        let mut data = self.get(id)?.to_persisted();
        update(&mut data);
        data.updated_at = updated_at;
        let project = Project::from_persisted(data);
        self.projects.insert(id.clone(), project.clone());
        Ok(project)
    }
}

#[async_trait]
impl<C> ProjectStore for InMemoryProjectStore<C>
where
    C: Clock + Send + Sync,
{
    async fn store(&self, project: &Project) -> ProjectStoreResult<()> {
        let mut state = self.write()?;
        if state.projects.contains_key(project.id()) {
            return Err(ProjectStoreError::DuplicateProject(project.id().clone()));
        }
        state.projects.insert(project.id().clone(), project.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ProjectId) -> ProjectStoreResult<Option<Project>> {
        let state = self.read()?;
        Ok(state.projects.get(id).cloned())
    }

    async fn is_user_examination_in_progress(&self, user_id: &UserId) -> ProjectStoreResult<bool> {
        let state = self.read()?;
        Ok(state.projects.values().any(|project| {
            project.is_owned_by(user_id) && project.examination_status().is_in_progress()
        }))
    }

    async fn get_last_commit_hash(
        &self,
        id: &ProjectId,
    ) -> ProjectStoreResult<Option<CommitHash>> {
        let state = self.read()?;
        Ok(state.get(id)?.commit_hash().cloned())
    }

    async fn set_commit_hash(&self, id: &ProjectId, hash: &CommitHash) -> ProjectStoreResult<()> {
        let mut state = self.write()?;
        state.rewrite(id, self.clock.utc(), |data| {
            data.commit_hash = Some(hash.clone());
        })?;
        Ok(())
    }

    async fn set_examination_status(
        &self,
        id: &ProjectId,
        status: ExaminationStatus,
    ) -> ProjectStoreResult<Project> {
        let mut state = self.write()?;
        let mut project = state.get(id)?.clone();
        project
            .transition_to(status, &*self.clock)
            .map_err(|err| match err {
                ProjectDomainError::InvalidStatusTransition {
                    project_id,
                    from,
                    to,
                } => ProjectStoreError::InvalidTransition {
                    project_id,
                    from,
                    to,
                },
                other => ProjectStoreError::persistence(other),
            })?;
        if status.is_in_progress() {
            state.ensure_owner_is_idle(&project)?;
        }
        state.projects.insert(id.clone(), project.clone());
        Ok(project)
    }

    async fn begin_examination(
        &self,
        project: &Project,
        expected: ExaminationStatus,
    ) -> ProjectStoreResult<Project> {
        let mut state = self.write()?;
        let actual = state.get(project.id())?.examination_status();
        if actual != expected {
            return Err(ProjectStoreError::StatusConflict {
                project_id: project.id().clone(),
                expected,
                actual,
            });
        }
        state.ensure_owner_is_idle(project)?;
        state.projects.insert(project.id().clone(), project.clone());
        Ok(project.clone())
    }
}
