//! Shared test helpers for in-memory admission integration tests.

use async_trait::async_trait;
use examiner::project::{
    adapters::memory::{
        InMemoryEventPublisher, InMemoryGitConnectionLookup, InMemoryProjectStore,
        InMemoryRepositoryInspector,
    },
    domain::{
        CommitHash, ExaminationStatus, GitConnection, PersistedProjectData, Project, ProjectId,
        RepositoryFullName, RepositoryId, RepositorySnapshot, UserId,
    },
    ports::{InspectorResult, ProjectStore, RepositoryInspector},
    services::AdmissionService,
};
use mockable::DefaultClock;
use std::sync::Arc;
use tokio::sync::Barrier;

/// Inspector that holds every caller until `parties` inspections are in
/// flight, forcing racing admissions past their read-side checks together.
#[derive(Debug, Clone)]
pub struct GatedInspector {
    inner: InMemoryRepositoryInspector,
    barrier: Arc<Barrier>,
}

impl GatedInspector {
    /// Creates an inspector releasing callers in groups of `parties`.
    pub fn new(inner: InMemoryRepositoryInspector, parties: usize) -> Self {
        Self {
            inner,
            barrier: Arc::new(Barrier::new(parties)),
        }
    }
}

#[async_trait]
impl RepositoryInspector for GatedInspector {
    async fn inspect(
        &self,
        project: &Project,
        connection: &GitConnection,
    ) -> InspectorResult<RepositorySnapshot> {
        self.barrier.wait().await;
        self.inner.inspect(project, connection).await
    }
}

/// Wired admission service plus handles to every adapter behind it.
pub struct World<I: RepositoryInspector> {
    /// Shared project store.
    pub store: Arc<InMemoryProjectStore>,
    /// Shared git connection registry.
    pub connections: Arc<InMemoryGitConnectionLookup>,
    /// Scripted inspector responses.
    pub responses: InMemoryRepositoryInspector,
    /// Recording publisher.
    pub publisher: Arc<InMemoryEventPublisher>,
    /// Service under test.
    pub service: AdmissionService<
        InMemoryProjectStore,
        InMemoryGitConnectionLookup,
        I,
        InMemoryEventPublisher,
        DefaultClock,
    >,
}

/// Builds a world whose inspector answers immediately.
pub fn world() -> World<InMemoryRepositoryInspector> {
    let responses = InMemoryRepositoryInspector::new();
    build(responses.clone(), Arc::new(responses))
}

/// Builds a world whose inspector releases callers in groups of `parties`.
pub fn gated_world(parties: usize) -> World<GatedInspector> {
    let responses = InMemoryRepositoryInspector::new();
    build(
        responses.clone(),
        Arc::new(GatedInspector::new(responses, parties)),
    )
}

fn build<I: RepositoryInspector>(
    responses: InMemoryRepositoryInspector,
    inspector: Arc<I>,
) -> World<I> {
    let store = Arc::new(InMemoryProjectStore::new());
    let connections = Arc::new(InMemoryGitConnectionLookup::new());
    let publisher = Arc::new(InMemoryEventPublisher::new());
    let service = AdmissionService::new(
        Arc::clone(&store),
        Arc::clone(&connections),
        inspector,
        Arc::clone(&publisher),
        Arc::new(DefaultClock),
    );
    World {
        store,
        connections,
        responses,
        publisher,
        service,
    }
}

impl<I: RepositoryInspector> World<I> {
    /// Stores a project and scripts its repository at `commit_hash`.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is invalid or an adapter call fails.
    pub async fn seed_project(
        &self,
        project_id: &str,
        owner: &str,
        repo_id: u64,
        status: ExaminationStatus,
        commit_hash: &str,
    ) -> eyre::Result<Project> {
        let now = chrono::Utc::now();
        let repo_name = RepositoryFullName::new(format!("{owner}/repo-{repo_id}"))?;
        let project = Project::from_persisted(PersistedProjectData {
            id: ProjectId::new(project_id)?,
            user_id: UserId::new(owner)?,
            repo_id: RepositoryId::new(repo_id)?,
            repo_name: repo_name.clone(),
            examination_status: status,
            commit_hash: None,
            created_at: now,
            updated_at: now,
        });
        self.store.store(&project).await?;
        self.responses.set_snapshot(
            project.repo_id(),
            RepositorySnapshot::from_parts(repo_name.as_str(), "main", commit_hash)?,
        )?;
        Ok(project)
    }

    /// Registers a git connection for `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is invalid or cannot be stored.
    pub fn connect(&self, owner: &str) -> eyre::Result<()> {
        self.connections
            .insert(GitConnection::from_parts(owner, "github", "ghp_integration")?)?;
        Ok(())
    }

    /// Returns how many of `project_ids` are in progress.
    ///
    /// # Errors
    ///
    /// Returns an error if a lookup fails.
    pub async fn in_progress_count(&self, project_ids: &[&str]) -> eyre::Result<usize> {
        let mut count = 0;
        for project_id in project_ids {
            let stored = self.store.find_by_id(&ProjectId::new(*project_id)?).await?;
            if stored.is_some_and(|project| project.examination_status().is_in_progress()) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Returns the stored commit hash of a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub async fn stored_hash(&self, project_id: &str) -> eyre::Result<Option<CommitHash>> {
        Ok(self
            .store
            .get_last_commit_hash(&ProjectId::new(project_id)?)
            .await?)
    }
}
