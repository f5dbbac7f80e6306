//! Shared world state for project admission BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use examiner::project::{
    adapters::memory::{
        InMemoryEventPublisher, InMemoryGitConnectionLookup, InMemoryProjectStore,
        InMemoryRepositoryInspector,
    },
    domain::{Project, RepositoryId},
    services::{AdmissionError, AdmissionService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestAdmissionService = AdmissionService<
    InMemoryProjectStore,
    InMemoryGitConnectionLookup,
    InMemoryRepositoryInspector,
    InMemoryEventPublisher,
    DefaultClock,
>;

/// Scenario world for admission behaviour tests.
pub struct AdmissionWorld {
    pub store: Arc<InMemoryProjectStore>,
    pub connections: Arc<InMemoryGitConnectionLookup>,
    pub inspector: Arc<InMemoryRepositoryInspector>,
    pub publisher: Arc<InMemoryEventPublisher>,
    pub service: TestAdmissionService,
    pub repositories: HashMap<String, RepositoryId>,
    pub last_result: Option<Result<Project, AdmissionError>>,
}

impl AdmissionWorld {
    /// Creates a world with empty adapters.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryProjectStore::new());
        let connections = Arc::new(InMemoryGitConnectionLookup::new());
        let inspector = Arc::new(InMemoryRepositoryInspector::new());
        let publisher = Arc::new(InMemoryEventPublisher::new());
        let service = AdmissionService::new(
            Arc::clone(&store),
            Arc::clone(&connections),
            Arc::clone(&inspector),
            Arc::clone(&publisher),
            Arc::new(DefaultClock),
        );

        Self {
            store,
            connections,
            inspector,
            publisher,
            service,
            repositories: HashMap::new(),
            last_result: None,
        }
    }

    /// Returns the repository assigned to `project` when it was seeded.
    pub fn repository_of(&self, project: &str) -> Result<RepositoryId, eyre::Report> {
        self.repositories
            .get(project)
            .copied()
            .ok_or_else(|| eyre::eyre!("project {project} was not seeded"))
    }

    /// Returns the admission outcome recorded by the when step.
    pub fn result(&self) -> Result<&Result<Project, AdmissionError>, eyre::Report> {
        self.last_result
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing admission result"))
    }
}

impl Default for AdmissionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> AdmissionWorld {
    AdmissionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
