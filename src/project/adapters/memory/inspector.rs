//! Scripted repository inspector.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::project::{
    domain::{GitConnection, Project, RepositoryId, RepositorySnapshot},
    ports::{InspectorResult, RepositoryInspector, RepositoryInspectorError},
};

/// In-memory repository inspector.
///
/// Responses are registered per repository identifier. This adapter models
/// provider behaviour without network access and is suitable for unit and
/// integration tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepositoryInspector {
    responses: Arc<RwLock<HashMap<RepositoryId, ScriptedResponse>>>,
}

#[derive(Debug, Clone)]
enum ScriptedResponse {
    Snapshot(RepositorySnapshot),
    Empty,
    Failure(String),
}

impl InMemoryRepositoryInspector {
    /// Creates an inspector with no registered repositories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports `snapshot` for the repository from now on.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn set_snapshot(
        &self,
        repo_id: RepositoryId,
        snapshot: RepositorySnapshot,
    ) -> InspectorResult<()> {
        self.script(repo_id, ScriptedResponse::Snapshot(snapshot))
    }

    /// Reports the repository as having no commits.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn mark_empty(&self, repo_id: RepositoryId) -> InspectorResult<()> {
        self.script(repo_id, ScriptedResponse::Empty)
    }

    /// Fails every inspection of the repository with a transport error.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn fail_with(
        &self,
        repo_id: RepositoryId,
        message: impl Into<String>,
    ) -> InspectorResult<()> {
        self.script(repo_id, ScriptedResponse::Failure(message.into()))
    }

    fn script(&self, repo_id: RepositoryId, response: ScriptedResponse) -> InspectorResult<()> {
        let mut responses = self.responses.write().map_err(|err| {
            RepositoryInspectorError::transport(std::io::Error::other(err.to_string()))
        })?;
        responses.insert(repo_id, response);
        Ok(())
    }
}

#[async_trait]
impl RepositoryInspector for InMemoryRepositoryInspector {
    async fn inspect(
        &self,
        project: &Project,
        _connection: &GitConnection,
    ) -> InspectorResult<RepositorySnapshot> {
        let responses = self.responses.read().map_err(|err| {
            RepositoryInspectorError::transport(std::io::Error::other(err.to_string()))
        })?;
        match responses.get(&project.repo_id()) {
            Some(ScriptedResponse::Snapshot(snapshot)) => Ok(snapshot.clone()),
            Some(ScriptedResponse::Empty) => Err(RepositoryInspectorError::EmptyRepository(
                project.repo_name().clone(),
            )),
            Some(ScriptedResponse::Failure(message)) => Err(RepositoryInspectorError::transport(
                std::io::Error::other(message.clone()),
            )),
            None => Err(RepositoryInspectorError::transport(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("repository {} is not reachable", project.repo_name()),
            ))),
        }
    }
}
