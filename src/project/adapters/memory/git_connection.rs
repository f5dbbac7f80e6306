//! In-memory git connection lookup.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::project::{
    domain::{GitConnection, UserId},
    ports::{GitConnectionLookup, GitConnectionLookupError, GitConnectionResult},
};

/// Thread-safe in-memory git connection registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGitConnectionLookup {
    connections: Arc<RwLock<HashMap<UserId, GitConnection>>>,
}

impl InMemoryGitConnectionLookup {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a connection, replacing any existing one for the same user.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn insert(&self, connection: GitConnection) -> GitConnectionResult<()> {
        let mut connections = self.connections.write().map_err(|err| {
            GitConnectionLookupError::persistence(std::io::Error::other(err.to_string()))
        })?;
        connections.insert(connection.user_id().clone(), connection);
        Ok(())
    }
}

#[async_trait]
impl GitConnectionLookup for InMemoryGitConnectionLookup {
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> GitConnectionResult<Option<GitConnection>> {
        let connections = self.connections.read().map_err(|err| {
            GitConnectionLookupError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(connections.get(user_id).cloned())
    }
}
