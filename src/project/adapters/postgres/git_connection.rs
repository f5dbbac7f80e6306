//! `PostgreSQL` git connection lookup.

use super::{models::GitConnectionRow, repository::ProjectPgPool, schema::git_connections};
use crate::project::{
    domain::{GitConnection, UserId},
    ports::{GitConnectionLookup, GitConnectionLookupError, GitConnectionResult},
};
use async_trait::async_trait;
use diesel::prelude::*;

/// `PostgreSQL`-backed git connection lookup.
#[derive(Debug, Clone)]
pub struct PostgresGitConnectionLookup {
    pool: ProjectPgPool,
}

impl PostgresGitConnectionLookup {
    /// Creates a lookup from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ProjectPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GitConnectionLookup for PostgresGitConnectionLookup {
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> GitConnectionResult<Option<GitConnection>> {
        let pool = self.pool.clone();
        let owner = user_id.as_str().to_owned();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(GitConnectionLookupError::persistence)?;
            let row = git_connections::table
                .filter(git_connections::user_id.eq(owner))
                .select(GitConnectionRow::as_select())
                .first::<GitConnectionRow>(&mut connection)
                .optional()
                .map_err(GitConnectionLookupError::persistence)?;
            row.map(|found| {
                GitConnection::from_parts(&found.user_id, &found.provider, &found.access_token)
                    .map_err(GitConnectionLookupError::persistence)
            })
            .transpose()
        })
        .await
        .map_err(GitConnectionLookupError::persistence)?
    }
}
