//! Diesel row models for project persistence.

use super::schema::{git_connections, projects};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for project records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Project identifier.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub id: String,
    /// Owning user identifier.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub user_id: String,
    /// Repository identifier.
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub repo_id: i64,
    /// Repository name.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub repo_name: String,
    /// Examination status.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub examination_status: String,
    /// Last recorded commit hash.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub commit_hash: Option<String>,
    /// Creation timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub updated_at: DateTime<Utc>,
}

/// Insert model for project records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProjectRow {
    /// Project identifier.
    pub id: String,
    /// Owning user identifier.
    pub user_id: String,
    /// Repository identifier.
    pub repo_id: i64,
    /// Repository name.
    pub repo_name: String,
    /// Examination status.
    pub examination_status: String,
    /// Last recorded commit hash.
    pub commit_hash: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for git connection records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = git_connections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GitConnectionRow {
    /// Owning user identifier.
    pub user_id: String,
    /// Git provider name.
    pub provider: String,
    /// Provider access token.
    pub access_token: String,
}
