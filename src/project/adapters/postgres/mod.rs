//! `PostgreSQL` adapters for project admission persistence.

mod git_connection;
mod models;
mod repository;
mod schema;

pub use git_connection::PostgresGitConnectionLookup;
pub use repository::{PostgresProjectStore, ProjectPgPool};
