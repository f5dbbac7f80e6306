//! In-memory adapters for every admission port.

mod git_connection;
mod inspector;
mod project_store;
mod publisher;

pub use git_connection::InMemoryGitConnectionLookup;
pub use inspector::InMemoryRepositoryInspector;
pub use project_store::InMemoryProjectStore;
pub use publisher::InMemoryEventPublisher;
