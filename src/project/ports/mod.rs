//! Port contracts for project examination admission.
//!
//! Ports define infrastructure-agnostic interfaces used by the admission
//! service.

pub mod git_connection;
pub mod inspector;
pub mod project_store;
pub mod publisher;

pub use git_connection::{GitConnectionLookup, GitConnectionLookupError, GitConnectionResult};
pub use inspector::{InspectorResult, RepositoryInspector, RepositoryInspectorError};
pub use project_store::{ProjectStore, ProjectStoreError, ProjectStoreResult};
pub use publisher::{EventPublisher, EventPublisherError, PublishResult};
