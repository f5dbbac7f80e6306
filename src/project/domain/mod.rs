//! Domain model for project examination admission.
//!
//! The project domain models the examination lifecycle of a repository-bound
//! project, the credentials used to inspect it, and the event that hands a
//! project over to the examination pipeline. Infrastructure concerns stay
//! outside of the domain boundary.

mod connection;
mod error;
mod event;
mod ids;
mod project;
mod repository;
mod status;

pub use connection::{AccessToken, GitConnection, GitProvider};
pub use error::{ParseExaminationStatusError, ProjectDomainError};
pub use event::{AdmissionEvent, AdmissionEventParams};
pub use ids::{ProjectId, UserId};
pub use project::{PersistedProjectData, Project};
pub use repository::{BranchName, CommitHash, RepositoryFullName, RepositoryId, RepositorySnapshot};
pub use status::ExaminationStatus;
