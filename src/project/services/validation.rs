//! Input validation for admission requests.

use crate::project::domain::{ProjectDomainError, ProjectId, UserId};
use thiserror::Error;

/// Raw admission request as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmitProjectRequest {
    user_id: String,
    project_id: String,
}

impl AdmitProjectRequest {
    /// Creates a request for `user_id` to admit `project_id`.
    #[must_use]
    pub fn new(user_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            project_id: project_id.into(),
        }
    }

    /// Returns the raw requesting user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the raw project identifier.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Validates both identifiers without performing any I/O.
    ///
    /// Every violation is reported, not only the first.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionValidationError`] when either identifier is empty
    /// or whitespace-only.
    pub fn validate(&self) -> Result<ValidatedAdmission, AdmissionValidationError> {
        match (
            UserId::new(self.user_id.as_str()),
            ProjectId::new(self.project_id.as_str()),
        ) {
            (Ok(user_id), Ok(project_id)) => Ok(ValidatedAdmission {
                user_id,
                project_id,
            }),
            (user_result, project_result) => Err(AdmissionValidationError::new(
                [user_result.err(), project_result.err()]
                    .into_iter()
                    .flatten(),
            )),
        }
    }
}

/// Admission request whose identifiers passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAdmission {
    user_id: UserId,
    project_id: ProjectId,
}

impl ValidatedAdmission {
    /// Returns the requesting user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the project to admit.
    #[must_use]
    pub const fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Splits the request into its identifiers.
    #[must_use]
    pub fn into_parts(self) -> (UserId, ProjectId) {
        (self.user_id, self.project_id)
    }
}

/// Malformed admission input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid admission request: {}", format_violations(.violations))]
pub struct AdmissionValidationError {
    violations: Vec<ProjectDomainError>,
}

impl AdmissionValidationError {
    fn new(violations: impl IntoIterator<Item = ProjectDomainError>) -> Self {
        Self {
            violations: violations.into_iter().collect(),
        }
    }

    /// Returns every violation found in the request.
    #[must_use]
    pub fn violations(&self) -> &[ProjectDomainError] {
        &self.violations
    }
}

fn format_violations(violations: &[ProjectDomainError]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
