//! Git provider credentials stored per user.

use super::{ProjectDomainError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported git hosting providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GitProvider {
    /// GitHub.
    #[serde(rename = "GITHUB")]
    GitHub,
    /// GitLab.
    #[serde(rename = "GITLAB")]
    GitLab,
}

impl GitProvider {
    /// Returns provider name in canonical storage format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GitHub => "GITHUB",
            Self::GitLab => "GITLAB",
        }
    }
}

impl TryFrom<&str> for GitProvider {
    type Error = ProjectDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "GITHUB" => Ok(Self::GitHub),
            "GITLAB" => Ok(Self::GitLab),
            _ => Err(ProjectDomainError::InvalidGitProvider(value.to_owned())),
        }
    }
}

impl fmt::Display for GitProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provider access token.
///
/// The secret is only reachable through [`AccessToken::expose`] and
/// serialization; formatting redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates a validated access token.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyAccessToken`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(ProjectDomainError::EmptyAccessToken);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the raw secret.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// A user's stored connection to a git provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConnection {
    user_id: UserId,
    provider: GitProvider,
    access_token: AccessToken,
}

impl GitConnection {
    /// Creates a git connection from validated components.
    #[must_use]
    pub const fn new(user_id: UserId, provider: GitProvider, access_token: AccessToken) -> Self {
        Self {
            user_id,
            provider,
            access_token,
        }
    }

    /// Creates a git connection from raw values.
    ///
    /// # Errors
    ///
    /// Returns a [`ProjectDomainError`] when any component is invalid.
    pub fn from_parts(
        user_id: &str,
        provider: &str,
        access_token: &str,
    ) -> Result<Self, ProjectDomainError> {
        Ok(Self::new(
            UserId::new(user_id)?,
            GitProvider::try_from(provider)?,
            AccessToken::new(access_token)?,
        ))
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the git provider.
    #[must_use]
    pub const fn provider(&self) -> GitProvider {
        self.provider
    }

    /// Returns the access token.
    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.access_token
    }
}
