//! Value objects describing the external repository bound to a project.

use super::ProjectDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a validated branch name.
const MAX_BRANCH_NAME_LENGTH: usize = 255;

/// Shortest abbreviated commit hash accepted by providers.
const MIN_COMMIT_HASH_LENGTH: usize = 7;

/// Length of a full SHA-256 object name.
const MAX_COMMIT_HASH_LENGTH: usize = 64;

/// Provider-issued numeric identifier of an external repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryId(u64);

impl RepositoryId {
    /// Largest identifier representable in the current `PostgreSQL` schema.
    const MAX_PERSISTED_VALUE: u64 = i64::MAX.unsigned_abs();

    /// Creates a validated repository identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvalidRepositoryId`] when the value is
    /// zero or exceeds `i64::MAX`.
    pub const fn new(value: u64) -> Result<Self, ProjectDomainError> {
        if value == 0 || value > Self::MAX_PERSISTED_VALUE {
            return Err(ProjectDomainError::InvalidRepositoryId(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized external repository name in `owner/repo` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryFullName(String);

impl RepositoryFullName {
    /// Creates a validated repository name.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvalidRepository`] if the value does not
    /// contain exactly one slash-delimited owner and repository segment.
    pub fn new(value: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let mut segments = normalized.split('/');
        let owner = segments.next().unwrap_or_default();
        let repo = segments.next().unwrap_or_default();
        let has_more_segments = segments.next().is_some();
        let is_valid = !owner.is_empty()
            && !repo.is_empty()
            && !has_more_segments
            && !normalized.chars().any(char::is_whitespace);

        if !is_valid {
            return Err(ProjectDomainError::InvalidRepository(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the repository name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RepositoryFullName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RepositoryFullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated Git branch name.
///
/// # Examples
///
///     use examiner::project::domain::BranchName;
///
///     let name = BranchName::new("main").expect("valid");
///     assert_eq!(name.as_str(), "main");
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// Creates a validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvalidBranchName`] when the value is
    /// empty, contains whitespace or a colon, or exceeds the length limit.
    pub fn new(value: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        let is_invalid = normalized.is_empty()
            || normalized.len() > MAX_BRANCH_NAME_LENGTH
            || normalized.contains(':')
            || normalized.chars().any(char::is_whitespace);
        if is_invalid {
            return Err(ProjectDomainError::InvalidBranchName(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hexadecimal commit object name, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitHash(String);

impl CommitHash {
    /// Creates a validated commit hash.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvalidCommitHash`] unless the trimmed
    /// value is 7 to 64 ASCII hexadecimal characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let has_valid_length =
            (MIN_COMMIT_HASH_LENGTH..=MAX_COMMIT_HASH_LENGTH).contains(&normalized.len());
        if !has_valid_length || !normalized.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(ProjectDomainError::InvalidCommitHash(raw));
        }
        Ok(Self(normalized.to_ascii_lowercase()))
    }

    /// Returns the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitHash {
    type Error = ProjectDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommitHash> for String {
    fn from(value: CommitHash) -> Self {
        value.0
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current state of an external repository as reported by an inspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    full_name: RepositoryFullName,
    branch: BranchName,
    commit_hash: CommitHash,
}

impl RepositorySnapshot {
    /// Creates a snapshot from validated components.
    #[must_use]
    pub const fn new(
        full_name: RepositoryFullName,
        branch: BranchName,
        commit_hash: CommitHash,
    ) -> Self {
        Self {
            full_name,
            branch,
            commit_hash,
        }
    }

    /// Creates a snapshot from raw provider values.
    ///
    /// # Errors
    ///
    /// Returns a [`ProjectDomainError`] when any component is invalid.
    pub fn from_parts(
        full_name: &str,
        branch: &str,
        commit_hash: &str,
    ) -> Result<Self, ProjectDomainError> {
        Ok(Self::new(
            RepositoryFullName::new(full_name)?,
            BranchName::new(branch)?,
            CommitHash::new(commit_hash)?,
        ))
    }

    /// Returns the repository's full `owner/repo` name.
    #[must_use]
    pub const fn full_name(&self) -> &RepositoryFullName {
        &self.full_name
    }

    /// Returns the default branch that was inspected.
    #[must_use]
    pub const fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// Returns the latest commit on the inspected branch.
    #[must_use]
    pub const fn commit_hash(&self) -> &CommitHash {
        &self.commit_hash
    }
}
