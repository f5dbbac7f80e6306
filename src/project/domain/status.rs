//! Examination lifecycle states and their transition table.

use super::ParseExaminationStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Examination lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExaminationStatus {
    /// The project has never been admitted.
    Pending,
    /// An examination is in flight.
    InProgress,
    /// The last examination finished successfully.
    Completed,
    /// The last examination failed.
    Failed,
}

impl ExaminationStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::InProgress, Self::Completed, Self::Failed];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    /// Returns whether an examination is currently running.
    #[must_use]
    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Returns whether moving from `self` to `target` is permitted.
    ///
    /// Admission is the only way into [`Self::InProgress`]; the completion
    /// callback is the only way out of it.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::Pending | Self::Completed | Self::Failed,
                Self::InProgress
            ) | (Self::InProgress, Self::Completed | Self::Failed)
        )
    }
}

impl TryFrom<&str> for ExaminationStatus {
    type Error = ParseExaminationStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            _ => Err(ParseExaminationStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for ExaminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
