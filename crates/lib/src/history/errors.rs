//! Error types for history construction and replay.

use thiserror::Error;

/// Errors raised by [`History`](super::History) operations.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Neither an initial nor a latest state was supplied
    #[error("A history needs at least one of an initial or a latest state")]
    MissingState,

    /// The requested version does not exist
    #[error("Version {version} is out of range for a history of {count} versions")]
    VersionOutOfRange { version: usize, count: usize },

    /// Replaying the patches from the initial state does not reach the latest state
    #[error("Patches do not lead from the initial state to version {version}")]
    Diverged { version: usize },
}

impl HistoryError {
    /// Check if this error was caused by invalid constructor arguments
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, HistoryError::MissingState)
    }

    /// Check if this error refers to a version that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, HistoryError::VersionOutOfRange { .. })
    }

    /// Check if the recorded patches are inconsistent with the recorded states
    pub fn is_diverged(&self) -> bool {
        matches!(self, HistoryError::Diverged { .. })
    }
}

// Conversion from HistoryError to the main Error type
impl From<HistoryError> for crate::Error {
    fn from(err: HistoryError) -> Self {
        crate::Error::History(err)
    }
}
