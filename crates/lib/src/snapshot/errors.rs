//! Error types for snapshot paths, tagged values, and flattening.
//!
//! These errors cover the textual codec of paths and values as well as the
//! structural problems that can surface while flattening a tree or rebuilding
//! one from a snapshot.

use thiserror::Error;

/// Structured error types for snapshot operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// A record field name cannot be used as a path segment
    #[error("Invalid path component '{component}': {reason}")]
    InvalidComponent { component: String, reason: String },

    /// A textual path could not be parsed
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A textual value could not be parsed
    #[error("Invalid snapshot value '{value}': {reason}")]
    InvalidValue { value: String, reason: String },

    /// The value stored at a path disagrees with the path's metadata marker
    #[error("Value kind does not match metadata marker at '{path}'")]
    MetadataMismatch { path: String },

    /// Two entries describe incompatible structure at the same location
    #[error("Conflicting structure at '{path}': {reason}")]
    Conflict { path: String, reason: String },
}

impl SnapshotError {
    /// Check if this error came from parsing the textual form of a path or value.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            SnapshotError::InvalidPath { .. } | SnapshotError::InvalidValue { .. }
        )
    }

    /// Check if this error is related to structural inconsistencies.
    pub fn is_structure_error(&self) -> bool {
        matches!(
            self,
            SnapshotError::MetadataMismatch { .. } | SnapshotError::Conflict { .. }
        )
    }

    /// Get the path if this is a path-related error
    pub fn path(&self) -> Option<&str> {
        match self {
            SnapshotError::InvalidPath { path, .. }
            | SnapshotError::MetadataMismatch { path }
            | SnapshotError::Conflict { path, .. } => Some(path),
            _ => None,
        }
    }
}

// Conversion from SnapshotError to the main Error type
impl From<SnapshotError> for crate::Error {
    fn from(err: SnapshotError) -> Self {
        crate::Error::Snapshot(err)
    }
}
