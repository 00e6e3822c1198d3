//! Patch validation errors

use thiserror::Error;

/// Errors raised when a patch is malformed.
///
/// Validation runs before a patch touches a snapshot, so a failed apply never
/// leaves partial changes behind.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// The same path appears in more than one of additions, deletions and updates
    #[error("Path '{path}' appears in more than one change set")]
    OverlappingPaths { path: String },

    /// A value's kind disagrees with the metadata marker of its path
    #[error("Patch value kind does not match metadata marker at '{path}'")]
    MetadataMismatch { path: String },
}

impl PatchError {
    /// Check if this error means the patch itself is inconsistent
    pub fn is_invalid_patch(&self) -> bool {
        matches!(
            self,
            PatchError::OverlappingPaths { .. } | PatchError::MetadataMismatch { .. }
        )
    }

    /// Get the offending path
    pub fn path(&self) -> &str {
        match self {
            PatchError::OverlappingPaths { path } | PatchError::MetadataMismatch { path } => path,
        }
    }
}

// Conversion from PatchError to the main Error type
impl From<PatchError> for crate::Error {
    fn from(err: PatchError) -> Self {
        crate::Error::Patch(err)
    }
}
