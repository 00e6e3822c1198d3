//! Error types for marshalling values to and from [`Tree`](super::Tree)s.

use thiserror::Error;

/// Conversion failures between typed values and trees.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The tree node has a different kind than the target type expects
    #[error("Tree type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A numeric value does not fit the target type
    #[error("Value {value} is out of range for {target}")]
    OutOfRange { value: String, target: String },

    /// A required record field is absent
    #[error("Missing record field: {field}")]
    MissingField { field: String },

    /// The serde bridge failed to convert the value
    #[error("Tree serialization failed: {reason}")]
    Serialization { reason: String },
}

impl TreeError {
    /// Check if this error is related to type mismatches
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            TreeError::TypeMismatch { .. } | TreeError::OutOfRange { .. }
        )
    }

    /// Check if this error is a missing record field
    pub fn is_missing_field(&self) -> bool {
        matches!(self, TreeError::MissingField { .. })
    }

    /// Check if this error is related to serialization
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, TreeError::Serialization { .. })
    }
}

// Conversion from TreeError to the main Error type
impl From<TreeError> for crate::Error {
    fn from(err: TreeError) -> Self {
        crate::Error::Tree(err)
    }
}
