//!
//! Patchlog: change histories for structured values.
//! This library records how a value evolves by storing its first and latest state plus the
//! ordered patches between them.
//!
//! ## Core Concepts
//!
//! Patchlog is built around several key concepts:
//!
//! * **Trees (`tree::Tree`)**: The type-independent shape of a value: records, lists, maps and scalars. Typed values cross into trees through the `tree::Marshal` trait.
//! * **Snapshots (`snapshot::Snapshot`)**: A tree flattened into a single-level map from dotted paths to tagged scalars, with structural metadata for collection sizes and runtime types.
//! * **Patches (`patch::Patch`)**: The additions, deletions and updates between two snapshots, applicable forward and in reverse.
//! * **Histories (`history::History`)**: An initial state, a latest state and the append-only list of patches leading from one to the other.
//!
//! ```
//! use patchlog::{History, Result, tree::{Marshal, Record, Tree}};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Person {
//!     first_name: String,
//!     last_name: String,
//! }
//!
//! impl Marshal for Person {
//!     fn to_tree(&self) -> Result<Tree> {
//!         Ok(Record::new("Person")
//!             .field("firstName", &self.first_name)?
//!             .field("lastName", &self.last_name)?
//!             .into())
//!     }
//!
//!     fn from_tree(tree: &Tree) -> Result<Self> {
//!         Ok(Person {
//!             first_name: tree.field_as("firstName")?,
//!             last_name: tree.field_as("lastName")?,
//!         })
//!     }
//! }
//!
//! let mut history = History::new(Person {
//!     first_name: "Bob".into(),
//!     last_name: "Smith".into(),
//! });
//! history.create_patch_with(|person| person.first_name = "Bobby".into())?;
//!
//! let json = serde_json::to_value(&history.patches()[0])?;
//! assert_eq!(json["updates"]["firstName"]["oldValue"], "S,Bob");
//! assert_eq!(json["updates"]["firstName"]["newValue"], "S,Bobby");
//! # Ok::<(), patchlog::Error>(())
//! ```

pub mod constants;
pub mod history;
pub mod patch;
pub mod snapshot;
pub mod tree;

/// Re-export the `History` struct for easier access.
pub use history::History;
pub use patch::Patch;
pub use snapshot::Snapshot;
pub use tree::{Marshal, Record, Tree};

/// Result type used throughout the Patchlog library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Patchlog library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured conversion errors from the tree module
    #[error(transparent)]
    Tree(tree::TreeError),

    /// Structured path and value errors from the snapshot module
    #[error(transparent)]
    Snapshot(snapshot::SnapshotError),

    /// Structured patch validation errors from the patch module
    #[error(transparent)]
    Patch(patch::PatchError),

    /// Structured history errors from the history module
    #[error(transparent)]
    History(history::HistoryError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Serialize(_) => "serialize",
            Error::Tree(_) => "tree",
            Error::Snapshot(_) => "snapshot",
            Error::Patch(_) => "patch",
            Error::History(_) => "history",
        }
    }

    /// Check if this error is a failure to convert a value to or from a tree.
    pub fn is_conversion_error(&self) -> bool {
        matches!(self, Error::Tree(_))
    }

    /// Check if this error is a rejected constructor argument.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Error::History(history_err) => history_err.is_invalid_argument(),
            Error::Snapshot(snapshot_err) => {
                matches!(snapshot_err, snapshot::SnapshotError::InvalidComponent { .. })
            }
            _ => false,
        }
    }

    /// Check if this error means a patch is malformed.
    pub fn is_invalid_patch(&self) -> bool {
        match self {
            Error::Patch(patch_err) => patch_err.is_invalid_patch(),
            _ => false,
        }
    }

    /// Check if this error indicates a requested version was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::History(history_err) => history_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates stored data is inconsistent.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Snapshot(snapshot_err) => snapshot_err.is_structure_error(),
            Error::History(history_err) => history_err.is_diverged(),
            _ => false,
        }
    }

    /// Check if this error is serialization-related.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Serialize(_) => true,
            Error::Tree(tree_err) => tree_err.is_serialization_error(),
            Error::Snapshot(snapshot_err) => snapshot_err.is_parse_error(),
            _ => false,
        }
    }
}
