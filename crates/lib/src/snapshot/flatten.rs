//! Tree to snapshot conversion.
//!
//! The walk is depth-first in declaration order: record fields in the order
//! they were inserted, list elements by index, map entries in iteration order.
//! Scalars become tagged leaves, nulls are dropped, and every list and map
//! leaves a [`MetaKind::Size`] entry at its own path, including empty ones.

use tracing::trace;

use super::{FlatValue, MetaKind, Path, Segment, Slot, Snapshot};
use crate::{Result, constants::FIRST_MAP_ORDINAL, tree::Tree};

/// Configurable tree flattener.
///
/// ```
/// use patchlog::snapshot::Flattener;
/// use patchlog::tree::{Record, Tree};
///
/// let tree: Tree = Record::new("User")
///     .with("address", Record::new("Address").with("city", "Paris"))
///     .into();
///
/// let typed = Flattener::new().flatten(&tree)?;
/// assert_eq!(typed.lookup("address%1cty").unwrap().as_runtime_type(), Some("Address"));
///
/// let untyped = Flattener::new().with_runtime_types(false).flatten(&tree)?;
/// assert!(untyped.lookup("address%1cty").is_none());
/// assert_eq!(untyped.len(), 1);
/// # Ok::<(), patchlog::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flattener {
    emit_runtime_types: bool,
}

impl Default for Flattener {
    fn default() -> Self {
        Self {
            emit_runtime_types: true,
        }
    }
}

impl Flattener {
    /// Creates a flattener with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether named records below the root record their type name.
    pub fn with_runtime_types(mut self, emit: bool) -> Self {
        self.emit_runtime_types = emit;
        self
    }

    /// Returns whether runtime type metadata is emitted.
    pub fn emits_runtime_types(&self) -> bool {
        self.emit_runtime_types
    }

    /// Flattens a tree into a snapshot.
    ///
    /// # Errors
    /// Fails with [`SnapshotError::InvalidComponent`](super::SnapshotError::InvalidComponent)
    /// if a record field name cannot be used as a path segment.
    pub fn flatten(&self, tree: &Tree) -> Result<Snapshot> {
        let mut snapshot = Snapshot::new();
        self.walk(tree, Path::root(), &mut snapshot)?;
        trace!(entries = snapshot.len(), "Flattened tree");
        Ok(snapshot)
    }

    fn walk(&self, tree: &Tree, path: Path, out: &mut Snapshot) -> Result<()> {
        match tree {
            Tree::Null => {}
            Tree::Scalar(scalar) => out.put(path, FlatValue::Leaf(scalar.clone())),
            Tree::List(items) => {
                out.put(path.meta(MetaKind::Size), FlatValue::Size(items.len()));
                for (index, item) in items.iter().enumerate() {
                    self.walk(item, path.join(Segment::Index(index)), out)?;
                }
            }
            Tree::Map(entries) => {
                out.put(path.meta(MetaKind::Size), FlatValue::Size(entries.len()));
                for (offset, (key, value)) in entries.iter().enumerate() {
                    let ordinal = FIRST_MAP_ORDINAL + offset;
                    self.walk(key, path.join(Segment::Entry(ordinal, Slot::Key)), out)?;
                    self.walk(value, path.join(Segment::Entry(ordinal, Slot::Value)), out)?;
                }
            }
            Tree::Record(record) => {
                if self.emit_runtime_types && !path.is_empty() {
                    if let Some(type_name) = record.type_name() {
                        out.put(
                            path.meta(MetaKind::RuntimeType),
                            FlatValue::RuntimeType(type_name.to_string()),
                        );
                    }
                }
                for (name, value) in record.fields() {
                    self.walk(value, path.join(Segment::field(name)?), out)?;
                }
            }
        }
        Ok(())
    }
}

/// Flattens a tree with the default [`Flattener`].
pub fn flatten(tree: &Tree) -> Result<Snapshot> {
    Flattener::default().flatten(tree)
}
