//! Flattened snapshots of value trees.
//!
//! A [`Snapshot`] is a single-level association from [`Path`] to [`FlatValue`]:
//! every scalar of the source tree becomes a tagged leaf at its dotted path, and
//! lists, maps and typed records leave structural metadata entries behind so the
//! shape can be rebuilt later.
//!
//! # Core Types
//!
//! - [`Path`] - Typed location of an entry
//! - [`Scalar`] - A primitive value with its type tag
//! - [`FlatValue`] - A leaf or a metadata entry
//! - [`Snapshot`] - The flattened association itself
//! - [`Flattener`] - Tree to snapshot conversion
//!
//! # Example
//!
//! ```
//! use patchlog::snapshot::{Scalar, flatten, unflatten};
//! use patchlog::tree::{Record, Tree};
//!
//! let tree: Tree = Record::new("User")
//!     .with("name", "Bob")
//!     .with("tags", Tree::List(vec!["a".into(), "b".into()]))
//!     .into();
//!
//! let snapshot = flatten(&tree)?;
//! let encoded: Vec<(String, String)> = snapshot
//!     .iter()
//!     .map(|(path, value)| (path.to_string(), value.encode()))
//!     .collect();
//! assert_eq!(
//!     encoded,
//!     vec![
//!         ("name".to_string(), "S,Bob".to_string()),
//!         ("tags%2siz".to_string(), "2".to_string()),
//!         ("tags.0".to_string(), "S,a".to_string()),
//!         ("tags.1".to_string(), "S,b".to_string()),
//!     ]
//! );
//!
//! let rebuilt = unflatten(&snapshot)?;
//! assert_eq!(rebuilt.get_field("name"), Some(&Tree::from("Bob")));
//! # Ok::<(), patchlog::Error>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod errors;
pub mod flatten;
pub mod path;
pub mod unflatten;
pub mod value;

pub use errors::SnapshotError;
pub use flatten::{Flattener, flatten};
pub use path::{MetaKind, Path, Segment, Slot};
pub use unflatten::unflatten;
pub use value::{FlatValue, Scalar};

/// A flattened association from paths to tagged values.
///
/// Entries are kept in [`Path`] order so iteration and serialization are
/// deterministic. Null values are never stored, and the value at every path
/// matches the path's metadata marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<Path, FlatValue>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from entries, validating each one.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (Path, FlatValue)>,
    ) -> Result<Self, SnapshotError> {
        let mut snapshot = Self::new();
        for (path, value) in entries {
            snapshot.insert(path, value)?;
        }
        Ok(snapshot)
    }

    /// Wraps an entry map whose values are already known to match their paths.
    pub(crate) fn from_map_unchecked(entries: BTreeMap<Path, FlatValue>) -> Self {
        Self { entries }
    }

    /// Inserts an entry, returning the previous value at the path.
    ///
    /// # Errors
    /// [`SnapshotError::MetadataMismatch`] if the value kind does not match the
    /// path's metadata marker.
    pub fn insert(&mut self, path: Path, value: FlatValue) -> Result<Option<FlatValue>, SnapshotError> {
        check_kind(&path, &value)?;
        Ok(self.entries.insert(path, value))
    }

    /// Inserts an entry the caller has already matched to its path.
    pub(crate) fn put(&mut self, path: Path, value: FlatValue) {
        debug_assert_eq!(path.meta_kind(), value.meta_kind());
        self.entries.insert(path, value);
    }

    /// Removes the entry at a path.
    pub fn remove(&mut self, path: &Path) -> Option<FlatValue> {
        self.entries.remove(path)
    }

    /// Returns the value at a path.
    pub fn get(&self, path: &Path) -> Option<&FlatValue> {
        self.entries.get(path)
    }

    /// Returns the value at a path given in textual form.
    ///
    /// Unparseable paths simply have no value.
    pub fn lookup(&self, path: &str) -> Option<&FlatValue> {
        path.parse::<Path>().ok().and_then(|path| self.entries.get(&path))
    }

    /// Returns `true` if the snapshot has an entry at the path.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &FlatValue)> {
        self.entries.iter()
    }

    /// Iterates over the tagged leaves only, skipping metadata.
    pub fn leaves(&self) -> impl Iterator<Item = (&Path, &Scalar)> {
        self.entries
            .iter()
            .filter_map(|(path, value)| value.as_leaf().map(|scalar| (path, scalar)))
    }

    /// Returns the underlying entry map.
    pub fn entries(&self) -> &BTreeMap<Path, FlatValue> {
        &self.entries
    }

    /// Consumes the snapshot and returns the underlying entry map.
    pub fn into_entries(self) -> BTreeMap<Path, FlatValue> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a Path, &'a FlatValue);
    type IntoIter = std::collections::btree_map::Iter<'a, Path, FlatValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

pub(crate) fn check_kind(path: &Path, value: &FlatValue) -> Result<(), SnapshotError> {
    if path.meta_kind() == value.meta_kind() {
        Ok(())
    } else {
        Err(SnapshotError::MetadataMismatch {
            path: path.to_string(),
        })
    }
}

/// Serializes as a JSON object of textual paths to textual values.
impl Serialize for Snapshot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        text_entries::serialize(&self.entries, serializer)
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        text_entries::deserialize(deserializer).map(Snapshot::from_map_unchecked)
    }
}

/// Serde helpers for `Path -> FlatValue` maps in the persisted textual form.
///
/// Used with `#[serde(with = "...")]` wherever such a map is persisted.
pub(crate) mod text_entries {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::{FlatValue, Path};

    pub fn serialize<S>(entries: &BTreeMap<Path, FlatValue>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(
            entries
                .iter()
                .map(|(path, value)| (path.to_string(), value.encode())),
        )
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<Path, FlatValue>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<Path, String>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(path, text)| {
                let value = FlatValue::decode(path.meta_kind(), &text).map_err(D::Error::custom)?;
                Ok((path, value))
            })
            .collect()
    }
}
