//! Path types for addressing locations inside a flattened snapshot.
//!
//! A [`Path`] is a sequence of typed [`Segment`]s, optionally tagged with a
//! [`MetaKind`] when the entry it names is structural metadata rather than a leaf.
//! Keeping segments and metadata typed means a record field can never collide
//! with a reserved marker; the markers only exist in the textual form.
//!
//! # Textual form
//!
//! | Path | Text |
//! |---|---|
//! | field `firstName` under `person` | `person.firstName` |
//! | list element 1 of `addresses` | `addresses.1` |
//! | key slot of the first entry of `relations` | `relations.1%1key` |
//! | value slot of the first entry of `relations` | `relations.1%1val` |
//! | size of `addresses` | `addresses%2siz` |
//! | runtime type of `addresses.1` | `addresses.1%1cty` |
//!
//! ```rust
//! use patchlog::snapshot::{MetaKind, Path, Segment, Slot};
//!
//! let path = Path::root()
//!     .join(Segment::field("relations")?)
//!     .join(Segment::Entry(1, Slot::Value))
//!     .join(Segment::field("firstName")?);
//! assert_eq!(path.to_string(), "relations.1%1val.firstName");
//!
//! let size = Path::root().join(Segment::field("addresses")?).meta(MetaKind::Size);
//! assert_eq!(size.to_string(), "addresses%2siz");
//! assert_eq!("addresses%2siz".parse::<Path>()?, size);
//! # Ok::<(), patchlog::snapshot::SnapshotError>(())
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::SnapshotError;
use crate::constants::{
    MAP_KEY_MARKER, MAP_VALUE_MARKER, MARKER_PREFIX, RUNTIME_TYPE_MARKER, SEGMENT_SEPARATOR,
    SIZE_MARKER,
};

/// Which half of a map entry a path points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// The entry's key
    Key,
    /// The entry's value
    Value,
}

impl Slot {
    fn marker(self) -> &'static str {
        match self {
            Slot::Key => MAP_KEY_MARKER,
            Slot::Value => MAP_VALUE_MARKER,
        }
    }
}

/// Kind of structural metadata recorded at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetaKind {
    /// Number of elements of the list or map at the path
    Size,
    /// Concrete type name of the record at the path
    RuntimeType,
}

impl MetaKind {
    /// Returns the reserved suffix used for this kind in the textual form.
    pub fn marker(self) -> &'static str {
        match self {
            MetaKind::Size => SIZE_MARKER,
            MetaKind::RuntimeType => RUNTIME_TYPE_MARKER,
        }
    }
}

/// A single step in a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// A named record field
    Field(String),
    /// A zero-based list position
    Index(usize),
    /// A slot of the map entry with the given ordinal
    Entry(usize, Slot),
}

impl Segment {
    /// Creates a field segment after validating the name.
    ///
    /// # Errors
    /// Field names must be non-empty, must not contain the segment separator or
    /// the marker prefix, and must not be a canonical decimal number (that text
    /// is reserved for list positions).
    pub fn field(name: impl Into<String>) -> Result<Self, SnapshotError> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("field names cannot be empty")
        } else if name.contains(SEGMENT_SEPARATOR) {
            Some("field names cannot contain dots")
        } else if name.contains(MARKER_PREFIX) {
            Some("field names cannot contain '%'")
        } else if parse_number(&name).is_some() {
            Some("field names cannot look like list positions")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(SnapshotError::InvalidComponent {
                component: name,
                reason: reason.to_string(),
            }),
            None => Ok(Segment::Field(name)),
        }
    }

    /// Returns the field name if this is a field segment.
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Segment::Field(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the position if this is a list index segment.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index(index) => Some(*index),
            _ => None,
        }
    }

    /// Parses one dot-separated component of a textual path.
    fn parse(text: &str, full: &str) -> Result<Self, SnapshotError> {
        let invalid = |reason: &str| SnapshotError::InvalidPath {
            path: full.to_string(),
            reason: reason.to_string(),
        };

        if text.is_empty() {
            return Err(invalid("empty segment"));
        }

        for slot in [Slot::Key, Slot::Value] {
            if let Some(ordinal) = text.strip_suffix(slot.marker()) {
                let ordinal = parse_number(ordinal).ok_or_else(|| invalid("bad entry ordinal"))?;
                return Ok(Segment::Entry(ordinal, slot));
            }
        }

        if text.contains(MARKER_PREFIX) {
            return Err(invalid("unknown marker"));
        }

        Ok(match parse_number(text) {
            Some(index) => Segment::Index(index),
            None => Segment::Field(text.to_string()),
        })
    }
}

/// Parses a canonical decimal number (no sign, no leading zeros).
fn parse_number(text: &str) -> Option<usize> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if text.len() > 1 && text.starts_with('0') {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, "{name}"),
            Segment::Index(index) => write!(f, "{index}"),
            Segment::Entry(ordinal, slot) => write!(f, "{ordinal}{}", slot.marker()),
        }
    }
}

/// A location inside a snapshot.
///
/// Paths order segment-wise, so a location always sorts before everything
/// beneath it and a metadata entry sorts directly after its location's plain
/// entry. This keeps serialized snapshots deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    segments: Vec<Segment>,
    meta: Option<MetaKind>,
}

impl Path {
    /// Creates the root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from a list of segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            meta: None,
        }
    }

    /// Returns a new path with `segment` appended.
    ///
    /// Any metadata marker on `self` is dropped: the child of a metadata
    /// entry is not meaningful, so the result always names a plain location.
    pub fn join(&self, segment: Segment) -> Path {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Path {
            segments,
            meta: None,
        }
    }

    /// Returns the metadata path of the given kind for this location.
    pub fn meta(&self, kind: MetaKind) -> Path {
        Path {
            segments: self.segments.clone(),
            meta: Some(kind),
        }
    }

    /// Returns this path without its metadata marker.
    pub fn location(&self) -> Path {
        Path::from_segments(self.segments.clone())
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the metadata kind, if this path names a metadata entry.
    pub fn meta_kind(&self) -> Option<MetaKind> {
        self.meta
    }

    /// Returns `true` if this path names a metadata entry.
    pub fn is_meta(&self) -> bool {
        self.meta.is_some()
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the last segment, or `None` for the root.
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Returns the parent location, or `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        let (_, init) = self.segments.split_last()?;
        Some(Path::from_segments(init.to_vec()))
    }

    /// Returns `true` if `prefix`'s segments are a prefix of this path's segments.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEGMENT_SEPARATOR}")?;
            }
            write!(f, "{segment}")?;
        }
        if let Some(kind) = self.meta {
            write!(f, "{}", kind.marker())?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (body, meta) = if let Some(body) = s.strip_suffix(SIZE_MARKER) {
            (body, Some(MetaKind::Size))
        } else if let Some(body) = s.strip_suffix(RUNTIME_TYPE_MARKER) {
            (body, Some(MetaKind::RuntimeType))
        } else {
            (s, None)
        };

        let segments = if body.is_empty() {
            Vec::new()
        } else {
            body.split(SEGMENT_SEPARATOR)
                .map(|part| Segment::parse(part, s))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Path { segments, meta })
    }
}

impl Serialize for Path {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
