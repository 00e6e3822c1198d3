//! Constants used throughout the patchlog library.
//!
//! This module provides central definitions for the reserved markers that appear
//! in the textual form of snapshot paths and tagged values. These strings are part
//! of the persisted patch format and must not change.

/// Separator between the segments of a textual path (`person.firstName`).
pub const SEGMENT_SEPARATOR: char = '.';

/// Leading character of every reserved marker. Field names may not contain it.
pub const MARKER_PREFIX: char = '%';

/// Suffix marking a collection size entry (`addresses%2siz`).
pub const SIZE_MARKER: &str = "%2siz";

/// Suffix marking a runtime type entry (`addresses.1%1cty`).
pub const RUNTIME_TYPE_MARKER: &str = "%1cty";

/// Suffix marking the key slot of a map entry (`relations.1%1key`).
pub const MAP_KEY_MARKER: &str = "%1key";

/// Suffix marking the value slot of a map entry (`relations.1%1val`).
pub const MAP_VALUE_MARKER: &str = "%1val";

/// Separator between a scalar's type tag and its value (`S,Bob`).
pub const TAG_SEPARATOR: char = ',';

/// Ordinal assigned to the first entry of a map. List indices start at zero.
pub const FIRST_MAP_ORDINAL: usize = 1;

/// Largest list length rebuilt from a snapshot. Persisted sizes and positions
/// beyond it are rejected instead of allocated.
pub const MAX_LIST_LEN: usize = 1 << 24;
