//! Snapshot to tree reconstruction.
//!
//! Entries are first folded into a trie keyed by [`Segment`], then each node is
//! turned into a tree node according to the kind of its children: index
//! children make a list, entry slots make a map, field names make a record.
//! Structural entries that contradict each other are reported as
//! [`SnapshotError::Conflict`].

use std::collections::BTreeMap;

use super::{FlatValue, Path, Scalar, Segment, Slot, Snapshot, SnapshotError};
use crate::{
    Result,
    constants::MAX_LIST_LEN,
    tree::{Record, Tree},
};

#[derive(Debug, Default)]
struct Node {
    leaf: Option<Scalar>,
    size: Option<usize>,
    type_name: Option<String>,
    children: BTreeMap<Segment, Node>,
}

impl Node {
    fn descend(&mut self, path: &Path) -> &mut Node {
        path.segments().iter().fold(self, |node, segment| {
            node.children.entry(segment.clone()).or_default()
        })
    }
}

/// Rebuilds a tree from a snapshot.
///
/// Empty lists and empty maps flatten identically, so an empty collection is
/// always rebuilt as an empty [`Tree::List`]. List positions with no entries
/// are filled with [`Tree::Null`]. A list size or position past
/// [`MAX_LIST_LEN`] is reported as a conflict.
pub fn unflatten(snapshot: &Snapshot) -> Result<Tree> {
    let mut root = Node::default();
    for (path, value) in snapshot {
        let node = root.descend(path);
        match value {
            FlatValue::Leaf(scalar) => node.leaf = Some(scalar.clone()),
            FlatValue::Size(size) => node.size = Some(*size),
            FlatValue::RuntimeType(name) => node.type_name = Some(name.clone()),
        }
    }
    Ok(build(root, &Path::root())?)
}

fn conflict(path: &Path, reason: &str) -> SnapshotError {
    SnapshotError::Conflict {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn build(node: Node, path: &Path) -> std::result::Result<Tree, SnapshotError> {
    if let Some(scalar) = node.leaf {
        if !node.children.is_empty() || node.size.is_some() || node.type_name.is_some() {
            return Err(conflict(path, "leaf value with nested entries"));
        }
        return Ok(Tree::Scalar(scalar));
    }

    match node.children.keys().next() {
        Some(Segment::Index(_)) => build_list(node, path),
        Some(Segment::Entry(..)) => build_map(node, path),
        Some(Segment::Field(_)) => build_record(node, path),
        None => match (node.size, node.type_name) {
            (Some(_), Some(_)) => Err(conflict(path, "size on a typed record")),
            (Some(size), None) => Ok(Tree::List(null_list(size, path)?)),
            (None, Some(type_name)) => Ok(Tree::Record(Record::new(type_name))),
            (None, None) => Ok(Tree::Null),
        },
    }
}

/// Allocates `len` null positions, refusing lengths that cannot be a real list.
fn null_list(len: usize, path: &Path) -> std::result::Result<Vec<Tree>, SnapshotError> {
    if len > MAX_LIST_LEN {
        return Err(conflict(path, "list length exceeds the supported maximum"));
    }
    let mut items = Vec::new();
    items
        .try_reserve_exact(len)
        .map_err(|_| conflict(path, "list length cannot be allocated"))?;
    items.resize(len, Tree::Null);
    Ok(items)
}

fn build_list(node: Node, path: &Path) -> std::result::Result<Tree, SnapshotError> {
    if node.type_name.is_some() {
        return Err(conflict(path, "runtime type on a list"));
    }

    // Children iterate in ascending index order, so the last one decides the
    // length when no size was recorded.
    let len = match (node.size, node.children.keys().next_back()) {
        (Some(size), _) => size,
        (None, Some(Segment::Index(last))) => last
            .checked_add(1)
            .ok_or_else(|| conflict(path, "list position overflows"))?,
        (None, _) => 0,
    };
    let mut items = null_list(len, path)?;

    for (segment, child) in node.children {
        let Segment::Index(index) = segment else {
            return Err(conflict(path, "list positions mixed with other segments"));
        };
        let child_path = path.join(Segment::Index(index));
        let Some(slot) = items.get_mut(index) else {
            return Err(conflict(&child_path, "position beyond recorded size"));
        };
        *slot = build(child, &child_path)?;
    }
    Ok(Tree::List(items))
}

fn build_map(node: Node, path: &Path) -> std::result::Result<Tree, SnapshotError> {
    if node.type_name.is_some() {
        return Err(conflict(path, "runtime type on a map"));
    }

    // Slots of one ordinal sort next to each other, key before value.
    let mut entries: BTreeMap<usize, (Tree, Tree)> = BTreeMap::new();
    for (segment, child) in node.children {
        let Segment::Entry(ordinal, slot) = segment else {
            return Err(conflict(path, "map entries mixed with other segments"));
        };
        let tree = build(child, &path.join(Segment::Entry(ordinal, slot)))?;
        let entry = entries.entry(ordinal).or_default();
        match slot {
            Slot::Key => entry.0 = tree,
            Slot::Value => entry.1 = tree,
        }
    }

    if let Some(size) = node.size {
        if size != entries.len() {
            return Err(conflict(path, "entry count differs from recorded size"));
        }
    }
    Ok(Tree::Map(entries.into_values().collect()))
}

fn build_record(node: Node, path: &Path) -> std::result::Result<Tree, SnapshotError> {
    if node.size.is_some() {
        return Err(conflict(path, "size on a record"));
    }

    let mut record = match node.type_name {
        Some(type_name) => Record::new(type_name),
        None => Record::anonymous(),
    };
    for (segment, child) in node.children {
        let Segment::Field(name) = segment else {
            return Err(conflict(path, "fields mixed with other segments"));
        };
        let child_path = path.join(Segment::Field(name.clone()));
        record.insert(name, build(child, &child_path)?);
    }
    Ok(Tree::Record(record))
}
