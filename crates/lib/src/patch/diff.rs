use std::{cmp::Ordering, collections::BTreeMap};

use tracing::trace;

use super::{Patch, Update};
use crate::snapshot::Snapshot;

/// Computes the patch that turns `old` into `new`.
///
/// Returns `None` when the snapshots are equal. Metadata entries are compared
/// like any other entry, so a resized list shows up as an update of its size.
///
/// ```
/// use patchlog::patch::diff;
/// use patchlog::snapshot::{Path, flatten};
/// use patchlog::tree::{Record, Tree};
///
/// let old = flatten(&Record::new("Person").with("firstName", "Bob").into())?;
/// let new = flatten(&Record::new("Person").with("firstName", "Bobby").into())?;
///
/// let patch = diff(&old, &new).expect("names differ");
/// let update = &patch.updates()[&"firstName".parse::<Path>()?];
/// assert_eq!(update.old_value.encode(), "S,Bob");
/// assert_eq!(update.new_value.encode(), "S,Bobby");
/// assert!(diff(&old, &old).is_none());
/// # Ok::<(), patchlog::Error>(())
/// ```
pub fn diff(old: &Snapshot, new: &Snapshot) -> Option<Patch> {
    let mut additions = BTreeMap::new();
    let mut deletions = BTreeMap::new();
    let mut updates = BTreeMap::new();

    // Both sides iterate in path order, so a single merge pass finds every change.
    let mut old_entries = old.iter().peekable();
    let mut new_entries = new.iter().peekable();
    loop {
        let order = match (old_entries.peek(), new_entries.peek()) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((old_path, _)), Some((new_path, _))) => old_path.cmp(new_path),
        };

        match order {
            Ordering::Less => {
                if let Some((path, value)) = old_entries.next() {
                    deletions.insert(path.clone(), value.clone());
                }
            }
            Ordering::Greater => {
                if let Some((path, value)) = new_entries.next() {
                    additions.insert(path.clone(), value.clone());
                }
            }
            Ordering::Equal => {
                if let (Some((path, old_value)), Some((_, new_value))) =
                    (old_entries.next(), new_entries.next())
                {
                    if old_value != new_value {
                        updates.insert(path.clone(), Update::new(old_value.clone(), new_value.clone()));
                    }
                }
            }
        }
    }

    trace!(
        additions = additions.len(),
        deletions = deletions.len(),
        updates = updates.len(),
        "Computed snapshot diff"
    );

    let patch = Patch::from_parts(additions, deletions, updates);
    (!patch.is_empty()).then_some(patch)
}
