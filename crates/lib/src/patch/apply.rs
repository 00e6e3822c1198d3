use tracing::trace;

use super::Patch;
use crate::{Result, snapshot::Snapshot};

/// Applies a patch to the snapshot it was computed from.
///
/// Deletions are removed, additions inserted and updates set to their new
/// value. The patch is validated first and the input is left untouched, so a
/// failure never yields a partially patched snapshot.
pub fn apply_forward(snapshot: &Snapshot, patch: &Patch) -> Result<Snapshot> {
    patch.validate()?;
    let mut entries = snapshot.entries().clone();
    for path in patch.deletions().keys() {
        entries.remove(path);
    }
    for (path, value) in patch.additions() {
        entries.insert(path.clone(), value.clone());
    }
    for (path, update) in patch.updates() {
        entries.insert(path.clone(), update.new_value.clone());
    }
    trace!(changes = patch.len(), entries = entries.len(), "Applied patch forward");
    Ok(Snapshot::from_map_unchecked(entries))
}

/// Undoes a patch on the snapshot it produced.
///
/// Deletions are restored, additions removed and updates set back to their
/// old value.
pub fn apply_reverse(snapshot: &Snapshot, patch: &Patch) -> Result<Snapshot> {
    patch.validate()?;
    let mut entries = snapshot.entries().clone();
    for path in patch.additions().keys() {
        entries.remove(path);
    }
    for (path, value) in patch.deletions() {
        entries.insert(path.clone(), value.clone());
    }
    for (path, update) in patch.updates() {
        entries.insert(path.clone(), update.old_value.clone());
    }
    trace!(changes = patch.len(), entries = entries.len(), "Applied patch in reverse");
    Ok(Snapshot::from_map_unchecked(entries))
}

/// Applies a sequence of patches in order, starting from `base`.
pub fn replay_forward(base: &Snapshot, patches: &[Patch]) -> Result<Snapshot> {
    patches
        .iter()
        .try_fold(base.clone(), |snapshot, patch| apply_forward(&snapshot, patch))
}

/// Undoes a sequence of patches, last one first, starting from `latest`.
pub fn replay_reverse(latest: &Snapshot, patches: &[Patch]) -> Result<Snapshot> {
    patches
        .iter()
        .rev()
        .try_fold(latest.clone(), |snapshot, patch| apply_reverse(&snapshot, patch))
}
