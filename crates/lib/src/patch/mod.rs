//! Patches between snapshots.
//!
//! A [`Patch`] records the paths that were added, deleted and updated between
//! two snapshots. Patches are produced by [`diff`] and consumed by
//! [`apply_forward`] and [`apply_reverse`]; together they satisfy
//!
//! - `apply_forward(old, diff(old, new)) == new`
//! - `apply_reverse(new, diff(old, new)) == old`
//!
//! Lists are compared by position, so inserting in the middle of a list shows
//! up as an update of every following element plus one addition at the end.
//!
//! # Persisted form
//!
//! ```json
//! {
//!   "additions": { "addresses.1.zip": "I,111" },
//!   "deletions": { "relations.1%1key": "S,brother" },
//!   "updates": {
//!     "addresses%2siz": { "oldValue": "1", "newValue": "2" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod apply;
mod diff;
pub mod errors;

pub use apply::{apply_forward, apply_reverse, replay_forward, replay_reverse};
pub use diff::diff;
pub use errors::PatchError;

use crate::snapshot::{FlatValue, Path, text_entries};

/// The two sides of a changed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    /// Value before the change
    pub old_value: FlatValue,
    /// Value after the change
    pub new_value: FlatValue,
}

impl Update {
    /// Creates an update from its two sides.
    pub fn new(old_value: impl Into<FlatValue>, new_value: impl Into<FlatValue>) -> Self {
        Self {
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }

    /// Returns the update with its sides swapped.
    pub fn inverted(&self) -> Self {
        Self {
            old_value: self.new_value.clone(),
            new_value: self.old_value.clone(),
        }
    }
}

/// The difference between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    #[serde(default, with = "text_entries")]
    additions: BTreeMap<Path, FlatValue>,
    #[serde(default, with = "text_entries")]
    deletions: BTreeMap<Path, FlatValue>,
    #[serde(default, with = "text_updates")]
    updates: BTreeMap<Path, Update>,
}

impl Patch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        additions: BTreeMap<Path, FlatValue>,
        deletions: BTreeMap<Path, FlatValue>,
        updates: BTreeMap<Path, Update>,
    ) -> Self {
        Self {
            additions,
            deletions,
            updates,
        }
    }

    /// Paths present only in the newer snapshot, with their values.
    pub fn additions(&self) -> &BTreeMap<Path, FlatValue> {
        &self.additions
    }

    /// Paths present only in the older snapshot, with their values.
    pub fn deletions(&self) -> &BTreeMap<Path, FlatValue> {
        &self.deletions
    }

    /// Paths present in both snapshots with differing values.
    pub fn updates(&self) -> &BTreeMap<Path, Update> {
        &self.updates
    }

    /// Adds an addition.
    pub fn with_addition(mut self, path: Path, value: impl Into<FlatValue>) -> Result<Self, PatchError> {
        let value = value.into();
        check_kind(&path, &value)?;
        self.additions.insert(path, value);
        Ok(self)
    }

    /// Adds a deletion.
    pub fn with_deletion(mut self, path: Path, value: impl Into<FlatValue>) -> Result<Self, PatchError> {
        let value = value.into();
        check_kind(&path, &value)?;
        self.deletions.insert(path, value);
        Ok(self)
    }

    /// Adds an update.
    pub fn with_update(mut self, path: Path, update: Update) -> Result<Self, PatchError> {
        check_kind(&path, &update.old_value)?;
        check_kind(&path, &update.new_value)?;
        self.updates.insert(path, update);
        Ok(self)
    }

    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.deletions.is_empty() && self.updates.is_empty()
    }

    /// Returns the number of changed paths.
    pub fn len(&self) -> usize {
        self.additions.len() + self.deletions.len() + self.updates.len()
    }

    /// Iterates over every changed path.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.additions
            .keys()
            .chain(self.deletions.keys())
            .chain(self.updates.keys())
    }

    /// Checks that no path appears in more than one change set and that every
    /// value matches its path's metadata marker.
    pub fn validate(&self) -> Result<(), PatchError> {
        for path in self.additions.keys() {
            if self.deletions.contains_key(path) || self.updates.contains_key(path) {
                return Err(PatchError::OverlappingPaths {
                    path: path.to_string(),
                });
            }
        }
        if let Some(path) = self.deletions.keys().find(|path| self.updates.contains_key(*path)) {
            return Err(PatchError::OverlappingPaths {
                path: path.to_string(),
            });
        }

        for (path, value) in self.additions.iter().chain(&self.deletions) {
            check_kind(path, value)?;
        }
        for (path, update) in &self.updates {
            check_kind(path, &update.old_value)?;
            check_kind(path, &update.new_value)?;
        }
        Ok(())
    }

    /// Returns the patch that undoes this one.
    ///
    /// Additions and deletions trade places and every update is swapped, so
    /// applying the inverse forward is the same as applying this patch in reverse.
    pub fn invert(&self) -> Patch {
        Patch {
            additions: self.deletions.clone(),
            deletions: self.additions.clone(),
            updates: self
                .updates
                .iter()
                .map(|(path, update)| (path.clone(), update.inverted()))
                .collect(),
        }
    }
}

fn check_kind(path: &Path, value: &FlatValue) -> Result<(), PatchError> {
    if path.meta_kind() == value.meta_kind() {
        Ok(())
    } else {
        Err(PatchError::MetadataMismatch {
            path: path.to_string(),
        })
    }
}

/// Serde helpers for the `updates` map in its persisted textual form.
mod text_updates {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

    use super::Update;
    use crate::snapshot::{FlatValue, Path};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct TextUpdate {
        old_value: String,
        new_value: String,
    }

    pub fn serialize<S>(updates: &BTreeMap<Path, Update>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(updates.iter().map(|(path, update)| {
            (
                path.to_string(),
                TextUpdate {
                    old_value: update.old_value.encode(),
                    new_value: update.new_value.encode(),
                },
            )
        }))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<Path, Update>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<Path, TextUpdate>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(path, text)| {
                let kind = path.meta_kind();
                let update = Update {
                    old_value: FlatValue::decode(kind, &text.old_value).map_err(D::Error::custom)?,
                    new_value: FlatValue::decode(kind, &text.new_value).map_err(D::Error::custom)?,
                };
                Ok((path, update))
            })
            .collect()
    }
}
