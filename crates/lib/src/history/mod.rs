//! Versioned value history.
//!
//! A [`History`] keeps the first and the most recent state of a value together
//! with the ordered list of [`Patch`]es that lead from one to the other. Each
//! call to [`History::create_patch`] or [`History::create_patch_with`] flattens
//! the current and the proposed state, diffs them and appends the result, so
//! intermediate versions never have to be stored in full.
//!
//! ```
//! use patchlog::History;
//!
//! let mut history = History::new(vec!["a".to_string()]);
//! history.create_patch_with(|tags| tags.push("b".to_string()))?;
//! history.create_patch_with(|tags| tags.clear())?;
//!
//! assert_eq!(history.patches().len(), 2);
//! assert_eq!(history.state_at(1)?, vec!["a".to_string(), "b".to_string()]);
//! assert!(history.latest_state().is_empty());
//! # Ok::<(), patchlog::Error>(())
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

pub mod errors;

pub use errors::HistoryError;

use crate::{
    Result,
    patch::{Patch, diff, replay_forward, replay_reverse},
    snapshot::{Flattener, Snapshot, unflatten},
    tree::Marshal,
};


/// The recorded history of a value.
///
/// Serializes as `{"initialState": .., "latestState": .., "patches": [..]}`.
/// A flattener that skips runtime types adds `"runtimeTypes": false`, so the
/// loaded history flattens the way its patches were recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct History<T> {
    initial_state: T,
    latest_state: T,
    patches: Vec<Patch>,
    #[serde(
        rename = "runtimeTypes",
        skip_serializing_if = "Flattener::emits_runtime_types",
        serialize_with = "serialize_runtime_types"
    )]
    flattener: Flattener,
}

fn serialize_runtime_types<S: serde::Serializer>(
    flattener: &Flattener,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_bool(flattener.emits_runtime_types())
}

impl<T: Clone> History<T> {
    /// Starts a history whose initial and latest state are both `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            latest_state: initial.clone(),
            initial_state: initial,
            patches: Vec::new(),
            flattener: Flattener::default(),
        }
    }

    /// Rebuilds a history from persisted parts.
    ///
    /// A missing state is filled in with a copy of the other one and a missing
    /// patch list means no patches. Patches are taken as they are; use
    /// [`History::restore`] to derive a missing state from them instead, and
    /// [`History::verify`] to check that they are consistent with the states.
    ///
    /// # Errors
    /// [`HistoryError::MissingState`] if both states are absent.
    pub fn from_parts(initial: Option<T>, latest: Option<T>, patches: Option<Vec<Patch>>) -> Result<Self> {
        let (initial_state, latest_state) = match (initial, latest) {
            (Some(initial), Some(latest)) => (initial, latest),
            (Some(initial), None) => (initial.clone(), initial),
            (None, Some(latest)) => (latest.clone(), latest),
            (None, None) => return Err(HistoryError::MissingState.into()),
        };
        let patches = patches.unwrap_or_default();
        debug!(patches = patches.len(), "Rebuilt history from parts");

        Ok(Self {
            initial_state,
            latest_state,
            patches,
            flattener: Flattener::default(),
        })
    }
}

impl<T> History<T> {
    /// Replaces the flattener used for new patches and snapshots.
    ///
    /// Patches already recorded keep the shape they were computed with, so this
    /// is meant to be set before the first patch is created.
    pub fn with_flattener(mut self, flattener: Flattener) -> Self {
        self.flattener = flattener;
        self
    }

    /// Returns the flattener in use.
    pub fn flattener(&self) -> &Flattener {
        &self.flattener
    }

    /// Returns the state the history started from.
    pub fn initial_state(&self) -> &T {
        &self.initial_state
    }

    /// Returns the most recent state.
    pub fn latest_state(&self) -> &T {
        &self.latest_state
    }

    /// Returns the recorded patches, oldest first.
    ///
    /// The view is read-only; patches can only be added through
    /// `create_patch` and friends.
    ///
    /// ```compile_fail
    /// # use patchlog::History;
    /// let mut history = History::new(1_i64);
    /// history.create_patch(2).unwrap();
    /// history.patches().remove(0);
    /// ```
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Returns the number of recorded versions, counting the initial state.
    pub fn version_count(&self) -> usize {
        self.patches.len() + 1
    }

    /// Splits the history into its persisted parts.
    pub fn into_parts(self) -> (T, T, Vec<Patch>) {
        (self.initial_state, self.latest_state, self.patches)
    }

    fn check_version(&self, version: usize) -> Result<()> {
        if version < self.version_count() {
            Ok(())
        } else {
            Err(HistoryError::VersionOutOfRange {
                version,
                count: self.version_count(),
            }
            .into())
        }
    }
}

impl<T: Marshal + Clone> History<T> {
    /// Rebuilds a history from persisted parts, deriving a missing state by
    /// replaying the patches.
    ///
    /// With only the initial state, the latest state is reached by applying
    /// every patch forward; with only the latest state, the initial one is
    /// reached by undoing them.
    ///
    /// # Errors
    /// [`HistoryError::MissingState`] if both states are absent, or any error
    /// from replaying the patches and rebuilding the derived state.
    pub fn restore(initial: Option<T>, latest: Option<T>, patches: Option<Vec<Patch>>) -> Result<Self> {
        let patches = patches.unwrap_or_default();
        let flattener = Flattener::default();

        let (initial_state, latest_state) = match (initial, latest) {
            (Some(initial), Some(latest)) => (initial, latest),
            (Some(initial), None) => {
                let base = flattener.flatten(&initial.to_tree()?)?;
                let latest = T::from_tree(&unflatten(&replay_forward(&base, &patches)?)?)?;
                (initial, latest)
            }
            (None, Some(latest)) => {
                let base = flattener.flatten(&latest.to_tree()?)?;
                let initial = T::from_tree(&unflatten(&replay_reverse(&base, &patches)?)?)?;
                (initial, latest)
            }
            (None, None) => return Err(HistoryError::MissingState.into()),
        };
        debug!(patches = patches.len(), "Restored history from parts");

        Ok(Self {
            initial_state,
            latest_state,
            patches,
            flattener,
        })
    }

    /// Flattens the initial state.
    pub fn initial_snapshot(&self) -> Result<Snapshot> {
        self.flatten(&self.initial_state)
    }

    /// Flattens the latest state.
    pub fn latest_snapshot(&self) -> Result<Snapshot> {
        self.flatten(&self.latest_state)
    }

    fn flatten(&self, state: &T) -> Result<Snapshot> {
        self.flattener.flatten(&state.to_tree()?)
    }

    /// Records a new state.
    ///
    /// Returns the appended patch, or `None` if `new_state` flattens to the same
    /// snapshot as the latest state, in which case nothing is recorded. On error
    /// the history is left unchanged.
    pub fn create_patch(&mut self, new_state: T) -> Result<Option<&Patch>> {
        let before = self.latest_snapshot()?;
        let after = self.flatten(&new_state)?;

        let Some(patch) = diff(&before, &after) else {
            return Ok(None);
        };

        debug!(
            version = self.version_count(),
            additions = patch.additions().len(),
            deletions = patch.deletions().len(),
            updates = patch.updates().len(),
            "Recorded patch"
        );
        self.latest_state = new_state;
        self.patches.push(patch);
        Ok(self.patches.last())
    }

    /// Records the result of mutating a copy of the latest state.
    ///
    /// The mutation runs on a clone, so the latest state only changes if a
    /// patch is actually recorded.
    pub fn create_patch_with<F>(&mut self, mutate: F) -> Result<Option<&Patch>>
    where
        F: FnOnce(&mut T),
    {
        let mut next = self.latest_state.clone();
        mutate(&mut next);
        self.create_patch(next)
    }

    /// Returns the snapshot of a version, where `0` is the initial state.
    pub fn snapshot_at(&self, version: usize) -> Result<Snapshot> {
        self.check_version(version)?;
        replay_forward(&self.initial_snapshot()?, &self.patches[..version])
    }

    /// Returns the state at a version, where `0` is the initial state.
    ///
    /// The two endpoints are returned as stored. Intermediate versions are
    /// rebuilt from their snapshot, so they only carry what the flattened form
    /// keeps (for example, an empty map comes back through an empty list).
    pub fn state_at(&self, version: usize) -> Result<T> {
        self.check_version(version)?;
        if version == 0 {
            return Ok(self.initial_state.clone());
        }
        if version == self.patches.len() {
            return Ok(self.latest_state.clone());
        }
        T::from_tree(&unflatten(&self.snapshot_at(version)?)?)
    }

    /// Checks that replaying every patch from the initial state reaches the
    /// latest state.
    ///
    /// # Errors
    /// [`HistoryError::Diverged`] if it does not.
    pub fn verify(&self) -> Result<()> {
        let replayed = replay_forward(&self.initial_snapshot()?, &self.patches)?;
        let latest = self.latest_snapshot()?;
        if replayed == latest {
            return Ok(());
        }

        let version = self.patches.len();
        let first_difference = diff(&replayed, &latest)
            .and_then(|patch| patch.paths().next().map(ToString::to_string))
            .unwrap_or_default();
        warn!(version, path = %first_difference, "History patches diverge from latest state");
        Err(HistoryError::Diverged { version }.into())
    }
}

/// Persisted form accepted on deserialization: any part may be absent or null.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedHistory<T> {
    initial_state: Option<T>,
    latest_state: Option<T>,
    patches: Option<Vec<Patch>>,
    runtime_types: Option<bool>,
}

impl<'de, T> Deserialize<'de> for History<T>
where
    T: Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let persisted = PersistedHistory::<T>::deserialize(deserializer)?;
        let history = History::from_parts(persisted.initial_state, persisted.latest_state, persisted.patches)
            .map_err(serde::de::Error::custom)?;
        Ok(match persisted.runtime_types {
            Some(emit) => history.with_flattener(Flattener::new().with_runtime_types(emit)),
            None => history,
        })
    }
}
