use patchlog::{
    Error, History, Marshal, Patch,
    history::HistoryError,
    patch::Update,
    snapshot::{FlatValue, Flattener, SnapshotError},
    tree::Tree,
};
use serde_json::json;

use crate::helpers::*;

/// Builds the three-version history of Bob: rename, then move and lose the brother.
fn three_versions() -> History<UserDetail> {
    let mut history = History::new(bob());
    history
        .create_patch_with(|user| user.person.first_name = "Bobby".to_string())
        .unwrap();
    history
        .create_patch_with(|user| {
            user.addresses.push(address("9 Harbor Rd", "Master", 111));
            user.relations.clear();
        })
        .unwrap();
    history
}

#[test]
fn test_new_history() {
    let history = History::new(bob());
    assert_eq!(history.initial_state(), &bob());
    assert_eq!(history.latest_state(), &bob());
    assert!(history.patches().is_empty());
}

#[test]
fn test_three_version_history() {
    let history = three_versions();
    assert_eq!(history.patches().len(), 2);
    assert_eq!(history.version_count(), 3);

    let first = &history.patches()[0];
    assert_eq!(first.len(), 1);
    let rename = &first.updates()[&path("person.firstName")];
    assert_eq!(rename.old_value.encode(), "S,Bob");
    assert_eq!(rename.new_value.encode(), "S,Bobby");

    let second = &history.patches()[1];
    assert_eq!(second.additions().len(), 4);
    assert_eq!(second.deletions().len(), 6);
    assert_eq!(second.updates().len(), 2);
    assert_eq!(
        second.updates()[&path("relations%2siz")].new_value,
        FlatValue::Size(0)
    );

    assert_eq!(history.initial_state(), &bob());
    assert_eq!(history.latest_state().person.first_name, "Bobby");
    assert_eq!(history.latest_state().addresses.len(), 2);
    assert!(history.latest_state().relations.is_empty());
    assert!(history.verify().is_ok());
}

#[test]
fn test_no_op_mutation_keeps_history() {
    let mut history = three_versions();
    let before = history.clone();

    let result = history
        .create_patch_with(|user| user.person.first_name = "Bobby".to_string())
        .unwrap();
    assert!(result.is_none());
    assert_eq!(history, before);
}

#[test]
fn test_intermediate_state() {
    let history = three_versions();
    let middle = history.state_at(1).unwrap();
    assert_eq!(middle.person.first_name, "Bobby");
    assert_eq!(middle.addresses.len(), 1);
    assert_eq!(middle.relations.len(), 1);

    assert!(history.state_at(3).unwrap_err().is_not_found());
}

#[test]
fn test_history_invariant_holds_after_every_patch() {
    let mut history = History::new(bob());
    let edits: Vec<Box<dyn Fn(&mut UserDetail)>> = vec![
        Box::new(|user: &mut UserDetail| user.position = 2),
        Box::new(|user: &mut UserDetail| user.person.email_addresses.push("bob@example.org".to_string())),
        Box::new(|user: &mut UserDetail| user.addresses.insert(0, address("2 Side St", "Tacoma", 98402))),
        Box::new(|user: &mut UserDetail| {
            user.relations
                .insert("sister".to_string(), person("Sue", "Smith"));
        }),
        Box::new(|user: &mut UserDetail| user.addresses.clear()),
    ];

    for edit in &edits {
        history.create_patch_with(|user| edit(user)).unwrap();
        assert!(history.verify().is_ok());
    }
    assert_eq!(history.patches().len(), edits.len());
}

#[test]
fn test_missing_states_are_invalid() {
    let err = History::<UserDetail>::from_parts(None, None, Some(Vec::new())).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(matches!(err, Error::History(HistoryError::MissingState)));
}

#[test]
fn test_persisted_round_trip() {
    let history = three_versions();
    let json = serde_json::to_string(&history).unwrap();
    let back: History<UserDetail> = serde_json::from_str(&json).unwrap();

    assert_eq!(back, history);
    assert!(back.verify().is_ok());
}

#[test]
fn test_persisted_form_shape() {
    let history = three_versions();
    let value = serde_json::to_value(&history).unwrap();

    assert_eq!(value["initialState"]["person"]["firstName"], "Bob");
    assert_eq!(value["latestState"]["person"]["firstName"], "Bobby");
    assert_eq!(
        value["patches"][0]["updates"]["person.firstName"],
        json!({ "oldValue": "S,Bob", "newValue": "S,Bobby" })
    );
    assert_eq!(value["patches"][1]["additions"]["addresses.1.zip"], "I,111");
}

#[test]
fn test_deserialize_with_only_initial_state() {
    let value = json!({ "initialState": serde_json::to_value(bob()).unwrap() });
    let history: History<UserDetail> = serde_json::from_value(value).unwrap();
    assert_eq!(history.latest_state(), &bob());
    assert!(history.patches().is_empty());
}

#[test]
fn test_restore_derives_latest_state() {
    let history = three_versions();
    let patches: Vec<Patch> = history.patches().to_vec();

    let restored = History::restore(Some(bob()), None, Some(patches.clone())).unwrap();
    assert_eq!(restored.latest_state(), history.latest_state());

    let restored = History::restore(None, Some(history.latest_state().clone()), Some(patches)).unwrap();
    assert_eq!(restored.initial_state(), &bob());
}

#[test]
fn test_custom_flattener() {
    let mut history = History::new(bob()).with_flattener(Flattener::new().with_runtime_types(false));
    history
        .create_patch_with(|user| user.addresses.push(address("9 Harbor Rd", "Master", 111)))
        .unwrap();

    let patch = &history.patches()[0];
    assert_eq!(
        addition_paths(patch),
        vec!["addresses.1.city", "addresses.1.streetAddress", "addresses.1.zip"]
    );
}

/// Bob's history marshalled through the serde derive instead of `Marshal`.
#[derive(Debug, Clone, PartialEq)]
struct SerdeUser(UserDetail);

impl Marshal for SerdeUser {
    fn to_tree(&self) -> patchlog::Result<Tree> {
        Tree::from_serialize(&self.0)
    }

    fn from_tree(tree: &Tree) -> patchlog::Result<Self> {
        tree.deserialize_into().map(SerdeUser)
    }
}

#[test]
fn test_serde_marshalling_records_same_patches() {
    let mut history = History::new(SerdeUser(bob()));
    history
        .create_patch_with(|user| user.0.person.first_name = "Bobby".to_string())
        .unwrap();
    history
        .create_patch_with(|user| {
            user.0.addresses.push(address("9 Harbor Rd", "Master", 111));
            user.0.relations.clear();
        })
        .unwrap();

    assert_eq!(history.patches(), three_versions().patches());
    let cleared = &history.patches()[1];
    assert_eq!(
        cleared.updates()[&path("relations%2siz")],
        Update::new(FlatValue::Size(1), FlatValue::Size(0))
    );
    assert_eq!(cleared.deletions()[&path("relations.1%1key")], "brother");

    assert_eq!(history.state_at(1).unwrap().0.relations.len(), 1);
    assert!(history.verify().is_ok());
}

#[test]
fn test_restore_rejects_unbounded_list_size() {
    let patch: Patch = serde_json::from_value(json!({
        "updates": { "addresses%2siz": { "oldValue": "1", "newValue": "18446744073709551615" } }
    }))
    .unwrap();

    let err = History::restore(Some(bob()), None, Some(vec![patch])).unwrap_err();
    assert!(matches!(err, Error::Snapshot(SnapshotError::Conflict { .. })));
}

#[test]
fn test_flattener_setting_survives_persistence() {
    let mut history = History::new(bob()).with_flattener(Flattener::new().with_runtime_types(false));
    history
        .create_patch_with(|user| user.addresses.push(address("9 Harbor Rd", "Master", 111)))
        .unwrap();

    let value = serde_json::to_value(&history).unwrap();
    assert_eq!(value["runtimeTypes"], false);

    let back: History<UserDetail> = serde_json::from_value(value).unwrap();
    assert!(!back.flattener().emits_runtime_types());
    assert_eq!(back, history);
    assert!(back.verify().is_ok());

    let default_form = serde_json::to_value(three_versions()).unwrap();
    assert!(default_form.get("runtimeTypes").is_none());
}
