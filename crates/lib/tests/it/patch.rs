use patchlog::{
    Marshal, Patch,
    patch::{Update, apply_forward, apply_reverse, diff, replay_forward, replay_reverse},
    snapshot::{FlatValue, Scalar, Snapshot, flatten},
};
use serde_json::json;

use crate::helpers::*;

fn snapshot_of(user: &UserDetail) -> Snapshot {
    flatten(&user.to_tree().unwrap()).unwrap()
}

/// Version two of Bob: another address and no relations.
fn moved_out() -> UserDetail {
    let mut user = bob();
    user.addresses.push(address("9 Harbor Rd", "Master", 111));
    user.relations.clear();
    user
}

#[test]
fn test_diff_of_identical_users_is_none() {
    let snapshot = snapshot_of(&bob());
    assert!(diff(&snapshot, &snapshot_of(&bob())).is_none());
}

#[test]
fn test_diff_single_field() {
    let mut renamed = bob();
    renamed.person.first_name = "Bobby".to_string();

    let patch = diff(&snapshot_of(&bob()), &snapshot_of(&renamed)).unwrap();
    assert_eq!(patch.len(), 1);
    assert_eq!(
        serde_json::to_value(&patch).unwrap(),
        json!({
            "additions": {},
            "deletions": {},
            "updates": {
                "person.firstName": { "oldValue": "S,Bob", "newValue": "S,Bobby" }
            }
        })
    );
}

#[test]
fn test_diff_structural_changes() {
    let patch = diff(&snapshot_of(&bob()), &snapshot_of(&moved_out())).unwrap();

    assert_eq!(
        addition_paths(&patch),
        vec![
            "addresses.1%1cty",
            "addresses.1.city",
            "addresses.1.streetAddress",
            "addresses.1.zip",
        ]
    );
    assert_eq!(patch.additions()[&path("addresses.1.zip")], FlatValue::Leaf(Scalar::Int(111)));
    assert_eq!(patch.additions()[&path("addresses.1.city")], "Master");

    assert_eq!(
        deletion_paths(&patch),
        vec![
            "relations.1%1key",
            "relations.1%1val%1cty",
            "relations.1%1val.emailAddresses%2siz",
            "relations.1%1val.firstName",
            "relations.1%1val.lastName",
            "relations.1%1val.phones%2siz",
        ]
    );
    assert_eq!(patch.deletions()[&path("relations.1%1key")], "brother");

    assert_eq!(patch.updates().len(), 2);
    assert_eq!(
        patch.updates()[&path("addresses%2siz")],
        Update::new(FlatValue::Size(1), FlatValue::Size(2))
    );
    assert_eq!(
        patch.updates()[&path("relations%2siz")],
        Update::new(FlatValue::Size(1), FlatValue::Size(0))
    );
}

#[test]
fn test_structural_patch_persisted_values() {
    let patch = diff(&snapshot_of(&bob()), &snapshot_of(&moved_out())).unwrap();
    let value = serde_json::to_value(&patch).unwrap();

    assert_eq!(value["additions"]["addresses.1.zip"], "I,111");
    assert_eq!(value["additions"]["addresses.1%1cty"], "Address");
    assert_eq!(value["deletions"]["relations.1%1key"], "S,brother");
    assert_eq!(value["deletions"]["relations.1%1val.emailAddresses%2siz"], "0");
    assert_eq!(
        value["updates"]["addresses%2siz"],
        json!({ "oldValue": "1", "newValue": "2" })
    );
    assert_eq!(
        value["updates"]["relations%2siz"],
        json!({ "oldValue": "1", "newValue": "0" })
    );

    let back: Patch = serde_json::from_value(value).unwrap();
    assert_eq!(back, patch);
}

#[test]
fn test_apply_round_trip() {
    let old = snapshot_of(&bob());
    let new = snapshot_of(&moved_out());
    let patch = diff(&old, &new).unwrap();

    assert_eq!(apply_forward(&old, &patch).unwrap(), new);
    assert_eq!(apply_reverse(&new, &patch).unwrap(), old);
}

#[test]
fn test_replay_three_versions() {
    let mut renamed = bob();
    renamed.person.first_name = "Bobby".to_string();
    let mut moved = renamed.clone();
    moved.addresses.push(address("9 Harbor Rd", "Master", 111));
    moved.relations.clear();

    let versions = [snapshot_of(&bob()), snapshot_of(&renamed), snapshot_of(&moved)];
    let patches = vec![
        diff(&versions[0], &versions[1]).unwrap(),
        diff(&versions[1], &versions[2]).unwrap(),
    ];

    assert_eq!(replay_forward(&versions[0], &patches).unwrap(), versions[2]);
    assert_eq!(replay_reverse(&versions[2], &patches).unwrap(), versions[0]);
}

#[test]
fn test_overlapping_patch_is_invalid() {
    let patch: Patch = serde_json::from_value(json!({
        "additions": { "position": "I,2" },
        "updates": { "position": { "oldValue": "I,1", "newValue": "I,2" } }
    }))
    .unwrap();

    let snapshot = snapshot_of(&bob());
    let err = apply_forward(&snapshot, &patch).unwrap_err();
    assert!(err.is_invalid_patch());
    assert!(apply_reverse(&snapshot, &patch).unwrap_err().is_invalid_patch());
}

#[test]
fn test_persisted_patch_rejects_bad_text() {
    let bad_tag: Result<Patch, _> = serde_json::from_value(json!({
        "additions": { "position": "Q,2" }
    }));
    assert!(bad_tag.is_err());

    let bad_size: Result<Patch, _> = serde_json::from_value(json!({
        "updates": { "addresses%2siz": { "oldValue": "one", "newValue": "2" } }
    }));
    assert!(bad_size.is_err());

    let bad_path: Result<Patch, _> = serde_json::from_value(json!({
        "deletions": { "relations.x%1key": "S,brother" }
    }));
    assert!(bad_path.is_err());
}
