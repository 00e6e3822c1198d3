use patchlog::{
    Marshal,
    snapshot::{FlatValue, Flattener, Scalar, Snapshot, flatten, unflatten},
    tree::{Record, Tree},
};
use serde_json::json;

use crate::helpers::*;

#[test]
fn test_flatten_user_detail() {
    let snapshot = flatten(&bob().to_tree().unwrap()).unwrap();

    assert_eq!(
        encoded(&snapshot),
        pairs(&[
            ("position", "I,1"),
            ("userId", "S,bob.smith"),
            ("person%1cty", "Person"),
            ("person.firstName", "S,Bob"),
            ("person.lastName", "S,Smith"),
            ("person.emailAddresses%2siz", "0"),
            ("person.phones%2siz", "0"),
            ("addresses%2siz", "1"),
            ("addresses.0%1cty", "Address"),
            ("addresses.0.streetAddress", "S,1 Main St"),
            ("addresses.0.city", "S,Seattle"),
            ("addresses.0.zip", "I,123"),
            ("relations%2siz", "1"),
            ("relations.1%1key", "S,brother"),
            ("relations.1%1val%1cty", "Person"),
            ("relations.1%1val.firstName", "S,Tom"),
            ("relations.1%1val.lastName", "S,Smith"),
            ("relations.1%1val.emailAddresses%2siz", "0"),
            ("relations.1%1val.phones%2siz", "0"),
        ])
    );
}

#[test]
fn test_every_leaf_is_tagged() {
    let snapshot = flatten(&bob().to_tree().unwrap()).unwrap();
    for (path, value) in snapshot.iter() {
        match value {
            FlatValue::Leaf(scalar) => {
                assert!(!path.is_meta());
                assert!(value.encode().starts_with(scalar.tag()));
            }
            FlatValue::Size(_) | FlatValue::RuntimeType(_) => assert!(path.is_meta()),
        }
    }
}

#[test]
fn test_lists_of_scalars() {
    let mut user = bob();
    user.person.phones = vec!["555-0100".to_string(), "555-0199".to_string()];
    let snapshot = flatten(&user.to_tree().unwrap()).unwrap();

    assert_eq!(snapshot.lookup("person.phones%2siz"), Some(&FlatValue::Size(2)));
    assert_eq!(snapshot.lookup("person.phones.0").unwrap(), &"555-0100");
    assert_eq!(snapshot.lookup("person.phones.1").unwrap(), &"555-0199");
}

#[test]
fn test_snapshot_rebuilds_typed_value() {
    let user = bob();
    let snapshot = flatten(&user.to_tree().unwrap()).unwrap();
    let rebuilt = UserDetail::from_tree(&unflatten(&snapshot).unwrap()).unwrap();
    assert_eq!(rebuilt, user);
}

#[test]
fn test_empty_relations_rebuild() {
    let mut user = bob();
    user.relations.clear();
    user.addresses.clear();
    let snapshot = flatten(&user.to_tree().unwrap()).unwrap();
    let rebuilt = UserDetail::from_tree(&unflatten(&snapshot).unwrap()).unwrap();
    assert_eq!(rebuilt, user);
}

#[test]
fn test_scalar_kinds_survive_round_trip() {
    let tree: Tree = Record::new("Kinds")
        .with("flag", true)
        .with("count", -3_i64)
        .with("big", Scalar::UInt(u64::MAX))
        .with("ratio", 0.25)
        .with("initial", Scalar::Char('B'))
        .with("label", "a,b.c%d")
        .into();

    let snapshot = flatten(&tree).unwrap();
    let text = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(
        text,
        json!({
            "flag": "B,true",
            "count": "I,-3",
            "big": "U,18446744073709551615",
            "ratio": "D,0.25",
            "initial": "C,B",
            "label": "S,a,b.c%d",
        })
    );

    let back: Snapshot = serde_json::from_value(text).unwrap();
    assert_eq!(back, snapshot);
    let rebuilt = unflatten(&back).unwrap();
    assert_eq!(rebuilt.get_field("big"), Some(&Tree::Scalar(Scalar::UInt(u64::MAX))));
    assert_eq!(rebuilt.get_field("label"), Some(&Tree::from("a,b.c%d")));
}

#[test]
fn test_field_names_with_reserved_characters_fail() {
    for name in ["first.name", "size%2siz", ""] {
        let tree: Tree = Record::new("Bad").with(name, 1).into();
        let err = flatten(&tree).unwrap_err();
        assert!(err.is_invalid_argument(), "'{name}' should be rejected");
    }
}

#[test]
fn test_flattener_without_runtime_types() {
    let flattener = Flattener::new().with_runtime_types(false);
    let snapshot = flattener.flatten(&bob().to_tree().unwrap()).unwrap();
    assert!(snapshot.iter().all(|(_, value)| value.as_runtime_type().is_none()));
    assert_eq!(snapshot.lookup("addresses%2siz"), Some(&FlatValue::Size(1)));

    let rebuilt = UserDetail::from_tree(&unflatten(&snapshot).unwrap()).unwrap();
    assert_eq!(rebuilt, bob());
}
