//! Bridge between [`Tree`] and serde.
//!
//! Serialization goes through [`TreeSerializer`](super::ser::TreeSerializer),
//! which keeps structs and maps apart. Deserialization and raw JSON go through
//! `serde_json::Value`: JSON has no notion of records versus maps, so an object
//! becomes an anonymous record when every key is a valid field name and a map
//! otherwise. Map keys that are not text are rendered with their display form,
//! which `serde_json` parses back for integer-keyed maps.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Number, Value};

use super::{Marshal, Record, Tree, TreeError, ser::TreeSerializer};
use crate::{
    Result,
    snapshot::{Scalar, Segment},
};

impl Tree {
    /// Converts a JSON value into a tree.
    pub fn from_json(value: &Value) -> Tree {
        match value {
            Value::Null => Tree::Null,
            Value::Bool(b) => Tree::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => Tree::Scalar(number_to_scalar(n)),
            Value::String(s) => Tree::Scalar(Scalar::Text(s.clone())),
            Value::Array(items) => Tree::List(items.iter().map(Tree::from_json).collect()),
            Value::Object(fields) if !fields.keys().all(|key| Segment::field(key.as_str()).is_ok()) => {
                Tree::Map(
                    fields
                        .iter()
                        .map(|(key, value)| (Tree::from(key.as_str()), Tree::from_json(value)))
                        .collect(),
                )
            }
            Value::Object(fields) => {
                let mut record = Record::anonymous();
                for (name, value) in fields {
                    record.insert(name.clone(), Tree::from_json(value));
                }
                Tree::Record(record)
            }
        }
    }

    /// Converts this tree into a JSON value.
    ///
    /// Non-finite floats have no JSON form and become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Tree::Null => Value::Null,
            Tree::Scalar(scalar) => scalar_to_json(scalar),
            Tree::List(items) => Value::Array(items.iter().map(Tree::to_json).collect()),
            Tree::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key_to_string(key), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            Tree::Record(record) => Value::Object(
                record
                    .fields()
                    .map(|(name, value)| (name.to_string(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }

    /// Marshals any serde-serializable value.
    ///
    /// Structs become records named after the type, maps become
    /// [`Tree::Map`]s, and `None` becomes [`Tree::Null`].
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Tree> {
        Ok(value.serialize(TreeSerializer)?)
    }

    /// Rebuilds a serde-deserializable value from this tree's JSON form.
    ///
    /// Trees rebuilt by [`unflatten`](crate::snapshot::unflatten) carry empty
    /// maps as empty lists, which a derived map field rejects.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_json()).map_err(|e| {
            TreeError::Serialization {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

fn number_to_scalar(n: &Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i)
    } else if let Some(u) = n.as_u64() {
        Scalar::UInt(u)
    } else {
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn scalar_to_json(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Int(n) => Value::from(*n),
        Scalar::UInt(n) => Value::from(*n),
        Scalar::Float(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
        Scalar::Char(c) => Value::String(c.to_string()),
        Scalar::Text(s) => Value::String(s.clone()),
    }
}

fn key_to_string(key: &Tree) -> String {
    match key {
        Tree::Scalar(Scalar::Text(s)) => s.clone(),
        Tree::Scalar(scalar) => scalar.to_string(),
        other => other.to_json().to_string(),
    }
}

impl Marshal for Value {
    fn to_tree(&self) -> Result<Tree> {
        Ok(Tree::from_json(self))
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        Ok(tree.to_json())
    }
}
