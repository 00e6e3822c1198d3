//! Generic value trees.
//!
//! A [`Tree`] is the type-independent shape of a value: records with named
//! fields, ordered lists, associative maps, and tagged scalars. Typed values
//! cross into and out of this representation through the [`Marshal`] trait;
//! everything downstream (flattening, diffing, history) only ever sees trees.
//!
//! # Building trees
//!
//! ```
//! use patchlog::tree::{Record, Tree};
//!
//! let person: Tree = Record::new("Person")
//!     .with("firstName", "Bob")
//!     .with("lastName", "Smith")
//!     .into();
//!
//! assert_eq!(person.get_field("firstName"), Some(&Tree::from("Bob")));
//! assert_eq!(person.as_record().unwrap().type_name(), Some("Person"));
//! ```

pub mod errors;
mod json;
pub mod marshal;
mod ser;

pub use errors::TreeError;
pub use marshal::Marshal;

use crate::snapshot::Scalar;

/// A node of a generic value tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Tree {
    /// Absent value. Never stored in a snapshot.
    #[default]
    Null,
    /// Primitive value
    Scalar(Scalar),
    /// Ordered list of values
    List(Vec<Tree>),
    /// Associative map in iteration order
    Map(Vec<(Tree, Tree)>),
    /// Record with named fields
    Record(Record),
}

impl Tree {
    /// Returns true if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Tree::Null)
    }

    /// Returns the kind of node as a string
    pub fn kind_name(&self) -> &'static str {
        match self {
            Tree::Null => "null",
            Tree::Scalar(scalar) => scalar.type_name(),
            Tree::List(_) => "list",
            Tree::Map(_) => "map",
            Tree::Record(_) => "record",
        }
    }

    /// Attempts to convert to a scalar
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Tree::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Attempts to convert to a list
    pub fn as_list(&self) -> Option<&[Tree]> {
        match self {
            Tree::List(items) => Some(items),
            _ => None,
        }
    }

    /// Attempts to convert to a map
    pub fn as_map(&self) -> Option<&[(Tree, Tree)]> {
        match self {
            Tree::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Attempts to convert to a record
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Tree::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the named field if this is a record that has it.
    pub fn get_field(&self, name: &str) -> Option<&Tree> {
        self.as_record().and_then(|record| record.get(name))
    }

    /// Decodes the named field of a record.
    ///
    /// A missing field decodes like [`Tree::Null`], so `Option` fields come back
    /// as `None`; any other type reports [`TreeError::MissingField`].
    pub fn field_as<T: Marshal>(&self, name: &str) -> crate::Result<T> {
        let record = self.as_record().ok_or_else(|| TreeError::TypeMismatch {
            expected: "record".to_string(),
            actual: self.kind_name().to_string(),
        })?;

        match record.get(name) {
            Some(value) => T::from_tree(value),
            None => T::from_tree(&Tree::Null).map_err(|_| {
                TreeError::MissingField {
                    field: name.to_string(),
                }
                .into()
            }),
        }
    }

    /// Builds a type mismatch error for this node.
    pub(crate) fn mismatch(&self, expected: &str) -> TreeError {
        TreeError::TypeMismatch {
            expected: expected.to_string(),
            actual: self.kind_name().to_string(),
        }
    }
}

/// A record: an ordered set of named fields with an optional type name.
///
/// The type name is what the flattener records as runtime-type metadata, so
/// polymorphic positions can tell which concrete shape they held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    type_name: Option<String>,
    fields: Vec<(String, Tree)>,
}

impl Record {
    /// Creates an empty record with a type name.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            fields: Vec::new(),
        }
    }

    /// Creates an empty record without a type name.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Returns the record's type name.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Sets or clears the record's type name.
    pub fn set_type_name(&mut self, type_name: Option<String>) {
        self.type_name = type_name;
    }

    /// Returns the named field.
    pub fn get(&self, name: &str) -> Option<&Tree> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Sets a field, replacing an existing field of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Tree>) -> Option<Tree> {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Builder form of [`Record::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Tree>) -> Self {
        self.insert(name, value);
        self
    }

    /// Marshals `value` and stores it as a field.
    pub fn field<T: Marshal>(mut self, name: impl Into<String>, value: &T) -> crate::Result<Self> {
        self.insert(name, value.to_tree()?);
        Ok(self)
    }

    /// Iterates over the fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Tree)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Record> for Tree {
    fn from(value: Record) -> Self {
        Tree::Record(value)
    }
}

impl From<Scalar> for Tree {
    fn from(value: Scalar) -> Self {
        Tree::Scalar(value)
    }
}

impl From<bool> for Tree {
    fn from(value: bool) -> Self {
        Tree::Scalar(value.into())
    }
}

impl From<i64> for Tree {
    fn from(value: i64) -> Self {
        Tree::Scalar(value.into())
    }
}

impl From<i32> for Tree {
    fn from(value: i32) -> Self {
        Tree::Scalar(value.into())
    }
}

impl From<f64> for Tree {
    fn from(value: f64) -> Self {
        Tree::Scalar(value.into())
    }
}

impl From<String> for Tree {
    fn from(value: String) -> Self {
        Tree::Scalar(value.into())
    }
}

impl From<&str> for Tree {
    fn from(value: &str) -> Self {
        Tree::Scalar(value.into())
    }
}

impl From<Vec<Tree>> for Tree {
    fn from(value: Vec<Tree>) -> Self {
        Tree::List(value)
    }
}
