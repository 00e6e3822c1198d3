//! The marshalling boundary between typed values and [`Tree`]s.
//!
//! [`Marshal`] is implemented here for primitives, `String`, `Option`, `Vec`
//! and `BTreeMap`. Domain types implement it by building a [`Record`]:
//!
//! ```
//! use patchlog::{Result, tree::{Marshal, Record, Tree}};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Address {
//!     city: String,
//!     zip: i32,
//! }
//!
//! impl Marshal for Address {
//!     fn to_tree(&self) -> Result<Tree> {
//!         Ok(Record::new("Address")
//!             .field("city", &self.city)?
//!             .field("zip", &self.zip)?
//!             .into())
//!     }
//!
//!     fn from_tree(tree: &Tree) -> Result<Self> {
//!         Ok(Address {
//!             city: tree.field_as("city")?,
//!             zip: tree.field_as("zip")?,
//!         })
//!     }
//! }
//!
//! let address = Address { city: "Seattle".into(), zip: 123 };
//! let tree = address.to_tree()?;
//! assert_eq!(Address::from_tree(&tree)?, address);
//! # Ok::<(), patchlog::Error>(())
//! ```
//!
//! Types that already derive serde traits can route through
//! [`Tree::from_serialize`] and [`Tree::deserialize_into`] instead.
//!
//! [`Record`]: super::Record

use std::collections::BTreeMap;

use super::{Tree, TreeError};
use crate::{Result, snapshot::Scalar};

/// Conversion between a typed value and its generic [`Tree`].
///
/// Implementations must be deterministic: marshalling equal values must give
/// equal trees, with fields and entries in the same order, or histories will
/// record spurious patches.
pub trait Marshal: Sized {
    /// Converts the value into a tree.
    fn to_tree(&self) -> Result<Tree>;

    /// Rebuilds a value from a tree.
    fn from_tree(tree: &Tree) -> Result<Self>;
}

fn scalar<'a>(tree: &'a Tree, expected: &str) -> Result<&'a Scalar> {
    tree.as_scalar().ok_or_else(|| tree.mismatch(expected).into())
}

fn out_of_range(value: impl ToString, target: &str) -> crate::Error {
    TreeError::OutOfRange {
        value: value.to_string(),
        target: target.to_string(),
    }
    .into()
}

impl Marshal for Tree {
    fn to_tree(&self) -> Result<Tree> {
        Ok(self.clone())
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        Ok(tree.clone())
    }
}

impl Marshal for bool {
    fn to_tree(&self) -> Result<Tree> {
        Ok(Tree::Scalar(Scalar::Bool(*self)))
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        scalar(tree, "bool")?
            .as_bool()
            .ok_or_else(|| tree.mismatch("bool").into())
    }
}

/// Reads any integer scalar into the target type, checking the range.
macro_rules! integer_from_tree {
    ($ty:ty, $tree:expr) => {{
        let tree = $tree;
        match scalar(tree, stringify!($ty))? {
            Scalar::Int(n) => <$ty>::try_from(*n).map_err(|_| out_of_range(n, stringify!($ty))),
            Scalar::UInt(n) => <$ty>::try_from(*n).map_err(|_| out_of_range(n, stringify!($ty))),
            _ => Err(tree.mismatch(stringify!($ty)).into()),
        }
    }};
}

/// Integers that always fit an `i64` are stored as [`Scalar::Int`].
macro_rules! marshal_small_int {
    ($($ty:ty),*) => {$(
        impl Marshal for $ty {
            fn to_tree(&self) -> Result<Tree> {
                Ok(Tree::Scalar(Scalar::Int(i64::from(*self))))
            }

            fn from_tree(tree: &Tree) -> Result<Self> {
                integer_from_tree!($ty, tree)
            }
        }
    )*};
}

marshal_small_int!(i8, i16, i32, i64, u8, u16, u32);

impl Marshal for isize {
    fn to_tree(&self) -> Result<Tree> {
        i64::try_from(*self)
            .map(|n| Tree::Scalar(Scalar::Int(n)))
            .map_err(|_| out_of_range(self, "i64"))
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        integer_from_tree!(isize, tree)
    }
}

impl Marshal for u64 {
    fn to_tree(&self) -> Result<Tree> {
        Ok(Tree::Scalar(Scalar::UInt(*self)))
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        integer_from_tree!(u64, tree)
    }
}

impl Marshal for usize {
    fn to_tree(&self) -> Result<Tree> {
        u64::try_from(*self)
            .map(|n| Tree::Scalar(Scalar::UInt(n)))
            .map_err(|_| out_of_range(self, "u64"))
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        integer_from_tree!(usize, tree)
    }
}

impl Marshal for f64 {
    fn to_tree(&self) -> Result<Tree> {
        Ok(Tree::Scalar(Scalar::Float(*self)))
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        match scalar(tree, "f64")? {
            Scalar::Float(n) => Ok(*n),
            Scalar::Int(n) => Ok(*n as f64),
            Scalar::UInt(n) => Ok(*n as f64),
            _ => Err(tree.mismatch("f64").into()),
        }
    }
}

impl Marshal for f32 {
    fn to_tree(&self) -> Result<Tree> {
        Ok(Tree::Scalar(Scalar::Float(f64::from(*self))))
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        f64::from_tree(tree).map(|n| n as f32)
    }
}

impl Marshal for char {
    fn to_tree(&self) -> Result<Tree> {
        Ok(Tree::Scalar(Scalar::Char(*self)))
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        match scalar(tree, "char")? {
            Scalar::Char(c) => Ok(*c),
            // The serde bridge has no char kind and hands characters over as text.
            Scalar::Text(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(tree.mismatch("char").into()),
                }
            }
            _ => Err(tree.mismatch("char").into()),
        }
    }
}

impl Marshal for String {
    fn to_tree(&self) -> Result<Tree> {
        Ok(Tree::Scalar(Scalar::Text(self.clone())))
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        match scalar(tree, "String")? {
            Scalar::Text(s) => Ok(s.clone()),
            Scalar::Char(c) => Ok(c.to_string()),
            _ => Err(tree.mismatch("String").into()),
        }
    }
}

impl<T: Marshal> Marshal for Option<T> {
    fn to_tree(&self) -> Result<Tree> {
        match self {
            Some(value) => value.to_tree(),
            None => Ok(Tree::Null),
        }
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        match tree {
            Tree::Null => Ok(None),
            other => T::from_tree(other).map(Some),
        }
    }
}

impl<T: Marshal> Marshal for Vec<T> {
    fn to_tree(&self) -> Result<Tree> {
        self.iter()
            .map(Marshal::to_tree)
            .collect::<Result<Vec<_>>>()
            .map(Tree::List)
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        match tree {
            Tree::List(items) => items.iter().map(T::from_tree).collect(),
            // An empty map and an empty list flatten identically.
            Tree::Map(entries) if entries.is_empty() => Ok(Vec::new()),
            other => Err(other.mismatch("list").into()),
        }
    }
}

impl<K, V> Marshal for BTreeMap<K, V>
where
    K: Marshal + Ord,
    V: Marshal,
{
    fn to_tree(&self) -> Result<Tree> {
        self.iter()
            .map(|(key, value)| -> Result<(Tree, Tree)> { Ok((key.to_tree()?, value.to_tree()?)) })
            .collect::<Result<Vec<_>>>()
            .map(Tree::Map)
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        match tree {
            Tree::Map(entries) => entries
                .iter()
                .map(|(key, value)| -> Result<(K, V)> { Ok((K::from_tree(key)?, V::from_tree(value)?)) })
                .collect(),
            // Rebuilt snapshots cannot tell an empty map from an empty list.
            Tree::List(items) if items.is_empty() => Ok(BTreeMap::new()),
            // JSON objects arrive as anonymous records keyed by text.
            Tree::Record(record) if record.type_name().is_none() => record
                .fields()
                .map(|(name, value)| -> Result<(K, V)> {
                    Ok((K::from_tree(&Tree::from(name))?, V::from_tree(value)?))
                })
                .collect(),
            other => Err(other.mismatch("map").into()),
        }
    }
}
