//! Tagged values stored in a snapshot.
//!
//! Every leaf in a snapshot is a [`Scalar`]: a primitive value paired with its
//! kind, so a type-erased snapshot can still rebuild the right primitive. The
//! one-letter tags only matter at the serialization boundary:
//!
//! | Variant | Tag | Text |
//! |---|---|---|
//! | [`Scalar::Text`] | `S` | `S,Bob` |
//! | [`Scalar::Int`] | `I` | `I,111` |
//! | [`Scalar::UInt`] | `U` | `U,18446744073709551615` |
//! | [`Scalar::Float`] | `D` | `D,2.5` |
//! | [`Scalar::Bool`] | `B` | `B,true` |
//! | [`Scalar::Char`] | `C` | `C,x` |
//!
//! Structural metadata ([`FlatValue::Size`], [`FlatValue::RuntimeType`]) is
//! written untagged; the path's [`MetaKind`] says how to read it back.

use std::{fmt, str::FromStr};

use super::{MetaKind, SnapshotError};
use crate::constants::TAG_SEPARATOR;

/// A primitive value with its type preserved.
///
/// Equality on [`Scalar::Float`] is bitwise, so `NaN == NaN` and `0.0 != -0.0`.
/// This keeps diffing stable: an unchanged float never shows up as an update.
///
/// ```
/// # use patchlog::snapshot::Scalar;
/// let name = Scalar::from("Bob");
/// assert_eq!(name.tag(), 'S');
/// assert_eq!(name.encode(), "S,Bob");
/// assert_eq!("I,111".parse::<Scalar>().unwrap(), Scalar::Int(111));
/// assert_eq!(Scalar::Float(f64::NAN), Scalar::Float(f64::NAN));
/// ```
#[derive(Debug, Clone)]
pub enum Scalar {
    /// Boolean value
    Bool(bool),
    /// Signed integer value
    Int(i64),
    /// Unsigned integer value
    UInt(u64),
    /// Floating point value
    Float(f64),
    /// Single character
    Char(char),
    /// Text string value
    Text(String),
}

impl Scalar {
    /// Returns the one-letter type tag.
    pub fn tag(&self) -> char {
        match self {
            Scalar::Bool(_) => 'B',
            Scalar::Int(_) => 'I',
            Scalar::UInt(_) => 'U',
            Scalar::Float(_) => 'D',
            Scalar::Char(_) => 'C',
            Scalar::Text(_) => 'S',
        }
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::UInt(_) => "uint",
            Scalar::Float(_) => "float",
            Scalar::Char(_) => "char",
            Scalar::Text(_) => "text",
        }
    }

    /// Attempts to convert to a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to convert to a signed integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to convert to an unsigned integer
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Scalar::UInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to convert to a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Scalar::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to convert to a character
    pub fn as_char(&self) -> Option<char> {
        match self {
            Scalar::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Attempts to convert to a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Encodes the scalar in its `<tag>,<value>` textual form.
    pub fn encode(&self) -> String {
        format!("{}{TAG_SEPARATOR}{self}", self.tag())
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::UInt(a), Scalar::UInt(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a.to_bits() == b.to_bits(),
            (Scalar::Char(a), Scalar::Char(b)) => a == b,
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

/// Displays the raw value without its tag.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::UInt(n) => write!(f, "{n}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::Char(c) => write!(f, "{c}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for Scalar {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| SnapshotError::InvalidValue {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let (tag, raw) = s
            .split_once(TAG_SEPARATOR)
            .ok_or_else(|| invalid("missing type tag"))?;

        match tag {
            "S" => Ok(Scalar::Text(raw.to_string())),
            "I" => raw
                .parse()
                .map(Scalar::Int)
                .map_err(|_| invalid("not a signed integer")),
            "U" => raw
                .parse()
                .map(Scalar::UInt)
                .map_err(|_| invalid("not an unsigned integer")),
            "D" => raw
                .parse()
                .map(Scalar::Float)
                .map_err(|_| invalid("not a float")),
            "B" => raw
                .parse()
                .map(Scalar::Bool)
                .map_err(|_| invalid("not a boolean")),
            "C" => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Scalar::Char(c)),
                    _ => Err(invalid("not a single character")),
                }
            }
            _ => Err(invalid("unknown type tag")),
        }
    }
}

// Convenient From implementations for common types
impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Scalar::UInt(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<char> for Scalar {
    fn from(value: char) -> Self {
        Scalar::Char(value)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

/// The value stored at a snapshot path.
///
/// The variant always agrees with the path: plain paths hold leaves,
/// [`MetaKind::Size`] paths hold sizes, [`MetaKind::RuntimeType`] paths hold
/// type names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatValue {
    /// A tagged primitive
    Leaf(Scalar),
    /// Number of elements of a list or map
    Size(usize),
    /// Concrete type name of a record
    RuntimeType(String),
}

impl FlatValue {
    /// Returns the metadata kind a path must carry to hold this value.
    pub fn meta_kind(&self) -> Option<MetaKind> {
        match self {
            FlatValue::Leaf(_) => None,
            FlatValue::Size(_) => Some(MetaKind::Size),
            FlatValue::RuntimeType(_) => Some(MetaKind::RuntimeType),
        }
    }

    /// Returns true if this is a tagged leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self, FlatValue::Leaf(_))
    }

    /// Attempts to convert to a leaf
    pub fn as_leaf(&self) -> Option<&Scalar> {
        match self {
            FlatValue::Leaf(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Attempts to convert to a size
    pub fn as_size(&self) -> Option<usize> {
        match self {
            FlatValue::Size(size) => Some(*size),
            _ => None,
        }
    }

    /// Attempts to convert to a runtime type name
    pub fn as_runtime_type(&self) -> Option<&str> {
        match self {
            FlatValue::RuntimeType(name) => Some(name),
            _ => None,
        }
    }

    /// Encodes the value in its persisted textual form.
    pub fn encode(&self) -> String {
        match self {
            FlatValue::Leaf(scalar) => scalar.encode(),
            FlatValue::Size(size) => size.to_string(),
            FlatValue::RuntimeType(name) => name.clone(),
        }
    }

    /// Decodes a textual value stored under a path with the given metadata kind.
    pub fn decode(kind: Option<MetaKind>, text: &str) -> Result<Self, SnapshotError> {
        match kind {
            None => text.parse().map(FlatValue::Leaf),
            Some(MetaKind::Size) => {
                text.parse()
                    .map(FlatValue::Size)
                    .map_err(|_| SnapshotError::InvalidValue {
                        value: text.to_string(),
                        reason: "not a collection size".to_string(),
                    })
            }
            Some(MetaKind::RuntimeType) => Ok(FlatValue::RuntimeType(text.to_string())),
        }
    }
}

impl fmt::Display for FlatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl From<Scalar> for FlatValue {
    fn from(value: Scalar) -> Self {
        FlatValue::Leaf(value)
    }
}

// PartialEq implementations for comparing leaves with primitives in assertions
impl PartialEq<&str> for FlatValue {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, FlatValue::Leaf(Scalar::Text(s)) if s == other)
    }
}

impl PartialEq<i64> for FlatValue {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, FlatValue::Leaf(Scalar::Int(n)) if n == other)
    }
}
