//! A serde [`Serializer`] that produces [`Tree`]s.
//!
//! Structs become named records, so their type name reaches the flattener as
//! runtime-type metadata. Maps become [`Tree::Map`] whatever their key type,
//! which keeps integer or free-form keys out of path segments. Enum variants
//! use the externally tagged shape `serde_json` uses, so [`Tree::to_json`]
//! can hand the result back to a derived `Deserialize`.

use serde::ser::{self, Serialize};

use super::{Record, Tree, TreeError};
use crate::snapshot::Scalar;

impl ser::Error for TreeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        TreeError::Serialization {
            reason: msg.to_string(),
        }
    }
}

/// Serializes values into trees.
pub(crate) struct TreeSerializer;

type SerResult = Result<Tree, TreeError>;

fn variant_record(variant: &'static str, value: Tree) -> Tree {
    Record::anonymous().with(variant, value).into()
}

impl ser::Serializer for TreeSerializer {
    type Ok = Tree;
    type Error = TreeError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = SeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = RecordBuilder;
    type SerializeStructVariant = RecordBuilder;

    fn serialize_bool(self, v: bool) -> SerResult {
        Ok(Tree::Scalar(Scalar::Bool(v)))
    }

    fn serialize_i8(self, v: i8) -> SerResult {
        self.serialize_i64(v.into())
    }

    fn serialize_i16(self, v: i16) -> SerResult {
        self.serialize_i64(v.into())
    }

    fn serialize_i32(self, v: i32) -> SerResult {
        self.serialize_i64(v.into())
    }

    fn serialize_i64(self, v: i64) -> SerResult {
        Ok(Tree::Scalar(Scalar::Int(v)))
    }

    fn serialize_u8(self, v: u8) -> SerResult {
        self.serialize_i64(v.into())
    }

    fn serialize_u16(self, v: u16) -> SerResult {
        self.serialize_i64(v.into())
    }

    fn serialize_u32(self, v: u32) -> SerResult {
        self.serialize_i64(v.into())
    }

    fn serialize_u64(self, v: u64) -> SerResult {
        Ok(Tree::Scalar(Scalar::UInt(v)))
    }

    fn serialize_f32(self, v: f32) -> SerResult {
        self.serialize_f64(v.into())
    }

    fn serialize_f64(self, v: f64) -> SerResult {
        Ok(Tree::Scalar(Scalar::Float(v)))
    }

    fn serialize_char(self, v: char) -> SerResult {
        Ok(Tree::Scalar(Scalar::Char(v)))
    }

    fn serialize_str(self, v: &str) -> SerResult {
        Ok(Tree::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> SerResult {
        Ok(Tree::List(v.iter().map(|b| Tree::from(i64::from(*b))).collect()))
    }

    fn serialize_none(self) -> SerResult {
        Ok(Tree::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> SerResult {
        value.serialize(self)
    }

    fn serialize_unit(self) -> SerResult {
        Ok(Tree::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> SerResult {
        Ok(Tree::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> SerResult {
        Ok(Tree::from(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> SerResult {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> SerResult {
        Ok(variant_record(variant, value.serialize(TreeSerializer)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, TreeError> {
        Ok(SeqBuilder {
            variant: None,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, TreeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, TreeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, TreeError> {
        Ok(SeqBuilder {
            variant: Some(variant),
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, TreeError> {
        Ok(MapBuilder {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<RecordBuilder, TreeError> {
        Ok(RecordBuilder {
            variant: None,
            record: Record::new(name),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<RecordBuilder, TreeError> {
        Ok(RecordBuilder {
            variant: Some(variant),
            record: Record::new(variant),
        })
    }
}

pub(crate) struct SeqBuilder {
    variant: Option<&'static str>,
    items: Vec<Tree>,
}

impl SeqBuilder {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), TreeError> {
        self.items.push(value.serialize(TreeSerializer)?);
        Ok(())
    }

    fn finish(self) -> SerResult {
        let list = Tree::List(self.items);
        Ok(match self.variant {
            Some(variant) => variant_record(variant, list),
            None => list,
        })
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), TreeError> {
        self.push(value)
    }

    fn end(self) -> SerResult {
        self.finish()
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), TreeError> {
        self.push(value)
    }

    fn end(self) -> SerResult {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), TreeError> {
        self.push(value)
    }

    fn end(self) -> SerResult {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SeqBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), TreeError> {
        self.push(value)
    }

    fn end(self) -> SerResult {
        self.finish()
    }
}

pub(crate) struct MapBuilder {
    entries: Vec<(Tree, Tree)>,
    pending_key: Option<Tree>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), TreeError> {
        self.pending_key = Some(key.serialize(TreeSerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), TreeError> {
        let key = self.pending_key.take().ok_or_else(|| TreeError::Serialization {
            reason: "map value serialized before its key".to_string(),
        })?;
        self.entries.push((key, value.serialize(TreeSerializer)?));
        Ok(())
    }

    fn end(self) -> SerResult {
        Ok(Tree::Map(self.entries))
    }
}

pub(crate) struct RecordBuilder {
    variant: Option<&'static str>,
    record: Record,
}

impl RecordBuilder {
    fn insert<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<(), TreeError> {
        self.record.insert(key, value.serialize(TreeSerializer)?);
        Ok(())
    }

    fn finish(self) -> SerResult {
        let record = Tree::Record(self.record);
        Ok(match self.variant {
            Some(variant) => variant_record(variant, record),
            None => record,
        })
    }
}

impl ser::SerializeStruct for RecordBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), TreeError> {
        self.insert(key, value)
    }

    fn end(self) -> SerResult {
        self.finish()
    }
}

impl ser::SerializeStructVariant for RecordBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), TreeError> {
        self.insert(key, value)
    }

    fn end(self) -> SerResult {
        self.finish()
    }
}
