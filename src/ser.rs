//! Encoding: object graphs to notation trees, and Rust values to object
//! graphs.
//!
//! ## Overview
//!
//! - [`Encoder`] walks a [`Value`] graph and builds one [`Link`] tree. Each
//!   container is written in full at its first encounter and as
//!   `(ref obj_N)` everywhere after, which also breaks cycles.
//! - [`ValueSerializer`] is a serde `Serializer` that turns any
//!   `T: Serialize` into a fresh, unshared [`Value`] tree.
//!
//! Most users should use the functions in the crate root:
//!
//! ```rust
//! use lino_objects_codec::{encode, List, Value};
//!
//! let list = List::new();
//! list.push(1);
//! list.push(list.clone());
//! assert_eq!(
//!     encode(&Value::from(list)).unwrap(),
//!     "(array obj_0 (int 1) (ref obj_0))"
//! );
//! ```

use crate::identity::{Ancestors, ContainerId, IdentityTracker, RefId, Tracked};
use crate::links::Link;
use crate::{tag, CodecOptions, Error, Key, List, Map, Result, Value};
use base64::Engine;
use num_bigint::BigInt;
use serde::{ser, Serialize};
use tracing::trace;

/// Encodes one object graph into a notation tree.
///
/// An encoder owns the identity state for a single call and is consumed by
/// [`Encoder::encode`], so reference ids always start at `obj_0`.
pub struct Encoder {
    tracker: IdentityTracker,
    options: CodecOptions,
}

impl Encoder {
    #[must_use]
    pub fn new(options: CodecOptions) -> Self {
        Encoder {
            tracker: IdentityTracker::new(),
            options,
        }
    }

    /// Encodes `value` into a tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooDeep`] if the graph nests deeper than
    /// [`CodecOptions::max_depth`]. Nothing is produced on failure.
    pub fn encode(mut self, value: &Value) -> Result<Link> {
        self.encode_value(value, &Ancestors::new())
    }

    fn encode_value(&mut self, value: &Value, path: &Ancestors) -> Result<Link> {
        if path.depth() > self.options.max_depth {
            return Err(Error::TooDeep(self.options.max_depth));
        }

        match value {
            Value::Null => Ok(tagged(tag::NULL, None)),
            Value::Undefined => Ok(tagged(tag::UNDEFINED, None)),
            Value::Bool(b) => {
                let payload = if *b { tag::TRUE } else { tag::FALSE };
                Ok(tagged(tag::BOOL, Some(payload.to_string())))
            }
            Value::Int(i) => Ok(tagged(tag::INT, Some(i.to_string()))),
            Value::BigInt(i) => Ok(tagged(tag::INT, Some(i.to_string()))),
            Value::Float(f) => Ok(tagged(tag::FLOAT, Some(format_float(*f)))),
            Value::Str(s) => Ok(tagged(tag::STR, Some(encode_str(s)))),
            Value::List(list) => {
                let id = list.container_id();
                let ref_id = match self.track(id, value, path) {
                    Tracked::Fresh(ref_id) => ref_id,
                    Tracked::Reused(ref_id) => return Ok(reference(ref_id)),
                };
                let path = path.with(id);
                let items = list.borrow();
                let mut values = Vec::with_capacity(items.len() + 2);
                values.push(Link::leaf(tag::ARRAY));
                values.push(Link::leaf(ref_id.to_string()));
                for item in items.iter() {
                    values.push(self.encode_value(item, &path)?);
                }
                Ok(Link::node(values))
            }
            Value::Map(map) => {
                let id = map.container_id();
                let ref_id = match self.track(id, value, path) {
                    Tracked::Fresh(ref_id) => ref_id,
                    Tracked::Reused(ref_id) => return Ok(reference(ref_id)),
                };
                let path = path.with(id);
                let entries = map.borrow();
                let mut values = Vec::with_capacity(entries.len() + 2);
                values.push(Link::leaf(tag::OBJECT));
                values.push(Link::leaf(ref_id.to_string()));
                for (key, item) in entries.iter() {
                    let key = self.encode_value(&Value::from(key.clone()), &path)?;
                    let item = self.encode_value(item, &path)?;
                    values.push(Link::node(vec![key, item]));
                }
                Ok(Link::node(values))
            }
        }
    }

    /// Gives a container its id on first encounter, or hands back the id it
    /// already has.
    fn track(&mut self, id: ContainerId, value: &Value, path: &Ancestors) -> Tracked {
        let tracked = self.tracker.track_id(id);
        if let Tracked::Reused(ref_id) = tracked {
            if path.contains(id) {
                trace!(%ref_id, kind = value.kind_name(), "closing cycle");
            } else {
                trace!(%ref_id, kind = value.kind_name(), "reusing shared container");
            }
        }
        tracked
    }
}

fn tagged(tag: &str, payload: Option<String>) -> Link {
    let mut values = vec![Link::leaf(tag)];
    values.extend(payload.map(Link::leaf));
    Link::node(values)
}

fn reference(ref_id: RefId) -> Link {
    tagged(tag::REF, Some(ref_id.to_string()))
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        tag::NAN.to_string()
    } else if f == f64::INFINITY {
        tag::INFINITY.to_string()
    } else if f == f64::NEG_INFINITY {
        tag::NEG_INFINITY.to_string()
    } else {
        format!("{:?}", f)
    }
}

fn encode_str(s: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(s.as_bytes())
}

/// Serde serializer producing a [`Value`].
///
/// Every sequence and map becomes a new container; nothing is shared.
///
/// | Rust | Value |
/// |------|-------|
/// | `()`, unit structs, `None` | `Null` |
/// | integers | `Int`, or `BigInt` outside `i64` |
/// | floats | `Float` |
/// | `char`, `&str`, `String`, unit variants | `Str` |
/// | bytes | `List` of `Int` |
/// | sequences, tuples | `List` |
/// | maps, structs | `Map` |
/// | newtype, tuple and struct variants | `Map` with one entry `{variant: payload}` |
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    map: Map,
    current_key: Option<Key>,
    variant: Option<&'static str>,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::from(BigInt::from(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::from(BigInt::from(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Float(v as f64))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::List(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::Str(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(wrap_variant(variant, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(variant)))
    }
}

impl SerializeVec {
    fn new(capacity: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Value {
        let list = Value::List(List::from_vec(self.vec));
        match self.variant {
            Some(variant) => wrap_variant(variant, list),
            None => list,
        }
    }
}

impl SerializeMap {
    fn new(variant: Option<&'static str>) -> Self {
        SerializeMap {
            map: Map::new(),
            current_key: None,
            variant,
        }
    }

    fn finish(self) -> Value {
        let map = Value::Map(self.map);
        match self.variant {
            Some(variant) => wrap_variant(variant, map),
            None => map,
        }
    }
}

fn wrap_variant(variant: &str, payload: Value) -> Value {
    let map = Map::new();
    map.insert(variant, payload);
    Value::Map(map)
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = to_value(key)?;
        if key.is_container() {
            return Err(Error::unsupported_kind(&format!(
                "{} as map key",
                key.kind_name()
            )));
        }
        self.current_key = Some(Key::try_from(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn encode(value: &Value) -> String {
        Encoder::new(CodecOptions::default())
            .encode(value)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(encode(&Value::Null), "(null)");
        assert_eq!(encode(&Value::Undefined), "(undefined)");
        assert_eq!(encode(&Value::Bool(true)), "(bool true)");
        assert_eq!(encode(&Value::Int(-42)), "(int -42)");
        assert_eq!(encode(&Value::Float(1.5)), "(float 1.5)");
        assert_eq!(encode(&Value::Float(7.0)), "(float 7.0)");
        assert_eq!(encode(&Value::Str("hi".into())), "(str aGk=)");
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(encode(&Value::Float(f64::NAN)), "(float NaN)");
        assert_eq!(encode(&Value::Float(f64::INFINITY)), "(float Infinity)");
        assert_eq!(encode(&Value::Float(f64::NEG_INFINITY)), "(float -Infinity)");
    }

    #[test]
    fn test_bigint() {
        let big = BigInt::from(u64::MAX) * 10;
        assert_eq!(
            encode(&Value::BigInt(big)),
            "(int 184467440737095516150)"
        );
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(encode(&Value::from("")), "(str \"\")");
    }

    #[test]
    fn test_ids_in_pre_order() {
        let inner = List::new();
        let map = Map::new();
        map.insert("xs", inner.clone());
        let root = List::from_vec(vec![Value::from(map), Value::from(List::new())]);
        assert_eq!(
            encode(&Value::from(root)),
            "(array obj_0 (object obj_1 ((str eHM=) (array obj_2))) (array obj_3))"
        );
    }

    #[test]
    fn test_shared_container_written_once() {
        let shared = List::from_vec(vec![Value::from(1)]);
        let root = List::from_vec(vec![Value::from(shared.clone()), Value::from(shared)]);
        assert_eq!(
            encode(&Value::from(root)),
            "(array obj_0 (array obj_1 (int 1)) (ref obj_1))"
        );
    }

    #[test]
    fn test_self_reference() {
        let map = Map::new();
        map.insert("me", map.clone());
        assert_eq!(
            encode(&Value::from(map)),
            "(object obj_0 ((str bWU=) (ref obj_0)))"
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut value = Value::from(1);
        for _ in 0..5 {
            value = Value::from(vec![value]);
        }
        let shallow = Encoder::new(CodecOptions::new().with_max_depth(4)).encode(&value);
        assert!(matches!(shallow, Err(Error::TooDeep(4))));
        let exact = Encoder::new(CodecOptions::new().with_max_depth(5)).encode(&value);
        assert!(exact.is_ok());
    }

    #[test]
    fn test_value_serializer_structs() {
        #[derive(Serialize)]
        struct User {
            name: String,
            age: u8,
            tags: Vec<&'static str>,
            nick: Option<String>,
        }

        let value = to_value(&User {
            name: "Alice".into(),
            age: 30,
            tags: vec!["a", "b"],
            nick: None,
        })
        .unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("name"), Some(Value::from("Alice")));
        assert_eq!(map.get("age"), Some(Value::Int(30)));
        assert_eq!(map.get("nick"), Some(Value::Null));
        assert_eq!(map.get("tags").unwrap().as_list().unwrap().len(), 2);
    }

    #[test]
    fn test_value_serializer_enums() {
        #[derive(Serialize)]
        enum Shape {
            Empty,
            Circle(f64),
            Point(i32, i32),
            Rect { w: u32, h: u32 },
        }

        assert_eq!(to_value(&Shape::Empty).unwrap(), Value::from("Empty"));

        let circle = to_value(&Shape::Circle(1.5)).unwrap();
        assert_eq!(
            circle.as_map().unwrap().get("Circle"),
            Some(Value::Float(1.5))
        );

        let point = to_value(&Shape::Point(1, 2)).unwrap();
        assert_eq!(
            point.as_map().unwrap().get("Point"),
            Some(Value::from(vec![Value::from(1), Value::from(2)]))
        );

        let rect = to_value(&Shape::Rect { w: 3, h: 4 }).unwrap();
        let fields = rect.as_map().unwrap().get("Rect").unwrap();
        assert_eq!(fields.as_map().unwrap().get("h"), Some(Value::Int(4)));
    }

    #[test]
    fn test_value_serializer_numbers() {
        assert_eq!(to_value(&u64::MAX).unwrap(), Value::BigInt(BigInt::from(u64::MAX)));
        assert_eq!(to_value(&-5i128).unwrap(), Value::Int(-5));
        assert_eq!(to_value(&'x').unwrap(), Value::from("x"));
    }

    #[test]
    fn test_value_serializer_non_string_keys() {
        let mut map = BTreeMap::new();
        map.insert(2, "two");
        map.insert(1, "one");
        let value = to_value(&map).unwrap();
        assert_eq!(value.as_map().unwrap().get(1), Some(Value::from("one")));
        assert_eq!(value.as_map().unwrap().keys(), vec![Key::Int(1), Key::Int(2)]);
    }

    #[test]
    fn test_value_serializer_rejects_container_keys() {
        let mut map = BTreeMap::new();
        map.insert(vec![1], "list key");
        let err = to_value(&map).unwrap_err();
        assert!(matches!(err, Error::UnsupportedValueKind(_)));
    }
}
