//! Decoding: notation trees to object graphs, and object graphs to Rust
//! values.
//!
//! ## Overview
//!
//! - [`Decoder`] rebuilds a [`Value`] graph from one [`Link`] tree. A
//!   container is registered under its reference id *before* its children
//!   are decoded, so a `(ref obj_N)` inside it resolves to the container
//!   itself and cycles close.
//! - [`ValueDeserializer`] is a serde `Deserializer` reading any
//!   `T: Deserialize` out of a [`Value`]. Shared containers are read once per
//!   occurrence; cycles are reported as [`Error::CyclicValue`].
//!
//! ```rust
//! use lino_objects_codec::{decode, Value};
//!
//! let value = decode("(array obj_0 (int 1) (ref obj_0))").unwrap();
//! let list = value.as_list().unwrap();
//! assert_eq!(list.get(0), Some(Value::Int(1)));
//! assert!(list.get(1).unwrap().as_list().unwrap().ptr_eq(list));
//! ```

use crate::identity::Ancestors;
use crate::links::Link;
use crate::{tag, CodecOptions, Error, Key, List, Map, Result, Value};
use base64::Engine;
use num_bigint::BigInt;
use serde::de::{
    self, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, Unexpected,
    VariantAccess, Visitor,
};
use serde::forward_to_deserialize_any;
use std::collections::HashMap;
use tracing::debug;

/// Decodes one notation tree into an object graph.
///
/// A decoder owns the reference table for a single call and is consumed by
/// [`Decoder::decode`].
pub struct Decoder {
    refs: HashMap<String, Value>,
    options: CodecOptions,
}

impl Decoder {
    #[must_use]
    pub fn new(options: CodecOptions) -> Self {
        Decoder {
            refs: HashMap::new(),
            options,
        }
    }

    /// Decodes `link` into a value.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownTag`] for an unrecognized tag
    /// - [`Error::DanglingReference`] for a `ref` to an unregistered id
    /// - [`Error::InvalidNode`] for shapes that cannot describe a value
    /// - [`Error::TooDeep`] past [`CodecOptions::max_depth`]
    /// - [`Error::MalformedPayload`] in strict mode only
    ///
    /// On error the containers built so far are released, so a partial
    /// cycle does not outlive the call.
    pub fn decode(mut self, link: &Link) -> Result<Value> {
        let result = self.decode_link(link, 0);
        if result.is_err() {
            self.release_partial();
        }
        result
    }

    fn release_partial(&mut self) {
        for (_, container) in self.refs.drain() {
            container.release();
        }
    }

    fn decode_link(&mut self, link: &Link, depth: usize) -> Result<Value> {
        if depth > self.options.max_depth {
            return Err(Error::TooDeep(self.options.max_depth));
        }

        let Some(first) = link.values.first() else {
            // A bare reference stands for its own text.
            return Ok(link.id.clone().map_or(Value::Null, Value::Str));
        };
        let kind = match (first.is_leaf(), first.id()) {
            (true, Some(kind)) => kind,
            _ => return Err(Error::invalid_node("node does not start with a tag")),
        };
        let payload = link.leaf_at(1);

        match kind {
            tag::NULL => Ok(Value::Null),
            tag::UNDEFINED => Ok(Value::Undefined),
            tag::BOOL => self.decode_bool(payload),
            tag::INT => self.decode_int(payload),
            tag::FLOAT => self.decode_float(payload),
            tag::STR => self.decode_str(payload),
            tag::REF => {
                let id = payload.ok_or_else(|| Error::invalid_node("ref without an id"))?;
                self.refs
                    .get(id)
                    .cloned()
                    .ok_or_else(|| Error::dangling_reference(id))
            }
            tag::ARRAY => self.decode_array(link, depth),
            tag::OBJECT => self.decode_object(link, depth),
            other => Err(Error::unknown_tag(other)),
        }
    }

    /// Registers an empty container under the node's reference id.
    ///
    /// Returns `Ok(false)` for a container node with no id at all, which
    /// decodes to an empty container.
    fn register(&mut self, link: &Link, container: Value) -> Result<bool> {
        match link.values.get(1) {
            None => Ok(false),
            Some(child) if child.is_leaf() => {
                if let Some(id) = child.id() {
                    self.refs.insert(id.to_string(), container);
                }
                Ok(true)
            }
            Some(_) => Err(Error::invalid_node("container without a reference id")),
        }
    }

    fn decode_array(&mut self, link: &Link, depth: usize) -> Result<Value> {
        let list = List::new();
        if !self.register(link, Value::List(list.clone()))? {
            return Ok(Value::List(list));
        }
        for child in &link.values[2..] {
            let item = self.decode_link(child, depth + 1)?;
            list.push(item);
        }
        Ok(Value::List(list))
    }

    fn decode_object(&mut self, link: &Link, depth: usize) -> Result<Value> {
        let map = Map::new();
        if !self.register(link, Value::Map(map.clone()))? {
            return Ok(Value::Map(map));
        }
        for pair in &link.values[2..] {
            let [key, item, ..] = pair.values.as_slice() else {
                debug!(pair = %pair, "skipping object entry without key and value");
                continue;
            };
            let key = Key::try_from(self.decode_link(key, depth + 1)?)?;
            let item = self.decode_link(item, depth + 1)?;
            map.insert(key, item);
        }
        Ok(Value::Map(map))
    }

    fn decode_bool(&self, payload: Option<&str>) -> Result<Value> {
        match payload {
            None | Some(tag::FALSE) => Ok(Value::Bool(false)),
            Some(tag::TRUE) => Ok(Value::Bool(true)),
            Some(other) => self.malformed(tag::BOOL, other, Value::Bool(false)),
        }
    }

    fn decode_int(&self, payload: Option<&str>) -> Result<Value> {
        let Some(text) = payload else {
            return Ok(Value::Int(0));
        };
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Value::Int(i));
        }
        match text.parse::<BigInt>() {
            Ok(big) => Ok(Value::from(big)),
            Err(_) => self.malformed(tag::INT, text, Value::Int(0)),
        }
    }

    fn decode_float(&self, payload: Option<&str>) -> Result<Value> {
        match payload {
            None => Ok(Value::Float(0.0)),
            Some(tag::NAN) => Ok(Value::Float(f64::NAN)),
            Some(tag::INFINITY) => Ok(Value::Float(f64::INFINITY)),
            Some(tag::NEG_INFINITY) => Ok(Value::Float(f64::NEG_INFINITY)),
            Some(text) => match text.parse::<f64>() {
                Ok(f) => Ok(Value::Float(f)),
                Err(_) => self.malformed(tag::FLOAT, text, Value::Float(0.0)),
            },
        }
    }

    fn decode_str(&self, payload: Option<&str>) -> Result<Value> {
        let Some(text) = payload else {
            return Ok(Value::Str(String::new()));
        };
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(text)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok());
        match decoded {
            Some(s) => Ok(Value::Str(s)),
            None => self.malformed(tag::STR, text, Value::Str(text.to_string())),
        }
    }

    fn malformed(&self, kind: &str, payload: &str, fallback: Value) -> Result<Value> {
        if self.options.mode.is_strict() {
            return Err(Error::malformed_payload(kind, payload));
        }
        debug!(kind, payload, fallback = ?fallback, "malformed payload, using fallback");
        Ok(fallback)
    }
}

/// Serde deserializer reading from a [`Value`].
///
/// Created via [`ValueDeserializer::new`]; most users call
/// [`from_value`](crate::from_value) instead.
pub struct ValueDeserializer {
    value: Value,
    path: Ancestors,
}

impl ValueDeserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        ValueDeserializer {
            value,
            path: Ancestors::new(),
        }
    }

    /// Extends the path with the current container, failing on a cycle.
    fn enter(&self) -> Result<Ancestors> {
        match self.value.container_id() {
            Some(id) if self.path.contains(id) => {
                Err(Error::CyclicValue(self.value.kind_name().to_string()))
            }
            Some(id) => Ok(self.path.with(id)),
            None => Ok(self.path.clone()),
        }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let path = self.enter()?;
        match self.value {
            Value::Null | Value::Undefined => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Int(i) => visitor.visit_i64(i),
            Value::BigInt(big) => visit_bigint(big, visitor),
            Value::Float(f) => visitor.visit_f64(f),
            Value::Str(s) => visitor.visit_string(s),
            Value::List(list) => visitor.visit_seq(SeqDeserializer {
                iter: list.to_vec().into_iter(),
                path,
            }),
            Value::Map(map) => visitor.visit_map(MapDeserializer {
                iter: map.entries().into_iter(),
                value: None,
                path,
            }),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null | Value::Undefined => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let path = self.enter()?;
        match &self.value {
            Value::Str(variant) => visitor.visit_enum(EnumDeserializer {
                variant: variant.clone(),
                value: None,
                path,
            }),
            Value::Map(map) if map.len() == 1 => {
                let mut entries = map.entries();
                let (key, value) = entries.remove(0);
                let Key::Str(variant) = key else {
                    return Err(de::Error::invalid_type(
                        Unexpected::Other("non-string variant name"),
                        &"string variant name",
                    ));
                };
                visitor.visit_enum(EnumDeserializer {
                    variant,
                    value: Some(value),
                    path,
                })
            }
            other => Err(de::Error::invalid_type(
                Unexpected::Other(other.kind_name()),
                &"string or single-entry object",
            )),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

fn visit_bigint<'de, V>(big: BigInt, visitor: V) -> Result<V::Value>
where
    V: Visitor<'de>,
{
    if let Ok(i) = i64::try_from(&big) {
        visitor.visit_i64(i)
    } else if let Ok(u) = u64::try_from(&big) {
        visitor.visit_u64(u)
    } else if let Ok(i) = i128::try_from(&big) {
        visitor.visit_i128(i)
    } else if let Ok(u) = u128::try_from(&big) {
        visitor.visit_u128(u)
    } else {
        visitor.visit_string(big.to_string())
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
    path: Ancestors,
}

impl<'de> SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(ValueDeserializer {
                    value,
                    path: self.path.clone(),
                })
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: std::vec::IntoIter<(Key, Value)>,
    value: Option<Value>,
    path: Ancestors,
}

impl<'de> MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer {
                    value: Value::from(key),
                    path: self.path.clone(),
                })
                .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let value = self
            .value
            .take()
            .ok_or_else(|| Error::custom("next_value called before next_key"))?;
        seed.deserialize(ValueDeserializer {
            value,
            path: self.path.clone(),
        })
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
    path: Ancestors,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, VariantDeserializer)>
    where
        V: DeserializeSeed<'de>,
    {
        let name: de::value::StringDeserializer<Error> = self.variant.into_deserializer();
        let variant = seed.deserialize(name)?;
        Ok((
            variant,
            VariantDeserializer {
                value: self.value,
                path: self.path,
            },
        ))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
    path: Ancestors,
}

impl VariantDeserializer {
    fn payload(self, expected: &str) -> Result<ValueDeserializer> {
        match self.value {
            Some(value) => Ok(ValueDeserializer {
                value,
                path: self.path,
            }),
            None => Err(de::Error::invalid_type(Unexpected::UnitVariant, &expected)),
        }
    }
}

impl<'de> VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None | Some(Value::Null) => Ok(()),
            Some(other) => Err(de::Error::invalid_type(
                Unexpected::Other(other.kind_name()),
                &"unit variant",
            )),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(self.payload("newtype variant")?)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_any(self.payload("tuple variant")?, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_any(self.payload("struct variant")?, visitor)
    }
}
