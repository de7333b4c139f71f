//! # lino_objects_codec
//!
//! Encode object graphs to Links Notation and decode them back, keeping
//! shared references shared and cycles cyclic.
//!
//! ## What does it do?
//!
//! A [`Value`] is the kind of value a dynamic-language runtime works with:
//! null, undefined, booleans, integers, floats, strings, lists and maps.
//! Lists and maps are shared handles, so a graph can reference one container
//! from several places or contain itself. [`encode`] turns such a graph into
//! Links Notation text (`text/lino`) and [`decode`] turns the text back into
//! a graph with the same shape.
//!
//! ## Key Features
//!
//! - **Identity preserving**: a container referenced twice decodes to one
//!   container referenced twice, not two copies
//! - **Cycle safe**: self-referencing containers encode to finite text and
//!   decode back into the same cycle
//! - **Exact numbers**: integers stay integers, floats stay floats, and
//!   `NaN`, `Infinity` and `-Infinity` survive the trip
//! - **Byte exact strings**: string payloads are base64, so parentheses,
//!   quotes, newlines and any UTF-8 pass through untouched
//! - **Serde bridge**: any `T: Serialize` can be encoded and any
//!   `T: Deserialize` decoded
//!
//! ## Quick Start
//!
//! ```rust
//! use lino_objects_codec::{decode, encode, lino, Value};
//!
//! let user = lino!({"name": "Alice"});
//! let text = encode(&user).unwrap();
//! assert_eq!(text, "(object obj_0 ((str bmFtZQ==) (str QWxpY2U=)))");
//!
//! let back = decode(&text).unwrap();
//! assert_eq!(back, user);
//! ```
//!
//! ### Shared references and cycles
//!
//! ```rust
//! use lino_objects_codec::{decode, encode, Map, Value};
//!
//! let node = Map::new();
//! node.insert("name", "root");
//! node.insert("self", node.clone());
//!
//! let text = encode(&Value::from(node)).unwrap();
//! let back = decode(&text).unwrap();
//!
//! let map = back.as_map().unwrap();
//! let inner = map.get("self").unwrap();
//! assert!(inner.as_map().unwrap().ptr_eq(map));
//! ```
//!
//! ### Rust types
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use lino_objects_codec::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Point { x: i32, y: f64 }
//!
//! let text = to_string(&Point { x: 1, y: 2.5 }).unwrap();
//! let point: Point = from_str(&text).unwrap();
//! assert_eq!(point, Point { x: 1, y: 2.5 });
//! ```
//!
//! ## Error policy
//!
//! Structural problems (unknown tags, dangling references, malformed
//! notation) fail the whole call. Scalar payloads that do not parse degrade
//! to a fallback value unless [`DecodeMode::Strict`] is selected. See
//! [`error`] for details.
//!
//! ## State
//!
//! All reference tracking lives in an [`Encoder`]/[`Decoder`] created for
//! one call, so concurrent calls on different threads never share tables.
//!
//! ## Format Specification
//!
//! See the [`spec`] module.

pub mod de;
pub mod error;
pub mod identity;
pub mod links;
pub mod macros;
pub mod options;
pub mod ser;
pub mod spec;
mod tag;
pub mod value;

pub use de::{Decoder, ValueDeserializer};
pub use error::{Error, Result};
pub use links::Link;
pub use options::{CodecOptions, DecodeMode, DEFAULT_MAX_DEPTH};
pub use ser::{Encoder, ValueSerializer};
pub use value::{Key, List, Map, Value};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Media type of Links Notation documents.
pub const LINO_CONTENT_TYPE: &str = "text/lino";

/// Encode an object graph to Links Notation text.
///
/// # Examples
///
/// ```rust
/// use lino_objects_codec::{encode, Value};
///
/// assert_eq!(encode(&Value::from(7)).unwrap(), "(int 7)");
/// assert_eq!(encode(&Value::Float(f64::NAN)).unwrap(), "(float NaN)");
/// ```
///
/// # Errors
///
/// Returns [`Error::TooDeep`] if the graph nests deeper than the default
/// depth limit.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode(value: &Value) -> Result<String> {
    encode_with_options(value, CodecOptions::default())
}

/// Encode an object graph with custom options.
///
/// # Errors
///
/// Returns [`Error::TooDeep`] if the graph nests deeper than
/// `options.max_depth`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_with_options(value: &Value, options: CodecOptions) -> Result<String> {
    Ok(to_link(value, options)?.to_string())
}

/// Encode an object graph to a notation tree without rendering it.
///
/// # Errors
///
/// Returns [`Error::TooDeep`] if the graph nests deeper than
/// `options.max_depth`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_link(value: &Value, options: CodecOptions) -> Result<Link> {
    Encoder::new(options).encode(value)
}

/// Decode Links Notation text to an object graph.
///
/// Only the first top-level link is decoded. An empty or whitespace-only
/// document decodes to [`Value::Null`].
///
/// Decoded containers are reference counted. A document with a cycle
/// yields a graph that is not freed when dropped; call [`Value::release`]
/// once it is no longer needed.
///
/// # Examples
///
/// ```rust
/// use lino_objects_codec::{decode, Value};
///
/// assert_eq!(decode("(int 7)").unwrap(), Value::Int(7));
/// assert_eq!(decode("   ").unwrap(), Value::Null);
/// assert!(decode("(ref obj_3)").is_err());
/// ```
///
/// # Errors
///
/// Returns an error for malformed notation, unknown tags, dangling
/// references and excessive nesting.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode(text: &str) -> Result<Value> {
    decode_with_options(text, CodecOptions::default())
}

/// Decode Links Notation text with custom options.
///
/// # Errors
///
/// As [`decode`], plus [`Error::MalformedPayload`] in strict mode.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_with_options(text: &str, options: CodecOptions) -> Result<Value> {
    let links = links::parse(text)?;
    match links.first() {
        Some(link) => from_link(link, options),
        None => Ok(Value::Null),
    }
}

/// Decode a notation tree to an object graph.
///
/// # Errors
///
/// As [`decode_with_options`], minus syntax errors.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_link(link: &Link, options: CodecOptions) -> Result<Value> {
    Decoder::new(options).decode(link)
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Examples
///
/// ```rust
/// use lino_objects_codec::to_value;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is_map());
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedValueKind`] for map keys that are not
/// scalars.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Deserialize an instance of `T` from a [`Value`].
///
/// # Errors
///
/// Returns [`Error::CyclicValue`] if the graph contains a cycle, or a custom
/// error if the value does not match `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: &Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(ValueDeserializer::new(value.clone()))
}

/// Serialize any `T: Serialize` to Links Notation text.
///
/// # Examples
///
/// ```rust
/// use lino_objects_codec::to_string;
///
/// assert_eq!(to_string(&vec![1, 2]).unwrap(), "(array obj_0 (int 1) (int 2))");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be represented as an object graph.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    encode(&to_value(value)?)
}

/// Serialize any `T: Serialize` to a writer as Links Notation.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string(value)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize an instance of `T` from Links Notation text.
///
/// # Examples
///
/// ```rust
/// use lino_objects_codec::from_str;
///
/// let numbers: Vec<i32> = from_str("(array obj_0 (int 1) (int 2))").unwrap();
/// assert_eq!(numbers, vec![1, 2]);
/// ```
///
/// # Errors
///
/// Returns an error if the text does not decode, contains a cycle, or does
/// not match `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(text: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(&decode(text)?)
}

/// Deserialize an instance of `T` from bytes of Links Notation text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 or [`from_str`] fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let text = std::str::from_utf8(bytes).map_err(|e| Error::custom(e.to_string()))?;
    from_str(text)
}

/// Deserialize an instance of `T` from a reader of Links Notation text.
///
/// # Errors
///
/// Returns an error if reading fails or [`from_str`] fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lino;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
    }

    fn alice() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let value = lino!({"a": [1, 2.5, "x", null, undefined], "b": {}});
        let text = encode(&value).unwrap();
        assert_eq!(decode(&text).unwrap(), value);
    }

    #[test]
    fn test_empty_document_is_null() {
        assert_eq!(decode("").unwrap(), Value::Null);
        assert_eq!(decode("\n  \t").unwrap(), Value::Null);
    }

    #[test]
    fn test_only_first_link_decoded() {
        assert_eq!(decode("(int 1)\n(int 2)").unwrap(), Value::Int(1));
    }

    #[test]
    fn test_deep_document_fails_cleanly() {
        let depth = 50_000;
        let text = format!("{}{}", "(array x ".repeat(depth), ")".repeat(depth));
        assert_eq!(decode(&text), Err(Error::TooDeep(DEFAULT_MAX_DEPTH)));
    }

    #[test]
    fn test_syntax_error_surfaces() {
        assert!(matches!(decode("(int 1"), Err(Error::Syntax { .. })));
    }

    #[test]
    fn test_serialize_deserialize_user() {
        let text = to_string(&alice()).unwrap();
        let user: User = from_str(&text).unwrap();
        assert_eq!(user, alice());
    }

    #[test]
    fn test_writer_and_reader() {
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &alice()).unwrap();
        let from_bytes: User = from_slice(&buffer).unwrap();
        let from_read: User = from_reader(buffer.as_slice()).unwrap();
        assert_eq!(from_bytes, alice());
        assert_eq!(from_read, alice());
    }

    #[test]
    fn test_from_slice_rejects_invalid_utf8() {
        assert!(from_slice::<i32>(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_link_level_api() {
        let link = to_link(&Value::from(vec![Value::from(1)]), CodecOptions::new()).unwrap();
        assert_eq!(link.to_string(), "(array obj_0 (int 1))");
        let value = from_link(&link, CodecOptions::new()).unwrap();
        assert_eq!(value, Value::from(vec![Value::from(1)]));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(LINO_CONTENT_TYPE, "text/lino");
    }
}
