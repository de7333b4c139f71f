//! Error types for encoding and decoding object graphs.
//!
//! The codec is strict about structure and lenient about scalar payloads:
//!
//! - **Structural errors** are fatal: an unknown tag, a dangling `ref`, a
//!   node shape that cannot be a value, or nesting deeper than the configured
//!   limit aborts the whole call.
//! - **Payload errors** (bad base64, unparsable numbers) only surface as
//!   [`Error::MalformedPayload`] when decoding in
//!   [`DecodeMode::Strict`](crate::DecodeMode::Strict). In the default lenient
//!   mode the payload degrades to a fallback value instead.
//! - **Syntax errors** come from the notation parser and carry a line and
//!   column.
//!
//! ## Examples
//!
//! ```rust
//! use lino_objects_codec::{decode, Error};
//!
//! let err = decode("(ref obj_99)").unwrap_err();
//! assert!(matches!(err, Error::DanglingReference(ref id) if id == "obj_99"));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding or decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed notation text
    #[error("Syntax error at line {line}, column {col}: {msg}")]
    Syntax { line: usize, col: usize, msg: String },

    /// Encode met a value kind outside the object graph model
    #[error("Unsupported value kind: {0}")]
    UnsupportedValueKind(String),

    /// Decode met a tag it does not recognize
    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    /// A `ref` node names an id that was never registered
    #[error("Dangling reference: {0}")]
    DanglingReference(String),

    /// A node whose shape cannot describe a value
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// A scalar payload that does not parse (strict mode only)
    #[error("Malformed payload for tag '{tag}': {payload:?}")]
    MalformedPayload { tag: String, payload: String },

    /// Nesting exceeded the configured maximum depth
    #[error("Too deeply nested: exceeded maximum depth of {0}")]
    TooDeep(usize),

    /// A cyclic graph was handed to something that needs a tree
    #[error("Cyclic value: container {0} contains itself")]
    CyclicValue(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lino_objects_codec::Error;
    ///
    /// let err = Error::syntax(3, 7, "unbalanced ')'");
    /// assert!(err.to_string().contains("line 3"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates an error for a value kind the object graph cannot hold.
    pub fn unsupported_kind(kind: &str) -> Self {
        Error::UnsupportedValueKind(kind.to_string())
    }

    /// Creates an error for an unrecognized tag.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lino_objects_codec::Error;
    ///
    /// let err = Error::unknown_tag("set");
    /// assert_eq!(err.to_string(), "Unknown tag: set");
    /// ```
    pub fn unknown_tag(tag: &str) -> Self {
        Error::UnknownTag(tag.to_string())
    }

    /// Creates an error for a `ref` node whose target was never registered.
    pub fn dangling_reference(id: &str) -> Self {
        Error::DanglingReference(id.to_string())
    }

    pub fn invalid_node(msg: &str) -> Self {
        Error::InvalidNode(msg.to_string())
    }

    /// Creates an error for a scalar payload that fails to parse.
    pub fn malformed_payload(tag: &str, payload: &str) -> Self {
        Error::MalformedPayload {
            tag: tag.to_string(),
            payload: payload.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lino_objects_codec::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reader/writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` if the error was caused by the input document rather
    /// than by the value being encoded or by I/O.
    ///
    /// A service layer can map these to a client error response.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::Syntax { .. }
                | Error::UnknownTag(_)
                | Error::DanglingReference(_)
                | Error::InvalidNode(_)
                | Error::MalformedPayload { .. }
                | Error::TooDeep(_)
        )
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
