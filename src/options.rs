//! Configuration options for encoding and decoding.
//!
//! - [`CodecOptions`]: Main configuration struct
//! - [`DecodeMode`]: How decode treats scalar payloads that do not parse
//!
//! ## Examples
//!
//! ```rust
//! use lino_objects_codec::{decode_with_options, CodecOptions, DecodeMode, Value};
//!
//! // Lenient (default): a broken integer payload becomes 0
//! let value = decode_with_options("(int 12x)", CodecOptions::new()).unwrap();
//! assert_eq!(value, Value::Int(0));
//!
//! // Strict: the same payload is an error
//! let options = CodecOptions::new().with_mode(DecodeMode::Strict);
//! assert!(decode_with_options("(int 12x)", options).is_err());
//! ```

/// Default limit on container nesting for both encode and decode.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Policy for scalar payloads that fail to parse during decode.
///
/// - **Lenient**: Default. Invalid base64 yields the raw payload text,
///   invalid numbers yield zero.
/// - **Strict**: Any malformed payload fails the decode with
///   [`Error::MalformedPayload`](crate::Error::MalformedPayload).
///
/// Structural problems (unknown tags, dangling references) are fatal in
/// both modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DecodeMode {
    #[default]
    Lenient,
    Strict,
}

impl DecodeMode {
    /// Returns `true` for [`DecodeMode::Strict`].
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        matches!(self, DecodeMode::Strict)
    }
}

/// Configuration options for the codec.
///
/// # Examples
///
/// ```rust
/// use lino_objects_codec::{CodecOptions, DecodeMode};
///
/// let options = CodecOptions::new();
/// assert_eq!(options.mode, DecodeMode::Lenient);
///
/// let options = CodecOptions::strict().with_max_depth(64);
/// assert!(options.mode.is_strict());
/// assert_eq!(options.max_depth, 64);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecOptions {
    pub max_depth: usize,
    pub mode: DecodeMode,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            mode: DecodeMode::default(),
        }
    }
}

impl CodecOptions {
    /// Creates default options (lenient decode, depth limit of 512).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that reject malformed scalar payloads.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lino_objects_codec::CodecOptions;
    ///
    /// assert!(CodecOptions::strict().mode.is_strict());
    /// ```
    #[must_use]
    pub fn strict() -> Self {
        CodecOptions {
            mode: DecodeMode::Strict,
            ..Default::default()
        }
    }

    /// Sets the maximum container nesting depth.
    ///
    /// The root value sits at depth 0 and each container adds one level for
    /// its children. Encoding or decoding a value nested deeper than this
    /// fails with
    /// [`Error::TooDeep`](crate::Error::TooDeep).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the payload decode policy.
    #[must_use]
    pub fn with_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }
}
