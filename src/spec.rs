//! Object Graph Format
//!
//! This module documents how object graphs are written in Links Notation by
//! this library.
//!
//! # Overview
//!
//! Links Notation is a parenthesized notation of *links*. A link is either a
//! bare reference (a word such as `obj_0` or `NaN`) or a parenthesized list
//! of links, optionally labeled with `label:`. Every value in an object graph
//! becomes one link whose first child names its kind.
//!
//! ## Design Philosophy
//!
//! - **Tagged**: the first child of every node says what the node is
//! - **Identity aware**: containers carry an id so later occurrences can
//!   point back to them
//! - **Lossless**: integers, floats and strings come back exactly as written
//!
//! # Links Notation Syntax
//!
//! ```text
//! word                  bare reference
//! (a b c)               link with three children
//! (label: a b)          labeled link
//! 'two words'           quoted reference, '' escapes a quote
//! "two words"           quoted reference, "" escapes a quote
//! ()                    empty link
//! ```
//!
//! Whitespace, including newlines, separates children. Several top-level
//! links may appear in one document; only the first is decoded.
//!
//! # Scalars
//!
//! ```text
//! (null)
//! (undefined)
//! (bool true)
//! (bool false)
//! (int 42)
//! (int -170141183460469231731687303715884105728)
//! (float 3.14)
//! (float 1.0)
//! (float NaN)
//! (float Infinity)
//! (float -Infinity)
//! (str SGVsbG8=)
//! ```
//!
//! ## Numbers
//!
//! Integers use the `int` tag with decimal digits and have no size limit.
//! Floats always use the `float` tag, so `1.0` stays a float after a round
//! trip even though its value is integral. Finite floats are written in the
//! shortest form that parses back to the same bits.
//!
//! ## Strings
//!
//! String payloads are standard base64 (RFC 4648, with padding) of the UTF-8
//! bytes. The empty string is written as `(str "")`, since an empty
//! reference cannot appear bare:
//!
//! ```text
//! (str "")
//! (str aGk=)
//! (str KGEgYik=)        "(a b)"
//! ```
//!
//! # Containers
//!
//! Arrays list their items after the id. Objects list one `(key value)`
//! pair per entry, where both key and value are full value nodes:
//!
//! ```text
//! (array obj_0 (int 1) (str dHdv) (bool true))
//! (object obj_0 ((str bmFtZQ==) (str QWxpY2U=)))
//! ```
//!
//! Ids are `obj_0`, `obj_1`, ... in the order containers are first reached
//! by a depth-first walk. Object entries keep insertion order.
//!
//! # References
//!
//! The second and later occurrences of a container are written as a
//! reference to its id:
//!
//! ```text
//! (array obj_0 (array obj_1 (int 1)) (ref obj_1))
//! ```
//!
//! A container that contains itself refers to its own id from inside its
//! own node:
//!
//! ```text
//! (object obj_0 ((str c2VsZg==) (ref obj_0)))
//! ```
//!
//! When decoding, a container is registered before its children are
//! decoded, so a reference may point at any enclosing container as well as
//! any container decoded earlier. A reference to an id that was never
//! defined is an error.
//!
//! # Decoding Edge Cases
//!
//! ```text
//! hello                 decodes to the string "hello"
//! ()                    decodes to null
//! (array)               decodes to an empty array
//! (object obj_0 (k))    entries with fewer than two children are skipped
//! (int abc)             decodes to 0 (lenient) or fails (strict)
//! (str !!!)             decodes to the text "!!!" (lenient) or fails (strict)
//! (bool maybe)          decodes to false (lenient) or fails (strict)
//! (float x)             decodes to 0.0 (lenient) or fails (strict)
//! (widget 1)            fails: unknown tag
//! ((int 1) 2)           fails: the tag must be a bare reference
//! ```
//!
//! # Limitations
//!
//! - **Object keys**: must be scalars; arrays and objects cannot be keys
//! - **Nesting**: limited by `CodecOptions::max_depth` in both directions
//! - **Comments**: not supported
//!
//! # Conformance
//!
//! Output is byte-for-byte compatible with the JavaScript and Python
//! `lino-objects-codec` packages for the value kinds they share.

// This module contains only documentation; no implementation code
