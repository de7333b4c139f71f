//! Links Notation trees.
//!
//! A [`Link`] is one node of the notation: an optional textual id and an
//! ordered list of child links. The codec only needs four things from it,
//! all provided here:
//!
//! - build a labeled leaf ([`Link::leaf`])
//! - build an unlabeled node from children ([`Link::node`])
//! - render a tree to text ([`Display`](std::fmt::Display), [`format_links`])
//! - parse text back into trees ([`parse`])
//!
//! ## Rendering
//!
//! | Shape | Text |
//! |-------|------|
//! | leaf `id` | `id` |
//! | node without id | `(a b c)` |
//! | node with id | `(id: a b c)` |
//! | empty node | `()` |
//!
//! Ids containing whitespace, parentheses, `:` or quotes are wrapped in
//! double quotes, with embedded `"` doubled.
//!
//! A node with an id and no values is a leaf, so the labeled empty form
//! `(x:)` has no tree of its own and [`parse`] rejects it. Every tree that
//! `parse` returns renders back to equivalent text.
//!
//! ```rust
//! use lino_objects_codec::links::{parse, Link};
//!
//! let link = Link::node(vec![Link::leaf("int"), Link::leaf("42")]);
//! assert_eq!(link.to_string(), "(int 42)");
//!
//! let parsed = parse("(int 42)").unwrap();
//! assert_eq!(parsed, vec![link]);
//! ```

use crate::{Error, Result};
use std::fmt;

/// A node of a Links Notation tree.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Link {
    pub id: Option<String>,
    pub values: Vec<Link>,
}

impl Link {
    /// Creates a leaf carrying only an id.
    #[must_use]
    pub fn leaf(id: impl Into<String>) -> Self {
        Link {
            id: Some(id.into()),
            values: Vec::new(),
        }
    }

    /// Creates an unlabeled node from its children.
    #[must_use]
    pub fn node(values: Vec<Link>) -> Self {
        Link { id: None, values }
    }

    /// Creates a labeled node with children, rendered as `(id: ...)`.
    #[must_use]
    pub fn with_id(id: impl Into<String>, values: Vec<Link>) -> Self {
        Link {
            id: Some(id.into()),
            values,
        }
    }

    /// Returns the id of this link, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns `true` if this link has an id and no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.id.is_some() && self.values.is_empty()
    }

    /// Returns the id of the child at `index` when that child is a leaf.
    #[must_use]
    pub fn leaf_at(&self, index: usize) -> Option<&str> {
        self.values
            .get(index)
            .filter(|child| child.is_leaf())
            .and_then(Link::id)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.id, self.values.is_empty()) {
            (Some(id), true) => write_id(f, id),
            (id, _) => {
                f.write_str("(")?;
                if let Some(id) = id {
                    write_id(f, id)?;
                    f.write_str(": ")?;
                }
                for (i, value) in self.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str(")")
            }
        }
    }
}

fn needs_quotes(id: &str) -> bool {
    id.is_empty() || id.chars().any(|c| c.is_whitespace() || is_special(c))
}

fn is_special(c: char) -> bool {
    matches!(c, '(' | ')' | ':' | '"' | '\'')
}

fn write_id(f: &mut fmt::Formatter<'_>, id: &str) -> fmt::Result {
    if needs_quotes(id) {
        write!(f, "\"{}\"", id.replace('"', "\"\""))
    } else {
        f.write_str(id)
    }
}

impl Drop for Link {
    // Flatten children first so deep trees drop without deep recursion.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.values);
        while let Some(mut link) = pending.pop() {
            pending.append(&mut link.values);
        }
    }
}

/// Renders a sequence of top-level links, one per line.
///
/// # Examples
///
/// ```rust
/// use lino_objects_codec::links::{format_links, Link};
///
/// let text = format_links(&[Link::leaf("a"), Link::node(vec![Link::leaf("b")])]);
/// assert_eq!(text, "a\n(b)");
/// ```
#[must_use]
pub fn format_links(links: &[Link]) -> String {
    links
        .iter()
        .map(Link::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses notation text into its top-level links.
///
/// Empty or whitespace-only input yields an empty vector. Nesting is handled
/// with an explicit stack, so arbitrarily deep input cannot overflow the call
/// stack here.
///
/// # Errors
///
/// Returns [`Error::Syntax`] for unbalanced parentheses, unterminated quotes
/// and misplaced `:` separators.
pub fn parse(input: &str) -> Result<Vec<Link>> {
    Parser::new(input).parse_document()
}

struct Frame {
    link: Link,
    line: usize,
    col: usize,
}

struct Parser<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            input,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn error(&self, msg: &str) -> Error {
        Error::syntax(self.line, self.column, msg)
    }

    fn parse_document(&mut self) -> Result<Vec<Link>> {
        let mut output = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            self.skip_whitespace();
            let Some(ch) = self.peek_char() else {
                break;
            };

            match ch {
                '(' => {
                    stack.push(Frame {
                        link: Link::default(),
                        line: self.line,
                        col: self.column,
                    });
                    self.next_char();
                }
                ')' => {
                    let frame = stack.pop().ok_or_else(|| self.error("unbalanced ')'"))?;
                    if frame.link.id.is_some() && frame.link.values.is_empty() {
                        return Err(Error::syntax(frame.line, frame.col, "label without values"));
                    }
                    self.next_char();
                    attach(&mut stack, &mut output, frame.link);
                }
                ':' => return Err(self.error("unexpected ':' outside a link id")),
                _ => {
                    let id = self.parse_reference()?;
                    let opens_frame = stack
                        .last()
                        .is_some_and(|top| top.link.id.is_none() && top.link.values.is_empty());
                    if opens_frame {
                        self.skip_whitespace();
                        if self.peek_char() == Some(':') {
                            self.next_char();
                            if let Some(top) = stack.last_mut() {
                                top.link.id = Some(id);
                            }
                            continue;
                        }
                    }
                    attach(&mut stack, &mut output, Link::leaf(id));
                }
            }
        }

        if let Some(open) = stack.pop() {
            return Err(Error::syntax(open.line, open.col, "unclosed '('"));
        }

        Ok(output)
    }

    fn parse_reference(&mut self) -> Result<String> {
        match self.peek_char() {
            Some(quote @ ('"' | '\'')) => self.parse_quoted(quote),
            _ => {
                let start = self.position;
                while let Some(ch) = self.peek_char() {
                    if ch.is_whitespace() || is_special(ch) {
                        break;
                    }
                    self.next_char();
                }
                Ok(self.input[start..self.position].to_string())
            }
        }
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String> {
        let (line, col) = (self.line, self.column);
        self.next_char();
        let mut text = String::new();
        loop {
            match self.next_char() {
                Some(ch) if ch == quote => {
                    if self.peek_char() == Some(quote) {
                        self.next_char();
                        text.push(quote);
                    } else {
                        return Ok(text);
                    }
                }
                Some(ch) => text.push(ch),
                None => return Err(Error::syntax(line, col, "unterminated quoted reference")),
            }
        }
    }
}

fn attach(stack: &mut [Frame], output: &mut Vec<Link>, link: Link) {
    match stack.last_mut() {
        Some(parent) => parent.link.values.push(link),
        None => output.push(link),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str) -> Link {
        Link::leaf(id)
    }

    #[test]
    fn test_render_shapes() {
        assert_eq!(leaf("obj_0").to_string(), "obj_0");
        assert_eq!(Link::node(vec![]).to_string(), "()");
        assert_eq!(
            Link::node(vec![leaf("str"), leaf("aGk=")]).to_string(),
            "(str aGk=)"
        );
        assert_eq!(
            Link::with_id("pair", vec![leaf("a"), leaf("b")]).to_string(),
            "(pair: a b)"
        );
    }

    #[test]
    fn test_render_quotes_special_ids() {
        assert_eq!(leaf("two words").to_string(), "\"two words\"");
        assert_eq!(leaf("say \"hi\"").to_string(), "\"say \"\"hi\"\"\"");
        assert_eq!(leaf("").to_string(), "\"\"");
        assert_eq!(leaf("a:b").to_string(), "\"a:b\"");
    }

    #[test]
    fn test_parse_nested() {
        let parsed = parse("(object obj_0 ((str a) (int 1)))").unwrap();
        let expected = Link::node(vec![
            leaf("object"),
            leaf("obj_0"),
            Link::node(vec![
                Link::node(vec![leaf("str"), leaf("a")]),
                Link::node(vec![leaf("int"), leaf("1")]),
            ]),
        ]);
        assert_eq!(parsed, vec![expected]);
    }

    #[test]
    fn test_parse_labeled_node() {
        let parsed = parse("(pair: a b)").unwrap();
        assert_eq!(parsed, vec![Link::with_id("pair", vec![leaf("a"), leaf("b")])]);
    }

    #[test]
    fn test_parse_quoted_roundtrip() {
        for id in ["two words", "say \"hi\"", "", "(x)", "it's"] {
            let link = Link::node(vec![leaf("str"), leaf(id)]);
            let parsed = parse(&link.to_string()).unwrap();
            assert_eq!(parsed, vec![link]);
        }
        assert_eq!(parse("'single quoted'").unwrap(), vec![leaf("single quoted")]);
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("  \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_multiple_top_level() {
        let links = [leaf("a"), Link::node(vec![leaf("b"), leaf("c")])];
        let text = format_links(&links);
        assert_eq!(parse(&text).unwrap(), links.to_vec());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse("(a b"), Err(Error::Syntax { line: 1, col: 1, .. })));
        assert!(matches!(parse("a)"), Err(Error::Syntax { .. })));
        assert!(matches!(parse("(a \"b)"), Err(Error::Syntax { .. })));
        assert!(matches!(parse("(a b: c)"), Err(Error::Syntax { .. })));
        assert!(matches!(parse("(x:)"), Err(Error::Syntax { line: 1, col: 1, .. })));
        assert!(matches!(parse("(a (x: ))"), Err(Error::Syntax { line: 1, col: 4, .. })));
    }

    #[test]
    fn test_labeled_nodes_render_as_parsed() {
        for text in ["(x: a)", "(x: a b)", "(x: (y: z))", "x", "()"] {
            let links = parse(text).unwrap();
            assert_eq!(format_links(&links), text);
            assert_eq!(parse(&format_links(&links)).unwrap(), links);
        }
    }

    #[test]
    fn test_parse_reports_line_and_column() {
        match parse("(a\n  b))") {
            Err(Error::Syntax { line, col, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(col, 5);
            }
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_deep_nesting_is_iterative() {
        let depth = 100_000;
        let text = format!("{}{}", "(".repeat(depth), ")".repeat(depth));
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        drop(parsed);
    }
}
