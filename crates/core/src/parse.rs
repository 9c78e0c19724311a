//! Textual path syntax.
//!
//! Grammar, informally: segments joined by `.`, bracket segments attach
//! directly. `items[*].name` broadcasts over a sequence, `orders[0]` indexes
//! one element, `payment.when[CreditCard]` asserts a variant tag, `wrapped`
//! descends through a single-field wrapper, and `['first name']` is the
//! quoted form for field names that are not plain identifiers or that
//! collide with the reserved words `when`, `wrapped`, `each`. `each` is an
//! accepted alias for `[*]`; the canonical render always uses `[*]`.

use std::fmt;
use std::str::FromStr;

use crate::optic::{Optic, Segment};

/// A rejected path string, with the byte offset where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParseError {
    pub offset: usize,
    pub message: String,
}

impl fmt::Display for PathParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid path at offset {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for PathParseError {}

impl Optic {
    /// Parses the textual path syntax. The empty string is the root optic.
    pub fn parse(src: &str) -> Result<Optic, PathParseError> {
        let src = src.trim();
        let mut cur = Cursor { src, pos: 0 };
        let mut segments = Vec::new();

        if cur.peek().is_none() {
            return Ok(Optic::root());
        }
        if cur.peek() == Some('[') {
            parse_bracket(&mut cur, &mut segments)?;
        } else {
            parse_word(&mut cur, &mut segments)?;
        }
        loop {
            match cur.peek() {
                None => break,
                Some('.') => {
                    cur.bump();
                    parse_word(&mut cur, &mut segments)?;
                }
                Some('[') => parse_bracket(&mut cur, &mut segments)?,
                Some(c) => {
                    return Err(cur.error(format!("expected '.' or '[', found '{}'", c)))
                }
            }
        }
        Ok(Optic::from_segments(segments))
    }
}

impl FromStr for Optic {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Optic, PathParseError> {
        Optic::parse(s)
    }
}

// ──────────────────────────────────────────────
// Cursor
// ──────────────────────────────────────────────

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, want: char) -> Result<(), PathParseError> {
        match self.peek() {
            Some(c) if c == want => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", want, c))),
            None => Err(self.error(format!("expected '{}', found end of input", want))),
        }
    }

    fn error(&self, message: impl Into<String>) -> PathParseError {
        PathParseError {
            offset: self.pos,
            message: message.into(),
        }
    }
}

// ──────────────────────────────────────────────
// Segment parsers
// ──────────────────────────────────────────────

fn read_ident(cur: &mut Cursor) -> String {
    let mut out = String::new();
    if matches!(cur.peek(), Some(c) if c.is_ascii_alphabetic() || c == '_') {
        while let Some(c) = cur.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                out.push(c);
                cur.bump();
            } else {
                break;
            }
        }
    }
    out
}

fn parse_word(cur: &mut Cursor, segments: &mut Vec<Segment>) -> Result<(), PathParseError> {
    let start = cur.pos;
    let word = read_ident(cur);
    if word.is_empty() {
        return Err(PathParseError {
            offset: start,
            message: "expected a path segment".to_string(),
        });
    }
    match word.as_str() {
        "when" => {
            cur.expect('[')?;
            let tag = if cur.peek() == Some('\'') {
                read_quoted(cur)?
            } else {
                let at = cur.pos;
                let tag = read_ident(cur);
                if tag.is_empty() {
                    return Err(PathParseError {
                        offset: at,
                        message: "expected a case tag".to_string(),
                    });
                }
                tag
            };
            cur.expect(']')?;
            segments.push(Segment::Case(tag));
        }
        "wrapped" => segments.push(Segment::Wrapped),
        "each" => segments.push(Segment::Elements),
        _ => segments.push(Segment::Field(word)),
    }
    Ok(())
}

fn parse_bracket(cur: &mut Cursor, segments: &mut Vec<Segment>) -> Result<(), PathParseError> {
    cur.expect('[')?;
    match cur.peek() {
        Some('*') => {
            cur.bump();
            cur.expect(']')?;
            segments.push(Segment::Elements);
        }
        Some(c) if c.is_ascii_digit() => {
            let at = cur.pos;
            let mut digits = String::new();
            while let Some(d) = cur.peek() {
                if d.is_ascii_digit() {
                    digits.push(d);
                    cur.bump();
                } else {
                    break;
                }
            }
            let index = digits.parse::<usize>().map_err(|_| PathParseError {
                offset: at,
                message: format!("index '{}' is out of range", digits),
            })?;
            cur.expect(']')?;
            segments.push(Segment::AtIndex(index));
        }
        Some('\'') => {
            let name = read_quoted(cur)?;
            cur.expect(']')?;
            segments.push(Segment::Field(name));
        }
        Some(c) => {
            return Err(cur.error(format!(
                "expected '*', an index, or a quoted name, found '{}'",
                c
            )))
        }
        None => return Err(cur.error("unterminated '['")),
    }
    Ok(())
}

fn read_quoted(cur: &mut Cursor) -> Result<String, PathParseError> {
    cur.expect('\'')?;
    let mut out = String::new();
    loop {
        match cur.bump() {
            None => return Err(cur.error("unterminated quoted name")),
            Some('\'') => return Ok(out),
            Some('\\') => match cur.bump() {
                Some('\'') => out.push('\''),
                Some('\\') => out.push('\\'),
                Some(c) => {
                    return Err(PathParseError {
                        offset: cur.pos - c.len_utf8(),
                        message: format!("unsupported escape '\\{}'", c),
                    })
                }
                None => return Err(cur.error("unterminated quoted name")),
            },
            Some(c) => out.push(c),
        }
    }
}
