//! Paths addressing one or more locations inside a value tree.

use std::fmt;

// ──────────────────────────────────────────────
// Segments
// ──────────────────────────────────────────────

/// One navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Descend into a named record field.
    Field(String),
    /// Assert the variant tag and descend into its payload.
    Case(String),
    /// Address every element of a sequence (broadcast).
    Elements,
    /// Address one sequence element by position.
    AtIndex(usize),
    /// Descend through a single-field wrapper record.
    Wrapped,
}

// ──────────────────────────────────────────────
// Optics
// ──────────────────────────────────────────────

/// An ordered list of segments. The empty optic addresses the root value.
///
/// Built with the chainable constructors, or parsed from the textual syntax
/// (see `parse`). `Display` renders the canonical text, so optics round-trip
/// through their string form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Optic {
    segments: Vec<Segment>,
}

impl Optic {
    /// The empty optic, addressing the root value itself.
    pub fn root() -> Optic {
        Optic::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Optic {
        Optic { segments }
    }

    pub fn field(mut self, name: impl Into<String>) -> Optic {
        self.segments.push(Segment::Field(name.into()));
        self
    }

    pub fn case(mut self, tag: impl Into<String>) -> Optic {
        self.segments.push(Segment::Case(tag.into()));
        self
    }

    pub fn elements(mut self) -> Optic {
        self.segments.push(Segment::Elements);
        self
    }

    pub fn at_index(mut self, index: usize) -> Optic {
        self.segments.push(Segment::AtIndex(index));
        self
    }

    pub fn wrapped(mut self) -> Optic {
        self.segments.push(Segment::Wrapped);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Everything but the last segment, and the last segment. `None` for the
    /// root optic.
    pub fn split_last(&self) -> Option<(Optic, &Segment)> {
        let (last, rest) = self.segments.split_last()?;
        Some((Optic::from_segments(rest.to_vec()), last))
    }

    /// This optic followed by all of `other`'s segments.
    pub fn concat(&self, other: &Optic) -> Optic {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Optic { segments }
    }
}

// Reserved words in segment position; fields with these names (or names that
// are not plain identifiers) render in the quoted bracket form.
pub(crate) const RESERVED_WORDS: [&str; 3] = ["when", "wrapped", "each"];

pub(crate) fn is_plain_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let leading_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    leading_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RESERVED_WORDS.contains(&s)
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "['")?;
    for c in s.chars() {
        match c {
            '\'' => write!(f, "\\'")?,
            '\\' => write!(f, "\\\\")?,
            other => write!(f, "{}", other)?,
        }
    }
    write!(f, "']")
}

impl fmt::Display for Optic {
    /// Canonical textual form: `items[*].name`, `payment.when[CreditCard]`,
    /// `['first name']`, `total.wrapped`. The root optic renders as the
    /// empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            match segment {
                Segment::Field(name) if is_plain_ident(name) => {
                    if !first {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                Segment::Field(name) => write_quoted(f, name)?,
                Segment::Case(tag) => {
                    if !first {
                        write!(f, ".")?;
                    }
                    if is_plain_ident(tag) {
                        write!(f, "when[{}]", tag)?;
                    } else {
                        write!(f, "when")?;
                        write_quoted(f, tag)?;
                    }
                }
                Segment::Elements => write!(f, "[*]")?,
                Segment::AtIndex(i) => write!(f, "[{}]", i)?,
                Segment::Wrapped => {
                    if !first {
                        write!(f, ".")?;
                    }
                    write!(f, "wrapped")?;
                }
            }
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_renders_empty() {
        assert_eq!(Optic::root().to_string(), "");
        assert!(Optic::root().is_root());
    }

    #[test]
    fn builder_chains_in_order() {
        let o = Optic::root().field("items").elements().field("name");
        assert_eq!(
            o.segments(),
            &[
                Segment::Field("items".into()),
                Segment::Elements,
                Segment::Field("name".into()),
            ]
        );
        assert_eq!(o.to_string(), "items[*].name");
    }

    #[test]
    fn case_and_wrapped_render_as_keywords() {
        let o = Optic::root().field("payment").case("CreditCard").field("number");
        assert_eq!(o.to_string(), "payment.when[CreditCard].number");
        let w = Optic::root().field("total").wrapped();
        assert_eq!(w.to_string(), "total.wrapped");
    }

    #[test]
    fn awkward_names_render_quoted() {
        assert_eq!(
            Optic::root().field("first name").to_string(),
            "['first name']"
        );
        // Reserved words only reach field position through the quoted form.
        assert_eq!(Optic::root().field("when").to_string(), "['when']");
        assert_eq!(
            Optic::root().field("it's").to_string(),
            r"['it\'s']"
        );
    }

    #[test]
    fn index_attaches_without_dot() {
        let o = Optic::root().field("orders").at_index(0).field("total");
        assert_eq!(o.to_string(), "orders[0].total");
    }

    #[test]
    fn split_last_peels_one_segment() {
        let o = Optic::root().field("a").field("b");
        let (parent, last) = o.split_last().unwrap();
        assert_eq!(parent, Optic::root().field("a"));
        assert_eq!(last, &Segment::Field("b".into()));
        assert!(Optic::root().split_last().is_none());
    }

    #[test]
    fn concat_joins_segment_lists() {
        let a = Optic::root().field("user");
        let b = Optic::root().field("name");
        assert_eq!(a.concat(&b), Optic::root().field("user").field("name"));
        assert_eq!(Optic::root().concat(&b), b);
    }
}
