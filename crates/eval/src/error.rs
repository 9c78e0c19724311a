//! Errors produced while applying a migration.

use std::fmt;

/// Errors that can occur while applying a migration to a value.
///
/// The interpreter wraps each failure in a [`ApplyError::Step`] carrying the
/// index of the failing action and its anchor path; failures inside a
/// `TransformElements` are additionally wrapped in [`ApplyError::Element`]
/// with the element index, so a nested error reads as a breadcrumb trail down
/// to the exact edit that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// A `Field`, `AtIndex`, or `Wrapped` step could not resolve.
    PathNotFound { segment: String, found: String },
    /// `AddField` (or a rename target) collides with an existing field.
    FieldAlreadyExists { name: String },
    /// A `Case` step found a variant with a different tag.
    TagMismatch { expected: String, found: String },
    /// An `AtIndex` step pointed past the end of a sequence.
    IndexOutOfBounds { index: usize, len: usize },
    /// The expression evaluator rejected an expression, including explicit
    /// `Fail` expressions and unknown or misused function ids.
    Expr {
        function: Option<String>,
        reason: String,
    },
    /// A value had the wrong shape for the action (e.g. `Mandate` on a
    /// non-optional variant, `TransformElements` on a non-sequence).
    ShapeMismatch { expected: String, found: String },
    /// A failure at one element of a sequence broadcast.
    Element { index: usize, source: Box<ApplyError> },
    /// A failure at one action of a migration.
    Step {
        index: usize,
        at: String,
        source: Box<ApplyError>,
    },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyError::PathNotFound { segment, found } => {
                write!(f, "path not found: {} in {}", segment, found)
            }
            ApplyError::FieldAlreadyExists { name } => {
                write!(f, "field already exists: '{}'", name)
            }
            ApplyError::TagMismatch { expected, found } => {
                write!(f, "tag mismatch: expected '{}', found '{}'", expected, found)
            }
            ApplyError::IndexOutOfBounds { index, len } => {
                write!(f, "index {} out of bounds for sequence of {}", index, len)
            }
            ApplyError::Expr {
                function: Some(function),
                reason,
            } => {
                write!(f, "expression '{}' failed: {}", function, reason)
            }
            ApplyError::Expr {
                function: None,
                reason,
            } => {
                write!(f, "expression failed: {}", reason)
            }
            ApplyError::ShapeMismatch { expected, found } => {
                write!(f, "shape mismatch: expected {}, found {}", expected, found)
            }
            ApplyError::Element { index, source } => {
                write!(f, "element {}: {}", index, source)
            }
            ApplyError::Step { index, at, source } => {
                write!(f, "action {} at '{}': {}", index, at, source)
            }
        }
    }
}

impl std::error::Error for ApplyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplyError::Element { source, .. } | ApplyError::Step { source, .. } => {
                Some(source.as_ref())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breadcrumbs_read_outermost_first() {
        let err = ApplyError::Step {
            index: 2,
            at: "items".to_string(),
            source: Box::new(ApplyError::Element {
                index: 4,
                source: Box::new(ApplyError::PathNotFound {
                    segment: "field 'qty'".to_string(),
                    found: "Record".to_string(),
                }),
            }),
        };
        assert_eq!(
            err.to_string(),
            "action 2 at 'items': element 4: path not found: field 'qty' in Record"
        );
    }

    #[test]
    fn source_chains_through_wrappers() {
        use std::error::Error;
        let inner = ApplyError::FieldAlreadyExists {
            name: "age".to_string(),
        };
        let err = ApplyError::Step {
            index: 0,
            at: "root".to_string(),
            source: Box::new(inner.clone()),
        };
        let chained = err.source().unwrap();
        assert_eq!(chained.to_string(), inner.to_string());
        assert!(inner.source().is_none());
    }
}
