//! Copy-on-write navigation: locate the value(s) a path addresses and
//! rebuild the root with an edit applied there.
//!
//! Values are immutable trees, so "modify at path" is a structural recursion
//! that clones the untouched branches and rebuilds the spine down to the
//! edit. An `Elements` segment fans the rest of the path (and the edit) out
//! over every element of a sequence, collecting results positionally.

use instar_core::{Segment, Value};

use crate::error::ApplyError;

/// Rebuild `root` with `edit` applied at every location `segments` addresses.
pub(crate) fn edit_at<F>(root: &Value, segments: &[Segment], edit: &mut F) -> Result<Value, ApplyError>
where
    F: FnMut(&Value) -> Result<Value, ApplyError>,
{
    let Some((segment, rest)) = segments.split_first() else {
        return edit(root);
    };

    match (segment, root) {
        (Segment::Field(name), Value::Record(fields)) => {
            let mut out = Vec::with_capacity(fields.len());
            let mut found = false;
            for (key, value) in fields {
                if key == name {
                    found = true;
                    out.push((key.clone(), edit_at(value, rest, edit)?));
                } else {
                    out.push((key.clone(), value.clone()));
                }
            }
            if !found {
                return Err(ApplyError::PathNotFound {
                    segment: format!("field '{}'", name),
                    found: describe_record(fields),
                });
            }
            Ok(Value::Record(out))
        }
        (Segment::Field(name), other) => Err(ApplyError::PathNotFound {
            segment: format!("field '{}'", name),
            found: other.kind_name().to_string(),
        }),
        (Segment::Case(expected), Value::Variant { tag, payload }) => {
            if tag != expected {
                return Err(ApplyError::TagMismatch {
                    expected: expected.clone(),
                    found: tag.clone(),
                });
            }
            Ok(Value::Variant {
                tag: tag.clone(),
                payload: Box::new(edit_at(payload, rest, edit)?),
            })
        }
        (Segment::Case(_), other) => Err(ApplyError::ShapeMismatch {
            expected: "Variant".to_string(),
            found: other.kind_name().to_string(),
        }),
        (Segment::Elements, Value::Sequence(items)) => {
            let elements = items
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    edit_at(element, rest, edit).map_err(|source| ApplyError::Element {
                        index,
                        source: Box::new(source),
                    })
                })
                .collect::<Result<Vec<Value>, ApplyError>>()?;
            Ok(Value::Sequence(elements))
        }
        (Segment::Elements, other) => Err(ApplyError::ShapeMismatch {
            expected: "Sequence".to_string(),
            found: other.kind_name().to_string(),
        }),
        (Segment::AtIndex(index), Value::Sequence(items)) => {
            let Some(element) = items.get(*index) else {
                return Err(ApplyError::IndexOutOfBounds {
                    index: *index,
                    len: items.len(),
                });
            };
            let mut out = items.clone();
            out[*index] = edit_at(element, rest, edit)?;
            Ok(Value::Sequence(out))
        }
        (Segment::AtIndex(_), other) => Err(ApplyError::ShapeMismatch {
            expected: "Sequence".to_string(),
            found: other.kind_name().to_string(),
        }),
        (Segment::Wrapped, Value::Record(fields)) if fields.len() == 1 => {
            let (key, value) = &fields[0];
            Ok(Value::Record(vec![(
                key.clone(),
                edit_at(value, rest, edit)?,
            )]))
        }
        (Segment::Wrapped, other) => Err(ApplyError::PathNotFound {
            segment: "wrapped".to_string(),
            found: match other {
                Value::Record(fields) => describe_record(fields),
                _ => other.kind_name().to_string(),
            },
        }),
    }
}

/// Read the single value a path addresses. Broadcast (`Elements`) segments
/// are rejected: callers that fan out go through [`edit_at`].
pub(crate) fn fetch<'a>(root: &'a Value, segments: &[Segment]) -> Result<&'a Value, ApplyError> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(root);
    };

    match (segment, root) {
        (Segment::Field(name), Value::Record(fields)) => {
            let value = root.field(name).ok_or_else(|| ApplyError::PathNotFound {
                segment: format!("field '{}'", name),
                found: describe_record(fields),
            })?;
            fetch(value, rest)
        }
        (Segment::Field(name), other) => Err(ApplyError::PathNotFound {
            segment: format!("field '{}'", name),
            found: other.kind_name().to_string(),
        }),
        (Segment::Case(expected), Value::Variant { tag, payload }) => {
            if tag != expected {
                return Err(ApplyError::TagMismatch {
                    expected: expected.clone(),
                    found: tag.clone(),
                });
            }
            fetch(payload, rest)
        }
        (Segment::Case(_), other) => Err(ApplyError::ShapeMismatch {
            expected: "Variant".to_string(),
            found: other.kind_name().to_string(),
        }),
        (Segment::Elements, _) => Err(ApplyError::ShapeMismatch {
            expected: "a single location".to_string(),
            found: "[*] broadcast".to_string(),
        }),
        (Segment::AtIndex(index), Value::Sequence(items)) => {
            let element = items.get(*index).ok_or(ApplyError::IndexOutOfBounds {
                index: *index,
                len: items.len(),
            })?;
            fetch(element, rest)
        }
        (Segment::AtIndex(_), other) => Err(ApplyError::ShapeMismatch {
            expected: "Sequence".to_string(),
            found: other.kind_name().to_string(),
        }),
        (Segment::Wrapped, Value::Record(fields)) if fields.len() == 1 => {
            fetch(&fields[0].1, rest)
        }
        (Segment::Wrapped, other) => Err(ApplyError::PathNotFound {
            segment: "wrapped".to_string(),
            found: match other {
                Value::Record(fields) => describe_record(fields),
                _ => other.kind_name().to_string(),
            },
        }),
    }
}

fn describe_record(fields: &[(String, Value)]) -> String {
    let names: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
    format!("Record{{{}}}", names.join(", "))
}
