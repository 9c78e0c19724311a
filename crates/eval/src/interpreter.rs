//! The migration interpreter: a strict, fail-fast left fold over actions.

use instar_core::{Action, Migration, Optic, Segment, Value};

use crate::error::ApplyError;
use crate::navigate::{edit_at, fetch};
use crate::registry::{eval_distribute, eval_expr, FunctionRegistry};

/// Apply a migration to a value.
///
/// Actions run in list order, each one receiving the previous action's
/// output. The first failure aborts the fold and is returned wrapped with
/// the index of the failing action and its anchor path; the input value is
/// never touched, so a failed application leaves the caller holding exactly
/// what it started with. Pure: no state survives between calls.
pub fn apply(
    migration: &Migration,
    value: &Value,
    registry: &FunctionRegistry,
) -> Result<Value, ApplyError> {
    let mut current = value.clone();
    for (index, action) in migration.iter().enumerate() {
        current = apply_action(action, &current, registry).map_err(|source| ApplyError::Step {
            index,
            at: anchor_text(action.anchor()),
            source: Box::new(source),
        })?;
    }
    Ok(current)
}

/// The root optic displays as the empty string; diagnostics call it `root`.
fn anchor_text(at: &Optic) -> String {
    if at.is_root() {
        "root".to_string()
    } else {
        at.to_string()
    }
}

fn apply_action(
    action: &Action,
    value: &Value,
    registry: &FunctionRegistry,
) -> Result<Value, ApplyError> {
    match action {
        Action::Rename { at, from, to } => edit_at(value, at.segments(), &mut |v| {
            rename_field(v, from, to)
        }),
        Action::AddField { at, name, default } => edit_at(value, at.segments(), &mut |v| {
            let fields = as_record(v)?;
            if v.field(name).is_some() {
                return Err(ApplyError::FieldAlreadyExists { name: name.clone() });
            }
            let mut out = fields.to_vec();
            out.push((name.clone(), eval_expr(default, &[], registry)?));
            Ok(Value::Record(out))
        }),
        Action::DropField { at, name, .. } => edit_at(value, at.segments(), &mut |v| {
            let fields = as_record(v)?;
            if v.field(name).is_none() {
                return Err(ApplyError::PathNotFound {
                    segment: format!("field '{}'", name),
                    found: v.kind_name().to_string(),
                });
            }
            Ok(Value::Record(
                fields.iter().filter(|(k, _)| k != name).cloned().collect(),
            ))
        }),
        Action::TransformValue { at, expr } => edit_at(value, at.segments(), &mut |v| {
            eval_expr(expr, std::slice::from_ref(v), registry)
        }),
        Action::ChangeType { at, forward, .. } => edit_at(value, at.segments(), &mut |v| {
            eval_expr(forward, std::slice::from_ref(v), registry)
        }),
        Action::Optionalize { at } => {
            edit_at(value, at.segments(), &mut |v| Ok(Value::some(v.clone())))
        }
        Action::Mandate { at, if_none } => edit_at(value, at.segments(), &mut |v| match v {
            Value::Variant { tag, payload } if tag == "Some" => Ok((**payload).clone()),
            Value::Variant { tag, .. } if tag == "None" => eval_expr(if_none, &[], registry),
            other => Err(ApplyError::ShapeMismatch {
                expected: "Some/None variant".to_string(),
                found: describe_variant(other),
            }),
        }),
        Action::RenameCase { at, from, to } => edit_at(value, at.segments(), &mut |v| match v {
            Value::Variant { tag, payload } if tag == from => Ok(Value::Variant {
                tag: to.clone(),
                payload: payload.clone(),
            }),
            // Any other tag is simply not this case; leave it alone.
            Value::Variant { .. } => Ok(v.clone()),
            other => Err(ApplyError::ShapeMismatch {
                expected: "Variant".to_string(),
                found: other.kind_name().to_string(),
            }),
        }),
        Action::Join {
            at,
            sources,
            combiner,
        } => {
            let (container, name) = field_anchor(at)?;
            edit_at(value, container.segments(), &mut |record| {
                let fields = as_record(record)?;
                if record.field(&name).is_some() {
                    return Err(ApplyError::FieldAlreadyExists { name: name.clone() });
                }
                let inputs = sources
                    .iter()
                    .map(|source| fetch(record, source.segments()).cloned())
                    .collect::<Result<Vec<Value>, ApplyError>>()?;
                let joined = eval_expr(combiner, &inputs, registry)?;
                let mut out = fields.to_vec();
                out.push((name.clone(), joined));
                Ok(Value::Record(out))
            })
        }
        Action::Split {
            at,
            targets,
            splitter,
        } => {
            let (container, name) = field_anchor(at)?;
            edit_at(value, container.segments(), &mut |record| {
                as_record(record)?;
                let source = record
                    .field(&name)
                    .ok_or_else(|| ApplyError::PathNotFound {
                        segment: format!("field '{}'", name),
                        found: record.kind_name().to_string(),
                    })?
                    .clone();
                let parts = eval_distribute(splitter, &source, targets.len(), registry)?;
                let mut out = record.clone();
                for (target, part) in targets.iter().zip(parts) {
                    out = upsert_at(&out, target, part)?;
                }
                Ok(out)
            })
        }
        Action::TransformElements { at, inner } => edit_at(value, at.segments(), &mut |v| {
            let Value::Sequence(items) = v else {
                return Err(ApplyError::ShapeMismatch {
                    expected: "Sequence".to_string(),
                    found: v.kind_name().to_string(),
                });
            };
            let elements = items
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    apply(inner, element, registry).map_err(|source| ApplyError::Element {
                        index,
                        source: Box::new(source),
                    })
                })
                .collect::<Result<Vec<Value>, ApplyError>>()?;
            Ok(Value::Sequence(elements))
        }),
    }
}

fn rename_field(v: &Value, from: &str, to: &str) -> Result<Value, ApplyError> {
    let fields = as_record(v)?;
    if v.field(from).is_none() {
        return Err(ApplyError::PathNotFound {
            segment: format!("field '{}'", from),
            found: v.kind_name().to_string(),
        });
    }
    if from != to && v.field(to).is_some() {
        return Err(ApplyError::FieldAlreadyExists {
            name: to.to_string(),
        });
    }
    Ok(Value::Record(
        fields
            .iter()
            .map(|(k, value)| {
                let key = if k == from { to.to_string() } else { k.clone() };
                (key, value.clone())
            })
            .collect(),
    ))
}

/// `Join` and `Split` anchor at the joined/split field: the last segment must
/// name it, and the rest of the path addresses the containing record.
fn field_anchor(at: &Optic) -> Result<(Optic, String), ApplyError> {
    match at.split_last() {
        Some((container, Segment::Field(name))) => Ok((container, name.clone())),
        _ => Err(ApplyError::ShapeMismatch {
            expected: "an anchor ending in a field segment".to_string(),
            found: anchor_text(at),
        }),
    }
}

/// Write `part` at `target`, inserting the final field if it is absent.
fn upsert_at(record: &Value, target: &Optic, part: Value) -> Result<Value, ApplyError> {
    if let Some((parent, Segment::Field(name))) = target.split_last() {
        return edit_at(record, parent.segments(), &mut |v| {
            let fields = as_record(v)?;
            let mut out = fields.to_vec();
            match out.iter_mut().find(|(k, _)| k == name) {
                Some((_, slot)) => *slot = part.clone(),
                None => out.push((name.to_string(), part.clone())),
            }
            Ok(Value::Record(out))
        });
    }
    // Non-field targets must already resolve; they are replaced in place.
    edit_at(record, target.segments(), &mut |_| Ok(part.clone()))
}

fn as_record(v: &Value) -> Result<&[(String, Value)], ApplyError> {
    v.as_record().ok_or_else(|| ApplyError::ShapeMismatch {
        expected: "Record".to_string(),
        found: v.kind_name().to_string(),
    })
}

fn describe_variant(v: &Value) -> String {
    match v {
        Value::Variant { tag, .. } => format!("Variant '{}'", tag),
        other => other.kind_name().to_string(),
    }
}
