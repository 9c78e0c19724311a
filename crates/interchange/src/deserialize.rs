//! Deserialization of interchange JSON documents back into migrations.
//!
//! The main entry point is [`migration_from_json`], which takes a
//! `&serde_json::Value` holding a full document and produces a
//! [`Migration`]. The per-node readers ([`value_from_json`],
//! [`expr_from_json`], [`action_from_json`]) are public for callers that
//! embed fragments in larger documents.
//!
//! Unknown kinds are rejected rather than skipped: a migration with an
//! action silently dropped would rewrite every value it touches wrongly.

use instar_core::{Action, Expr, Migration, Optic, Value};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::fmt;

/// Errors during interchange JSON deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterchangeError {
    /// A node is missing a required field.
    MissingField { field: String },
    /// A field is present but does not hold what it should.
    InvalidField { field: String, message: String },
    /// A node carries a `kind` tag this reader does not know.
    UnknownKind { kind: String },
    /// The document was written by an incompatible format version.
    UnsupportedVersion { found: String },
    /// An entry in the `actions` array failed to parse.
    ActionError {
        index: usize,
        kind: String,
        message: String,
    },
}

impl fmt::Display for InterchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterchangeError::MissingField { field } => {
                write!(f, "missing required field: '{}'", field)
            }
            InterchangeError::InvalidField { field, message } => {
                write!(f, "field '{}': {}", field, message)
            }
            InterchangeError::UnknownKind { kind } => {
                write!(f, "unknown kind: '{}'", kind)
            }
            InterchangeError::UnsupportedVersion { found } => {
                write!(
                    f,
                    "unsupported format version: '{}' (expected '{}')",
                    found,
                    crate::FORMAT_VERSION
                )
            }
            InterchangeError::ActionError {
                index,
                kind,
                message,
            } => {
                write!(f, "action {} ('{}'): {}", index, kind, message)
            }
        }
    }
}

impl std::error::Error for InterchangeError {}

/// Deserialize a full migration document.
///
/// Checks the envelope (`format_version`, `kind`) before touching the
/// `actions` array, and wraps any per-action failure with the action's
/// index and kind tag.
pub fn migration_from_json(doc: &serde_json::Value) -> Result<Migration, InterchangeError> {
    let version = required_str(doc, "format_version")?;
    if version != crate::FORMAT_VERSION {
        return Err(InterchangeError::UnsupportedVersion { found: version });
    }

    let kind = required_str(doc, "kind")?;
    if kind != "migration" {
        return Err(InterchangeError::UnknownKind { kind });
    }

    let entries = required_array(doc, "actions")?;
    let mut actions = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let kind = entry
            .get("kind")
            .and_then(|k| k.as_str())
            .unwrap_or("")
            .to_string();
        let action = action_from_json(entry).map_err(|e| InterchangeError::ActionError {
            index,
            kind,
            message: e.to_string(),
        })?;
        actions.push(action);
    }

    Ok(Migration::from_actions(actions))
}

/// Deserialize a single action node, dispatching on its `kind` tag.
pub fn action_from_json(a: &serde_json::Value) -> Result<Action, InterchangeError> {
    let kind = required_str(a, "kind")?;
    match kind.as_str() {
        "rename_field" => Ok(Action::Rename {
            at: parse_path(a, "at")?,
            from: required_str(a, "from")?,
            to: required_str(a, "to")?,
        }),
        "add_field" => Ok(Action::AddField {
            at: parse_path(a, "at")?,
            name: required_str(a, "name")?,
            default: expr_from_json(required_field(a, "default")?)?,
        }),
        "drop_field" => Ok(Action::DropField {
            at: parse_path(a, "at")?,
            name: required_str(a, "name")?,
            captured: expr_from_json(required_field(a, "captured")?)?,
        }),
        "transform_value" => Ok(Action::TransformValue {
            at: parse_path(a, "at")?,
            expr: expr_from_json(required_field(a, "expr")?)?,
        }),
        "change_type" => Ok(Action::ChangeType {
            at: parse_path(a, "at")?,
            forward: expr_from_json(required_field(a, "forward")?)?,
            backward: expr_from_json(required_field(a, "backward")?)?,
        }),
        "optionalize" => Ok(Action::Optionalize {
            at: parse_path(a, "at")?,
        }),
        "mandate" => Ok(Action::Mandate {
            at: parse_path(a, "at")?,
            if_none: expr_from_json(required_field(a, "if_none")?)?,
        }),
        "rename_case" => Ok(Action::RenameCase {
            at: parse_path(a, "at")?,
            from: required_str(a, "from")?,
            to: required_str(a, "to")?,
        }),
        "join" => Ok(Action::Join {
            at: parse_path(a, "at")?,
            sources: parse_path_list(a, "sources")?,
            combiner: expr_from_json(required_field(a, "combiner")?)?,
        }),
        "split" => Ok(Action::Split {
            at: parse_path(a, "at")?,
            targets: parse_path_list(a, "targets")?,
            splitter: expr_from_json(required_field(a, "splitter")?)?,
        }),
        "transform_elements" => {
            let inner = required_array(a, "inner")?
                .iter()
                .map(action_from_json)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Action::TransformElements {
                at: parse_path(a, "at")?,
                inner: Migration::from_actions(inner),
            })
        }
        other => Err(InterchangeError::UnknownKind {
            kind: other.to_string(),
        }),
    }
}

/// Deserialize a single expression node.
pub fn expr_from_json(e: &serde_json::Value) -> Result<Expr, InterchangeError> {
    let kind = required_str(e, "kind")?;
    match kind.as_str() {
        "literal" => Ok(Expr::Literal(value_from_json(required_field(e, "value")?)?)),
        "identity" => Ok(Expr::Identity),
        "fail" => Ok(Expr::fail(required_str(e, "reason")?)),
        "combine" => Ok(Expr::Combine {
            function: required_str(e, "function")?,
            arity: required_usize(e, "arity")?,
        }),
        "distribute" => Ok(Expr::Distribute {
            function: required_str(e, "function")?,
            arity: required_usize(e, "arity")?,
        }),
        other => Err(InterchangeError::UnknownKind {
            kind: other.to_string(),
        }),
    }
}

/// Deserialize a single value node.
///
/// Record field names must be distinct; a duplicate is an error here, not
/// a last-one-wins merge.
pub fn value_from_json(v: &serde_json::Value) -> Result<Value, InterchangeError> {
    let kind = required_str(v, "kind")?;
    match kind.as_str() {
        "unit_value" => Ok(Value::unit()),
        "bool_value" => required_field(v, "value")?
            .as_bool()
            .map(Value::bool)
            .ok_or_else(|| invalid("value", "expected a boolean")),
        "int_value" => required_field(v, "value")?
            .as_i64()
            .map(Value::int)
            .ok_or_else(|| invalid("value", "expected an integer")),
        "decimal_value" => {
            let text = required_str(v, "value")?;
            let d = text
                .parse::<Decimal>()
                .map_err(|e| invalid("value", &format!("invalid decimal '{}': {}", text, e)))?;
            Ok(Value::decimal(d))
        }
        "text_value" => Ok(Value::text(required_str(v, "value")?)),
        "record_value" => {
            let entries = required_array(v, "fields")?;
            let mut seen = BTreeSet::new();
            let mut fields = Vec::with_capacity(entries.len());
            for entry in entries {
                let name = required_str(entry, "name")?;
                if !seen.insert(name.clone()) {
                    return Err(invalid(
                        "fields",
                        &format!("duplicate record field '{}'", name),
                    ));
                }
                let value = value_from_json(required_field(entry, "value")?)?;
                fields.push((name, value));
            }
            Ok(Value::record(fields))
        }
        "variant_value" => Ok(Value::variant(
            required_str(v, "tag")?,
            value_from_json(required_field(v, "payload")?)?,
        )),
        "sequence_value" => {
            let items = required_array(v, "elements")?
                .iter()
                .map(value_from_json)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::sequence(items))
        }
        other => Err(InterchangeError::UnknownKind {
            kind: other.to_string(),
        }),
    }
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn invalid(field: &str, message: &str) -> InterchangeError {
    InterchangeError::InvalidField {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn required_field<'a>(
    obj: &'a serde_json::Value,
    field: &str,
) -> Result<&'a serde_json::Value, InterchangeError> {
    obj.get(field).ok_or_else(|| InterchangeError::MissingField {
        field: field.to_string(),
    })
}

fn required_str(obj: &serde_json::Value, field: &str) -> Result<String, InterchangeError> {
    required_field(obj, field)?
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| invalid(field, "expected a string"))
}

fn required_usize(obj: &serde_json::Value, field: &str) -> Result<usize, InterchangeError> {
    required_field(obj, field)?
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| invalid(field, "expected an unsigned integer"))
}

fn required_array<'a>(
    obj: &'a serde_json::Value,
    field: &str,
) -> Result<&'a Vec<serde_json::Value>, InterchangeError> {
    required_field(obj, field)?
        .as_array()
        .ok_or_else(|| invalid(field, "expected an array"))
}

fn parse_path(obj: &serde_json::Value, field: &str) -> Result<Optic, InterchangeError> {
    let text = required_str(obj, field)?;
    Optic::parse(&text).map_err(|e| invalid(field, &e.to_string()))
}

fn parse_path_list(obj: &serde_json::Value, field: &str) -> Result<Vec<Optic>, InterchangeError> {
    required_array(obj, field)?
        .iter()
        .map(|entry| {
            let text = entry
                .as_str()
                .ok_or_else(|| invalid(field, "expected an array of path strings"))?;
            Optic::parse(text).map_err(|e| invalid(field, &e.to_string()))
        })
        .collect()
}
