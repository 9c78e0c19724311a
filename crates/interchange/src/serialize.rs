//! Serialization of values, expressions, actions, and migrations to
//! interchange JSON.

use instar_core::{Action, Expr, Migration, Scalar, Value};
use serde_json::json;

/// Convert a value tree to its kind-tagged JSON form.
///
/// Record fields become an array of `{name, value}` pairs rather than a
/// JSON object: field order is part of the value, and JSON objects do not
/// reliably keep it.
pub fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Primitive(Scalar::Unit) => json!({ "kind": "unit_value" }),
        Value::Primitive(Scalar::Bool(b)) => json!({ "kind": "bool_value", "value": b }),
        Value::Primitive(Scalar::Int(i)) => json!({ "kind": "int_value", "value": i }),
        Value::Primitive(Scalar::Decimal(d)) => {
            json!({ "kind": "decimal_value", "value": d.to_string() })
        }
        Value::Primitive(Scalar::Text(t)) => json!({ "kind": "text_value", "value": t }),
        Value::Record(fields) => {
            let entries: Vec<serde_json::Value> = fields
                .iter()
                .map(|(name, value)| json!({ "name": name, "value": value_to_json(value) }))
                .collect();
            json!({ "kind": "record_value", "fields": entries })
        }
        Value::Variant { tag, payload } => json!({
            "kind": "variant_value",
            "tag": tag,
            "payload": value_to_json(payload),
        }),
        Value::Sequence(items) => {
            let elements: Vec<serde_json::Value> = items.iter().map(value_to_json).collect();
            json!({ "kind": "sequence_value", "elements": elements })
        }
    }
}

/// Convert an expression to its kind-tagged JSON form.
pub fn expr_to_json(e: &Expr) -> serde_json::Value {
    match e {
        Expr::Literal(v) => json!({ "kind": "literal", "value": value_to_json(v) }),
        Expr::Identity => json!({ "kind": "identity" }),
        Expr::Fail(reason) => json!({ "kind": "fail", "reason": reason }),
        Expr::Combine { function, arity } => {
            json!({ "kind": "combine", "function": function, "arity": arity })
        }
        Expr::Distribute { function, arity } => {
            json!({ "kind": "distribute", "function": function, "arity": arity })
        }
    }
}

/// Convert a single action to its kind-tagged JSON form. Paths are written
/// in their canonical text form; the root path is the empty string.
pub fn action_to_json(a: &Action) -> serde_json::Value {
    match a {
        Action::Rename { at, from, to } => json!({
            "kind": "rename_field",
            "at": at.to_string(),
            "from": from,
            "to": to,
        }),
        Action::AddField { at, name, default } => json!({
            "kind": "add_field",
            "at": at.to_string(),
            "name": name,
            "default": expr_to_json(default),
        }),
        Action::DropField { at, name, captured } => json!({
            "kind": "drop_field",
            "at": at.to_string(),
            "name": name,
            "captured": expr_to_json(captured),
        }),
        Action::TransformValue { at, expr } => json!({
            "kind": "transform_value",
            "at": at.to_string(),
            "expr": expr_to_json(expr),
        }),
        Action::ChangeType {
            at,
            forward,
            backward,
        } => json!({
            "kind": "change_type",
            "at": at.to_string(),
            "forward": expr_to_json(forward),
            "backward": expr_to_json(backward),
        }),
        Action::Optionalize { at } => json!({
            "kind": "optionalize",
            "at": at.to_string(),
        }),
        Action::Mandate { at, if_none } => json!({
            "kind": "mandate",
            "at": at.to_string(),
            "if_none": expr_to_json(if_none),
        }),
        Action::RenameCase { at, from, to } => json!({
            "kind": "rename_case",
            "at": at.to_string(),
            "from": from,
            "to": to,
        }),
        Action::Join {
            at,
            sources,
            combiner,
        } => json!({
            "kind": "join",
            "at": at.to_string(),
            "sources": sources.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            "combiner": expr_to_json(combiner),
        }),
        Action::Split {
            at,
            targets,
            splitter,
        } => json!({
            "kind": "split",
            "at": at.to_string(),
            "targets": targets.iter().map(|t| t.to_string()).collect::<Vec<_>>(),
            "splitter": expr_to_json(splitter),
        }),
        Action::TransformElements { at, inner } => json!({
            "kind": "transform_elements",
            "at": at.to_string(),
            "inner": inner.iter().map(action_to_json).collect::<Vec<_>>(),
        }),
    }
}

/// Serialize a whole migration into the versioned document envelope.
pub fn migration_to_json(m: &Migration) -> serde_json::Value {
    let actions: Vec<serde_json::Value> = m.iter().map(action_to_json).collect();
    json!({
        "format_version": crate::FORMAT_VERSION,
        "kind": "migration",
        "actions": actions,
    })
}
