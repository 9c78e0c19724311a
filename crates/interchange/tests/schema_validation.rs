//! Validates serializer output against the formal migration schema at
//! schema/migration-schema.json.

use instar_core::{Action, Expr, Migration, Optic, Value};
use instar_interchange::migration_to_json;
use std::path::Path;

fn compiled_schema() -> jsonschema::Validator {
    let schema_path =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schema/migration-schema.json");
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e))
}

fn kitchen_sink() -> Migration {
    Migration::from_actions(vec![
        Action::Rename {
            at: Optic::root().field("customer"),
            from: "zip".to_string(),
            to: "postal_code".to_string(),
        },
        Action::AddField {
            at: Optic::root(),
            name: "totals".to_string(),
            default: Expr::literal(Value::record([
                ("count", Value::int(0)),
                ("sum", Value::decimal("0.00".parse().unwrap())),
            ])),
        },
        Action::DropField {
            at: Optic::root(),
            name: "legacy_flag".to_string(),
            captured: Expr::literal(Value::bool(false)),
        },
        Action::TransformValue {
            at: Optic::root().field("status").case("Active").wrapped(),
            expr: Expr::Identity,
        },
        Action::ChangeType {
            at: Optic::root().field("age"),
            forward: Expr::combine("int_to_text", 1),
            backward: Expr::combine("text_to_int", 1),
        },
        Action::Optionalize {
            at: Optic::root().field("nickname"),
        },
        Action::Mandate {
            at: Optic::root().field("email"),
            if_none: Expr::no_mandate_default(),
        },
        Action::RenameCase {
            at: Optic::root().field("payment"),
            from: "CreditCard".to_string(),
            to: "Card".to_string(),
        },
        Action::Join {
            at: Optic::root().field("full_name"),
            sources: vec![
                Optic::root().field("first_name"),
                Optic::root().field("last_name"),
            ],
            combiner: Expr::combine("concat_space", 2),
        },
        Action::Split {
            at: Optic::root().field("full name"),
            targets: vec![Optic::root().field("first"), Optic::root().field("last")],
            splitter: Expr::distribute("concat_space", 2),
        },
        Action::TransformElements {
            at: Optic::root().field("items"),
            inner: Migration::from_actions(vec![
                Action::Rename {
                    at: Optic::root(),
                    from: "qty".to_string(),
                    to: "quantity".to_string(),
                },
                Action::TransformElements {
                    at: Optic::root().field("tags"),
                    inner: Migration::single(Action::TransformValue {
                        at: Optic::root(),
                        expr: Expr::combine("to_text", 1),
                    }),
                },
            ]),
        },
    ])
}

#[test]
fn validate_serialized_migrations_against_schema() {
    let validator = compiled_schema();

    let sink = kitchen_sink();
    let documents = vec![
        ("empty", migration_to_json(&Migration::empty())),
        ("kitchen_sink", migration_to_json(&sink)),
        ("kitchen_sink_reversed", migration_to_json(&sink.reverse())),
        (
            "deep_values",
            migration_to_json(&Migration::single(Action::AddField {
                at: Optic::root(),
                name: "payload".to_string(),
                default: Expr::literal(Value::record([
                    ("unit", Value::unit()),
                    ("opt", Value::some(Value::text("x"))),
                    ("missing", Value::none()),
                    (
                        "rows",
                        Value::sequence(vec![
                            Value::record([("n", Value::int(-3))]),
                            Value::record([("n", Value::int(14))]),
                        ]),
                    ),
                ])),
            })),
        ),
    ];

    let mut failures = Vec::new();
    for (name, doc) in &documents {
        if let Err(error) = validator.validate(doc) {
            failures.push(format!("{}: {}", name, error));
        }
    }

    assert!(
        failures.is_empty(),
        "Schema validation failed for {} of {} documents:\n{}",
        failures.len(),
        documents.len(),
        failures.join("\n")
    );
}

#[test]
fn schema_rejects_action_without_anchor() {
    let validator = compiled_schema();
    let doc = serde_json::json!({
        "format_version": "1.0",
        "kind": "migration",
        "actions": [ { "kind": "optionalize" } ],
    });
    assert!(!validator.is_valid(&doc));
}

#[test]
fn schema_rejects_float_literals() {
    let validator = compiled_schema();
    let doc = serde_json::json!({
        "format_version": "1.0",
        "kind": "migration",
        "actions": [ {
            "kind": "transform_value",
            "at": "price",
            "expr": { "kind": "literal", "value": { "kind": "int_value", "value": 1.5 } },
        } ],
    });
    assert!(!validator.is_valid(&doc));
}

#[test]
fn schema_rejects_unversioned_documents() {
    let validator = compiled_schema();
    let doc = serde_json::json!({ "kind": "migration", "actions": [] });
    assert!(!validator.is_valid(&doc));
}
