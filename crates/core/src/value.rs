//! Untyped value trees that migrations operate on.

use rust_decimal::Decimal;

// ──────────────────────────────────────────────
// Scalars
// ──────────────────────────────────────────────

/// A leaf scalar. All numeric values use `rust_decimal::Decimal` or `i64` --
/// never `f64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Unit,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
}

impl Scalar {
    /// Returns a human-readable kind name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Unit => "Unit",
            Scalar::Bool(_) => "Bool",
            Scalar::Int(_) => "Int",
            Scalar::Decimal(_) => "Decimal",
            Scalar::Text(_) => "Text",
        }
    }
}

// ──────────────────────────────────────────────
// Value trees
// ──────────────────────────────────────────────

/// The untyped, self-describing representation of structured data.
///
/// Values are immutable and acyclic. Record fields keep their declared order
/// (stable re-encoding depends on it) but are always matched by name, never
/// by position. Every transformation builds a new tree; nothing is edited in
/// place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Primitive(Scalar),
    /// Labeled product. Field names are unique within one record.
    Record(Vec<(String, Value)>),
    /// Labeled sum with exactly one active case.
    Variant { tag: String, payload: Box<Value> },
    /// Ordered, repeatable collection. Length and order matter.
    Sequence(Vec<Value>),
}

impl Value {
    pub fn unit() -> Value {
        Value::Primitive(Scalar::Unit)
    }

    pub fn bool(b: bool) -> Value {
        Value::Primitive(Scalar::Bool(b))
    }

    pub fn int(i: i64) -> Value {
        Value::Primitive(Scalar::Int(i))
    }

    pub fn decimal(d: Decimal) -> Value {
        Value::Primitive(Scalar::Decimal(d))
    }

    pub fn text(t: impl Into<String>) -> Value {
        Value::Primitive(Scalar::Text(t.into()))
    }

    pub fn record<S, I>(fields: I) -> Value
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Value)>,
    {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn sequence(elements: impl IntoIterator<Item = Value>) -> Value {
        Value::Sequence(elements.into_iter().collect())
    }

    pub fn variant(tag: impl Into<String>, payload: Value) -> Value {
        Value::Variant {
            tag: tag.into(),
            payload: Box::new(payload),
        }
    }

    /// The optional-presence marker: `Variant("Some", v)`.
    pub fn some(payload: Value) -> Value {
        Value::variant("Some", payload)
    }

    /// The optional-absence marker: `Variant("None", unit)`.
    pub fn none() -> Value {
        Value::variant("None", Value::unit())
    }

    /// Returns a human-readable kind name for error messages. Primitives
    /// report their scalar kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Primitive(s) => s.kind_name(),
            Value::Record(_) => "Record",
            Value::Variant { .. } => "Variant",
            Value::Sequence(_) => "Sequence",
        }
    }

    /// Record fields in declared order, or `None` for non-records.
    pub fn as_record(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Looks up a record field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_record()?
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}
