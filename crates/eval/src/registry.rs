//! Function registry: the swappable table of named function bodies that
//! expressions refer to.
//!
//! Actions carry expressions as plain data (a function id plus an arity);
//! the bodies live here and are resolved only at apply time. A combine body
//! takes N values to one, a distribute body takes one value to N. A pair
//! registered under the same id lets a reversed `Join` resolve the other
//! direction without renaming anything.

use std::collections::HashMap;

use instar_core::{Expr, Scalar, Value};
use rust_decimal::Decimal;

use crate::error::ApplyError;

/// A named N-to-one function body.
pub type CombineFn = Box<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// A named one-to-N function body. The body must return exactly the arity it
/// was registered with.
pub type DistributeFn = Box<dyn Fn(&Value) -> Result<Vec<Value>, String> + Send + Sync>;

#[derive(Default)]
struct Entry {
    combine: Option<(usize, CombineFn)>,
    distribute: Option<(usize, DistributeFn)>,
}

/// The table of function bodies available during one `apply` call.
///
/// Callers either start from [`FunctionRegistry::standard`] or build an empty
/// registry and register exactly the functions their migrations name.
/// Registering an id again replaces that direction's body.
#[derive(Default)]
pub struct FunctionRegistry {
    entries: HashMap<String, Entry>,
}

impl FunctionRegistry {
    /// A registry with no functions.
    pub fn empty() -> FunctionRegistry {
        FunctionRegistry::default()
    }

    /// The standard library: text joining/splitting and the scalar
    /// converters used by `ChangeType` pairs.
    pub fn standard() -> FunctionRegistry {
        let mut registry = FunctionRegistry::empty();

        registry.register_combine("concat_space", 2, |inputs| {
            let parts = texts(inputs)?;
            Ok(Value::text(parts.join(" ")))
        });
        registry.register_distribute("concat_space", 2, |input| {
            let whole = text(input)?;
            // The last part takes the remainder, so joining back is lossless
            // for two single-word parts.
            let (first, rest) = whole.split_once(' ').unwrap_or((whole, ""));
            Ok(vec![Value::text(first), Value::text(rest)])
        });

        registry.register_combine("concat", 2, |inputs| {
            let parts = texts(inputs)?;
            Ok(Value::text(parts.concat()))
        });

        registry.register_combine("to_text", 1, |inputs| {
            match &inputs[0] {
                Value::Primitive(Scalar::Text(t)) => Ok(Value::text(t.clone())),
                Value::Primitive(Scalar::Int(i)) => Ok(Value::text(i.to_string())),
                Value::Primitive(Scalar::Decimal(d)) => Ok(Value::text(d.to_string())),
                Value::Primitive(Scalar::Bool(b)) => Ok(Value::text(b.to_string())),
                Value::Primitive(Scalar::Unit) => Ok(Value::text("")),
                other => Err(format!("cannot render {} as text", other.kind_name())),
            }
        });

        registry.register_combine("text_to_int", 1, |inputs| {
            let t = text(&inputs[0])?;
            t.trim()
                .parse::<i64>()
                .map(Value::int)
                .map_err(|_| format!("not an integer: '{}'", t))
        });
        registry.register_combine("int_to_text", 1, |inputs| match &inputs[0] {
            Value::Primitive(Scalar::Int(i)) => Ok(Value::text(i.to_string())),
            other => Err(format!("expected Int, got {}", other.kind_name())),
        });

        registry.register_combine("text_to_decimal", 1, |inputs| {
            let t = text(&inputs[0])?;
            t.trim()
                .parse::<Decimal>()
                .map(Value::decimal)
                .map_err(|_| format!("not a decimal: '{}'", t))
        });
        registry.register_combine("decimal_to_text", 1, |inputs| match &inputs[0] {
            Value::Primitive(Scalar::Decimal(d)) => Ok(Value::text(d.to_string())),
            other => Err(format!("expected Decimal, got {}", other.kind_name())),
        });

        registry
    }

    pub fn register_combine<F>(&mut self, id: impl Into<String>, arity: usize, body: F)
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.entries.entry(id.into()).or_default().combine = Some((arity, Box::new(body)));
    }

    pub fn register_distribute<F>(&mut self, id: impl Into<String>, arity: usize, body: F)
    where
        F: Fn(&Value) -> Result<Vec<Value>, String> + Send + Sync + 'static,
    {
        self.entries.entry(id.into()).or_default().distribute = Some((arity, Box::new(body)));
    }

    fn combine_body(&self, id: &str) -> Result<&(usize, CombineFn), ApplyError> {
        self.entries
            .get(id)
            .and_then(|e| e.combine.as_ref())
            .ok_or_else(|| ApplyError::Expr {
                function: Some(id.to_string()),
                reason: "no combine body registered under this id".to_string(),
            })
    }

    fn distribute_body(&self, id: &str) -> Result<&(usize, DistributeFn), ApplyError> {
        self.entries
            .get(id)
            .and_then(|e| e.distribute.as_ref())
            .ok_or_else(|| ApplyError::Expr {
                function: Some(id.to_string()),
                reason: "no distribute body registered under this id".to_string(),
            })
    }
}

/// Evaluate an expression in combine position: `inputs` values in, one value
/// out.
///
/// Both `Combine` and `Distribute` descriptors resolve through their id, so
/// an expression that rode along through a structural reverse still finds the
/// right-direction body.
pub fn eval_expr(
    expr: &Expr,
    inputs: &[Value],
    registry: &FunctionRegistry,
) -> Result<Value, ApplyError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Identity => match inputs {
            [single] => Ok(single.clone()),
            _ => Err(ApplyError::Expr {
                function: None,
                reason: format!("identity takes exactly one input, got {}", inputs.len()),
            }),
        },
        Expr::Fail(reason) => Err(ApplyError::Expr {
            function: None,
            reason: reason.clone(),
        }),
        Expr::Combine { function, arity } | Expr::Distribute { function, arity } => {
            let (registered, body) = registry.combine_body(function)?;
            if *registered != *arity || inputs.len() != *arity {
                return Err(ApplyError::Expr {
                    function: Some(function.clone()),
                    reason: format!(
                        "arity mismatch: declared {}, registered {}, got {} input(s)",
                        arity,
                        registered,
                        inputs.len()
                    ),
                });
            }
            body(inputs).map_err(|reason| ApplyError::Expr {
                function: Some(function.clone()),
                reason,
            })
        }
    }
}

/// Evaluate an expression in distribute position: one value in, exactly
/// `want` values out.
pub fn eval_distribute(
    expr: &Expr,
    input: &Value,
    want: usize,
    registry: &FunctionRegistry,
) -> Result<Vec<Value>, ApplyError> {
    match expr {
        Expr::Identity if want == 1 => Ok(vec![input.clone()]),
        Expr::Identity => Err(ApplyError::Expr {
            function: None,
            reason: format!("identity yields one value, {} wanted", want),
        }),
        Expr::Literal(_) => Err(ApplyError::Expr {
            function: None,
            reason: "a literal cannot be distributed".to_string(),
        }),
        Expr::Fail(reason) => Err(ApplyError::Expr {
            function: None,
            reason: reason.clone(),
        }),
        Expr::Combine { function, arity } | Expr::Distribute { function, arity } => {
            let (registered, body) = registry.distribute_body(function)?;
            if *registered != *arity || want != *arity {
                return Err(ApplyError::Expr {
                    function: Some(function.clone()),
                    reason: format!(
                        "arity mismatch: declared {}, registered {}, {} wanted",
                        arity, registered, want
                    ),
                });
            }
            let parts = body(input).map_err(|reason| ApplyError::Expr {
                function: Some(function.clone()),
                reason,
            })?;
            if parts.len() != *arity {
                return Err(ApplyError::Expr {
                    function: Some(function.clone()),
                    reason: format!("body returned {} value(s), arity is {}", parts.len(), arity),
                });
            }
            Ok(parts)
        }
    }
}

fn text(v: &Value) -> Result<&str, String> {
    match v {
        Value::Primitive(Scalar::Text(t)) => Ok(t),
        other => Err(format!("expected Text, got {}", other.kind_name())),
    }
}

fn texts(inputs: &[Value]) -> Result<Vec<&str>, String> {
    inputs.iter().map(text).collect()
}
