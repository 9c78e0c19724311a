//! Expressions carried by migration actions.
//!
//! An expression is plain data: a constant, the identity, an explicit
//! failure, or the name and arity of a combine/distribute function. Function
//! bodies never live here -- they are resolved from a registry at apply time,
//! which keeps every action serializable and comparable.

use crate::value::Value;

/// The reason recorded when an `Optionalize` is reversed: mandating without
/// a caller-supplied default has no sound fallback.
pub const NO_MANDATE_DEFAULT: &str = "cannot mandate without default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A fixed constant; evaluation ignores its inputs.
    Literal(Value),
    /// Passes its single input through unchanged.
    Identity,
    /// Always fails with this reason. Marks "no sound default exists".
    Fail(String),
    /// A named function taking `arity` values to one.
    Combine { function: String, arity: usize },
    /// A named function taking one value to `arity` values.
    Distribute { function: String, arity: usize },
}

impl Expr {
    pub fn literal(value: Value) -> Expr {
        Expr::Literal(value)
    }

    pub fn fail(reason: impl Into<String>) -> Expr {
        Expr::Fail(reason.into())
    }

    pub fn combine(function: impl Into<String>, arity: usize) -> Expr {
        Expr::Combine {
            function: function.into(),
            arity,
        }
    }

    pub fn distribute(function: impl Into<String>, arity: usize) -> Expr {
        Expr::Distribute {
            function: function.into(),
            arity,
        }
    }

    /// The fallback produced by reversing an `Optionalize`.
    pub fn no_mandate_default() -> Expr {
        Expr::Fail(NO_MANDATE_DEFAULT.to_string())
    }
}
