//! Core data model for instar: untyped value trees, path optics, and the
//! reversible migration-action algebra.
//!
//! Everything in this crate is plain, comparable data -- no I/O, no
//! closures, no evaluation. Applying a migration to a value (and resolving
//! the named functions expressions refer to) lives in `instar-eval`; the
//! stable JSON form lives in `instar-interchange`.

pub mod action;
pub mod expr;
pub mod migration;
pub mod optic;
pub mod parse;
pub mod value;

pub use action::Action;
pub use expr::{Expr, NO_MANDATE_DEFAULT};
pub use migration::Migration;
pub use optic::{Optic, Segment};
pub use parse::PathParseError;
pub use value::{Scalar, Value};
