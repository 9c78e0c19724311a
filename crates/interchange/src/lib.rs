//! instar-interchange: the JSON wire form for migrations and values.
//!
//! A migration travels as a single JSON document with a `format_version`,
//! a `kind` of `"migration"`, and an `actions` array. Every node in the
//! document carries a `kind` tag, record fields are written as an array of
//! `{name, value}` pairs so field order survives the trip, decimals are
//! written as strings, and paths are written in their canonical text form.
//!
//! [`serialize`] produces documents, [`deserialize`] reads them back.
//! `migration_from_json(&migration_to_json(&m))` returns `m` exactly.

pub mod deserialize;
pub mod serialize;

/// Version stamped into every document this crate writes. Readers reject
/// anything else.
pub const FORMAT_VERSION: &str = "1.0";

pub use deserialize::{
    action_from_json, expr_from_json, migration_from_json, value_from_json, InterchangeError,
};
pub use serialize::{action_to_json, expr_to_json, migration_to_json, value_to_json};
