//! instar-eval: everything that runs a migration.
//!
//! [`apply`] folds a migration over a value tree, strictly and fail-fast,
//! resolving named expressions through a [`FunctionRegistry`]. On top of the
//! interpreter sit [`VersionChain`] (an append-only history of schema
//! versions linked by forward migrations) and the compatibility layer
//! ([`check_compatibility`], [`suggest_next_version`]) that classifies a
//! migration without executing it.
//!
//! Every entry point is a pure function over immutable inputs; migrations,
//! values, and registries can be shared across threads freely.

pub mod chain;
pub mod compat;
pub mod error;
pub mod interpreter;
mod navigate;
pub mod registry;
pub mod version;

pub use chain::{ChainError, Shape, VersionChain, VersionEntry};
pub use compat::{
    check_compatibility, suggest_next_version, CompatibilityLevel, CompatibilityNote,
    CompatibilityReport,
};
pub use error::ApplyError;
pub use interpreter::apply;
pub use registry::{eval_distribute, eval_expr, FunctionRegistry};
pub use version::SemVer;
