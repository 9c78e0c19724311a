//! Version chains: an append-only history of schema versions, each linked to
//! its predecessor by a forward migration.

use instar_core::Migration;
use instar_interchange::{migration_from_json, migration_to_json};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::version::SemVer;

/// Errors from version-chain construction, lookup, and snapshot handling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// A version string not present in the chain.
    #[error("unknown version: {version}")]
    UnknownVersion { version: String },

    /// A version string already present in the chain.
    #[error("duplicate version: {version}")]
    DuplicateVersion { version: String },

    /// A version string that does not parse as `major.minor.patch`.
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// A malformed or tampered chain snapshot.
    #[error("chain manifest error: {message}")]
    Manifest { message: String },
}

// ──────────────────────────────────────────────
// Shapes
// ──────────────────────────────────────────────

/// An opaque schema handle: whatever document the caller uses to describe a
/// version's shape, carried untouched and fingerprinted for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    document: serde_json::Value,
}

impl Shape {
    pub fn new(document: serde_json::Value) -> Shape {
        Shape { document }
    }

    pub fn document(&self) -> &serde_json::Value {
        &self.document
    }

    /// SHA-256 hex of the compact JSON serialization.
    pub fn fingerprint(&self) -> String {
        sha256_hex(&self.document)
    }
}

fn sha256_hex(doc: &serde_json::Value) -> String {
    // Serializing a serde_json::Value cannot fail for tree-shaped data.
    let canonical = serde_json::to_string(doc)
        .unwrap_or_else(|e| panic!("serialization error computing digest: {}", e));
    let hash = Sha256::digest(canonical.as_bytes());
    format!("{:x}", hash)
}

// ──────────────────────────────────────────────
// Entries and chains
// ──────────────────────────────────────────────

/// One version in a chain. `migration_from_previous` is `None` only for the
/// seed entry. `recorded_at` is an RFC 3339 UTC stamp taken at append time;
/// it is informational and excluded from equality.
#[derive(Debug, Clone)]
pub struct VersionEntry {
    pub version: String,
    pub shape: Shape,
    pub description: String,
    pub migration_from_previous: Option<Migration>,
    pub recorded_at: String,
}

impl PartialEq for VersionEntry {
    fn eq(&self, other: &VersionEntry) -> bool {
        self.version == other.version
            && self.shape == other.shape
            && self.description == other.description
            && self.migration_from_previous == other.migration_from_previous
    }
}

impl Eq for VersionEntry {}

/// An ordered, append-only list of versions. Entries are never removed or
/// reordered; grow the chain with [`VersionChain::add_version`] before
/// sharing it with readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChain {
    entries: Vec<VersionEntry>,
}

impl VersionChain {
    /// Seed a chain with its first version. The seed has no predecessor
    /// migration.
    pub fn create(
        version: impl Into<String>,
        shape: Shape,
        description: impl Into<String>,
    ) -> Result<VersionChain, ChainError> {
        let version = version.into();
        SemVer::parse(&version)?;
        Ok(VersionChain {
            entries: vec![VersionEntry {
                version,
                shape,
                description: description.into(),
                migration_from_previous: None,
                recorded_at: now_rfc3339(),
            }],
        })
    }

    /// Append a version. `migration` is the forward migration from the
    /// immediately preceding version's shape to this one's.
    pub fn add_version(
        &mut self,
        version: impl Into<String>,
        shape: Shape,
        description: impl Into<String>,
        migration: Migration,
    ) -> Result<(), ChainError> {
        let version = version.into();
        SemVer::parse(&version)?;
        if self.contains(&version) {
            return Err(ChainError::DuplicateVersion { version });
        }
        self.entries.push(VersionEntry {
            version,
            shape,
            description: description.into(),
            migration_from_previous: Some(migration),
            recorded_at: now_rfc3339(),
        });
        Ok(())
    }

    pub fn entries(&self) -> &[VersionEntry] {
        &self.entries
    }

    pub fn latest(&self) -> &VersionEntry {
        // A chain is never empty: create() seeds one entry.
        &self.entries[self.entries.len() - 1]
    }

    pub fn contains(&self, version: &str) -> bool {
        self.entries.iter().any(|e| e.version == version)
    }

    fn position(&self, version: &str) -> Result<usize, ChainError> {
        self.entries
            .iter()
            .position(|e| e.version == version)
            .ok_or_else(|| ChainError::UnknownVersion {
                version: version.to_string(),
            })
    }

    /// The migrations to run, in order, to move data from `from` to `to`.
    ///
    /// Equal versions yield the empty list. Going forward yields each
    /// intermediate entry's forward migration in chain order; going backward
    /// yields the structural reverses walking back entry by entry.
    pub fn migration_path(&self, from: &str, to: &str) -> Result<Vec<Migration>, ChainError> {
        let from_idx = self.position(from)?;
        let to_idx = self.position(to)?;

        if from_idx <= to_idx {
            Ok(self.entries[from_idx + 1..=to_idx]
                .iter()
                .map(forward_migration)
                .collect())
        } else {
            Ok(self.entries[to_idx + 1..=from_idx]
                .iter()
                .rev()
                .map(|e| forward_migration(e).reverse())
                .collect())
        }
    }

    /// [`Self::migration_path`] folded into one migration with `then`. The
    /// empty path composes to the identity migration.
    pub fn compose_migration(&self, from: &str, to: &str) -> Result<Migration, ChainError> {
        Ok(self
            .migration_path(from, to)?
            .into_iter()
            .fold(Migration::empty(), Migration::then))
    }

    // ──────────────────────────────────────────────
    // Snapshots
    // ──────────────────────────────────────────────

    /// Serialize the chain to a manifest document: entries plus an `etag`
    /// over the canonical body, so a stored chain can be checked for
    /// tampering or truncation on reload.
    pub fn snapshot(&self) -> serde_json::Value {
        let entries: Vec<serde_json::Value> = self
            .entries
            .iter()
            .map(|e| {
                json!({
                    "version": e.version,
                    "description": e.description,
                    "recorded_at": e.recorded_at,
                    "shape": e.shape.document(),
                    "shape_fingerprint": e.shape.fingerprint(),
                    "migration_from_previous": e
                        .migration_from_previous
                        .as_ref()
                        .map(|m| migration_to_json(m))
                        .unwrap_or(serde_json::Value::Null),
                })
            })
            .collect();
        let body = json!({
            "format_version": instar_interchange::FORMAT_VERSION,
            "kind": "version_chain",
            "entries": entries,
        });
        let etag = sha256_hex(&body);
        let mut doc = body;
        doc["etag"] = serde_json::Value::String(etag);
        doc
    }

    /// Rebuild a chain from a snapshot, verifying the etag and format
    /// version.
    pub fn restore(doc: &serde_json::Value) -> Result<VersionChain, ChainError> {
        let manifest = |message: String| ChainError::Manifest { message };

        let mut body = doc.clone();
        let etag = body
            .as_object_mut()
            .and_then(|o| o.remove("etag"))
            .and_then(|v| v.as_str().map(|s| s.to_string()))
            .ok_or_else(|| manifest("missing etag".to_string()))?;
        if etag != sha256_hex(&body) {
            return Err(manifest("etag mismatch: snapshot was modified".to_string()));
        }

        let version = body.get("format_version").and_then(|v| v.as_str());
        if version != Some(instar_interchange::FORMAT_VERSION) {
            return Err(manifest(format!(
                "unsupported format version: {:?}",
                version
            )));
        }
        if body.get("kind").and_then(|v| v.as_str()) != Some("version_chain") {
            return Err(manifest("document is not a version chain".to_string()));
        }

        let raw_entries = body
            .get("entries")
            .and_then(|v| v.as_array())
            .ok_or_else(|| manifest("missing entries array".to_string()))?;
        if raw_entries.is_empty() {
            return Err(manifest("a chain holds at least its seed entry".to_string()));
        }

        let mut entries = Vec::with_capacity(raw_entries.len());
        for (index, raw) in raw_entries.iter().enumerate() {
            let field = |name: &str| -> Result<String, ChainError> {
                raw.get(name)
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .ok_or_else(|| manifest(format!("entry {}: missing '{}'", index, name)))
            };
            let shape = Shape::new(
                raw.get("shape")
                    .cloned()
                    .ok_or_else(|| manifest(format!("entry {}: missing 'shape'", index)))?,
            );
            let migration_from_previous = match raw.get("migration_from_previous") {
                None | Some(serde_json::Value::Null) => {
                    if index != 0 {
                        return Err(manifest(format!(
                            "entry {}: only the seed entry may lack a migration",
                            index
                        )));
                    }
                    None
                }
                Some(m) => Some(migration_from_json(m).map_err(|e| {
                    manifest(format!("entry {}: bad migration: {}", index, e))
                })?),
            };
            entries.push(VersionEntry {
                version: field("version")?,
                shape,
                description: field("description")?,
                migration_from_previous,
                recorded_at: field("recorded_at")?,
            });
        }
        Ok(VersionChain { entries })
    }
}

/// Every non-seed entry carries its forward migration; a missing one can
/// only mean the seed, whose "migration" is the identity.
fn forward_migration(entry: &VersionEntry) -> Migration {
    entry
        .migration_from_previous
        .clone()
        .unwrap_or_else(Migration::empty)
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}
