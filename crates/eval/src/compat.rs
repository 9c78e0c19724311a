//! Compatibility classification: what a migration means for readers and
//! writers on either side of it, without executing anything.

use serde::Serialize;
use std::fmt;

use instar_core::{Action, Migration};

use crate::chain::ChainError;
use crate::version::SemVer;

/// How a migration affects cross-version readers and writers. Ordered by
/// severity, least to most, so the most severe action in a migration wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum CompatibilityLevel {
    /// No structural impact: old and new readers both keep working.
    FullyCompatible,
    /// Renames only: new data reads under old expectations once names are
    /// mapped, but old readers need the mapping.
    ForwardCompatible,
    /// Additions only: old data migrates forward losslessly; old readers do
    /// not understand the new fields.
    BackwardCompatible,
    /// Data is dropped or retyped; the reverse direction cannot be trusted.
    BreakingChange,
}

impl fmt::Display for CompatibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompatibilityLevel::FullyCompatible => write!(f, "FULLY_COMPATIBLE"),
            CompatibilityLevel::ForwardCompatible => write!(f, "FORWARD_COMPATIBLE"),
            CompatibilityLevel::BackwardCompatible => write!(f, "BACKWARD_COMPATIBLE"),
            CompatibilityLevel::BreakingChange => write!(f, "BREAKING_CHANGE"),
        }
    }
}

/// One action's contribution to the classification.
#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityNote {
    pub action: String,
    pub at: String,
    pub level: CompatibilityLevel,
    pub reason: String,
}

/// The classification of a whole migration, with per-action reasons for
/// anything above [`CompatibilityLevel::FullyCompatible`].
#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityReport {
    pub level: CompatibilityLevel,
    pub notes: Vec<CompatibilityNote>,
}

impl CompatibilityReport {
    /// Classify a migration by scanning its action list. The scan recurses
    /// into `TransformElements`: a drop inside a sequence still loses data.
    pub fn for_migration(migration: &Migration) -> CompatibilityReport {
        let mut notes = Vec::new();
        collect_notes(migration, &mut notes);
        let level = notes
            .iter()
            .map(|n| n.level)
            .max()
            .unwrap_or(CompatibilityLevel::FullyCompatible);
        CompatibilityReport { level, notes }
    }
}

/// Classify a migration. See [`CompatibilityReport::for_migration`] for the
/// annotated form.
pub fn check_compatibility(migration: &Migration) -> CompatibilityLevel {
    CompatibilityReport::for_migration(migration).level
}

fn collect_notes(migration: &Migration, notes: &mut Vec<CompatibilityNote>) {
    for action in migration {
        let classified = match action {
            Action::DropField { name, .. } => Some((
                CompatibilityLevel::BreakingChange,
                format!("drops field '{}'; old data is lost going forward", name),
            )),
            Action::ChangeType { .. } => Some((
                CompatibilityLevel::BreakingChange,
                "changes a value's type; round-trips only via the expression pair".to_string(),
            )),
            Action::AddField { name, .. } => Some((
                CompatibilityLevel::BackwardCompatible,
                format!("adds field '{}'; old readers will not know it", name),
            )),
            Action::Rename { from, to, .. } => Some((
                CompatibilityLevel::ForwardCompatible,
                format!("renames field '{}' to '{}'", from, to),
            )),
            Action::RenameCase { from, to, .. } => Some((
                CompatibilityLevel::ForwardCompatible,
                format!("renames case '{}' to '{}'", from, to),
            )),
            Action::TransformElements { inner, .. } => {
                collect_notes(inner, notes);
                None
            }
            // Value-level rewrites and optionality markers do not change the
            // structural contract on their own.
            Action::TransformValue { .. }
            | Action::Optionalize { .. }
            | Action::Mandate { .. }
            | Action::Join { .. }
            | Action::Split { .. } => None,
        };
        if let Some((level, reason)) = classified {
            let anchor = action.anchor();
            notes.push(CompatibilityNote {
                action: action.kind_name().to_string(),
                at: if anchor.is_root() {
                    "root".to_string()
                } else {
                    anchor.to_string()
                },
                level,
                reason,
            });
        }
    }
}

/// Map a migration's compatibility level onto the next version number:
/// breaking changes bump major, compatible-but-visible changes bump minor,
/// invisible changes bump patch.
pub fn suggest_next_version(current: &str, migration: &Migration) -> Result<SemVer, ChainError> {
    let version = SemVer::parse(current)?;
    Ok(match check_compatibility(migration) {
        CompatibilityLevel::BreakingChange => version.bump_major(),
        CompatibilityLevel::BackwardCompatible | CompatibilityLevel::ForwardCompatible => {
            version.bump_minor()
        }
        CompatibilityLevel::FullyCompatible => version.bump_patch(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use instar_core::{Expr, Optic, Value};

    fn make_add(name: &str) -> Action {
        Action::AddField {
            at: Optic::root(),
            name: name.to_string(),
            default: Expr::literal(Value::text("")),
        }
    }

    fn make_drop(name: &str) -> Action {
        Action::DropField {
            at: Optic::root(),
            name: name.to_string(),
            captured: Expr::fail("not captured"),
        }
    }

    fn make_rename(from: &str, to: &str) -> Action {
        Action::Rename {
            at: Optic::root(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn empty_migration_is_fully_compatible() {
        assert_eq!(
            check_compatibility(&Migration::empty()),
            CompatibilityLevel::FullyCompatible
        );
    }

    #[test]
    fn additions_alone_are_backward_compatible() {
        let m = Migration::from_actions(vec![make_add("email"), make_add("phone")]);
        assert_eq!(
            check_compatibility(&m),
            CompatibilityLevel::BackwardCompatible
        );
    }

    #[test]
    fn renames_alone_are_forward_compatible() {
        let m = Migration::from_actions(vec![
            make_rename("zip", "postal_code"),
            Action::RenameCase {
                at: Optic::root().field("payment"),
                from: "CreditCard".to_string(),
                to: "Card".to_string(),
            },
        ]);
        assert_eq!(
            check_compatibility(&m),
            CompatibilityLevel::ForwardCompatible
        );
    }

    #[test]
    fn any_drop_or_retype_is_breaking() {
        let with_drop = Migration::from_actions(vec![make_add("email"), make_drop("legacy")]);
        assert_eq!(
            check_compatibility(&with_drop),
            CompatibilityLevel::BreakingChange
        );

        let with_retype = Migration::single(Action::ChangeType {
            at: Optic::root().field("age"),
            forward: Expr::combine("int_to_text", 1),
            backward: Expr::combine("text_to_int", 1),
        });
        assert_eq!(
            check_compatibility(&with_retype),
            CompatibilityLevel::BreakingChange
        );
    }

    #[test]
    fn mixed_migrations_resolve_by_severity() {
        let m = Migration::from_actions(vec![make_rename("a", "b"), make_add("c")]);
        assert_eq!(
            check_compatibility(&m),
            CompatibilityLevel::BackwardCompatible
        );
    }

    #[test]
    fn semantics_preserving_actions_stay_fully_compatible() {
        let m = Migration::from_actions(vec![
            Action::TransformValue {
                at: Optic::root().field("name"),
                expr: Expr::Identity,
            },
            Action::Optionalize {
                at: Optic::root().field("nickname"),
            },
        ]);
        assert_eq!(check_compatibility(&m), CompatibilityLevel::FullyCompatible);
    }

    #[test]
    fn classification_recurses_into_element_migrations() {
        let m = Migration::single(Action::TransformElements {
            at: Optic::root().field("items"),
            inner: Migration::single(make_drop("sku")),
        });
        assert_eq!(check_compatibility(&m), CompatibilityLevel::BreakingChange);
    }

    #[test]
    fn report_carries_one_note_per_classified_action() {
        let report = CompatibilityReport::for_migration(&Migration::from_actions(vec![
            make_add("email"),
            make_drop("legacy"),
        ]));
        assert_eq!(report.level, CompatibilityLevel::BreakingChange);
        assert_eq!(report.notes.len(), 2);
        assert_eq!(report.notes[0].action, "AddField");
        assert_eq!(report.notes[1].action, "DropField");
        assert_eq!(report.notes[1].level, CompatibilityLevel::BreakingChange);
    }

    #[test]
    fn report_serializes_with_screaming_levels() {
        let report = CompatibilityReport::for_migration(&Migration::single(make_add("email")));
        let doc = serde_json::to_value(&report).unwrap();
        assert_eq!(doc["level"], "BackwardCompatible");
        assert_eq!(
            report.level.to_string(),
            "BACKWARD_COMPATIBLE"
        );
    }

    #[test]
    fn version_suggestions_follow_the_level() {
        let breaking = Migration::single(make_drop("x"));
        let additive = Migration::single(make_add("x"));
        let renames = Migration::single(make_rename("x", "y"));
        assert_eq!(
            suggest_next_version("1.4.2", &breaking).unwrap().to_string(),
            "2.0.0"
        );
        assert_eq!(
            suggest_next_version("1.4.2", &additive).unwrap().to_string(),
            "1.5.0"
        );
        assert_eq!(
            suggest_next_version("1.4.2", &renames).unwrap().to_string(),
            "1.5.0"
        );
        assert_eq!(
            suggest_next_version("1.4.2", &Migration::empty())
                .unwrap()
                .to_string(),
            "1.4.3"
        );
        assert!(matches!(
            suggest_next_version("latest", &Migration::empty()),
            Err(ChainError::InvalidVersion { .. })
        ));
    }
}
