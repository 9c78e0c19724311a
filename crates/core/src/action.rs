//! The migration action algebra: atomic, independently reversible edits.
//!
//! Every action is anchored at an optic. For the field-level record edits
//! (`Rename`, `AddField`, `DropField`) the anchor addresses the containing
//! record and the field name travels separately; for `Join` and `Split` the
//! anchor's last segment names the joined/split field, so sibling paths can
//! resolve against the same container. All other actions anchor directly at
//! the value they rewrite.

use crate::expr::Expr;
use crate::migration::Migration;
use crate::optic::Optic;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Rename a field of the record at `at`, keeping its value and position.
    Rename { at: Optic, from: String, to: String },
    /// Insert a new field into the record at `at`; `default` is evaluated
    /// with no inputs. Fails if the name is already taken.
    AddField { at: Optic, name: String, default: Expr },
    /// Remove a field from the record at `at`. The removed value is
    /// discarded; `captured` rides along only so the reverse can rebuild
    /// something in its place.
    DropField { at: Optic, name: String, captured: Expr },
    /// Replace the value at `at` with the expression applied to it.
    TransformValue { at: Optic, expr: Expr },
    /// Replace the value at `at` with `forward` applied to it. `backward`
    /// rides along so the reverse runs the other direction.
    ChangeType { at: Optic, forward: Expr, backward: Expr },
    /// Wrap the value at `at` in a `Some` marker.
    Optionalize { at: Optic },
    /// Unwrap the `Some` marker at `at`; a `None` evaluates `if_none`
    /// instead, and the action fails if that fails.
    Mandate { at: Optic, if_none: Expr },
    /// Retag the variant at `at` when its tag is `from`. Any other tag
    /// passes through unchanged.
    RenameCase { at: Optic, from: String, to: String },
    /// Combine the values found at `sources` (resolved against the record
    /// containing the field `at` names) and insert the result as that new
    /// field. The sources themselves are left untouched.
    Join {
        at: Optic,
        sources: Vec<Optic>,
        combiner: Expr,
    },
    /// Distribute the value of the field `at` names into `targets`
    /// (resolved against the containing record), one result per target.
    Split {
        at: Optic,
        targets: Vec<Optic>,
        splitter: Expr,
    },
    /// Apply `inner` to every element of the sequence at `at`, in order,
    /// failing on the first element that fails.
    TransformElements { at: Optic, inner: Migration },
}

impl Action {
    /// The structural reverse: the same data, syntactically inverted. Total,
    /// and never evaluates an expression.
    ///
    /// Reversing twice restores the action field-for-field, with one
    /// documented exception: `Mandate` reverses to a bare `Optionalize`, so
    /// a non-canonical fallback is normalized to `Expr::no_mandate_default()`
    /// by the second reverse. From then on reverse is exactly involutive.
    pub fn reverse(&self) -> Action {
        match self {
            Action::Rename { at, from, to } => Action::Rename {
                at: at.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            Action::AddField { at, name, default } => Action::DropField {
                at: at.clone(),
                name: name.clone(),
                captured: default.clone(),
            },
            Action::DropField { at, name, captured } => Action::AddField {
                at: at.clone(),
                name: name.clone(),
                default: captured.clone(),
            },
            // The expression is not inverted; a semantic inverse is the
            // caller's job.
            Action::TransformValue { .. } => self.clone(),
            Action::ChangeType {
                at,
                forward,
                backward,
            } => Action::ChangeType {
                at: at.clone(),
                forward: backward.clone(),
                backward: forward.clone(),
            },
            Action::Optionalize { at } => Action::Mandate {
                at: at.clone(),
                if_none: Expr::no_mandate_default(),
            },
            Action::Mandate { at, .. } => Action::Optionalize { at: at.clone() },
            Action::RenameCase { at, from, to } => Action::RenameCase {
                at: at.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            Action::Join {
                at,
                sources,
                combiner,
            } => Action::Split {
                at: at.clone(),
                targets: sources.clone(),
                splitter: combiner.clone(),
            },
            Action::Split {
                at,
                targets,
                splitter,
            } => Action::Join {
                at: at.clone(),
                sources: targets.clone(),
                combiner: splitter.clone(),
            },
            Action::TransformElements { at, inner } => Action::TransformElements {
                at: at.clone(),
                inner: inner.reverse(),
            },
        }
    }

    /// The anchor optic, for diagnostics.
    pub fn anchor(&self) -> &Optic {
        match self {
            Action::Rename { at, .. }
            | Action::AddField { at, .. }
            | Action::DropField { at, .. }
            | Action::TransformValue { at, .. }
            | Action::ChangeType { at, .. }
            | Action::Optionalize { at }
            | Action::Mandate { at, .. }
            | Action::RenameCase { at, .. }
            | Action::Join { at, .. }
            | Action::Split { at, .. }
            | Action::TransformElements { at, .. } => at,
        }
    }

    /// Returns a human-readable variant name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Action::Rename { .. } => "Rename",
            Action::AddField { .. } => "AddField",
            Action::DropField { .. } => "DropField",
            Action::TransformValue { .. } => "TransformValue",
            Action::ChangeType { .. } => "ChangeType",
            Action::Optionalize { .. } => "Optionalize",
            Action::Mandate { .. } => "Mandate",
            Action::RenameCase { .. } => "RenameCase",
            Action::Join { .. } => "Join",
            Action::Split { .. } => "Split",
            Action::TransformElements { .. } => "TransformElements",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn at() -> Optic {
        Optic::root().field("user")
    }

    #[test]
    fn rename_swaps_direction() {
        let a = Action::Rename {
            at: at(),
            from: "name".into(),
            to: "full_name".into(),
        };
        assert_eq!(
            a.reverse(),
            Action::Rename {
                at: at(),
                from: "full_name".into(),
                to: "name".into(),
            }
        );
        assert_eq!(a.reverse().reverse(), a);
    }

    #[test]
    fn add_and_drop_are_mutual_reverses() {
        let add = Action::AddField {
            at: at(),
            name: "age".into(),
            default: Expr::literal(Value::int(18)),
        };
        let drop = Action::DropField {
            at: at(),
            name: "age".into(),
            captured: Expr::literal(Value::int(18)),
        };
        assert_eq!(add.reverse(), drop);
        assert_eq!(drop.reverse(), add);
        assert_eq!(add.reverse().reverse(), add);
    }

    #[test]
    fn transform_value_is_self_reversed() {
        let a = Action::TransformValue {
            at: at(),
            expr: Expr::combine("to_text", 1),
        };
        assert_eq!(a.reverse(), a);
    }

    #[test]
    fn change_type_swaps_its_expression_pair() {
        let a = Action::ChangeType {
            at: at(),
            forward: Expr::combine("text_to_int", 1),
            backward: Expr::combine("int_to_text", 1),
        };
        let r = a.reverse();
        assert_eq!(
            r,
            Action::ChangeType {
                at: at(),
                forward: Expr::combine("int_to_text", 1),
                backward: Expr::combine("text_to_int", 1),
            }
        );
        assert_eq!(r.reverse(), a);
    }

    #[test]
    fn optionalize_reverses_to_the_canonical_mandate() {
        let a = Action::Optionalize { at: at() };
        assert_eq!(
            a.reverse(),
            Action::Mandate {
                at: at(),
                if_none: Expr::no_mandate_default(),
            }
        );
        assert_eq!(a.reverse().reverse(), a);
    }

    #[test]
    fn mandate_fallback_normalizes_after_one_round_trip() {
        let custom = Action::Mandate {
            at: at(),
            if_none: Expr::literal(Value::text("")),
        };
        // One reverse drops the fallback; the second restores the canonical
        // one. The third is stable.
        assert_eq!(custom.reverse(), Action::Optionalize { at: at() });
        let normalized = custom.reverse().reverse();
        assert_eq!(
            normalized,
            Action::Mandate {
                at: at(),
                if_none: Expr::no_mandate_default(),
            }
        );
        assert_eq!(normalized.reverse().reverse(), normalized);
    }

    #[test]
    fn rename_case_swaps_tags() {
        let a = Action::RenameCase {
            at: Optic::root(),
            from: "CreditCard".into(),
            to: "CC".into(),
        };
        assert_eq!(
            a.reverse(),
            Action::RenameCase {
                at: Optic::root(),
                from: "CC".into(),
                to: "CreditCard".into(),
            }
        );
        assert_eq!(a.reverse().reverse(), a);
    }

    #[test]
    fn join_and_split_swap_roles() {
        let join = Action::Join {
            at: at().field("full_name"),
            sources: vec![Optic::root().field("first"), Optic::root().field("last")],
            combiner: Expr::combine("concat_space", 2),
        };
        let split = Action::Split {
            at: at().field("full_name"),
            targets: vec![Optic::root().field("first"), Optic::root().field("last")],
            splitter: Expr::combine("concat_space", 2),
        };
        assert_eq!(join.reverse(), split);
        assert_eq!(split.reverse(), join);
        assert_eq!(join.reverse().reverse(), join);
    }

    #[test]
    fn transform_elements_reverses_its_inner_migration() {
        let inner = Migration::from_actions(vec![
            Action::Rename {
                at: Optic::root(),
                from: "a".into(),
                to: "b".into(),
            },
            Action::Optionalize {
                at: Optic::root().field("b"),
            },
        ]);
        let a = Action::TransformElements {
            at: Optic::root().field("items"),
            inner: inner.clone(),
        };
        let r = a.reverse();
        match &r {
            Action::TransformElements { inner: reversed, .. } => {
                assert_eq!(*reversed, inner.reverse());
            }
            other => panic!("expected TransformElements, got {:?}", other),
        }
        assert_eq!(r.reverse(), a);
    }

    #[test]
    fn kind_names_cover_every_variant() {
        let a = Action::Split {
            at: at(),
            targets: vec![],
            splitter: Expr::Identity,
        };
        assert_eq!(a.kind_name(), "Split");
        assert_eq!(a.anchor(), &at());
    }
}
