//! Ordered action sequences and their composition.

use crate::action::Action;

/// An ordered, possibly-empty sequence of actions.
///
/// Migrations form a monoid: `then` concatenates, `empty` is the identity,
/// and concatenation is associative. `reverse` flips the action order and
/// structurally reverses each action, so running a reversed migration walks
/// the edits back last-first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Migration {
    actions: Vec<Action>,
}

impl Migration {
    /// The identity migration: applying it changes nothing.
    pub fn empty() -> Migration {
        Migration::default()
    }

    pub fn single(action: Action) -> Migration {
        Migration {
            actions: vec![action],
        }
    }

    pub fn from_actions(actions: Vec<Action>) -> Migration {
        Migration { actions }
    }

    /// This migration followed by `other`.
    pub fn then(mut self, other: Migration) -> Migration {
        self.actions.extend(other.actions);
        self
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Reversed action order, each action structurally reversed.
    pub fn reverse(&self) -> Migration {
        Migration {
            actions: self.actions.iter().rev().map(Action::reverse).collect(),
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl FromIterator<Action> for Migration {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Migration {
        Migration {
            actions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Migration {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
