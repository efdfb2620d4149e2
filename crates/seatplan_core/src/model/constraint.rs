//! Forbidden-adjacency constraint store.
//!
//! # Responsibility
//! - Hold unordered "must not sit adjacent" student pairs.
//! - Answer partner lookups for the placement gate.
//!
//! # Invariants
//! - A pair never names the same student twice.
//! - `{a, b}` and `{b, a}` are the same pair; at most one copy is stored.
//! - Insertion order is preserved so index-based removal stays stable for
//!   list-style callers.

use crate::model::student::StudentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One unordered pair of students who must not be seated adjacently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub a: StudentId,
    pub b: StudentId,
}

impl Constraint {
    pub fn new(a: impl Into<StudentId>, b: impl Into<StudentId>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    pub fn involves(&self, student_id: &str) -> bool {
        self.a == student_id || self.b == student_id
    }

    /// Returns the other side of the pair when `student_id` is a member.
    pub fn partner_of(&self, student_id: &str) -> Option<&str> {
        if self.a == student_id {
            Some(self.b.as_str())
        } else if self.b == student_id {
            Some(self.a.as_str())
        } else {
            None
        }
    }

    /// Order-independent pair comparison.
    pub fn is_pair(&self, x: &str, y: &str) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

/// Constraint store failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    /// Both sides name the same student.
    InvalidConstraint(StudentId),
    /// The unordered pair is already stored; nothing changed.
    DuplicateConstraint { a: StudentId, b: StudentId },
    /// One side is not on the roster.
    UnknownStudent(StudentId),
}

impl ConstraintError {
    /// Duplicate inserts are reported to the user but are not failures.
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::DuplicateConstraint { .. })
    }
}

impl Display for ConstraintError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConstraint(id) => {
                write!(f, "a constraint needs two different students, got `{id}` twice")
            }
            Self::DuplicateConstraint { a, b } => {
                write!(f, "constraint already exists: {a} <-> {b}")
            }
            Self::UnknownStudent(id) => write!(f, "constraint references unknown student: {id}"),
        }
    }
}

impl Error for ConstraintError {}

/// Set of forbidden-adjacency pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintSet {
    pairs: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the unordered pair `{a, b}`.
    ///
    /// # Errors
    /// - `InvalidConstraint` when `a == b`.
    /// - `DuplicateConstraint` when the pair is already stored (no-op).
    pub fn add(&mut self, a: &str, b: &str) -> Result<(), ConstraintError> {
        if a == b {
            return Err(ConstraintError::InvalidConstraint(a.to_string()));
        }
        if self.contains(a, b) {
            return Err(ConstraintError::DuplicateConstraint {
                a: a.to_string(),
                b: b.to_string(),
            });
        }
        self.pairs.push(Constraint::new(a, b));
        Ok(())
    }

    /// Removes by list position; `None` when out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<Constraint> {
        if index < self.pairs.len() {
            Some(self.pairs.remove(index))
        } else {
            None
        }
    }

    /// Removes by value in either order; returns whether a pair was removed.
    pub fn remove(&mut self, a: &str, b: &str) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|pair| !pair.is_pair(a, b));
        self.pairs.len() != before
    }

    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.pairs.iter().any(|pair| pair.is_pair(a, b))
    }

    /// All students that must not sit next to `student_id`.
    pub fn forbidden_partners(&self, student_id: &str) -> BTreeSet<&str> {
        self.pairs
            .iter()
            .filter_map(|pair| pair.partner_of(student_id))
            .collect()
    }

    /// Drops every pair that mentions `student_id`; returns the removed count.
    pub fn purge(&mut self, student_id: &str) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|pair| !pair.involves(student_id));
        before - self.pairs.len()
    }

    /// Keeps only pairs accepted by `keep`; returns the removed count.
    pub fn retain(&mut self, mut keep: impl FnMut(&Constraint) -> bool) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|pair| keep(pair));
        before - self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{ConstraintError, ConstraintSet};

    #[test]
    fn pair_membership_is_order_independent() {
        let mut set = ConstraintSet::new();
        set.add("a", "b").unwrap();
        assert!(set.contains("b", "a"));

        let err = set.add("b", "a").unwrap_err();
        assert!(err.is_informational());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn self_pair_is_invalid() {
        let mut set = ConstraintSet::new();
        assert_eq!(
            set.add("a", "a").unwrap_err(),
            ConstraintError::InvalidConstraint("a".to_string())
        );
        assert!(set.is_empty());
    }

    #[test]
    fn forbidden_partners_collects_both_directions() {
        let mut set = ConstraintSet::new();
        set.add("a", "b").unwrap();
        set.add("c", "a").unwrap();
        set.add("b", "c").unwrap();

        let partners = set.forbidden_partners("a");
        assert_eq!(partners.into_iter().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn purge_removes_every_pair_for_student() {
        let mut set = ConstraintSet::new();
        set.add("a", "b").unwrap();
        set.add("c", "a").unwrap();
        set.add("b", "c").unwrap();

        assert_eq!(set.purge("a"), 2);
        assert!(set.iter().all(|pair| !pair.involves("a")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_by_index_and_value_are_noops_when_absent() {
        let mut set = ConstraintSet::new();
        set.add("a", "b").unwrap();
        assert!(set.remove_at(3).is_none());
        assert!(!set.remove("a", "z"));
        assert!(set.remove("b", "a"));
        assert!(set.is_empty());
    }
}
