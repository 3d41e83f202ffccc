use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::term::{Term, TermSpace};

/// Filler for the unused second slot of unary predicates. Never exposed through `args()`.
const UNUSED: Term = Term::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PredicateKind {
    Adjacent,
    Attached,
    Belong,
    Occupied,
    At,
    Loaded,
    Unloaded,
    Holding,
    Empty,
    In,
    On,
    Top,
    Free,
}

impl PredicateKind {
    pub const ALL: [PredicateKind; 13] = [
        PredicateKind::Adjacent,
        PredicateKind::Attached,
        PredicateKind::Belong,
        PredicateKind::Occupied,
        PredicateKind::At,
        PredicateKind::Loaded,
        PredicateKind::Unloaded,
        PredicateKind::Holding,
        PredicateKind::Empty,
        PredicateKind::In,
        PredicateKind::On,
        PredicateKind::Top,
        PredicateKind::Free,
    ];

    pub const fn arity(self) -> usize {
        match self {
            PredicateKind::Occupied
            | PredicateKind::Unloaded
            | PredicateKind::Empty
            | PredicateKind::Free => 1,
            _ => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PredicateKind::Adjacent => "adjacent",
            PredicateKind::Attached => "attached",
            PredicateKind::Belong => "belong",
            PredicateKind::Occupied => "occupied",
            PredicateKind::At => "at",
            PredicateKind::Loaded => "loaded",
            PredicateKind::Unloaded => "unloaded",
            PredicateKind::Holding => "holding",
            PredicateKind::Empty => "empty",
            PredicateKind::In => "in",
            PredicateKind::On => "on",
            PredicateKind::Top => "top",
            PredicateKind::Free => "free",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} takes {expected} argument(s), got {found}")]
pub struct ArityError {
    pub kind: PredicateKind,
    pub expected: usize,
    pub found: usize,
}

/// A fact over one or two terms. Equality is by `(kind, args)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Predicate {
    kind: PredicateKind,
    args: [Term; 2],
}

impl Predicate {
    pub fn new(kind: PredicateKind, args: &[Term]) -> Result<Self, ArityError> {
        if args.len() != kind.arity() {
            return Err(ArityError {
                kind,
                expected: kind.arity(),
                found: args.len(),
            });
        }
        let second = args.get(1).copied().unwrap_or(UNUSED);
        Ok(Self {
            kind,
            args: [args[0], second],
        })
    }

    /// Schema-internal constructor; callers guarantee the arity.
    pub(crate) const fn unary(kind: PredicateKind, a: Term) -> Self {
        debug_assert!(kind.arity() == 1);
        Self {
            kind,
            args: [a, UNUSED],
        }
    }

    pub(crate) const fn binary(kind: PredicateKind, a: Term, b: Term) -> Self {
        debug_assert!(kind.arity() == 2);
        Self { kind, args: [a, b] }
    }

    pub fn kind(&self) -> PredicateKind {
        self.kind
    }

    pub fn args(&self) -> &[Term] {
        &self.args[..self.kind.arity()]
    }

    pub fn mentions(&self, term: Term) -> bool {
        self.args().contains(&term)
    }

    /// Replace every occurrence of `old` with `new`. Returns whether anything changed.
    pub fn substitute(&mut self, old: Term, new: Term) -> bool {
        let arity = self.kind.arity();
        let mut changed = false;
        for arg in &mut self.args[..arity] {
            if *arg == old {
                *arg = new;
                changed = true;
            }
        }
        changed
    }

    pub fn display<'a>(&'a self, terms: &'a TermSpace) -> PredicateDisplay<'a> {
        PredicateDisplay {
            predicate: self,
            terms,
        }
    }
}

pub struct PredicateDisplay<'a> {
    predicate: &'a Predicate,
    terms: &'a TermSpace,
}

impl fmt::Display for PredicateDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.predicate.kind.name())?;
        for &arg in self.predicate.args() {
            write!(f, " {}", self.terms.display(arg))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_is_enforced_on_construction() {
        assert!(Predicate::new(PredicateKind::At, &[0, 1]).is_ok());
        let err = Predicate::new(PredicateKind::Free, &[0, 1]).unwrap_err();
        assert_eq!(err.expected, 1);
        assert_eq!(err.found, 2);
        assert!(Predicate::new(PredicateKind::On, &[3]).is_err());
    }

    #[test]
    fn substitute_preserves_arity_and_reports_change() {
        let mut p = Predicate::new(PredicateKind::Empty, &[7]).unwrap();
        assert!(!p.substitute(8, 1));
        assert!(p.substitute(7, 1));
        assert_eq!(p.args(), &[1]);

        let mut q = Predicate::new(PredicateKind::Adjacent, &[9, 9]).unwrap();
        assert!(q.substitute(9, 2));
        assert_eq!(q.args(), &[2, 2]);
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in PredicateKind::ALL {
            assert_eq!(PredicateKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(PredicateKind::from_name("teleported"), None);
    }
}
