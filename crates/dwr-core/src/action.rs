use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::operator::{self, ActionKind, MAX_ARGS};
use crate::predicate::Predicate;
use crate::term::{Term, TermSpace, VarSupply};
use crate::unify::{unify, Bindings};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} takes {expected} argument(s), got {found}")]
pub struct ActionArityError {
    pub kind: ActionKind,
    pub expected: usize,
    pub found: usize,
}

/// A plan step: an operator kind, its arguments, and the lists derived from them.
///
/// For the five operators the lists are recomputed from `(kind, args)` whenever a substitution
/// touches an argument. `start` and `finish` carry problem-specific lists instead: start adds the
/// initial facts, finish requires the goal facts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Action {
    kind: ActionKind,
    args: [Term; MAX_ARGS],
    preconditions: Vec<Predicate>,
    add_list: Vec<Predicate>,
    delete_list: Vec<Predicate>,
}

impl Action {
    pub fn new(kind: ActionKind, args: &[Term]) -> Result<Self, ActionArityError> {
        if kind.is_bookend() || args.len() != kind.arity() {
            return Err(ActionArityError {
                kind,
                expected: kind.arity(),
                found: args.len(),
            });
        }
        let mut slots = [Term::MAX; MAX_ARGS];
        slots[..args.len()].copy_from_slice(args);
        let mut action = Self {
            kind,
            args: slots,
            preconditions: Vec::new(),
            add_list: Vec::new(),
            delete_list: Vec::new(),
        };
        action.fill_predicates();
        Ok(action)
    }

    /// An operator instance whose every slot is a brand-new variable.
    pub fn fresh(kind: ActionKind, vars: &mut VarSupply) -> Result<Self, ActionArityError> {
        let args: Vec<Term> = (0..kind.arity()).map(|_| vars.fresh()).collect();
        Self::new(kind, &args)
    }

    pub fn start(initial: Vec<Predicate>) -> Self {
        Self {
            kind: ActionKind::Start,
            args: [Term::MAX; MAX_ARGS],
            preconditions: Vec::new(),
            add_list: initial,
            delete_list: Vec::new(),
        }
    }

    pub fn finish(goal: Vec<Predicate>) -> Self {
        Self {
            kind: ActionKind::Finish,
            args: [Term::MAX; MAX_ARGS],
            preconditions: goal,
            add_list: Vec::new(),
            delete_list: Vec::new(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn args(&self) -> &[Term] {
        &self.args[..self.kind.arity()]
    }

    pub fn preconditions(&self) -> &[Predicate] {
        &self.preconditions
    }

    pub fn add_list(&self) -> &[Predicate] {
        &self.add_list
    }

    pub fn delete_list(&self) -> &[Predicate] {
        &self.delete_list
    }

    fn fill_predicates(&mut self) {
        if self.kind.is_bookend() {
            return;
        }
        let args = &self.args[..self.kind.arity()];
        self.preconditions = operator::preconditions(self.kind, args);
        self.add_list = operator::add_list(self.kind, args);
        self.delete_list = operator::delete_list(self.kind, args);
    }

    /// Replace `old` with `new` in the arguments, re-deriving the lists immediately if anything
    /// changed. Bookend lists are substituted in place.
    pub fn substitute(&mut self, old: Term, new: Term) -> bool {
        if self.kind.is_bookend() {
            let mut changed = false;
            for p in self
                .preconditions
                .iter_mut()
                .chain(self.add_list.iter_mut())
                .chain(self.delete_list.iter_mut())
            {
                changed |= p.substitute(old, new);
            }
            return changed;
        }

        let arity = self.kind.arity();
        let mut changed = false;
        for arg in &mut self.args[..arity] {
            if *arg == old {
                *arg = new;
                changed = true;
            }
        }
        if changed {
            self.fill_predicates();
        }
        changed
    }

    /// Every way this action can add `p`: one binding set per unifying add-list entry.
    pub fn adds(&self, p: &Predicate, terms: &TermSpace) -> Vec<Bindings> {
        self.add_list
            .iter()
            .filter(|q| q.kind() == p.kind())
            .filter_map(|q| unify(q.args(), p.args(), Bindings::new(), terms).ok())
            .collect()
    }

    /// Whether some substitution makes this action delete `p`.
    pub fn deletes(&self, p: &Predicate, terms: &TermSpace) -> bool {
        self.delete_list
            .iter()
            .filter(|q| q.kind() == p.kind())
            .any(|q| unify(q.args(), p.args(), Bindings::new(), terms).is_ok())
    }

    pub fn mentions(&self, term: Term) -> bool {
        if self.kind.is_bookend() {
            self.preconditions
                .iter()
                .chain(self.add_list.iter())
                .any(|p| p.mentions(term))
        } else {
            self.args().contains(&term)
        }
    }

    pub fn display<'a>(&'a self, terms: &'a TermSpace) -> ActionDisplay<'a> {
        ActionDisplay {
            action: self,
            terms,
        }
    }
}

pub struct ActionDisplay<'a> {
    action: &'a Action,
    terms: &'a TermSpace,
}

impl fmt::Display for ActionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action.kind.name())?;
        for &arg in self.action.args() {
            write!(f, " {}", self.terms.display(arg))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::PredicateKind;
    use crate::term::ObjectCounts;

    fn space() -> TermSpace {
        TermSpace::new(ObjectCounts {
            locations: 2,
            robots: 1,
            cranes: 1,
            piles: 1,
            containers: 2,
        })
        .unwrap()
    }

    #[test]
    fn substitution_rederives_lists() {
        let s = space();
        let mut vars = s.var_supply();
        let mut mv = Action::fresh(ActionKind::Move, &mut vars).unwrap();
        let robot = mv.args()[0];
        let r0 = s.id_of("r0").unwrap();

        assert!(mv.substitute(robot, r0));
        assert_eq!(mv.args()[0], r0);
        assert!(mv
            .preconditions()
            .iter()
            .chain(mv.add_list())
            .chain(mv.delete_list())
            .all(|p| !p.mentions(robot)));
        assert!(!mv.substitute(robot, r0));
    }

    #[test]
    fn start_can_add_same_kind_several_ways() {
        let s = space();
        let c0 = s.id_of("c0").unwrap();
        let c1 = s.id_of("c1").unwrap();
        let p0 = s.id_of("p0").unwrap();
        let start = Action::start(vec![
            Predicate::new(PredicateKind::In, &[c0, p0]).unwrap(),
            Predicate::new(PredicateKind::In, &[c1, p0]).unwrap(),
            Predicate::new(PredicateKind::Empty, &[s.id_of("k0").unwrap()]).unwrap(),
        ]);
        let x = s.first_variable();
        let target = Predicate::new(PredicateKind::In, &[x, p0]).unwrap();
        let ways = start.adds(&target, &s);
        assert_eq!(ways.len(), 2);
        assert_eq!(ways[0].resolve(x), c0);
        assert_eq!(ways[1].resolve(x), c1);
    }

    #[test]
    fn deletes_uses_unification() {
        let s = space();
        let mut vars = s.var_supply();
        let take = Action::fresh(ActionKind::Take, &mut vars).unwrap();
        let k0 = s.id_of("k0").unwrap();
        let empty = Predicate::new(PredicateKind::Empty, &[k0]).unwrap();
        let free = Predicate::new(PredicateKind::Free, &[0]).unwrap();
        assert!(take.deletes(&empty, &s));
        assert!(!take.deletes(&free, &s));
    }

    #[test]
    fn bookends_reject_explicit_construction() {
        assert!(Action::new(ActionKind::Start, &[]).is_err());
        assert!(Action::new(ActionKind::Move, &[0, 1]).is_err());
    }

    #[test]
    fn short_argument_lists_never_reach_the_schema() {
        for kind in [
            ActionKind::Move,
            ActionKind::Take,
            ActionKind::Put,
            ActionKind::Load,
            ActionKind::Unload,
        ] {
            let args: Vec<Term> = (0..kind.arity() as Term - 1).collect();
            let err = Action::new(kind, &args).unwrap_err();
            assert_eq!(err.found, kind.arity() - 1);
            assert_eq!(err.expected, kind.arity());
        }
    }
}
