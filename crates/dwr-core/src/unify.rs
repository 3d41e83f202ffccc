//! Unification over flat term tuples.
//!
//! Terms carry no structure, so there is no occurs-check. Variable-to-variable bindings always
//! point from the larger id to the smaller one, which keeps one representative per equivalence
//! class and rules out binding cycles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::term::{Term, TermSpace};

/// `(variable, value)`: read as "replace `variable` with `value`".
pub type Binding = (Term, Term);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnifyError {
    #[error("tuple lengths differ ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    #[error("ground terms {left} and {right} clash")]
    Clash { left: Term, right: Term },
}

/// An accumulated substitution. Insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bindings {
    pairs: Vec<Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.pairs.iter()
    }

    pub fn get(&self, var: Term) -> Option<Term> {
        self.pairs
            .iter()
            .find(|(bound, _)| *bound == var)
            .map(|(_, value)| *value)
    }

    /// Follow the binding chain from `term` to its representative.
    pub fn resolve(&self, term: Term) -> Term {
        let mut current = term;
        // Chains strictly decrease through variables or end at a ground term, so this halts.
        while let Some(next) = self.get(current) {
            current = next;
        }
        current
    }

    pub fn apply(&self, terms: &[Term]) -> Vec<Term> {
        terms.iter().map(|&t| self.resolve(t)).collect()
    }

    /// Bindings with every value fully resolved; applying them in any order is equivalent.
    pub fn resolved(&self) -> Vec<Binding> {
        self.pairs
            .iter()
            .map(|&(var, _)| (var, self.resolve(var)))
            .collect()
    }

    fn bind(&mut self, var: Term, value: Term) {
        debug_assert!(self.get(var).is_none(), "rebinding {var}");
        self.pairs.push((var, value));
    }
}

impl<'a> IntoIterator for &'a Bindings {
    type Item = &'a Binding;
    type IntoIter = core::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// Extend `bindings` so that `xs` and `ys` become syntactically equal.
pub fn unify(
    xs: &[Term],
    ys: &[Term],
    mut bindings: Bindings,
    terms: &TermSpace,
) -> Result<Bindings, UnifyError> {
    if xs.len() != ys.len() {
        return Err(UnifyError::LengthMismatch {
            left: xs.len(),
            right: ys.len(),
        });
    }

    for (&x, &y) in xs.iter().zip(ys) {
        let a = bindings.resolve(x);
        let b = bindings.resolve(y);
        if a == b {
            continue;
        }
        match (terms.is_variable(a), terms.is_variable(b)) {
            (true, true) => bindings.bind(a.max(b), a.min(b)),
            (true, false) => bindings.bind(a, b),
            (false, true) => bindings.bind(b, a),
            (false, false) => return Err(UnifyError::Clash { left: a, right: b }),
        }
    }

    Ok(bindings)
}
