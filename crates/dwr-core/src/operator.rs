//! STRIPS schema for the dock-worker-robots operators.
//!
//! Every list is a pure function of the operator kind and its argument tuple. Slot meanings:
//!
//! - `move(r, from, to)`
//! - `take(k, l, c, under, p)`: crane `k` at `l` lifts `c` off `under` in pile `p`
//! - `put(k, l, c, under, p)`: crane `k` at `l` sets `c` onto `under` in pile `p`
//! - `load(k, l, c, r)`: crane `k` at `l` loads `c` onto robot `r`
//! - `unload(k, l, c, r)`: crane `k` at `l` takes `c` off robot `r`

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::predicate::{Predicate, PredicateKind as P};
use crate::term::Term;

pub const MAX_ARGS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionKind {
    Start,
    Finish,
    Move,
    Take,
    Put,
    Load,
    Unload,
}

impl ActionKind {
    /// The parameterised operators, in the order the planner instantiates them.
    pub const OPERATORS: [ActionKind; 5] = [
        ActionKind::Move,
        ActionKind::Take,
        ActionKind::Put,
        ActionKind::Load,
        ActionKind::Unload,
    ];

    pub const fn arity(self) -> usize {
        match self {
            ActionKind::Start | ActionKind::Finish => 0,
            ActionKind::Move => 3,
            ActionKind::Load | ActionKind::Unload => 4,
            ActionKind::Take | ActionKind::Put => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ActionKind::Start => "start",
            ActionKind::Finish => "finish",
            ActionKind::Move => "move",
            ActionKind::Take => "take",
            ActionKind::Put => "put",
            ActionKind::Load => "load",
            ActionKind::Unload => "unload",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            ActionKind::Start,
            ActionKind::Finish,
            ActionKind::Move,
            ActionKind::Take,
            ActionKind::Put,
            ActionKind::Load,
            ActionKind::Unload,
        ]
        .into_iter()
        .find(|kind| kind.name() == name)
    }

    pub const fn is_bookend(self) -> bool {
        matches!(self, ActionKind::Start | ActionKind::Finish)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Preconditions of an operator. Empty for the bookends, whose lists are problem-specific.
///
/// `a` must hold at least `kind.arity()` terms; [`Action::new`](crate::Action::new) checks this.
pub(crate) fn preconditions(kind: ActionKind, a: &[Term]) -> Vec<Predicate> {
    match kind {
        ActionKind::Start | ActionKind::Finish => Vec::new(),
        ActionKind::Move => vec![
            Predicate::binary(P::Adjacent, a[1], a[2]),
            Predicate::binary(P::At, a[0], a[1]),
            Predicate::unary(P::Free, a[2]),
        ],
        ActionKind::Take => vec![
            Predicate::binary(P::Belong, a[0], a[1]),
            Predicate::binary(P::Attached, a[4], a[1]),
            Predicate::unary(P::Empty, a[0]),
            Predicate::binary(P::Top, a[2], a[4]),
            Predicate::binary(P::On, a[2], a[3]),
        ],
        ActionKind::Put => vec![
            Predicate::binary(P::Belong, a[0], a[1]),
            Predicate::binary(P::Attached, a[4], a[1]),
            Predicate::binary(P::Holding, a[0], a[2]),
            Predicate::binary(P::Top, a[3], a[4]),
        ],
        ActionKind::Load => vec![
            Predicate::binary(P::Belong, a[0], a[1]),
            Predicate::binary(P::Holding, a[0], a[2]),
            Predicate::binary(P::At, a[3], a[1]),
            Predicate::unary(P::Unloaded, a[3]),
        ],
        ActionKind::Unload => vec![
            Predicate::binary(P::Belong, a[0], a[1]),
            Predicate::binary(P::At, a[3], a[1]),
            Predicate::binary(P::Loaded, a[3], a[2]),
            Predicate::unary(P::Empty, a[0]),
        ],
    }
}

pub(crate) fn add_list(kind: ActionKind, a: &[Term]) -> Vec<Predicate> {
    match kind {
        ActionKind::Start | ActionKind::Finish => Vec::new(),
        ActionKind::Move => vec![
            Predicate::binary(P::At, a[0], a[2]),
            Predicate::unary(P::Occupied, a[2]),
            Predicate::unary(P::Free, a[1]),
        ],
        ActionKind::Take => vec![
            Predicate::binary(P::Holding, a[0], a[2]),
            Predicate::binary(P::Top, a[3], a[4]),
        ],
        ActionKind::Put => vec![
            Predicate::unary(P::Empty, a[0]),
            Predicate::binary(P::In, a[2], a[4]),
            Predicate::binary(P::Top, a[2], a[4]),
            Predicate::binary(P::On, a[2], a[3]),
        ],
        ActionKind::Load => vec![
            Predicate::unary(P::Empty, a[0]),
            Predicate::binary(P::Loaded, a[3], a[2]),
        ],
        ActionKind::Unload => vec![
            Predicate::binary(P::Holding, a[0], a[2]),
            Predicate::unary(P::Unloaded, a[3]),
        ],
    }
}

pub(crate) fn delete_list(kind: ActionKind, a: &[Term]) -> Vec<Predicate> {
    match kind {
        ActionKind::Start | ActionKind::Finish => Vec::new(),
        ActionKind::Move => vec![
            Predicate::unary(P::Occupied, a[1]),
            Predicate::binary(P::At, a[0], a[1]),
            Predicate::unary(P::Free, a[2]),
        ],
        ActionKind::Take => vec![
            Predicate::unary(P::Empty, a[0]),
            Predicate::binary(P::In, a[2], a[4]),
            Predicate::binary(P::Top, a[2], a[4]),
            Predicate::binary(P::On, a[2], a[3]),
        ],
        ActionKind::Put => vec![
            Predicate::binary(P::Holding, a[0], a[2]),
            Predicate::binary(P::Top, a[3], a[4]),
        ],
        ActionKind::Load => vec![
            Predicate::binary(P::Holding, a[0], a[2]),
            Predicate::unary(P::Unloaded, a[3]),
        ],
        ActionKind::Unload => vec![
            Predicate::unary(P::Empty, a[0]),
            Predicate::binary(P::Loaded, a[3], a[2]),
        ],
    }
}
