use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::operator::ActionKind;
use crate::order::{topological_sort, TopoSort};
use crate::predicate::Predicate;
use crate::term::{Term, TermSpace, VarSupply};
use crate::unify::Bindings;

/// Index of a step inside its plan. Stable for the lifetime of a plan node.
pub type StepId = usize;

pub const START: StepId = 0;
pub const FINISH: StepId = 1;

/// `producer --predicate--> consumer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CausalLink {
    pub producer: StepId,
    pub predicate: Predicate,
    pub consumer: StepId,
}

/// `before` executes no later than `after` in every linearization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderingConstraint {
    pub before: StepId,
    pub after: StepId,
}

/// A precondition of `owner` not yet backed by a causal link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OpenCondition {
    pub predicate: Predicate,
    pub owner: StepId,
}

/// `step` may delete `link.predicate` and is not yet ordered outside the link's interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Threat {
    pub step: StepId,
    pub link: CausalLink,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanValidationError {
    #[error("step 0 must be start, found {0}")]
    MissingStart(ActionKind),

    #[error("step 1 must be finish, found {0}")]
    MissingFinish(ActionKind),

    #[error("plan has fewer than two steps")]
    MissingBookends,

    #[error("ordering start < finish is missing")]
    MissingBookendOrdering,

    #[error("{context} references term {term}, which is not a declared object")]
    UnknownTerm { context: &'static str, term: Term },

    #[error("{context} references step {step}, but the plan has {steps} steps")]
    StepOutOfRange {
        context: &'static str,
        step: StepId,
        steps: usize,
    },
}

/// A partial-order plan: the node type of the search.
///
/// Nodes are never mutated after being handed to the frontier; the planner clones a node for
/// every branch and edits the clone.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CausalPlan {
    steps: Vec<Action>,
    links: Vec<CausalLink>,
    orderings: BTreeSet<OrderingConstraint>,
    open_conditions: Vec<OpenCondition>,
    threats: Vec<Threat>,
    vars: VarSupply,
}

impl CausalPlan {
    /// The root node: `[start, finish]`, `start < finish`, every goal fact open on finish.
    pub fn new(initial: Vec<Predicate>, goal: Vec<Predicate>, terms: &TermSpace) -> Self {
        let open_conditions = goal
            .iter()
            .map(|&predicate| OpenCondition {
                predicate,
                owner: FINISH,
            })
            .collect();
        let mut orderings = BTreeSet::new();
        orderings.insert(OrderingConstraint {
            before: START,
            after: FINISH,
        });
        Self {
            steps: vec![Action::start(initial), Action::finish(goal)],
            links: Vec::new(),
            orderings,
            open_conditions,
            threats: Vec::new(),
            vars: terms.var_supply(),
        }
    }

    pub fn steps(&self) -> &[Action] {
        &self.steps
    }

    pub fn step(&self, id: StepId) -> Option<&Action> {
        self.steps.get(id)
    }

    /// Number of steps other than start and finish.
    pub fn operator_steps(&self) -> usize {
        self.steps.len().saturating_sub(2)
    }

    pub fn links(&self) -> &[CausalLink] {
        &self.links
    }

    pub fn orderings(&self) -> impl Iterator<Item = &OrderingConstraint> + '_ {
        self.orderings.iter()
    }

    pub fn ordering_count(&self) -> usize {
        self.orderings.len()
    }

    pub fn open_conditions(&self) -> &[OpenCondition] {
        &self.open_conditions
    }

    pub fn threats(&self) -> &[Threat] {
        &self.threats
    }

    pub fn var_supply(&self) -> VarSupply {
        self.vars
    }

    /// Adopt a supply that has already handed out ids (e.g. for a candidate step built outside
    /// the plan). The supply never moves backwards.
    pub fn reserve_variables(&mut self, supply: VarSupply) {
        if supply.peek() > self.vars.peek() {
            self.vars = supply;
        }
    }

    pub fn fresh_step(&mut self, kind: ActionKind) -> Option<Action> {
        Action::fresh(kind, &mut self.vars).ok()
    }

    pub fn take_open_condition(&mut self, index: usize) -> Option<OpenCondition> {
        (index < self.open_conditions.len()).then(|| self.open_conditions.remove(index))
    }

    /// Remove the most recently recorded threat.
    pub fn pop_threat(&mut self) -> Option<Threat> {
        self.threats.pop()
    }

    /// Idempotent. Acyclicity is not checked here.
    pub fn enforce_ordering(&mut self, before: StepId, after: StepId) -> bool {
        self.orderings.insert(OrderingConstraint { before, after })
    }

    pub fn is_ordered(&self, before: StepId, after: StepId) -> bool {
        self.orderings.contains(&OrderingConstraint { before, after })
    }

    pub fn is_threat_addressed(&self, threat: &Threat) -> bool {
        self.is_ordered(threat.step, threat.link.producer)
            || self.is_ordered(threat.link.consumer, threat.step)
    }

    /// Append a step, open all its preconditions, and bracket it between start and finish.
    pub fn add_step(&mut self, action: Action) -> StepId {
        let id = self.steps.len();
        self.open_conditions
            .extend(action.preconditions().iter().map(|&predicate| OpenCondition {
                predicate,
                owner: id,
            }));
        self.steps.push(action);
        self.enforce_ordering(START, id);
        self.enforce_ordering(id, FINISH);
        id
    }

    /// Record the link and order its producer before its consumer.
    pub fn add_link(&mut self, link: CausalLink) {
        self.enforce_ordering(link.producer, link.consumer);
        self.links.push(link);
    }

    /// Steps (other than the link's endpoints) that may delete the link's predicate and are not
    /// yet ordered outside it.
    pub fn threats_to_link(&self, link: &CausalLink, terms: &TermSpace) -> Vec<Threat> {
        self.steps
            .iter()
            .enumerate()
            .filter(|&(id, _)| id != link.producer && id != link.consumer)
            .filter(|(_, action)| action.deletes(&link.predicate, terms))
            .map(|(step, _)| Threat { step, link: *link })
            .filter(|threat| !self.is_threat_addressed(threat))
            .collect()
    }

    pub fn add_threats_to_link(&mut self, link: &CausalLink, terms: &TermSpace) -> usize {
        let found = self.threats_to_link(link, terms);
        let n = found.len();
        self.threats.extend(found);
        n
    }

    /// Threats `step` poses to links already in the plan.
    pub fn threats_from_step(&self, step: StepId, terms: &TermSpace) -> Vec<Threat> {
        let Some(action) = self.steps.get(step) else {
            return Vec::new();
        };
        self.links
            .iter()
            .filter(|link| link.producer != step && link.consumer != step)
            .filter(|link| action.deletes(&link.predicate, terms))
            .map(|link| Threat { step, link: *link })
            .filter(|threat| !self.is_threat_addressed(threat))
            .collect()
    }

    pub fn add_threats_from_step(&mut self, step: StepId, terms: &TermSpace) -> usize {
        let found = self.threats_from_step(step, terms);
        let n = found.len();
        self.threats.extend(found);
        n
    }

    /// Replace `old` with `new` in every predicate reachable from this node.
    pub fn substitute(&mut self, old: Term, new: Term) {
        for action in &mut self.steps {
            action.substitute(old, new);
        }
        for open in &mut self.open_conditions {
            open.predicate.substitute(old, new);
        }
        for link in &mut self.links {
            link.predicate.substitute(old, new);
        }
        for threat in &mut self.threats {
            threat.link.predicate.substitute(old, new);
        }
    }

    pub fn apply_bindings(&mut self, bindings: &Bindings) {
        for (var, value) in bindings.resolved() {
            if var != value {
                self.substitute(var, value);
            }
        }
    }

    /// Every predicate the node holds: step lists, open conditions, link and threat predicates.
    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> + '_ {
        self.steps
            .iter()
            .flat_map(|a| {
                a.preconditions()
                    .iter()
                    .chain(a.add_list())
                    .chain(a.delete_list())
            })
            .chain(self.open_conditions.iter().map(|o| &o.predicate))
            .chain(self.links.iter().map(|l| &l.predicate))
            .chain(self.threats.iter().map(|t| &t.link.predicate))
    }

    pub fn mentions(&self, term: Term) -> bool {
        self.steps.iter().any(|a| a.mentions(term)) || self.predicates().any(|p| p.mentions(term))
    }

    pub fn topological_sort(&self) -> TopoSort {
        topological_sort(
            self.orderings.iter().map(|o| (o.before, o.after)),
            self.steps.len(),
        )
    }

    pub fn is_order_consistent(&self) -> bool {
        self.topological_sort().acyclic
    }

    /// A total order of all steps consistent with the constraints, if one exists.
    pub fn linearize(&self) -> Option<Vec<StepId>> {
        let sorted = self.topological_sort();
        sorted.acyclic.then_some(sorted.order)
    }

    /// No open preconditions and no outstanding threats.
    pub fn is_complete(&self) -> bool {
        self.open_conditions.is_empty() && self.threats.is_empty()
    }

    /// Structural checks for a root node handed to the planner.
    pub fn validate(&self, terms: &TermSpace) -> Result<(), PlanValidationError> {
        let (start, finish) = match self.steps.as_slice() {
            [start, finish, ..] => (start, finish),
            _ => return Err(PlanValidationError::MissingBookends),
        };
        if start.kind() != ActionKind::Start {
            return Err(PlanValidationError::MissingStart(start.kind()));
        }
        if finish.kind() != ActionKind::Finish {
            return Err(PlanValidationError::MissingFinish(finish.kind()));
        }
        if !self.is_ordered(START, FINISH) {
            return Err(PlanValidationError::MissingBookendOrdering);
        }

        let check_terms = |context: &'static str, p: &Predicate| {
            match p.args().iter().find(|&&t| !terms.is_ground(t)) {
                Some(&term) => Err(PlanValidationError::UnknownTerm { context, term }),
                None => Ok(()),
            }
        };
        for p in start.add_list() {
            check_terms("initial fact", p)?;
        }
        for p in finish.preconditions() {
            check_terms("goal fact", p)?;
        }

        let steps = self.steps.len();
        let check_step = |context: &'static str, step: StepId| {
            if step < steps {
                Ok(())
            } else {
                Err(PlanValidationError::StepOutOfRange {
                    context,
                    step,
                    steps,
                })
            }
        };
        for open in &self.open_conditions {
            check_step("open condition", open.owner)?;
        }
        for link in &self.links {
            check_step("causal link", link.producer)?;
            check_step("causal link", link.consumer)?;
        }
        for o in &self.orderings {
            check_step("ordering", o.before)?;
            check_step("ordering", o.after)?;
        }
        Ok(())
    }
}
