//! Frontier cost and redundant-step detection.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use dwr_core::{Action, ActionKind, CausalPlan, StepId, FINISH, START};

/// Linear weights of the frontier cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeuristicWeights {
    pub steps: u32,
    pub open_conditions: u32,
    pub threats: u32,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            steps: 1,
            open_conditions: 1,
            threats: 0,
        }
    }
}

/// What to do with a child whose newest step undoes (or merely repeats) its neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "snake_case"))]
pub enum RedundancyPolicy {
    Off,
    Penalize { penalty: u32 },
    Reject,
}

impl Default for RedundancyPolicy {
    fn default() -> Self {
        Self::Penalize { penalty: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Cost(u32),
    /// Redundant under [`RedundancyPolicy::Penalize`]; the cost includes the penalty.
    Penalized(u32),
    Inconsistent,
    Redundant,
}

impl Evaluation {
    /// Frontier cost, if the node may be queued.
    pub fn cost(self) -> Option<u32> {
        match self {
            Evaluation::Cost(cost) | Evaluation::Penalized(cost) => Some(cost),
            Evaluation::Inconsistent | Evaluation::Redundant => None,
        }
    }
}

/// Score a plan node. Lower is better.
pub fn evaluate(
    plan: &CausalPlan,
    weights: HeuristicWeights,
    redundancy: RedundancyPolicy,
) -> Evaluation {
    let Some(order) = plan.linearize() else {
        return Evaluation::Inconsistent;
    };

    let cost = weight(weights.steps, plan.operator_steps())
        .saturating_add(weight(weights.open_conditions, plan.open_conditions().len()))
        .saturating_add(weight(weights.threats, plan.threats().len()));

    match redundancy {
        RedundancyPolicy::Off => {}
        RedundancyPolicy::Penalize { penalty } => {
            if newest_step_is_redundant(plan, &order) {
                return Evaluation::Penalized(cost.saturating_add(penalty));
            }
        }
        RedundancyPolicy::Reject => {
            if newest_step_is_redundant(plan, &order) {
                return Evaluation::Redundant;
            }
        }
    }
    Evaluation::Cost(cost)
}

fn weight(w: u32, n: usize) -> u32 {
    w.saturating_mul(u32::try_from(n).unwrap_or(u32::MAX))
}

/// Whether the most recently appended step sits next to a step it cancels out in `order`.
///
/// Recognised pairs, in execution order:
///
/// - `put` then `take` of the same container
/// - two `move`s of the same robot
/// - `load` then `unload` of the same container on the same robot
pub fn newest_step_is_redundant(plan: &CausalPlan, order: &[StepId]) -> bool {
    let newest = plan.steps().len().saturating_sub(1);
    if newest <= FINISH {
        return false;
    }
    let Some(pos) = order.iter().position(|&id| id == newest) else {
        return false;
    };

    let step = |i: usize| {
        order
            .get(i)
            .filter(|&&id| id != START && id != FINISH)
            .and_then(|&id| plan.step(id))
    };
    let current = &plan.steps()[newest];

    let before = pos.checked_sub(1).and_then(step);
    let after = step(pos + 1);
    before.is_some_and(|prev| cancels(prev, current))
        || after.is_some_and(|next| cancels(current, next))
}

fn cancels(first: &Action, second: &Action) -> bool {
    let (a, b) = (first.args(), second.args());
    match (first.kind(), second.kind()) {
        (ActionKind::Put, ActionKind::Take) => a[2] == b[2],
        (ActionKind::Move, ActionKind::Move) => a[0] == b[0],
        (ActionKind::Load, ActionKind::Unload) => a[2] == b[2] && a[3] == b[3],
        _ => false,
    }
}
