use core::cmp::Ordering;
use std::collections::BinaryHeap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use dwr_core::{
    Action, ActionKind, Bindings, CausalLink, CausalPlan, OpenCondition, Predicate, TermSpace,
};

use crate::heuristic::{evaluate, Evaluation, HeuristicWeights, RedundancyPolicy};
use crate::trace::{NullSearchSink, PruneReason, SearchEvent, SearchEventKind, SearchSink};
use crate::{BudgetKind, PlanError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoclPlannerConfig {
    /// Frontier pops before giving up.
    pub max_expansions: usize,
    /// Ceiling on non-bookend steps; larger children are dropped.
    pub max_steps: usize,
    pub weights: HeuristicWeights,
    pub redundancy: RedundancyPolicy,
    /// Attach the least-flawed plan seen to failures.
    pub keep_best_partial: bool,
}

impl Default for PoclPlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: 20_000,
            max_steps: 24,
            weights: HeuristicWeights::default(),
            redundancy: RedundancyPolicy::default(),
            keep_best_partial: true,
        }
    }
}

/// Counters collected over one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchStats {
    pub expansions: usize,
    pub generated: usize,
    pub pruned_inconsistent: usize,
    pub pruned_oversized: usize,
    pub pruned_redundant: usize,
    /// Children queued with a redundancy penalty.
    pub penalized_redundant: usize,
    pub max_frontier: usize,
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub plan: CausalPlan,
    pub stats: SearchStats,
}

#[derive(Debug, Clone, Default)]
pub struct PoclPlanner {
    config: PoclPlannerConfig,
}

#[derive(Debug)]
struct OpenNode {
    cost: u32,
    tie: u64,
    plan: Box<CausalPlan>,
}

impl OpenNode {
    fn key(&self) -> (u32, u64) {
        (self.cost, self.tie)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Least-flawed node popped so far: fewest open conditions plus threats, then lowest cost.
#[derive(Default)]
struct BestPartial {
    key: Option<(usize, u32)>,
    plan: Option<Box<CausalPlan>>,
}

impl BestPartial {
    fn offer(&mut self, node: &OpenNode) {
        let flaws = node.plan.open_conditions().len() + node.plan.threats().len();
        let key = (flaws, node.cost);
        if self.key.map_or(true, |best| key < best) {
            self.key = Some(key);
            self.plan = Some(node.plan.clone());
        }
    }
}

struct Frontier<'s> {
    heap: BinaryHeap<OpenNode>,
    tie: u64,
    stats: SearchStats,
    sink: &'s mut dyn SearchSink,
}

impl Frontier<'_> {
    /// Score `plan` and queue it, or count why it was dropped.
    fn push(&mut self, plan: CausalPlan, config: &PoclPlannerConfig) {
        let reason = if plan.operator_steps() > config.max_steps {
            self.stats.pruned_oversized += 1;
            PruneReason::Oversized
        } else {
            match evaluate(&plan, config.weights, config.redundancy) {
                eval @ (Evaluation::Cost(cost) | Evaluation::Penalized(cost)) => {
                    if matches!(eval, Evaluation::Penalized(_)) {
                        self.stats.penalized_redundant += 1;
                    }
                    self.heap.push(OpenNode {
                        cost,
                        tie: self.tie,
                        plan: Box::new(plan),
                    });
                    self.tie += 1;
                    self.stats.max_frontier = self.stats.max_frontier.max(self.heap.len());
                    return;
                }
                Evaluation::Inconsistent => {
                    self.stats.pruned_inconsistent += 1;
                    PruneReason::Inconsistent
                }
                Evaluation::Redundant => {
                    self.stats.pruned_redundant += 1;
                    PruneReason::Redundant
                }
            }
        };
        self.emit(SearchEventKind::Prune {
            reason,
            steps: plan.operator_steps(),
        });
    }

    fn emit(&mut self, kind: SearchEventKind) {
        self.sink.emit(SearchEvent {
            expansion: self.stats.expansions,
            kind,
        });
    }
}

impl PoclPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: PoclPlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PoclPlannerConfig {
        &self.config
    }

    pub fn plan(&self, initial: CausalPlan, terms: &TermSpace) -> Result<Solution> {
        self.plan_traced(initial, terms, &mut NullSearchSink)
    }

    /// Best-first search from `initial`, reporting progress to `sink`.
    pub fn plan_traced(
        &self,
        initial: CausalPlan,
        terms: &TermSpace,
        sink: &mut dyn SearchSink,
    ) -> Result<Solution> {
        initial.validate(terms)?;

        let mut frontier = Frontier {
            heap: BinaryHeap::new(),
            tie: 0,
            stats: SearchStats::default(),
            sink,
        };
        let mut best = BestPartial::default();
        frontier.push(initial, &self.config);

        while let Some(node) = frontier.heap.pop() {
            if frontier.stats.expansions >= self.config.max_expansions {
                let stats = frontier.stats;
                warn!(
                    expansions = stats.expansions,
                    frontier = frontier.heap.len() + 1,
                    "expansion budget exhausted"
                );
                return Err(PlanError::BudgetExhausted {
                    reason: BudgetKind::Expansions,
                    stats,
                    best_partial: self.partial(best),
                });
            }
            frontier.stats.expansions += 1;

            let plan = &node.plan;
            frontier.emit(SearchEventKind::Pop {
                cost: node.cost,
                open: plan.open_conditions().len(),
                threats: plan.threats().len(),
            });
            trace!(
                expansion = frontier.stats.expansions,
                cost = node.cost,
                steps = plan.operator_steps(),
                open = plan.open_conditions().len(),
                threats = plan.threats().len(),
                "pop"
            );

            if !plan.is_order_consistent() {
                frontier.stats.pruned_inconsistent += 1;
                continue;
            }

            if plan.is_complete() {
                let stats = frontier.stats;
                frontier.emit(SearchEventKind::Solved {
                    steps: plan.operator_steps(),
                    links: plan.links().len(),
                });
                info!(
                    steps = plan.operator_steps(),
                    links = plan.links().len(),
                    expansions = stats.expansions,
                    generated = stats.generated,
                    "plan found"
                );
                return Ok(Solution {
                    plan: *node.plan,
                    stats,
                });
            }

            if self.config.keep_best_partial {
                best.offer(&node);
            }

            if let Some(threat) = plan.threats().last() {
                frontier.emit(SearchEventKind::Threat {
                    step: threat.step,
                    producer: threat.link.producer,
                    consumer: threat.link.consumer,
                });
            }
            let owner = plan.open_conditions().first().map(|o| o.owner);

            let children = self.expand(plan, terms);
            frontier.stats.generated += children.len();
            if plan.threats().is_empty() {
                if let Some(owner) = owner {
                    frontier.emit(SearchEventKind::Open {
                        owner,
                        children: children.len(),
                    });
                }
            }
            if frontier.stats.expansions % 1000 == 0 {
                debug!(
                    expansions = frontier.stats.expansions,
                    frontier = frontier.heap.len(),
                    generated = frontier.stats.generated,
                    "search progress"
                );
            }

            for child in children {
                frontier.push(child, &self.config);
            }
        }

        let stats = frontier.stats;
        let best_partial = self.partial(best);
        if stats.pruned_oversized > 0 {
            warn!(
                max_steps = self.config.max_steps,
                pruned = stats.pruned_oversized,
                "frontier exhausted under the step ceiling"
            );
            Err(PlanError::BudgetExhausted {
                reason: BudgetKind::StepCeiling,
                stats,
                best_partial,
            })
        } else {
            debug!(expansions = stats.expansions, "frontier exhausted");
            Err(PlanError::NotFound {
                stats,
                best_partial,
            })
        }
    }

    fn partial(&self, best: BestPartial) -> Option<Box<CausalPlan>> {
        if self.config.keep_best_partial {
            best.plan
        } else {
            None
        }
    }

    /// Children of `plan`: resolve its newest threat if it has one, otherwise its earliest open
    /// condition. Children are not scored or filtered.
    pub fn expand(&self, plan: &CausalPlan, terms: &TermSpace) -> Vec<CausalPlan> {
        if !plan.threats().is_empty() {
            return resolve_threat(plan);
        }
        let mut base = plan.clone();
        match base.take_open_condition(0) {
            Some(open) => {
                let mut children = reuse_steps(&base, open, terms);
                children.extend(add_operators(&base, open, terms));
                children
            }
            None => Vec::new(),
        }
    }
}

/// Promotion then demotion of the most recently recorded threat.
fn resolve_threat(plan: &CausalPlan) -> Vec<CausalPlan> {
    let mut base = plan.clone();
    let Some(threat) = base.pop_threat() else {
        return Vec::new();
    };

    let mut promoted = base.clone();
    promoted.enforce_ordering(threat.step, threat.link.producer);

    let mut demoted = base;
    demoted.enforce_ordering(threat.link.consumer, threat.step);

    vec![promoted, demoted]
}

/// Support `open` with a step already in the plan.
fn reuse_steps(base: &CausalPlan, open: OpenCondition, terms: &TermSpace) -> Vec<CausalPlan> {
    let mut children = Vec::new();
    for (producer, action) in base.steps().iter().enumerate() {
        if producer == open.owner {
            continue;
        }
        for theta in action.adds(&open.predicate, terms) {
            let mut child = base.clone();
            child.apply_bindings(&theta);
            let link = CausalLink {
                producer,
                predicate: bind(open.predicate, &theta),
                consumer: open.owner,
            };
            child.add_link(link);
            child.add_threats_to_link(&link, terms);
            children.push(child);
        }
    }
    children
}

/// Support `open` with a new instance of each operator.
fn add_operators(base: &CausalPlan, open: OpenCondition, terms: &TermSpace) -> Vec<CausalPlan> {
    let mut children = Vec::new();
    for kind in ActionKind::OPERATORS {
        let mut supply = base.var_supply();
        let Ok(action) = Action::fresh(kind, &mut supply) else {
            continue;
        };
        for theta in action.adds(&open.predicate, terms) {
            let mut child = base.clone();
            child.reserve_variables(supply);
            let producer = child.add_step(action.clone());
            child.apply_bindings(&theta);
            let link = CausalLink {
                producer,
                predicate: bind(open.predicate, &theta),
                consumer: open.owner,
            };
            child.add_link(link);
            child.add_threats_from_step(producer, terms);
            child.add_threats_to_link(&link, terms);
            children.push(child);
        }
    }
    children
}

fn bind(mut predicate: Predicate, theta: &Bindings) -> Predicate {
    for (var, value) in theta.resolved() {
        predicate.substitute(var, value);
    }
    predicate
}
