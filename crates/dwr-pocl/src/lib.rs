//! Deterministic partial-order causal-link planner over `dwr-core` causal plans.
//!
//! The search is best-first over whole plan nodes. Each pop either resolves the newest threat
//! (promotion or demotion) or supports the earliest open condition, by reusing an existing step
//! or by adding a fresh operator instance. Every child is an independent copy of its parent.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod export;
pub mod heuristic;
pub mod planner;
pub mod trace;

pub use export::{
    ExportedLink, ExportedOpenCondition, ExportedOrdering, ExportedStep, ExportedThreat, PlanExport,
};
pub use heuristic::{evaluate, Evaluation, HeuristicWeights, RedundancyPolicy};
pub use planner::{PoclPlanner, PoclPlannerConfig, SearchStats, Solution};
pub use trace::{
    NullSearchSink, PruneReason, SearchEvent, SearchEventKind, SearchSink, VecSearchSink,
};

use dwr_core::{CausalPlan, PlanValidationError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which search budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BudgetKind {
    Expansions,
    StepCeiling,
}

impl core::fmt::Display for BudgetKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            BudgetKind::Expansions => "expansion budget",
            BudgetKind::StepCeiling => "step ceiling",
        })
    }
}

/// Error type for planning.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("malformed initial plan: {0}")]
    Malformed(#[from] PlanValidationError),

    /// The frontier emptied: no plan exists within the operator schema.
    #[error("no plan found after {} expansions", .stats.expansions)]
    NotFound {
        stats: SearchStats,
        best_partial: Option<Box<CausalPlan>>,
    },

    /// A budget ran out before the search could prove anything.
    #[error("{reason} exhausted after {} expansions", .stats.expansions)]
    BudgetExhausted {
        reason: BudgetKind,
        stats: SearchStats,
        best_partial: Option<Box<CausalPlan>>,
    },
}

impl PlanError {
    pub fn stats(&self) -> Option<&SearchStats> {
        match self {
            PlanError::Malformed(_) => None,
            PlanError::NotFound { stats, .. } | PlanError::BudgetExhausted { stats, .. } => {
                Some(stats)
            }
        }
    }

    pub fn best_partial(&self) -> Option<&CausalPlan> {
        match self {
            PlanError::Malformed(_) => None,
            PlanError::NotFound { best_partial, .. }
            | PlanError::BudgetExhausted { best_partial, .. } => best_partial.as_deref(),
        }
    }
}

/// Result type for planning.
pub type Result<T> = std::result::Result<T, PlanError>;
