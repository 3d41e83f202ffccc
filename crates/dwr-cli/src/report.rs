//! Machine-readable record of one `dwr solve` run.

use chrono::{DateTime, Utc};
use dwr_pocl::{BudgetKind, PlanError, PlanExport, SearchStats};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Solved,
    NotFound,
    BudgetExhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    pub problem: String,
    pub generated_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetKind>,
    pub stats: SearchStats,
    /// The solution, or the best partial plan when the search failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanExport>,
}

impl SolveReport {
    pub fn solved(problem: &str, elapsed_ms: u64, stats: SearchStats, plan: PlanExport) -> Self {
        Self {
            problem: problem.to_string(),
            generated_at: Utc::now(),
            elapsed_ms,
            outcome: Outcome::Solved,
            budget: None,
            stats,
            plan: Some(plan),
        }
    }

    /// `None` for errors raised before the search started.
    pub fn failed(
        problem: &str,
        elapsed_ms: u64,
        err: &PlanError,
        partial: Option<PlanExport>,
    ) -> Option<Self> {
        let (outcome, budget, stats) = match err {
            PlanError::Malformed(_) => return None,
            PlanError::NotFound { stats, .. } => (Outcome::NotFound, None, *stats),
            PlanError::BudgetExhausted { reason, stats, .. } => {
                (Outcome::BudgetExhausted, Some(*reason), *stats)
            }
        };
        Some(Self {
            problem: problem.to_string(),
            generated_at: Utc::now(),
            elapsed_ms,
            outcome,
            budget,
            stats,
            plan: partial,
        })
    }
}
