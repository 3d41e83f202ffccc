//! Planning kernel for the dock-worker-robots domain.
//!
//! Terms, predicates, the operator schema, flat unification, and the partial-order causal plan
//! that the POCL search in `dwr-pocl` branches over.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod operator;
pub mod order;
pub mod plan;
pub mod predicate;
pub mod problem;
pub mod term;
pub mod unify;

pub use action::{Action, ActionArityError};
pub use operator::ActionKind;
pub use order::{is_order_consistent, topological_sort, TopoSort};
pub use plan::{
    CausalLink, CausalPlan, OpenCondition, OrderingConstraint, PlanValidationError, StepId, Threat,
    FINISH, START,
};
pub use predicate::{ArityError, Predicate, PredicateKind};
pub use problem::{Problem, ProblemError};
pub use term::{
    CountOverflow, ObjectCounts, Term, TermCategory, TermSpace, VarSupply, MAX_GROUND_TERMS,
};
pub use unify::{unify, Binding, Bindings, UnifyError};
