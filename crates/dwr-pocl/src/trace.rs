//! Structured record of what the search did, one event per decision.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use dwr_core::StepId;

/// Why a child never reached the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PruneReason {
    /// Its ordering constraints form a cycle.
    Inconsistent,
    /// It has more operator steps than the configured ceiling.
    Oversized,
    /// Its newest step undoes its neighbour and the policy rejects that.
    Redundant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "snake_case"))]
pub enum SearchEventKind {
    /// A node left the frontier.
    Pop { cost: u32, open: usize, threats: usize },
    /// The popped node's newest threat was branched on.
    Threat { step: StepId, producer: StepId, consumer: StepId },
    /// The popped node's earliest open condition was supported.
    Open { owner: StepId, children: usize },
    Prune { reason: PruneReason, steps: usize },
    Solved { steps: usize, links: usize },
}

/// One search event, stamped with the expansion it happened during.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchEvent {
    pub expansion: usize,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: SearchEventKind,
}

pub trait SearchSink {
    fn emit(&mut self, event: SearchEvent);
}

/// Drops every event.
#[derive(Debug, Default)]
pub struct NullSearchSink;

impl SearchSink for NullSearchSink {
    fn emit(&mut self, _event: SearchEvent) {}
}

/// Keeps every event in order, for tests and offline inspection.
#[derive(Debug, Default)]
pub struct VecSearchSink {
    pub events: Vec<SearchEvent>,
}

impl VecSearchSink {
    pub fn kinds(&self) -> impl Iterator<Item = &SearchEventKind> + '_ {
        self.events.iter().map(|e| &e.kind)
    }

    /// How many children were dropped for `reason`.
    pub fn pruned(&self, reason: PruneReason) -> usize {
        self.kinds()
            .filter(|k| matches!(k, SearchEventKind::Prune { reason: r, .. } if *r == reason))
            .count()
    }
}

impl SearchSink for VecSearchSink {
    fn emit(&mut self, event: SearchEvent) {
        self.events.push(event);
    }
}
