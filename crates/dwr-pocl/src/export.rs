//! Rendering of finished plans for people and downstream tools.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use dwr_core::{CausalLink, CausalPlan, StepId, TermSpace, FINISH, START};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportedStep {
    pub id: StepId,
    pub name: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportedOrdering {
    pub before: StepId,
    pub after: StepId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportedLink {
    pub producer: StepId,
    pub predicate: String,
    pub consumer: StepId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportedOpenCondition {
    pub owner: StepId,
    pub predicate: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportedThreat {
    pub step: StepId,
    pub link: ExportedLink,
}

/// A plan flattened to names: steps in execution order, the orderings between operator steps,
/// and the causal links. Partial plans also keep their remaining flaws.
///
/// `Display` writes the `actions` / `constraints` / `links` text layout, followed by `open` and
/// `threats` sections when those are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanExport {
    pub steps: Vec<ExportedStep>,
    pub orderings: Vec<ExportedOrdering>,
    pub links: Vec<ExportedLink>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub open_conditions: Vec<ExportedOpenCondition>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub threats: Vec<ExportedThreat>,
}

impl PlanExport {
    /// `None` if the plan's orderings are cyclic.
    pub fn from_plan(plan: &CausalPlan, terms: &TermSpace) -> Option<Self> {
        let order = plan.linearize()?;

        let steps = order
            .into_iter()
            .filter_map(|id| {
                let action = plan.step(id)?;
                Some(ExportedStep {
                    id,
                    name: action.kind().name().to_string(),
                    args: action.args().iter().map(|&t| terms.name_of(t)).collect(),
                })
            })
            .collect();

        let orderings = plan
            .orderings()
            .filter(|o| ![o.before, o.after].iter().any(|&s| s == START || s == FINISH))
            .map(|o| ExportedOrdering {
                before: o.before,
                after: o.after,
            })
            .collect();

        let links = plan
            .links()
            .iter()
            .map(|link| ExportedLink::new(link, terms))
            .collect();

        let open_conditions = plan
            .open_conditions()
            .iter()
            .map(|open| ExportedOpenCondition {
                owner: open.owner,
                predicate: open.predicate.display(terms).to_string(),
            })
            .collect();

        let threats = plan
            .threats()
            .iter()
            .map(|threat| ExportedThreat {
                step: threat.step,
                link: ExportedLink::new(&threat.link, terms),
            })
            .collect();

        Some(Self {
            steps,
            orderings,
            links,
            open_conditions,
            threats,
        })
    }

    /// No open conditions and no threats.
    pub fn is_complete(&self) -> bool {
        self.open_conditions.is_empty() && self.threats.is_empty()
    }

    /// Operator steps only, in execution order.
    pub fn operators(&self) -> impl Iterator<Item = &ExportedStep> + '_ {
        self.steps
            .iter()
            .filter(|s| s.id != START && s.id != FINISH)
    }
}

impl ExportedLink {
    fn new(link: &CausalLink, terms: &TermSpace) -> Self {
        Self {
            producer: link.producer,
            predicate: link.predicate.display(terms).to_string(),
            consumer: link.consumer,
        }
    }
}

impl fmt::Display for ExportedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.producer, self.consumer, self.predicate)
    }
}

impl fmt::Display for ExportedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PlanExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "actions")?;
        for step in &self.steps {
            writeln!(f, "{} {}", step.id, step)?;
        }
        writeln!(f)?;
        writeln!(f, "constraints")?;
        for o in &self.orderings {
            writeln!(f, "{} < {}", o.before, o.after)?;
        }
        writeln!(f)?;
        writeln!(f, "links")?;
        for link in &self.links {
            writeln!(f, "{link}")?;
        }
        if !self.open_conditions.is_empty() {
            writeln!(f)?;
            writeln!(f, "open")?;
            for open in &self.open_conditions {
                writeln!(f, "{} {}", open.owner, open.predicate)?;
            }
        }
        if !self.threats.is_empty() {
            writeln!(f)?;
            writeln!(f, "threats")?;
            for threat in &self.threats {
                writeln!(f, "{} {}", threat.step, threat.link)?;
            }
        }
        Ok(())
    }
}
