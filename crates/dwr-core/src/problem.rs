//! Reader for problem description files.
//!
//! ```text
//! locations 2
//! robots 1
//! cranes 0
//! piles 0
//! containers 0
//! initial
//! adjacent l0 l1
//! at r0 l0
//! goal
//! at r0 l1
//! ```
//!
//! Lines starting with `#` are comments. The five counts come first (any order, each exactly
//! once); facts after `initial` hold in the initial state, facts after `goal` must hold at the
//! end.

use std::path::Path;

use crate::plan::CausalPlan;
use crate::predicate::{Predicate, PredicateKind};
use crate::term::{ObjectCounts, Term, TermSpace, MAX_GROUND_TERMS};

#[derive(Debug, thiserror::Error)]
pub enum ProblemError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: invalid count {value:?} for {name}")]
    BadCount {
        line: usize,
        name: String,
        value: String,
    },

    #[error("line {line}: {name} declared twice")]
    DuplicateCount { line: usize, name: String },

    #[error("line {line}: {name} declared after the `initial`/`goal` sections started")]
    CountAfterHeader { line: usize, name: String },

    #[error("line {line}: object counts exceed {max} ground terms", max = MAX_GROUND_TERMS)]
    CountOverflow { line: usize },

    #[error("missing object count: {0}")]
    MissingCount(&'static str),

    #[error("line {line}: fact appears before an `initial` or `goal` section")]
    FactOutsideSection { line: usize },

    #[error("line {line}: unknown predicate {name:?}")]
    UnknownPredicate { line: usize, name: String },

    #[error("line {line}: {kind} takes {expected} argument(s), got {found}")]
    Arity {
        line: usize,
        kind: PredicateKind,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: unknown object {name:?}")]
    UnknownTerm { line: usize, name: String },

    #[error("line {line}: variables are not allowed in problem files ({name})")]
    VariableInProblem { line: usize, name: String },
}

const COUNT_NAMES: [&str; 5] = ["locations", "robots", "cranes", "piles", "containers"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Initial,
    Goal,
}

/// A parsed problem: its term space, initial facts, and goal facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub terms: TermSpace,
    pub initial: Vec<Predicate>,
    pub goal: Vec<Predicate>,
}

impl Problem {
    pub fn load(path: &Path) -> Result<Self, ProblemError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProblemError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(input: &str) -> Result<Self, ProblemError> {
        let mut counts: [Option<u32>; 5] = [None; 5];
        let mut terms: Option<TermSpace> = None;
        let mut section = Section::Header;
        let mut initial = Vec::new();
        let mut goal = Vec::new();

        for (index, raw) in input.lines().enumerate() {
            let line = index + 1;
            let text = raw.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            let words: Vec<&str> = text.split_whitespace().collect();
            let head = words[0];

            if let Some(slot) = COUNT_NAMES.iter().position(|&n| n == head) {
                if section != Section::Header {
                    return Err(ProblemError::CountAfterHeader {
                        line,
                        name: head.to_string(),
                    });
                }
                if counts[slot].is_some() {
                    return Err(ProblemError::DuplicateCount {
                        line,
                        name: head.to_string(),
                    });
                }
                let value = words.last().copied().unwrap_or_default();
                let parsed = match (words.len(), value.parse::<u32>()) {
                    (2, Ok(n)) => n,
                    _ => {
                        return Err(ProblemError::BadCount {
                            line,
                            name: head.to_string(),
                            value: words[1..].join(" "),
                        })
                    }
                };
                counts[slot] = Some(parsed);
                continue;
            }

            match head {
                "initial" | "goal" => {
                    if terms.is_none() {
                        terms = Some(Self::term_space(&counts, line)?);
                    }
                    section = if head == "initial" {
                        Section::Initial
                    } else {
                        Section::Goal
                    };
                    continue;
                }
                _ => {}
            }

            let Some(space) = terms.as_ref() else {
                return Err(ProblemError::FactOutsideSection { line });
            };
            let fact = Self::parse_fact(line, &words, space)?;
            match section {
                Section::Initial => initial.push(fact),
                Section::Goal => goal.push(fact),
                Section::Header => return Err(ProblemError::FactOutsideSection { line }),
            }
        }

        let terms = match terms {
            Some(terms) => terms,
            None => Self::term_space(&counts, input.lines().count())?,
        };
        Ok(Self {
            terms,
            initial,
            goal,
        })
    }

    /// `line` is where the term space became necessary: the first section header, or the end
    /// of input.
    fn term_space(counts: &[Option<u32>; 5], line: usize) -> Result<TermSpace, ProblemError> {
        let get = |slot: usize| counts[slot].ok_or(ProblemError::MissingCount(COUNT_NAMES[slot]));
        TermSpace::new(ObjectCounts {
            locations: get(0)?,
            robots: get(1)?,
            cranes: get(2)?,
            piles: get(3)?,
            containers: get(4)?,
        })
        .map_err(|_| ProblemError::CountOverflow { line })
    }

    fn parse_fact(line: usize, words: &[&str], terms: &TermSpace) -> Result<Predicate, ProblemError> {
        let kind = PredicateKind::from_name(words[0]).ok_or_else(|| ProblemError::UnknownPredicate {
            line,
            name: words[0].to_string(),
        })?;
        let names = &words[1..];
        if names.len() != kind.arity() {
            return Err(ProblemError::Arity {
                line,
                kind,
                expected: kind.arity(),
                found: names.len(),
            });
        }
        let args = names
            .iter()
            .map(|name| Self::parse_term(line, name, terms))
            .collect::<Result<Vec<Term>, _>>()?;
        Predicate::new(kind, &args).map_err(|e| ProblemError::Arity {
            line,
            kind,
            expected: e.expected,
            found: e.found,
        })
    }

    fn parse_term(line: usize, name: &str, terms: &TermSpace) -> Result<Term, ProblemError> {
        let id = terms.id_of(name).ok_or_else(|| ProblemError::UnknownTerm {
            line,
            name: name.to_string(),
        })?;
        if terms.is_variable(id) {
            return Err(ProblemError::VariableInProblem {
                line,
                name: name.to_string(),
            });
        }
        Ok(id)
    }

    /// The root search node for this problem.
    pub fn initial_plan(&self) -> CausalPlan {
        CausalPlan::new(self.initial.clone(), self.goal.clone(), &self.terms)
    }
}
