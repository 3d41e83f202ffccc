use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Flat integer encoding of ground objects and free variables.
pub type Term = u32;

/// Object counts declared by a problem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectCounts {
    pub locations: u32,
    pub robots: u32,
    pub cranes: u32,
    pub piles: u32,
    pub containers: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TermCategory {
    Location,
    Robot,
    Crane,
    Pile,
    Container,
    /// The single "no location" padding literal, also used as the pile bottom.
    Padding,
    Variable,
}

impl TermCategory {
    fn prefix(self) -> char {
        match self {
            TermCategory::Location => 'l',
            TermCategory::Robot => 'r',
            TermCategory::Crane => 'k',
            TermCategory::Pile => 'p',
            TermCategory::Container => 'c',
            TermCategory::Padding => 'G',
            TermCategory::Variable => 'x',
        }
    }
}

/// Upper bound on ground ids; the rest of the range belongs to variables and the empty-slot
/// sentinel `Term::MAX`.
pub const MAX_GROUND_TERMS: Term = Term::MAX / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("object counts need more than {MAX_GROUND_TERMS} ground terms")]
pub struct CountOverflow;

/// Maps between symbolic names (`l0`, `r2`, `x7`, ...) and dense term ids.
///
/// Ground literals occupy `0..ground_end()` in the fixed order locations, robots, cranes, piles,
/// containers, padding. Every id at or above `ground_end()` is a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TermSpace {
    location_end: Term,
    robot_end: Term,
    crane_end: Term,
    pile_end: Term,
    container_end: Term,
    ground_end: Term,
}

impl TermSpace {
    /// Lay out the ground ranges for `counts`.
    ///
    /// Fails when the ground literals would not fit below [`MAX_GROUND_TERMS`].
    pub fn new(counts: ObjectCounts) -> Result<Self, CountOverflow> {
        let location_end = counts.locations;
        let robot_end = location_end.checked_add(counts.robots).ok_or(CountOverflow)?;
        let crane_end = robot_end.checked_add(counts.cranes).ok_or(CountOverflow)?;
        let pile_end = crane_end.checked_add(counts.piles).ok_or(CountOverflow)?;
        let container_end = pile_end.checked_add(counts.containers).ok_or(CountOverflow)?;
        let ground_end = container_end.checked_add(1).ok_or(CountOverflow)?;
        if ground_end > MAX_GROUND_TERMS {
            return Err(CountOverflow);
        }
        Ok(Self {
            location_end,
            robot_end,
            crane_end,
            pile_end,
            container_end,
            ground_end,
        })
    }

    pub fn counts(&self) -> ObjectCounts {
        ObjectCounts {
            locations: self.location_end,
            robots: self.robot_end - self.location_end,
            cranes: self.crane_end - self.robot_end,
            piles: self.pile_end - self.crane_end,
            containers: self.container_end - self.pile_end,
        }
    }

    pub fn is_variable(&self, term: Term) -> bool {
        term >= self.ground_end
    }

    pub fn is_ground(&self, term: Term) -> bool {
        term < self.ground_end
    }

    /// Id of the padding literal `G`.
    pub fn padding(&self) -> Term {
        self.container_end
    }

    pub fn ground_end(&self) -> Term {
        self.ground_end
    }

    pub fn first_variable(&self) -> Term {
        self.ground_end
    }

    /// A variable supply whose first id is the first variable of this space.
    pub fn var_supply(&self) -> VarSupply {
        VarSupply {
            next: self.ground_end,
        }
    }

    pub fn category(&self, term: Term) -> TermCategory {
        if term < self.location_end {
            TermCategory::Location
        } else if term < self.robot_end {
            TermCategory::Robot
        } else if term < self.crane_end {
            TermCategory::Crane
        } else if term < self.pile_end {
            TermCategory::Pile
        } else if term < self.container_end {
            TermCategory::Container
        } else if term < self.ground_end {
            TermCategory::Padding
        } else {
            TermCategory::Variable
        }
    }

    fn range_start(&self, category: TermCategory) -> Term {
        match category {
            TermCategory::Location => 0,
            TermCategory::Robot => self.location_end,
            TermCategory::Crane => self.robot_end,
            TermCategory::Pile => self.crane_end,
            TermCategory::Container => self.pile_end,
            TermCategory::Padding => self.container_end,
            TermCategory::Variable => self.ground_end,
        }
    }

    fn range_end(&self, category: TermCategory) -> Option<Term> {
        match category {
            TermCategory::Location => Some(self.location_end),
            TermCategory::Robot => Some(self.robot_end),
            TermCategory::Crane => Some(self.crane_end),
            TermCategory::Pile => Some(self.pile_end),
            TermCategory::Container => Some(self.container_end),
            TermCategory::Padding => Some(self.ground_end),
            TermCategory::Variable => None,
        }
    }

    /// Resolve a symbolic name. Ground indices must fall inside the declared counts.
    pub fn id_of(&self, name: &str) -> Option<Term> {
        if name == "G" {
            return Some(self.padding());
        }
        let mut chars = name.chars();
        let category = match chars.next()? {
            'l' => TermCategory::Location,
            'r' => TermCategory::Robot,
            'k' => TermCategory::Crane,
            'p' => TermCategory::Pile,
            'c' => TermCategory::Container,
            'x' => TermCategory::Variable,
            _ => return None,
        };
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index: Term = digits.parse().ok()?;
        let id = self.range_start(category).checked_add(index)?;
        match self.range_end(category) {
            Some(end) if id >= end => None,
            _ => Some(id),
        }
    }

    pub fn name_of(&self, term: Term) -> String {
        self.display(term).to_string()
    }

    pub fn display(&self, term: Term) -> TermDisplay<'_> {
        TermDisplay { space: self, term }
    }
}

pub struct TermDisplay<'a> {
    space: &'a TermSpace,
    term: Term,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = self.space.category(self.term);
        if category == TermCategory::Padding {
            return f.write_str("G");
        }
        let offset = self.term - self.space.range_start(category);
        write!(f, "{}{}", category.prefix(), offset)
    }
}

/// Monotonic source of fresh variable ids.
///
/// Each plan node carries its own supply; ids handed out are greater than every variable id
/// already present in that node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VarSupply {
    next: Term,
}

impl VarSupply {
    pub fn fresh(&mut self) -> Term {
        let var = self.next;
        self.next += 1;
        var
    }

    pub fn peek(&self) -> Term {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> TermSpace {
        TermSpace::new(ObjectCounts {
            locations: 3,
            robots: 2,
            cranes: 1,
            piles: 2,
            containers: 4,
        })
        .unwrap()
    }

    #[test]
    fn names_round_trip_through_ids() {
        let s = space();
        for name in ["l0", "l2", "r1", "k0", "p1", "c3", "G", "x0", "x12"] {
            let id = s.id_of(name).unwrap_or_else(|| panic!("{name} should resolve"));
            assert_eq!(s.name_of(id), name);
        }
    }

    #[test]
    fn ranges_are_contiguous_and_ordered() {
        let s = space();
        assert_eq!(s.id_of("l0"), Some(0));
        assert_eq!(s.id_of("r0"), Some(3));
        assert_eq!(s.id_of("k0"), Some(5));
        assert_eq!(s.id_of("p0"), Some(6));
        assert_eq!(s.id_of("c0"), Some(8));
        assert_eq!(s.id_of("G"), Some(12));
        assert_eq!(s.first_variable(), 13);
        assert!(s.is_ground(12));
        assert!(s.is_variable(13));
    }

    #[test]
    fn out_of_range_and_junk_names_are_rejected() {
        let s = space();
        assert_eq!(s.id_of("l3"), None);
        assert_eq!(s.id_of("c4"), None);
        assert_eq!(s.id_of("q1"), None);
        assert_eq!(s.id_of("r"), None);
        assert_eq!(s.id_of("r-1"), None);
        assert_eq!(s.id_of(""), None);
    }

    #[test]
    fn var_supply_is_monotonic() {
        let mut vars = space().var_supply();
        let a = vars.fresh();
        let b = vars.fresh();
        assert_eq!(a, 13);
        assert_eq!(b, 14);
        assert_eq!(vars.peek(), 15);
    }

    #[test]
    fn oversized_counts_are_rejected() {
        let too_many = ObjectCounts {
            locations: u32::MAX,
            robots: 1,
            ..ObjectCounts::default()
        };
        assert_eq!(TermSpace::new(too_many), Err(CountOverflow));

        let padding_only = ObjectCounts {
            locations: u32::MAX,
            ..ObjectCounts::default()
        };
        assert_eq!(TermSpace::new(padding_only), Err(CountOverflow));

        let at_limit = ObjectCounts {
            locations: MAX_GROUND_TERMS - 1,
            ..ObjectCounts::default()
        };
        let s = TermSpace::new(at_limit).unwrap();
        assert_eq!(s.ground_end(), MAX_GROUND_TERMS);
        assert!(TermSpace::new(ObjectCounts {
            locations: MAX_GROUND_TERMS,
            ..ObjectCounts::default()
        })
        .is_err());
    }

    #[test]
    fn counts_survive_construction() {
        let s = space();
        assert_eq!(s.counts().containers, 4);
        assert_eq!(s.counts().piles, 2);
    }
}
