use std::io::Write;

use dwr_core::{ActionKind, PredicateKind, Problem, ProblemError, FINISH, MAX_GROUND_TERMS};

const ONE_MOVE: &str = "\
# two locations, one robot
locations 2
robots 1
cranes 0
piles 0
containers 0

initial
adjacent l0 l1
adjacent l1 l0
at r0 l0
occupied l0
free l1

goal
at r0 l1
";

#[test]
fn parses_counts_facts_and_goal() {
    let problem = Problem::parse(ONE_MOVE).expect("parse");
    assert_eq!(problem.terms.counts().locations, 2);
    assert_eq!(problem.terms.counts().robots, 1);
    assert_eq!(problem.initial.len(), 5);
    assert_eq!(problem.goal.len(), 1);

    let goal = problem.goal[0];
    assert_eq!(goal.kind(), PredicateKind::At);
    assert_eq!(problem.terms.name_of(goal.args()[0]), "r0");
    assert_eq!(problem.terms.name_of(goal.args()[1]), "l1");
}

#[test]
fn initial_plan_opens_goal_on_finish() {
    let problem = Problem::parse(ONE_MOVE).unwrap();
    let plan = problem.initial_plan();
    assert_eq!(plan.steps().len(), 2);
    assert_eq!(plan.steps()[0].kind(), ActionKind::Start);
    assert_eq!(plan.steps()[0].add_list(), problem.initial.as_slice());
    assert_eq!(plan.steps()[1].preconditions(), problem.goal.as_slice());
    assert!(plan.open_conditions().iter().all(|o| o.owner == FINISH));
    assert!(plan.validate(&problem.terms).is_ok());
}

#[test]
fn padding_literal_is_accepted() {
    let input = "locations 1\nrobots 0\ncranes 1\npiles 1\ncontainers 1\n\
                 initial\non c0 G\ntop c0 p0\ngoal\nholding k0 c0\n";
    let problem = Problem::parse(input).unwrap();
    assert_eq!(problem.initial[0].args()[1], problem.terms.padding());
}

#[test]
fn rejects_unknown_predicate() {
    let input = ONE_MOVE.replace("free l1", "flying l1");
    let err = Problem::parse(&input).unwrap_err();
    assert!(matches!(err, ProblemError::UnknownPredicate { line: 13, ref name } if name == "flying"));
}

#[test]
fn rejects_wrong_arity() {
    let input = ONE_MOVE.replace("at r0 l1", "at r0");
    let err = Problem::parse(&input).unwrap_err();
    assert!(matches!(
        err,
        ProblemError::Arity { kind: PredicateKind::At, expected: 2, found: 1, .. }
    ));
}

#[test]
fn rejects_out_of_range_and_variable_terms() {
    let err = Problem::parse(&ONE_MOVE.replace("at r0 l1", "at r3 l1")).unwrap_err();
    assert!(matches!(err, ProblemError::UnknownTerm { ref name, .. } if name == "r3"));

    let err = Problem::parse(&ONE_MOVE.replace("at r0 l1", "at r0 x4")).unwrap_err();
    assert!(matches!(err, ProblemError::VariableInProblem { .. }));
}

#[test]
fn rejects_missing_and_duplicate_counts() {
    let err = Problem::parse(&ONE_MOVE.replace("piles 0\n", "")).unwrap_err();
    assert!(matches!(err, ProblemError::MissingCount("piles")));

    let err = Problem::parse(&ONE_MOVE.replace("piles 0\n", "robots 2\n")).unwrap_err();
    assert!(matches!(err, ProblemError::DuplicateCount { ref name, .. } if name == "robots"));

    let err = Problem::parse(&ONE_MOVE.replace("cranes 0", "cranes many")).unwrap_err();
    assert!(matches!(err, ProblemError::BadCount { .. }));
}

#[test]
fn rejects_fact_before_section() {
    let input = "locations 1\nrobots 0\ncranes 0\npiles 0\ncontainers 0\nfree l0\n";
    assert!(matches!(
        Problem::parse(input),
        Err(ProblemError::FactOutsideSection { line: 6 })
    ));
}

#[test]
fn oversized_counts_are_an_error() {
    let input = "locations 4294967295\nrobots 1\ncranes 0\npiles 0\ncontainers 0\ninitial\ngoal\n";
    assert!(matches!(
        Problem::parse(input),
        Err(ProblemError::CountOverflow { line: 6 })
    ));

    let padding_wraps = "locations 4294967295\nrobots 0\ncranes 0\npiles 0\ncontainers 0\n";
    assert!(matches!(
        Problem::parse(padding_wraps),
        Err(ProblemError::CountOverflow { line: 5 })
    ));

    let near_limit = format!(
        "locations {}\nrobots 0\ncranes 0\npiles 0\ncontainers 0\ninitial\ngoal\n",
        MAX_GROUND_TERMS - 1
    );
    let problem = Problem::parse(&near_limit).unwrap();
    assert_eq!(problem.terms.first_variable(), MAX_GROUND_TERMS);
}

#[test]
fn counts_after_a_section_are_reported_as_such() {
    let input = ONE_MOVE.replace("goal\n", "goal\nrobots 2\n");
    let err = Problem::parse(&input).unwrap_err();
    assert!(matches!(err, ProblemError::CountAfterHeader { line: 16, ref name } if name == "robots"));
}

#[test]
fn loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(ONE_MOVE.as_bytes()).unwrap();
    let problem = Problem::load(file.path()).unwrap();
    assert_eq!(problem.goal.len(), 1);

    let missing = file.path().with_extension("missing");
    assert!(matches!(Problem::load(&missing), Err(ProblemError::Io { .. })));
}
