use dwr_core::{
    Action, ActionKind, CausalLink, CausalPlan, Predicate, PredicateKind, Problem, START,
};
use dwr_pocl::{ExportedOrdering, PlanExport, PoclPlanner, PoclPlannerConfig};

const ONE_MOVE: &str = "\
locations 2
robots 1
cranes 0
piles 0
containers 0
initial
adjacent l0 l1
at r0 l0
occupied l0
free l1
goal
at r0 l1
";

fn export(source: &str) -> PlanExport {
    let problem = Problem::parse(source).unwrap();
    let solution = PoclPlanner::new()
        .plan(problem.initial_plan(), &problem.terms)
        .unwrap();
    PlanExport::from_plan(&solution.plan, &problem.terms).unwrap()
}

#[test]
fn one_move_renders_sections() {
    let export = export(ONE_MOVE);
    assert!(export.orderings.is_empty());
    assert!(export.is_complete());
    assert_eq!(
        export.to_string(),
        "\
actions
0 start
2 move r0 l0 l1
1 finish

constraints

links
2 1 at r0 l1
0 2 adjacent l0 l1
0 2 at r0 l0
0 2 free l1
"
    );
}

#[test]
fn operator_orderings_survive_and_bookends_do_not() {
    let export = export(
        "\
locations 3
robots 1
cranes 0
piles 0
containers 0
initial
adjacent l0 l1
adjacent l1 l2
at r0 l0
occupied l0
free l1
free l2
goal
at r0 l2
",
    );
    assert_eq!(
        export.orderings,
        vec![ExportedOrdering {
            before: 3,
            after: 2
        }]
    );
    let ids: Vec<_> = export.steps.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![0, 3, 2, 1]);
    assert_eq!(export.steps[1].args, vec!["r0", "l0", "l1"]);
    assert_eq!(export.links.len(), 7);
}

#[test]
fn partial_plan_lists_its_open_conditions() {
    let problem = Problem::parse(ONE_MOVE).unwrap();
    let err = PoclPlanner::new()
        .with_config(PoclPlannerConfig {
            max_expansions: 1,
            ..PoclPlannerConfig::default()
        })
        .plan(problem.initial_plan(), &problem.terms)
        .unwrap_err();
    let partial = err.best_partial().expect("root is kept as the best partial plan");
    let export = PlanExport::from_plan(partial, &problem.terms).unwrap();

    assert!(!export.is_complete());
    assert_eq!(
        export.to_string(),
        "\
actions
0 start
1 finish

constraints

links

open
1 at r0 l1
"
    );
}

#[test]
fn partial_plan_lists_its_threats() {
    let problem = Problem::parse(ONE_MOVE).unwrap();
    let terms = &problem.terms;
    let id = |n: &str| terms.id_of(n).unwrap();
    let at = Predicate::new(PredicateKind::At, &[id("r0"), id("l0")]).unwrap();
    let mut plan = CausalPlan::new(vec![at], Vec::new(), terms);
    let consumer = plan.add_step(
        Action::new(ActionKind::Move, &[id("r0"), id("l0"), id("l1")]).unwrap(),
    );
    plan.add_link(CausalLink {
        producer: START,
        predicate: at,
        consumer,
    });
    let other = plan.fresh_step(ActionKind::Move).unwrap();
    let threat = plan.add_step(other);
    assert_eq!(plan.add_threats_from_step(threat, terms), 1);

    let export = PlanExport::from_plan(&plan, terms).unwrap();
    assert_eq!(export.threats.len(), 1);
    assert_eq!(export.threats[0].step, threat);
    assert_eq!(export.threats[0].link.to_string(), "0 2 at r0 l0");
    assert!(export.to_string().ends_with("\nthreats\n3 0 2 at r0 l0\n"));
}
