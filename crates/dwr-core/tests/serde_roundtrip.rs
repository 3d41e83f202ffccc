#![cfg(feature = "serde")]

use dwr_core::{CausalPlan, Problem};

#[test]
fn causal_plan_roundtrips_via_serde() {
    let problem = Problem::parse(
        "locations 2\nrobots 1\ncranes 0\npiles 0\ncontainers 0\n\
         initial\nadjacent l0 l1\nat r0 l0\nfree l1\ngoal\nat r0 l1\n",
    )
    .unwrap();
    let mut plan = problem.initial_plan();
    let step = plan.fresh_step(dwr_core::ActionKind::Move).unwrap();
    plan.add_step(step);

    let json = serde_json::to_string(&plan).expect("serialize plan");
    let back: CausalPlan = serde_json::from_str(&json).expect("deserialize plan");
    assert_eq!(plan, back);
    assert_eq!(back.var_supply(), plan.var_supply());
}
