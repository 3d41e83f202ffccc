use dwr_core::{is_order_consistent, topological_sort};

#[test]
fn consistent_graphs_sort_smallest_first() {
    assert!(is_order_consistent([(0, 1), (2, 1)], 3));
    let sorted = topological_sort([(0, 1), (0, 1), (2, 1), (0, 2), (3, 2)], 4);
    assert!(sorted.acyclic);
    assert_eq!(sorted.order, vec![0, 3, 2, 1]);
}

#[test]
fn cycles_are_reported() {
    assert!(!is_order_consistent([(0, 1), (0, 2), (2, 1), (1, 2)], 3));
    let sorted = topological_sort([(0, 1), (1, 0)], 3);
    assert!(!sorted.acyclic);
    assert_eq!(sorted.order, vec![2]);
}

#[test]
fn isolated_vertices_are_still_ordered() {
    let sorted = topological_sort([(0, 3), (1, 3), (2, 3)], 5);
    assert!(sorted.acyclic);
    assert_eq!(sorted.order, vec![0, 1, 2, 3, 4]);
}

#[test]
fn out_of_range_edges_are_ignored() {
    let sorted = topological_sort([(0, 7), (1, 0)], 2);
    assert!(sorted.acyclic);
    assert_eq!(sorted.order, vec![1, 0]);
}
