//! Topological sorting of step-ordering graphs.

use core::cmp::Reverse;
use std::collections::BinaryHeap;

/// Result of a topological sort.
///
/// `order` lists every vertex that could be placed; when the graph has a cycle, the vertices on
/// or behind it are missing and `acyclic` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopoSort {
    pub order: Vec<usize>,
    pub acyclic: bool,
}

/// Kahn's algorithm over vertices `0..vertex_count`, always emitting the smallest ready vertex
/// first so the linearization is deterministic. Edges naming vertices out of range are ignored.
pub fn topological_sort<I>(edges: I, vertex_count: usize) -> TopoSort
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let mut incoming = vec![0usize; vertex_count];
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    let mut remaining_edges = 0usize;

    for (before, after) in edges {
        if before >= vertex_count || after >= vertex_count {
            continue;
        }
        outgoing[before].push(after);
        incoming[after] += 1;
        remaining_edges += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = incoming
        .iter()
        .enumerate()
        .filter(|(_, &n)| n == 0)
        .map(|(v, _)| Reverse(v))
        .collect();

    let mut order = Vec::with_capacity(vertex_count);
    while let Some(Reverse(vertex)) = ready.pop() {
        order.push(vertex);
        for &next in &outgoing[vertex] {
            incoming[next] -= 1;
            remaining_edges -= 1;
            if incoming[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    TopoSort {
        order,
        acyclic: remaining_edges == 0,
    }
}

pub fn is_order_consistent<I>(edges: I, vertex_count: usize) -> bool
where
    I: IntoIterator<Item = (usize, usize)>,
{
    topological_sort(edges, vertex_count).acyclic
}
