//! Sequential shortest paths, used to check the distributed result.

use petgraph::{algo::dijkstra, prelude::GraphMap, Directed};

use super::{
    graph::Graph,
    matrix::{Weight, INFINITY},
    SOURCE,
};

/// Distances from [`SOURCE`] computed by petgraph's Dijkstra over the same
/// matrix. Unreachable vertices get [`INFINITY`].
pub fn sequential(graph: &Graph) -> Vec<Weight> {
    let mut g: GraphMap<usize, Weight, Directed> = GraphMap::new();
    for v in 0..graph.order() {
        g.add_node(v);
    }
    for (from, to, weight) in graph.edges() {
        g.add_edge(from, to, weight);
    }

    let found = dijkstra(&g, SOURCE, None, |(.., w)| *w);
    (0..graph.order())
        .map(|v| found.get(&v).copied().unwrap_or(INFINITY))
        .collect()
}

/// The first vertex whose distances disagree, if any.
pub fn first_mismatch(expected: &[Weight], actual: &[Weight]) -> Option<usize> {
    if expected.len() != actual.len() {
        return Some(expected.len().min(actual.len()));
    }
    expected.iter().zip(actual).position(|(e, a)| e != a)
}
