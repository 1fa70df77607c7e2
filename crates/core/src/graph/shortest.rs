//! Single-source shortest paths over the relatedness multigraph.
//!
//! Dijkstra's algorithm is sufficient here: every edge weight is a
//! non-negative fraction of a relatedness coefficient (negative estimates
//! are clamped to zero at ingest, and insertion debug-asserts the
//! invariant). Bellman-Ford would only become necessary if penalty or
//! negative weights were ever introduced.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::Graph;
use crate::path::Weight;

/// Shortest-path tree from a single source node.
pub(crate) struct ShortestPaths {
    src: usize,
    dist: Vec<Weight>,
    prev_node: Vec<Option<usize>>,
    prev_edge: Vec<Option<usize>>,
}

/// Heap entry; ordered as a min-heap on cost with node index breaking ties
/// so pop order is deterministic.
struct State {
    cost: Weight,
    node: usize,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compute the full shortest-path tree from `src`.
pub(crate) fn from_source(graph: &Graph, src: usize) -> ShortestPaths {
    dijkstra(graph, src, None)
}

/// The cheapest cost from `a` to `b`, or `None` when unreachable.
///
/// Stops as soon as `b` is settled rather than exploring the whole graph.
pub(crate) fn cost_between(graph: &Graph, a: usize, b: usize) -> Option<Weight> {
    dijkstra(graph, a, Some(b)).cost_to(b)
}

fn dijkstra(graph: &Graph, src: usize, stop_at: Option<usize>) -> ShortestPaths {
    let n = graph.nodes.len();
    let mut dist = vec![Weight::INFINITY; n];
    let mut prev_node = vec![None; n];
    let mut prev_edge = vec![None; n];
    let mut heap = BinaryHeap::new();

    dist[src] = 0.0;
    heap.push(State {
        cost: 0.0,
        node: src,
    });

    while let Some(State { cost, node }) = heap.pop() {
        if cost > dist[node] {
            continue;
        }
        if stop_at == Some(node) {
            break;
        }
        for &eid in &graph.adjacency[node] {
            let edge = &graph.edges[eid];
            if !edge.live {
                continue;
            }
            let next = if edge.a == node { edge.b } else { edge.a };
            if next == node {
                // A self-loop never shortens a path.
                continue;
            }
            let candidate = cost + edge.weight;
            if candidate < dist[next] {
                dist[next] = candidate;
                prev_node[next] = Some(node);
                prev_edge[next] = Some(eid);
                heap.push(State {
                    cost: candidate,
                    node: next,
                });
            }
        }
    }

    ShortestPaths {
        src,
        dist,
        prev_node,
        prev_edge,
    }
}

impl ShortestPaths {
    /// Cost from the source to `dst`, or `None` when unreachable.
    pub(crate) fn cost_to(&self, dst: usize) -> Option<Weight> {
        if self.dist[dst].is_finite() {
            Some(self.dist[dst])
        } else {
            None
        }
    }

    /// The edge ids along the chosen shortest path from the source to
    /// `dst`, in path order. Empty for `dst == src`; `None` when
    /// unreachable.
    pub(crate) fn edge_path_to(&self, dst: usize) -> Option<Vec<usize>> {
        if dst == self.src {
            return Some(Vec::new());
        }
        if !self.dist[dst].is_finite() {
            return None;
        }
        let mut edges = Vec::new();
        let mut node = dst;
        while node != self.src {
            edges.push(self.prev_edge[node]?);
            node = self.prev_node[node]?;
        }
        edges.reverse();
        Some(edges)
    }
}
