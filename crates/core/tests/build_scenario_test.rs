//! Integration test: end-to-end graph build from a small relatedness
//! matrix.
//!
//! Input: {(A, B): 0.5, (A, C): 0.25}, max distance 9, no parentage or
//! demographics.
//!
//! Expected before pruning: a direct A-B edge (first degree, weight 0.5)
//! and a two-edge path A-U1-C (second degree, each edge 0.125). Pruning
//! changes nothing (the structure is already minimal), no individual is
//! unmapped, and the rendered pedigree holds 4 nodes and 3 edges.

use std::collections::HashMap;

use approx::assert_relative_eq;

use kindred_core::degree::Degree;
use kindred_core::graph::{Graph, GraphMode};
use kindred_core::naming::SequentialNamer;
use kindred_core::pedigree::Pedigree;
use kindred_core::sources::{DemographicsSource, ParentageSource, RelatednessSource};

struct MatrixSource {
    indvs: Vec<String>,
    rels: HashMap<(String, String), f64>,
}

impl MatrixSource {
    fn new(pairs: &[(&str, &str, f64)]) -> Self {
        let mut indvs: Vec<String> = Vec::new();
        let mut rels = HashMap::new();
        for (a, b, r) in pairs {
            for name in [a, b] {
                if !indvs.iter().any(|n| n == name) {
                    indvs.push(name.to_string());
                }
            }
            rels.insert((a.to_string(), b.to_string()), *r);
        }
        Self { indvs, rels }
    }
}

impl RelatednessSource for MatrixSource {
    fn indvs(&self) -> &[String] {
        &self.indvs
    }

    fn relatedness(&self, a: &str, b: &str) -> f64 {
        self.rels
            .get(&(a.to_string(), b.to_string()))
            .or_else(|| self.rels.get(&(b.to_string(), a.to_string())))
            .copied()
            .unwrap_or(0.0)
    }

    fn rel_distance(&self, a: &str, b: &str) -> Degree {
        Degree::from_relatedness(self.relatedness(a, b))
    }
}

fn build(rel: &MatrixSource) -> Graph {
    let mut namer = SequentialNamer::new();
    Graph::from_sources(
        GraphMode::Undirected,
        rel,
        Degree::Ninth,
        None::<&dyn ParentageSource>,
        None::<&dyn DemographicsSource>,
        &mut namer,
    )
    .unwrap()
}

#[test]
fn test_expected_structure_before_pruning() {
    let rel = MatrixSource::new(&[("A", "B", 0.5), ("A", "C", 0.25)]);
    let graph = build(&rel);

    // A, B, C and exactly one synthetic intermediate.
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 3);

    assert_relative_eq!(graph.min_weight_between("A", "B").unwrap(), 0.5);
    assert_relative_eq!(graph.min_weight_between("A", "U1").unwrap(), 0.125);
    assert_relative_eq!(graph.min_weight_between("U1", "C").unwrap(), 0.125);
    assert!(!graph.has_edge_between("A", "C"));

    assert!(graph.is_known("A"));
    assert!(!graph.is_known("U1"));
}

#[test]
fn test_pruning_preserves_minimal_structure() {
    let rel = MatrixSource::new(&[("A", "B", 0.5), ("A", "C", 0.25)]);
    let pruned = build(&rel).prune_to_shortest(false);

    assert_eq!(pruned.node_count(), 4);
    assert_eq!(pruned.edge_count(), 3);
    assert_relative_eq!(pruned.shortest_cost("A", "C").unwrap(), 0.25);
    assert_relative_eq!(pruned.shortest_cost("B", "C").unwrap(), 0.75);
}

#[test]
fn test_rendered_pedigree_counts() {
    let rel = MatrixSource::new(&[("A", "B", 0.5), ("A", "C", 0.25)]);
    let pruned = build(&rel).prune_to_shortest(false);

    let (ped, unmapped) = Pedigree::from_graph(&pruned, pruned.knowns(), false);
    assert!(unmapped.is_empty());

    let doc = ped.to_string();
    // Three known individuals, one synthetic.
    assert_eq!(doc.matches("fillcolor=yellow").count(), 3);
    assert_eq!(doc.matches("shape=diamond").count(), 1);
    // Three relationships: A-B is known, the A-U1-C legs are inferred.
    assert_eq!(doc.matches("->").count(), 3);
    assert_eq!(doc.matches("style=bold").count(), 1);
    assert_eq!(doc.matches("style=dashed").count(), 3); // U1 node + 2 edges
}

#[test]
fn test_unmapped_individuals_reported() {
    // C is present in the data but unrelated to everyone.
    let rel = MatrixSource::new(&[("A", "B", 0.5), ("A", "C", 0.0)]);
    let pruned = build(&rel).prune_to_shortest(false);

    let (_, unmapped) = Pedigree::from_graph(&pruned, pruned.knowns(), false);
    assert_eq!(unmapped, vec!["C".to_string()]);
}

#[test]
fn test_over_cutoff_pairs_skipped() {
    // 0.25 is second degree; a first-degree cutoff excludes it.
    let rel = MatrixSource::new(&[("A", "B", 0.5), ("A", "C", 0.25)]);
    let mut namer = SequentialNamer::new();
    let graph = Graph::from_sources(
        GraphMode::Undirected,
        &rel,
        Degree::First,
        None::<&dyn ParentageSource>,
        None::<&dyn DemographicsSource>,
        &mut namer,
    )
    .unwrap();

    assert_eq!(graph.edge_count(), 1);
    assert!(graph.has_edge_between("A", "B"));
    assert!(graph.node_id("C").is_none());

    let pruned = graph.prune_to_shortest(false);
    let (_, unmapped) = Pedigree::from_graph(&pruned, pruned.knowns(), false);
    assert_eq!(unmapped, vec!["C".to_string()]);
}

#[test]
fn test_connectivity_preserved_across_pruning() {
    let rel = MatrixSource::new(&[
        ("A", "B", 0.5),
        ("B", "C", 0.25),
        ("C", "D", 0.5),
        ("A", "D", 0.125),
    ]);
    let graph = build(&rel);
    let pruned = graph.prune_to_shortest(false);

    let knowns = ["A", "B", "C", "D"];
    for (i, a) in knowns.iter().enumerate() {
        for b in knowns.iter().skip(i + 1) {
            assert!(
                graph.shortest_cost(a, b).is_some(),
                "{} and {} disconnected before pruning",
                a,
                b
            );
            assert!(
                pruned.shortest_cost(a, b).is_some(),
                "{} and {} disconnected after pruning",
                a,
                b
            );
        }
    }
}

#[test]
fn test_pruning_is_idempotent() {
    let rel = MatrixSource::new(&[
        ("A", "B", 0.5),
        ("B", "C", 0.25),
        ("A", "D", 0.125),
    ]);
    let once = build(&rel).prune_to_shortest(false);
    let twice = once.prune_to_shortest(false);

    assert_eq!(once.node_count(), twice.node_count());
    assert_eq!(once.edge_count(), twice.edge_count());

    let edge_set = |g: &Graph| {
        let mut edges: Vec<(String, String, u64)> = g
            .edges()
            .map(|e| (e.from.to_string(), e.to.to_string(), e.weight.to_bits()))
            .collect();
        edges.sort();
        edges
    };
    assert_eq!(edge_set(&once), edge_set(&twice));
}
