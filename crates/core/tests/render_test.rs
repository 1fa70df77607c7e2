//! Integration test: rendering a pruned graph into a DOT pedigree,
//! including sex-based styling, same-age rank grouping, and unmapped
//! reporting.

use std::collections::HashMap;

use kindred_core::degree::Degree;
use kindred_core::graph::{Graph, GraphMode};
use kindred_core::naming::SequentialNamer;
use kindred_core::pedigree::Pedigree;
use kindred_core::sources::{DemographicsSource, ParentageSource, RelatednessSource, Sex};

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

struct MapDemographics {
    indvs: Vec<String>,
    ages: HashMap<String, u32>,
    sexes: HashMap<String, Sex>,
}

impl MapDemographics {
    fn new(records: &[(&str, Option<u32>, Sex)]) -> Self {
        let mut indvs = Vec::new();
        let mut ages = HashMap::new();
        let mut sexes = HashMap::new();
        for (id, age, sex) in records {
            indvs.push(id.to_string());
            if let Some(age) = age {
                ages.insert(id.to_string(), *age);
            }
            sexes.insert(id.to_string(), *sex);
        }
        Self { indvs, ages, sexes }
    }
}

impl DemographicsSource for MapDemographics {
    fn indvs(&self) -> &[String] {
        &self.indvs
    }

    fn age(&self, id: &str) -> Option<u32> {
        self.ages.get(id).copied()
    }

    fn sex(&self, id: &str) -> Option<Sex> {
        self.sexes.get(id).copied()
    }
}

fn build(rel: &MatrixSource, dems: &MapDemographics) -> Graph {
    let mut namer = SequentialNamer::new();
    Graph::from_sources(
        GraphMode::Undirected,
        rel,
        Degree::Ninth,
        None::<&dyn ParentageSource>,
        Some(dems),
        &mut namer,
    )
    .unwrap()
}

#[test]
fn test_sex_styling_from_demographics() {
    let rel = MatrixSource::new(&[("F1", "M1", 0.5)]);
    let dems = MapDemographics::new(&[
        ("F1", None, Sex::Female),
        ("M1", None, Sex::Male),
    ]);
    let pruned = build(&rel, &dems).prune_to_shortest(false);
    let (ped, unmapped) = Pedigree::from_graph(&pruned, pruned.knowns(), false);
    assert!(unmapped.is_empty());

    let doc = ped.to_string();
    let f_line = doc.lines().find(|l| l.contains("F1 [")).unwrap();
    let m_line = doc.lines().find(|l| l.contains("M1 [")).unwrap();
    assert!(f_line.contains("shape=ellipse"), "line: {}", f_line);
    assert!(m_line.contains("shape=box"), "line: {}", m_line);
}

#[test]
fn test_same_age_individuals_share_a_rank() {
    let rel = MatrixSource::new(&[("A", "B", 0.5), ("B", "C", 0.5)]);
    let dems = MapDemographics::new(&[
        ("A", Some(5), Sex::Unknown),
        ("B", Some(5), Sex::Unknown),
        ("C", Some(2), Sex::Unknown),
    ]);
    let pruned = build(&rel, &dems).prune_to_shortest(false);
    let (ped, _) = Pedigree::from_graph(&pruned, pruned.knowns(), false);

    let doc = ped.to_string();
    assert!(
        doc.contains("{rank=same; A, B }; // Age: 5"),
        "doc was:\n{}",
        doc
    );
    // C is alone at its age: no singleton rank group.
    assert!(!doc.contains("Age: 2"), "doc was:\n{}", doc);
}

#[test]
fn test_synthetics_never_join_rank_groups() {
    let rel = MatrixSource::new(&[("A", "B", 0.25)]);
    let dems = MapDemographics::new(&[
        ("A", Some(3), Sex::Unknown),
        ("B", Some(3), Sex::Unknown),
    ]);
    let pruned = build(&rel, &dems).prune_to_shortest(false);
    let (ped, _) = Pedigree::from_graph(&pruned, pruned.knowns(), false);

    let doc = ped.to_string();
    let rank_line = doc.lines().find(|l| l.contains("rank=same")).unwrap();
    assert!(rank_line.contains("A, B"), "line: {}", rank_line);
    assert!(!rank_line.contains("U1"), "line: {}", rank_line);
}

#[test]
fn test_unmapped_not_styled_into_document() {
    let rel = MatrixSource::new(&[("A", "B", 0.5), ("A", "Lost", 0.0)]);
    let dems = MapDemographics::new(&[("Lost", Some(1), Sex::Female)]);
    let pruned = build(&rel, &dems).prune_to_shortest(false);
    let (ped, unmapped) = Pedigree::from_graph(&pruned, pruned.knowns(), false);

    assert_eq!(unmapped, vec!["Lost".to_string()]);
    let doc = ped.to_string();
    assert!(!doc.contains("Lost ["), "doc was:\n{}", doc);
}

#[test]
fn test_rm_arrows_marks_every_edge() {
    let rel = MatrixSource::new(&[("A", "B", 0.5), ("B", "C", 0.25)]);
    let dems = MapDemographics::new(&[]);
    let pruned = build(&rel, &dems).prune_to_shortest(false);
    let (ped, _) = Pedigree::from_graph(&pruned, pruned.knowns(), true);

    let doc = ped.to_string();
    let edge_lines: Vec<&str> = doc.lines().filter(|l| l.contains("->")).collect();
    assert!(!edge_lines.is_empty());
    for line in edge_lines {
        assert!(line.contains("dir=none"), "line: {}", line);
    }
}
