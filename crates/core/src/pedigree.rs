//! Pedigree rendering: turns a pruned graph into a DOT graph-description
//! document, styling known and synthetic individuals differently and
//! aligning same-age individuals on the same rank.

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;

use crate::graph::Graph;
use crate::sources::Sex;

/// A renderable pedigree: a DOT document under construction.
///
/// Known individuals are filled yellow with a sex-specific shape (box for
/// males, ellipse for females, record otherwise); synthetic individuals
/// are unlabeled dashed diamonds. Known relationships are bold, inferred
/// ones dashed.
pub struct Pedigree {
    rm_arrows: bool,
    nodes: IndexMap<String, Vec<(&'static str, String)>>,
    edges: Vec<(String, String, Vec<(&'static str, String)>)>,
    ranks: BTreeMap<u32, Vec<String>>,
}

impl Pedigree {
    pub fn new(rm_arrows: bool) -> Self {
        Self {
            rm_arrows,
            nodes: IndexMap::new(),
            edges: Vec::new(),
            ranks: BTreeMap::new(),
        }
    }

    /// Build a pedigree from a pruned graph, returning it together with
    /// the known individuals that appear in no surviving edge (the
    /// "unmapped" diagnostic — not an error).
    ///
    /// Membership in the graph's known set decides known versus synthetic
    /// styling; metadata presence does not.
    pub fn from_graph(graph: &Graph, knowns: &[String], rm_arrows: bool) -> (Pedigree, Vec<String>) {
        let mut ped = Pedigree::new(rm_arrows);
        let mut mapped: HashSet<String> = HashSet::new();

        for edge in graph.edges() {
            let (src_id, dst_id) = graph.orient(edge.a, edge.b);
            let src = graph.node_name(src_id);
            let dst = graph.node_name(dst_id);

            for name in [src, dst] {
                if graph.is_known(name) {
                    let sex = graph.info(name).map(|i| i.sex).unwrap_or_default();
                    ped.add_known_indv(name, sex);
                } else {
                    ped.add_unknown_indv(name);
                }
                mapped.insert(name.to_string());
            }

            if graph.is_known(src) && graph.is_known(dst) {
                ped.add_known_rel(src, dst);
            } else {
                ped.add_unknown_rel(src, dst);
            }
        }

        // Same-age individuals share a rank; singleton groups add nothing.
        let mut by_age: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for name in mapped.iter() {
            if let Some(age) = graph.info(name).and_then(|i| i.age) {
                by_age.entry(age).or_default().push(name.clone());
            }
        }
        for (age, mut group) in by_age {
            if group.len() < 2 {
                continue;
            }
            group.sort();
            for name in group {
                ped.add_to_rank(age, &name);
            }
        }

        let unmapped = knowns
            .iter()
            .filter(|name| !mapped.contains(*name))
            .cloned()
            .collect();

        (ped, unmapped)
    }

    /// Add a known individual styled by sex. Repeated adds keep the first
    /// styling.
    pub fn add_known_indv(&mut self, name: &str, sex: Sex) {
        let shape = match sex {
            Sex::Male => "box",
            Sex::Female => "ellipse",
            Sex::Unknown => "record",
        };
        self.nodes.entry(name.to_string()).or_insert_with(|| {
            vec![
                ("fillcolor", "yellow".to_string()),
                ("fontname", "Sans".to_string()),
                ("shape", shape.to_string()),
                ("style", "filled".to_string()),
            ]
        });
    }

    /// Add a synthetic individual: a placeholder, drawn dashed and
    /// unlabeled.
    pub fn add_unknown_indv(&mut self, name: &str) {
        self.nodes.entry(name.to_string()).or_insert_with(|| {
            vec![
                ("fontname", "Sans".to_string()),
                ("label", "\"\"".to_string()),
                ("shape", "diamond".to_string()),
                ("style", "dashed".to_string()),
            ]
        });
    }

    /// Add a relationship recorded in (or inferred entirely between)
    /// known individuals.
    pub fn add_known_rel(&mut self, src: &str, dst: &str) {
        self.push_edge(src, dst, "bold");
    }

    /// Add a relationship that runs through at least one synthetic
    /// individual.
    pub fn add_unknown_rel(&mut self, src: &str, dst: &str) {
        self.push_edge(src, dst, "dashed");
    }

    /// Constrain `name` to the rank shared by everyone of `age`.
    pub fn add_to_rank(&mut self, age: u32, name: &str) {
        self.ranks.entry(age).or_default().push(name.to_string());
    }

    fn push_edge(&mut self, src: &str, dst: &str, style: &str) {
        let mut attrs = vec![("style", style.to_string())];
        if self.rm_arrows {
            attrs.push(("dir", "none".to_string()));
        }
        self.edges.push((src.to_string(), dst.to_string(), attrs));
    }
}

impl std::fmt::Display for Pedigree {
    /// Emit the complete DOT document, rank directives last before the
    /// closing brace.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "digraph pedigree {{")?;
        writeln!(
            f,
            "\tgraph [newrank=true, rankdir=TB, ratio=auto, splines=ortho];"
        )?;

        for (name, attrs) in &self.nodes {
            writeln!(f, "\t{} [{}];", quote_id(name), format_attrs(attrs))?;
        }

        for (src, dst, attrs) in &self.edges {
            writeln!(
                f,
                "\t{}->{} [{}];",
                quote_id(src),
                quote_id(dst),
                format_attrs(attrs)
            )?;
        }

        for (age, names) in &self.ranks {
            let quoted: Vec<String> = names.iter().map(|n| quote_id(n)).collect();
            writeln!(
                f,
                "\t{{rank=same; {} }}; // Age: {}",
                quoted.join(", "),
                age
            )?;
        }

        writeln!(f, "}}")
    }
}

fn format_attrs(attrs: &[(&'static str, String)]) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Quote a DOT identifier unless it is already a valid bare ID (a
/// letter/underscore-led alphanumeric word, or a plain numeral).
fn quote_id(id: &str) -> String {
    let bare_word = !id.is_empty()
        && !id.starts_with(|c: char| c.is_ascii_digit())
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    let numeral = !id.is_empty() && id.chars().all(|c| c.is_ascii_digit());
    if bare_word || numeral {
        id.to_string()
    } else {
        format!("\"{}\"", id.replace('"', "\\\""))
    }
}
