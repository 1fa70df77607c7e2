//! The pedigree graph engine: a named-node weighted multigraph over known
//! and synthetic individuals, with shortest-path pruning down to the
//! minimum-cost structure connecting the known individuals.
//!
//! Nodes live in an arena (`Vec<NodeInfo>`, id = index) with a name-to-id
//! map; a name maps to exactly one id for the lifetime of the graph. The
//! directed/undirected distinction is a mode flag switching the edge
//! insertion policy, not a separate type.

mod shortest;

use std::collections::{BTreeSet, HashMap, HashSet};

use rayon::prelude::*;

use crate::degree::Degree;
use crate::error::{KindredError, Result};
use crate::naming::SyntheticNamer;
use crate::path::{Path, Weight};
use crate::sources::{DemographicsSource, ParentageSource, RelatednessSource, Sex};

/// Edge storage and traversal policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphMode {
    /// Edges are oriented at insertion (parent to child, older to
    /// younger) and traversed in that direction only.
    Directed,
    /// Edges are bare weighted links; orientation is decided at render
    /// time.
    Undirected,
}

/// Per-node metadata. Age is an explicit optional — `Some(0)` (born this
/// year) and `None` (not recorded) are distinct values.
#[derive(Debug, Clone, Default)]
pub struct NodeInfo {
    pub name: String,
    pub age: Option<u32>,
    pub sex: Sex,
    pub dam: Option<String>,
    pub sire: Option<String>,
}

/// One weighted edge of the multigraph. Removed edges are tombstoned so
/// edge ids stay stable.
#[derive(Debug, Clone)]
struct Edge {
    a: usize,
    b: usize,
    weight: Weight,
    live: bool,
}

/// A view of one live edge, endpoints in storage order.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRef<'a> {
    pub a: usize,
    pub b: usize,
    pub from: &'a str,
    pub to: &'a str,
    pub weight: Weight,
}

/// A weighted multigraph of individuals, building toward a pruned
/// pedigree.
///
/// Lifecycle: `Building` (any number of `add_*` calls, in any order) then
/// `Pruned` (the terminal state returned by [`Graph::prune_to_shortest`]);
/// mutating a pruned graph is an error — start fresh instead.
#[derive(Debug, Clone)]
pub struct Graph {
    mode: GraphMode,
    nodes: Vec<NodeInfo>,
    name_to_id: HashMap<String, usize>,
    adjacency: Vec<Vec<usize>>,
    edges: Vec<Edge>,
    knowns: Vec<String>,
    known_set: HashSet<String>,
    pruned: bool,
}

impl Graph {
    /// Create an empty graph whose known individuals are fixed to `knowns`.
    pub fn new(mode: GraphMode, knowns: Vec<String>) -> Self {
        let known_set = knowns.iter().cloned().collect();
        Self {
            mode,
            nodes: Vec::new(),
            name_to_id: HashMap::new(),
            adjacency: Vec::new(),
            edges: Vec::new(),
            knowns,
            known_set,
            pruned: false,
        }
    }

    /// Build a graph from the full set of input sources.
    ///
    /// Order matters: recorded parentage goes in first (it takes precedence
    /// over inference), demographics next (directed insertion orients by
    /// age), and the relatedness matrix scan last.
    ///
    /// # Errors
    /// Propagates path-construction and graph-state errors.
    pub fn from_sources<R, P, D>(
        mode: GraphMode,
        rel: &R,
        max_degree: Degree,
        pars: Option<&P>,
        dems: Option<&D>,
        namer: &mut dyn SyntheticNamer,
    ) -> Result<Graph>
    where
        R: RelatednessSource + ?Sized,
        P: ParentageSource + ?Sized,
        D: DemographicsSource + ?Sized,
    {
        let mut graph = Graph::new(mode, rel.indvs().to_vec());

        if let Some(pars) = pars {
            if Degree::First <= max_degree {
                for child in pars.indvs() {
                    graph.add_known_parentage(child, pars.dam(child), pars.sire(child))?;
                }
            }
        }

        if let Some(dems) = dems {
            for name in rel.indvs() {
                if let Some(age) = dems.age(name) {
                    graph.add_age(name, age)?;
                }
                if let Some(sex) = dems.sex(name) {
                    graph.add_sex(name, sex)?;
                }
            }
        }

        graph.add_from_matrix(rel, max_degree, namer)?;

        Ok(graph)
    }

    pub fn mode(&self) -> GraphMode {
        self.mode
    }

    pub fn is_directed(&self) -> bool {
        self.mode == GraphMode::Directed
    }

    /// Whether this graph is the terminal result of pruning.
    pub fn is_pruned(&self) -> bool {
        self.pruned
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.live).count()
    }

    /// The known individuals fixed at construction, in input order.
    pub fn knowns(&self) -> &[String] {
        &self.knowns
    }

    /// Whether `name` is a known individual (present in the input
    /// relatedness data), as opposed to a synthetic intermediate.
    pub fn is_known(&self, name: &str) -> bool {
        self.known_set.contains(name)
    }

    /// The internal id for `name`, if the node exists.
    pub fn node_id(&self, name: &str) -> Option<usize> {
        self.name_to_id.get(name).copied()
    }

    /// The name of the node with id `id`.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    pub fn node_name(&self, id: usize) -> &str {
        &self.nodes[id].name
    }

    /// Metadata for `name`, if the node exists.
    pub fn info(&self, name: &str) -> Option<&NodeInfo> {
        self.node_id(name).map(|id| &self.nodes[id])
    }

    /// Record an age for `name`, creating the node if needed.
    ///
    /// # Errors
    /// Returns an error if the graph is already pruned.
    pub fn add_age(&mut self, name: &str, age: u32) -> Result<()> {
        self.ensure_building()?;
        let id = self.ensure_node(name);
        self.nodes[id].age = Some(age);
        Ok(())
    }

    /// Record a sex for `name`, creating the node if needed.
    ///
    /// # Errors
    /// Returns an error if the graph is already pruned.
    pub fn add_sex(&mut self, name: &str, sex: Sex) -> Result<()> {
        self.ensure_building()?;
        let id = self.ensure_node(name);
        self.nodes[id].sex = sex;
        Ok(())
    }

    /// Insert a weighted path, auto-vivifying its nodes.
    ///
    /// Admission policy: a path between two distinct endpoints that are
    /// already connected at a cost no greater than the path's total weight
    /// is discarded rather than inserted. The O(n^2) matrix scan visits
    /// every ordered pair, so without this check each unordered pair would
    /// be inserted twice and the graph would fill with redundant parallel
    /// structure.
    ///
    /// # Errors
    /// Returns an error if the graph is already pruned.
    pub fn add_path(&mut self, path: &Path) -> Result<()> {
        self.ensure_building()?;

        let (first, last) = path.endpoints();
        if first != last {
            if let (Some(a), Some(b)) = (self.node_id(first), self.node_id(last)) {
                if let Some(cost) = shortest::cost_between(self, a, b) {
                    if cost <= path.total_weight() {
                        log::debug!(
                            "Skipping path {}..{}: existing connection cost {} <= {}",
                            first,
                            last,
                            cost,
                            path.total_weight()
                        );
                        return Ok(());
                    }
                }
            }
        }

        for (i, &weight) in path.weights().iter().enumerate() {
            let a = self.ensure_node(&path.names()[i]);
            let b = self.ensure_node(&path.names()[i + 1]);
            self.insert_edge(a, b, weight);
        }
        Ok(())
    }

    /// Scan every ordered pair of known individuals and insert a
    /// relational-weight path for each pair whose degree falls within
    /// `max_degree`.
    ///
    /// Pairs already explained by recorded parentage (parent-child, or
    /// siblings sharing a recorded parent) are skipped: parentage takes
    /// precedence over inference. This scan is O(n^2) in the number of
    /// known individuals and dominates build cost; tighten `max_degree`
    /// for large inputs.
    ///
    /// # Errors
    /// Returns an error if the graph is already pruned.
    pub fn add_from_matrix<R>(
        &mut self,
        rel: &R,
        max_degree: Degree,
        namer: &mut dyn SyntheticNamer,
    ) -> Result<()>
    where
        R: RelatednessSource + ?Sized,
    {
        self.ensure_building()?;
        let indvs = self.knowns.clone();

        for from in &indvs {
            for to in &indvs {
                if from == to {
                    continue;
                }
                if self.parentage_explains(from, to) {
                    continue;
                }
                let degree = rel.rel_distance(from, to);
                if degree.is_unrelated() || degree > max_degree {
                    continue;
                }
                let weight = rel.relatedness(from, to);

                let (src, dst) = if self.is_directed() {
                    self.orient_by_age(from, to)
                } else {
                    (from.as_str(), to.as_str())
                };

                let path = Path::relational(src, dst, degree, weight, namer)?;
                self.add_path(&path)?;
            }
        }
        Ok(())
    }

    /// Record known parentage for `child` and insert an authoritative
    /// direct edge of weight 1.0 per available parent.
    ///
    /// Recorded parentage supersedes inference for every pair it explains:
    /// any existing direct edge between parent and child is replaced, and
    /// direct edges between the child and siblings sharing the recorded
    /// parent are removed — that relationship runs through the shared
    /// parent.
    ///
    /// # Errors
    /// Returns an error if the graph is already pruned.
    pub fn add_known_parentage(
        &mut self,
        child: &str,
        dam: Option<&str>,
        sire: Option<&str>,
    ) -> Result<()> {
        self.ensure_building()?;
        let child_id = self.ensure_node(child);

        for parent in [dam, sire].into_iter().flatten() {
            let parent_id = self.ensure_node(parent);
            self.remove_direct_edges(parent_id, child_id);

            let siblings: Vec<usize> = self
                .nodes
                .iter()
                .enumerate()
                .filter(|(id, info)| {
                    *id != child_id
                        && (info.dam.as_deref() == Some(parent)
                            || info.sire.as_deref() == Some(parent))
                })
                .map(|(id, _)| id)
                .collect();
            for sib in siblings {
                self.remove_direct_edges(child_id, sib);
            }

            self.insert_edge(parent_id, child_id, 1.0);
        }

        let info = &mut self.nodes[child_id];
        if let Some(dam) = dam {
            info.dam = Some(dam.to_string());
        }
        if let Some(sire) = sire {
            info.sire = Some(sire.to_string());
        }
        Ok(())
    }

    /// Iterate the live edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> {
        self.edges.iter().filter(|e| e.live).map(|e| EdgeRef {
            a: e.a,
            b: e.b,
            from: self.nodes[e.a].name.as_str(),
            to: self.nodes[e.b].name.as_str(),
            weight: e.weight,
        })
    }

    /// Whether any live edge links the two named nodes (either direction).
    pub fn has_edge_between(&self, a: &str, b: &str) -> bool {
        self.min_weight_between(a, b).is_some()
    }

    /// The minimum weight among direct edges between the two named nodes
    /// (either direction), or `None` when no direct edge exists.
    pub fn min_weight_between(&self, a: &str, b: &str) -> Option<Weight> {
        let a = self.node_id(a)?;
        let b = self.node_id(b)?;
        self.edges
            .iter()
            .filter(|e| e.live && ((e.a == a && e.b == b) || (e.a == b && e.b == a)))
            .map(|e| e.weight)
            .min_by(|x, y| x.total_cmp(y))
    }

    /// The cost of the cheapest path between two named nodes, or `None`
    /// when disconnected. Respects edge direction in directed mode.
    pub fn shortest_cost(&self, from: &str, to: &str) -> Option<Weight> {
        let a = self.node_id(from)?;
        let b = self.node_id(to)?;
        shortest::cost_between(self, a, b)
    }

    /// Decide the display direction for the edge `(a, b)`.
    ///
    /// Directed graphs keep their stored orientation. Otherwise recorded
    /// parentage wins (parent to child), then age (older to younger), then
    /// the fallback points from the second node to the first — an
    /// arbitrary but stable convention, so callers should only rely on the
    /// direction when parentage or age informed it.
    pub fn orient(&self, a: usize, b: usize) -> (usize, usize) {
        if self.is_directed() {
            return (a, b);
        }
        let na = &self.nodes[a];
        let nb = &self.nodes[b];
        if nb.dam.as_deref() == Some(na.name.as_str())
            || nb.sire.as_deref() == Some(na.name.as_str())
        {
            return (a, b);
        }
        if na.dam.as_deref() == Some(nb.name.as_str())
            || na.sire.as_deref() == Some(nb.name.as_str())
        {
            return (b, a);
        }
        match (na.age, nb.age) {
            (Some(age_a), Some(age_b)) => {
                if age_a >= age_b {
                    (a, b)
                } else {
                    (b, a)
                }
            }
            _ => (b, a),
        }
    }

    /// Reduce the graph to the union of nodes and edges on the chosen
    /// shortest paths between every pair of known individuals, returning a
    /// fresh pruned graph (the receiver is untouched — no in-place
    /// deletion mid-iteration).
    ///
    /// Self-loops are dropped unless `keep_self_loops` is set. Shortest
    /// paths from each known source are independent, so they run in
    /// parallel over the immutable graph and their per-source accumulators
    /// are unioned afterward.
    pub fn prune_to_shortest(&self, keep_self_loops: bool) -> Graph {
        let known_ids: Vec<usize> = self
            .knowns
            .iter()
            .filter_map(|n| self.node_id(n))
            .collect();
        let directed = self.is_directed();

        let per_source: Vec<(BTreeSet<usize>, BTreeSet<usize>)> = known_ids
            .par_iter()
            .enumerate()
            .map(|(i, &src)| {
                let sp = shortest::from_source(self, src);
                let mut nodes = BTreeSet::new();
                let mut edges = BTreeSet::new();
                for (j, &dst) in known_ids.iter().enumerate() {
                    // Undirected pairs are symmetric; visit each once.
                    let skip = if directed { j == i } else { j <= i };
                    if skip {
                        continue;
                    }
                    if let Some(path_edges) = sp.edge_path_to(dst) {
                        for eid in path_edges {
                            let e = &self.edges[eid];
                            nodes.insert(e.a);
                            nodes.insert(e.b);
                            edges.insert(eid);
                        }
                    }
                }
                (nodes, edges)
            })
            .collect();

        let mut kept_nodes = BTreeSet::new();
        let mut kept_edges = BTreeSet::new();
        for (nodes, edges) in per_source {
            kept_nodes.extend(nodes);
            kept_edges.extend(edges);
        }

        if keep_self_loops {
            for (eid, edge) in self.edges.iter().enumerate() {
                if edge.live && edge.a == edge.b && kept_nodes.contains(&edge.a) {
                    kept_edges.insert(eid);
                }
            }
        }

        let mut pruned = Graph::new(self.mode, self.knowns.clone());
        for &id in &kept_nodes {
            let new_id = pruned.ensure_node(&self.nodes[id].name);
            let src = &self.nodes[id];
            let dst = &mut pruned.nodes[new_id];
            dst.age = src.age;
            dst.sex = src.sex;
            dst.dam = src.dam.clone();
            dst.sire = src.sire.clone();
        }
        for &eid in &kept_edges {
            let e = &self.edges[eid];
            let a = pruned.name_to_id[self.nodes[e.a].name.as_str()];
            let b = pruned.name_to_id[self.nodes[e.b].name.as_str()];
            pruned.insert_edge(a, b, e.weight);
        }
        pruned.pruned = true;
        pruned
    }

    fn ensure_building(&self) -> Result<()> {
        if self.pruned {
            return Err(KindredError::Graph(
                "Graph is already pruned; build a fresh graph to add structure".to_string(),
            ));
        }
        Ok(())
    }

    /// Look up or create the node for `name`. A name maps to exactly one
    /// id for the lifetime of the graph.
    fn ensure_node(&mut self, name: &str) -> usize {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(NodeInfo {
            name: name.to_string(),
            ..NodeInfo::default()
        });
        self.adjacency.push(Vec::new());
        self.name_to_id.insert(name.to_string(), id);
        id
    }

    fn insert_edge(&mut self, a: usize, b: usize, weight: Weight) {
        debug_assert!(weight >= 0.0, "edge weights must be non-negative");
        let eid = self.edges.len();
        self.edges.push(Edge {
            a,
            b,
            weight,
            live: true,
        });
        self.adjacency[a].push(eid);
        if a != b && self.mode == GraphMode::Undirected {
            self.adjacency[b].push(eid);
        }
    }

    /// Tombstone every direct edge between `x` and `y`, either direction.
    fn remove_direct_edges(&mut self, x: usize, y: usize) {
        for edge in &mut self.edges {
            if edge.live && ((edge.a == x && edge.b == y) || (edge.a == y && edge.b == x)) {
                edge.live = false;
            }
        }
    }

    /// Whether recorded parentage already accounts for the relationship
    /// between `a` and `b`: one is a recorded parent of the other, or they
    /// share a recorded parent.
    fn parentage_explains(&self, a: &str, b: &str) -> bool {
        let ia = self.info(a);
        let ib = self.info(b);
        if let Some(ib) = ib {
            if ib.dam.as_deref() == Some(a) || ib.sire.as_deref() == Some(a) {
                return true;
            }
        }
        if let Some(ia) = ia {
            if ia.dam.as_deref() == Some(b) || ia.sire.as_deref() == Some(b) {
                return true;
            }
        }
        if let (Some(ia), Some(ib)) = (ia, ib) {
            if ia.dam.is_some() && ia.dam == ib.dam {
                return true;
            }
            if ia.sire.is_some() && ia.sire == ib.sire {
                return true;
            }
        }
        false
    }

    /// Pick the directed orientation for a matrix-scan path: older to
    /// younger when both ages are recorded, otherwise from the second
    /// individual to the first.
    fn orient_by_age<'a>(&self, from: &'a str, to: &'a str) -> (&'a str, &'a str) {
        let from_age = self.info(from).and_then(|i| i.age);
        let to_age = self.info(to).and_then(|i| i.age);
        match (from_age, to_age) {
            (Some(f), Some(t)) => {
                if f >= t {
                    (from, to)
                } else {
                    (to, from)
                }
            }
            _ => (to, from),
        }
    }
}
