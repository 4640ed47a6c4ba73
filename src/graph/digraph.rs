use custom_debug_derive::Debug;
use itertools::Itertools;
use rand::{seq::SliceRandom, Rng};
use std::{
    collections::{btree_set, BTreeMap},
    fmt,
};

use super::{Edge, EdgeSet, GraphError, Invariant, Label, LabelSet, Vertex, VertexIndex};

/// Directed simple graph in adjacency list representation.
///
/// Vertices are identified from the outside by their [`Label`], but stored
/// under a dense [`VertexIndex`]. Exchanging the label of an index therefore
/// yields an isomorphic graph without touching any adjacency list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    label_index: BTreeMap<Label, VertexIndex>,
    index_label: Vec<Label>,
    vertices: Vec<Vertex>,
    edge_number: usize,
    /// Smallest power of ten above the vertex count.
    #[debug(skip)]
    invariant_power: Invariant,
}

/// Labels adjacent to a vertex, in the order of their internal indices.
pub struct AdjacentLabels<'a> {
    index_label: &'a [Label],
    inner: Option<btree_set::Iter<'a, VertexIndex>>,
}

impl<'a> Iterator for AdjacentLabels<'a> {
    type Item = Label;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.inner.as_mut()?.next()?;
        Some(self.index_label[*index])
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            label_index: BTreeMap::new(),
            index_label: Vec::new(),
            vertices: Vec::new(),
            edge_number: 0,
            invariant_power: 1,
        }
    }

    /// Number of vertices.
    pub fn size(&self) -> usize {
        self.vertices.len()
    }

    pub fn number_edges(&self) -> usize {
        self.edge_number
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn index_of(&self, label: Label) -> Result<VertexIndex, GraphError> {
        self.label_index
            .get(&label)
            .copied()
            .ok_or(GraphError(label))
    }

    pub fn get_vertex(&self, label: Label) -> Result<&Vertex, GraphError> {
        let index = self.index_of(label)?;
        Ok(&self.vertices[index])
    }

    /// Register `label` as a new vertex.
    /// Returns false if the label is already known.
    pub fn add_vertex(&mut self, label: Label) -> bool {
        if self.label_index.contains_key(&label) {
            return false;
        }

        let index = self.vertices.len();
        self.label_index.insert(label, index);
        self.index_label.push(label);
        self.vertices.push(Vertex::new(index));

        while self.invariant_power <= self.vertices.len() as Invariant {
            self.invariant_power *= 10;
        }

        true
    }

    /// Insert the arc `source -> target`.
    /// Loops, unknown labels and already present arcs are refused.
    pub fn add_edge(&mut self, source: Label, target: Label) -> bool {
        if source == target {
            return false;
        }

        let (start, end) = match (self.index_of(source), self.index_of(target)) {
            (Ok(start), Ok(end)) => (start, end),
            _ => return false,
        };

        if !self.vertices[start].add_edge(end) {
            return false;
        }
        self.vertices[end].add_incoming();
        self.edge_number += 1;
        true
    }

    /// Add `label` and all of `targets` as vertices
    /// and connect `label` to each target.
    pub fn set_vertex(&mut self, label: Label, targets: &[Label]) {
        self.add_vertex(label);
        for target in targets {
            self.add_vertex(*target);
            self.add_edge(label, *target);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn is_node(&self, label: Label) -> bool {
        self.label_index.contains_key(&label)
    }

    pub fn is_connection(&self, start: Label, end: Label) -> bool {
        match (self.index_of(start), self.index_of(end)) {
            (Ok(start), Ok(end)) => self.vertices[start].is_adjacent(end),
            _ => false,
        }
    }

    /// Connection test in the subgraph induced by `within`.
    pub fn is_connection_within(&self, start: Label, end: Label, within: &LabelSet) -> bool {
        within.contains(&start) && within.contains(&end) && self.is_connection(start, end)
    }

    pub fn in_degree(&self, label: Label) -> Result<usize, GraphError> {
        Ok(self.get_vertex(label)?.in_degree())
    }

    pub fn out_degree(&self, label: Label) -> Result<usize, GraphError> {
        Ok(self.get_vertex(label)?.out_degree())
    }

    /// Number of arcs into `label` whose start lies in `within`.
    /// Scans the whole subset, so callers in hot loops should keep counters instead.
    pub fn in_degree_within(&self, label: Label, within: &LabelSet) -> Result<usize, GraphError> {
        let end = self.index_of(label)?;
        Ok(within
            .iter()
            .filter_map(|start| self.index_of(*start).ok())
            .filter(|start| self.vertices[*start].is_adjacent(end))
            .count())
    }

    /// Number of arcs out of `label` whose end lies in `within`.
    pub fn out_degree_within(&self, label: Label, within: &LabelSet) -> Result<usize, GraphError> {
        self.index_of(label)?;
        Ok(self
            .adjacent(label)
            .filter(|end| within.contains(end))
            .count())
    }

    /// Degree signature `P * out + in`. `P` exceeds any possible in-degree,
    /// so both degrees can be read back from the invariant.
    pub fn invariant(&self, label: Label) -> Result<Invariant, GraphError> {
        let vertex = self.get_vertex(label)?;
        Ok(self.vertex_invariant(vertex))
    }

    fn vertex_invariant(&self, vertex: &Vertex) -> Invariant {
        self.invariant_power * vertex.out_degree() as Invariant + vertex.in_degree() as Invariant
    }

    /// All labels together with their invariant, ascending by label.
    pub fn invariants(&self) -> impl Iterator<Item = (Label, Invariant)> + '_ {
        self.label_index
            .iter()
            .map(move |(label, index)| (*label, self.vertex_invariant(&self.vertices[*index])))
    }

    /// Labels in ascending order.
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.label_index.keys().copied()
    }

    /// Labels `label` points to. Empty for unknown labels.
    pub fn adjacent(&self, label: Label) -> AdjacentLabels<'_> {
        AdjacentLabels {
            index_label: &self.index_label,
            inner: self
                .index_of(label)
                .ok()
                .map(|index| self.vertices[index].edges_to_set().iter()),
        }
    }

    pub fn iterate_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.labels()
            .flat_map(move |source| self.adjacent(source).map(move |target| Edge::new(source, target)))
    }

    /// Insert every arc of the graph into `edges`.
    /// Returns how many were not yet contained.
    pub fn collect_edges(&self, edges: &mut EdgeSet) -> usize {
        self.iterate_edges()
            .filter(|edge| edges.insert(*edge))
            .count()
    }

    /// Insert every arc leaving `label` into `edges`.
    pub fn collect_edges_from(&self, edges: &mut EdgeSet, label: Label) -> Result<usize, GraphError> {
        self.index_of(label)?;
        Ok(self
            .adjacent(label)
            .filter(|target| edges.insert(Edge::new(label, *target)))
            .count())
    }

    /// Insert the arcs of the subgraph induced by `within` into `edges`.
    pub fn collect_edges_among(&self, edges: &mut EdgeSet, within: &LabelSet) -> usize {
        within
            .iter()
            .flat_map(|source| {
                self.adjacent(*source)
                    .filter(|target| within.contains(target))
                    .map(move |target| Edge::new(*source, target))
            })
            .filter(|edge| edges.insert(*edge))
            .count()
    }

    /// Discovery order of an iterative depth first search from `start`.
    /// Vertices in `visited` are neither entered nor reported, so repeated calls
    /// with a growing `visited` set span a forest of the whole graph.
    pub fn dfs_path(&self, start: Label, visited: &LabelSet) -> Vec<Label> {
        let mut path = Vec::new();

        let start_index = match self.index_of(start) {
            Ok(index) if !visited.contains(&start) => index,
            _ => return path,
        };

        let mut seen = vec![false; self.size()];
        let mut stack = vec![start_index];
        seen[start_index] = true;

        while let Some(parent) = stack.pop() {
            path.push(self.index_label[parent]);
            for child in self.vertices[parent].edges_to() {
                if !seen[child] && !visited.contains(&self.index_label[child]) {
                    seen[child] = true;
                    stack.push(child);
                }
            }
        }

        path
    }

    /// Give the vertex at each index the label at the same position of `labels`.
    fn assign_labels(&mut self, labels: Vec<Label>) {
        self.label_index = labels
            .iter()
            .enumerate()
            .map(|(index, label)| (*label, index))
            .collect();
        self.index_label = labels;
    }

    /// Copy of this graph under a uniformly random permutation of its labels.
    pub fn random_isomorphic<R: Rng + ?Sized>(&self, rng: &mut R) -> Graph {
        let mut labels = self.index_label.clone();
        labels.shuffle(rng);

        let mut graph = self.clone();
        graph.assign_labels(labels);
        graph
    }

    /// Copy of this graph with every label `l` replaced by `relabeling[l]`.
    /// Fails on labels without an image and on images used twice.
    pub fn relabeled(&self, relabeling: &BTreeMap<Label, Label>) -> Result<Graph, GraphError> {
        let mut images = LabelSet::new();
        let mut labels = Vec::with_capacity(self.size());

        for label in self.index_label.iter() {
            let image = *relabeling.get(label).ok_or(GraphError(*label))?;
            if !images.insert(image) {
                return Err(GraphError(image));
            }
            labels.push(image);
        }

        let mut graph = self.clone();
        graph.assign_labels(labels);
        Ok(graph)
    }

    /// Human readable dump including the internal indices and degrees.
    pub fn info(&self) -> String {
        let rule = "-".repeat(80);
        let mut info = format!(
            "Vertices: {}\nEdges   : {}\n{}\n",
            self.size(),
            self.number_edges(),
            rule
        );

        for (index, vertex) in self.vertices.iter().enumerate() {
            info.push_str(&format!(
                "({}) -> [{}]{{{}/{}}}|{}|\n",
                self.index_label[index],
                vertex.index(),
                vertex.in_degree(),
                vertex.out_degree(),
                vertex.edges_to().join(", ")
            ));
        }

        info.push_str(&rule);
        info.push('\n');
        info
    }

    fn fmt_vertex(&self, f: &mut fmt::Formatter<'_>, label: Label) -> fmt::Result {
        let ends = self.adjacent(label).sorted().join(", ");
        if ends.is_empty() {
            write!(f, "{}:", label)
        } else {
            write!(f, "{}: {}", label, ends)
        }
    }
}

/// One line `label: end1, end2, ...` per vertex, ascending by label.
impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for label in self.labels() {
            self.fmt_vertex(f, label)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
