use custom_debug_derive::Debug;
use itertools::Itertools;
use log::{debug, trace};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use super::{ForestNumbering, IsoMap};
use crate::{
    debug::mapping_fmt,
    graph::{Edge, EdgeSet, Graph, Invariant, Label, LabelSet},
};

/// Backtracking search for an isomorphism from `graph_x` to `graph_y`.
///
/// The vertices of X are numbered by a depth first spanning forest and its
/// arcs are consumed in that order. Every tree edge extends the partial
/// mapping by one vertex, every cross edge is checked against the image.
#[derive(Debug)]
pub struct Matcher<'g> {
    #[debug(skip)]
    graph_x: &'g Graph,
    #[debug(skip)]
    graph_y: &'g Graph,
    #[debug(with = "mapping_fmt")]
    mapping: IsoMap,
    /// Labels of Y already used as image.
    used: LabelSet,
    forest: ForestNumbering,
    #[debug(skip)]
    ordered_edges: Vec<Edge>,
    #[debug(skip)]
    invariants_x: HashMap<Label, Invariant>,
    #[debug(skip)]
    invariants_y: HashMap<Label, Invariant>,
    buckets_x: BTreeMap<Invariant, usize>,
    buckets_y: BTreeMap<Invariant, usize>,
    /// Arcs of X between the last placed vertex and the earlier ones.
    edges_to_last: usize,
}

impl<'g> Matcher<'g> {
    pub fn new(graph_x: &'g Graph, graph_y: &'g Graph) -> Self {
        Matcher {
            graph_x,
            graph_y,
            mapping: IsoMap::new(),
            used: LabelSet::new(),
            forest: ForestNumbering::default(),
            ordered_edges: Vec::new(),
            invariants_x: HashMap::new(),
            invariants_y: HashMap::new(),
            buckets_x: BTreeMap::new(),
            buckets_y: BTreeMap::new(),
            edges_to_last: 0,
        }
    }

    /// The mapping found by the last successful [`Matcher::is_isomorphism`].
    pub fn mapping(&self) -> &IsoMap {
        &self.mapping
    }

    fn reset(&mut self) {
        self.mapping.clear();
        self.used.clear();
        self.forest = ForestNumbering::default();
        self.ordered_edges.clear();
        self.invariants_x.clear();
        self.invariants_y.clear();
        self.buckets_x.clear();
        self.buckets_y.clear();
        self.edges_to_last = 0;
    }

    fn count_buckets(&mut self) {
        self.invariants_x = self.graph_x.invariants().collect();
        self.invariants_y = self.graph_y.invariants().collect();
        self.buckets_x = self.invariants_x.values().copied().counts().into_iter().collect();
        self.buckets_y = self.invariants_y.values().copied().counts().into_iter().collect();
    }

    /// Necessary conditions for an isomorphism: same number of vertices and
    /// arcs and the same number of vertices for each invariant.
    pub fn meets_requirements(&mut self) -> bool {
        if self.graph_x.is_empty() && self.graph_y.is_empty() {
            return true;
        }

        if self.graph_x.size() != self.graph_y.size() {
            debug!(
                "Vertex counts differ: {} vs {}",
                self.graph_x.size(),
                self.graph_y.size()
            );
            return false;
        }

        if self.graph_x.number_edges() != self.graph_y.number_edges() {
            debug!(
                "Edge counts differ: {} vs {}",
                self.graph_x.number_edges(),
                self.graph_y.number_edges()
            );
            return false;
        }

        self.reset();
        self.count_buckets();

        if self.buckets_x != self.buckets_y {
            debug!("Invariant histograms differ");
            return false;
        }

        true
    }

    /// Search for an isomorphism. On success it can be read with [`Matcher::mapping`].
    pub fn is_isomorphism(&mut self) -> bool {
        if self.graph_x.is_empty() && self.graph_y.is_empty() {
            self.reset();
            return true;
        }

        if !self.meets_requirements() {
            return false;
        }

        self.forest = ForestNumbering::new(self.graph_x, &self.buckets_x);
        self.ordered_edges = self.forest.order_edges(self.graph_x);
        debug!(
            "Searching with {} forest positions and {} ordered edges",
            self.forest.len(),
            self.ordered_edges.len()
        );

        let found = self.extend(0, 0);
        trace!("Search state:\n{}", self);
        found
    }

    fn assign(&mut self, label: Label, image: Label) {
        self.mapping.insert(label, image);
        self.used.insert(image);
    }

    fn unassign(&mut self, label: Label, image: Label) {
        self.mapping.remove(&label);
        self.used.remove(&image);
    }

    fn image(&self, label: Label) -> Option<Label> {
        self.mapping.get(&label).copied()
    }

    /// Unused vertices of Y with the given invariant, ascending by label.
    fn free_with_invariant(&self, invariant: Option<Invariant>) -> Vec<Label> {
        self.graph_y
            .labels()
            .filter(|candidate| {
                !self.used.contains(candidate)
                    && self.invariants_y.get(candidate).copied() == invariant
            })
            .collect()
    }

    /// Consume arcs from `cursor` on while the first `placed` forest
    /// positions are mapped. Runs of cross edges are handled in place,
    /// only the choice of a new image recurses.
    fn extend(&mut self, mut cursor: usize, placed: usize) -> bool {
        while let Some(edge) = self.ordered_edges.get(cursor).copied() {
            let (source, target) = match (
                self.forest.position_of(edge.source),
                self.forest.position_of(edge.target),
            ) {
                (Some(source), Some(target)) => (source, target),
                _ => return false,
            };

            if source >= placed {
                return self.close_last(placed) && self.match_root(cursor, placed);
            }

            if target >= placed {
                return self.close_last(placed) && self.match_tree_edge(edge, target, cursor, placed);
            }

            match (self.image(edge.source), self.image(edge.target)) {
                (Some(start), Some(end)) if self.graph_y.is_connection_within(start, end, &self.used) => {
                    self.edges_to_last += 1;
                }
                _ => return false,
            }
            cursor += 1;
        }

        self.close_last(placed) && self.match_isolated(placed)
    }

    /// The vertex at position `placed - 1` got all its arcs to earlier
    /// positions. Its image needs exactly as many arcs to the used set.
    fn close_last(&self, placed: usize) -> bool {
        if placed == 0 {
            return true;
        }

        let image = match self
            .forest
            .label_at(placed - 1)
            .and_then(|label| self.image(label))
        {
            Some(image) => image,
            None => return false,
        };

        match (
            self.graph_y.out_degree_within(image, &self.used),
            self.graph_y.in_degree_within(image, &self.used),
        ) {
            (Ok(out_degree), Ok(in_degree)) => out_degree + in_degree == self.edges_to_last,
            _ => false,
        }
    }

    /// Map the next root of the forest to any unused vertex of Y with
    /// the same invariant. The current arc is not consumed.
    fn match_root(&mut self, cursor: usize, placed: usize) -> bool {
        let root = match self.forest.label_at(placed) {
            Some(root) => root,
            None => return false,
        };
        let invariant = self.invariants_x.get(&root).copied();

        for candidate in self.free_with_invariant(invariant) {
            self.assign(root, candidate);
            self.edges_to_last = 0;

            if self.extend(cursor, placed + 1) {
                return true;
            }

            self.unassign(root, candidate);
        }

        false
    }

    /// Map the target of a tree edge to an unused successor of the image
    /// of its source with the same invariant.
    fn match_tree_edge(&mut self, edge: Edge, target: usize, cursor: usize, placed: usize) -> bool {
        let start = match self.image(edge.source) {
            Some(start) => start,
            None => return false,
        };
        let invariant = self.invariants_x.get(&edge.target).copied();

        let candidates = self
            .graph_y
            .adjacent(start)
            .filter(|candidate| {
                !self.used.contains(candidate)
                    && self.invariants_y.get(candidate).copied() == invariant
            })
            .collect_vec();

        for candidate in candidates {
            self.assign(edge.target, candidate);
            self.edges_to_last = 1;

            if self.extend(cursor + 1, placed.max(target + 1)) {
                return true;
            }

            self.unassign(edge.target, candidate);
        }

        false
    }

    /// All arcs are matched. Whatever is left in the forest has no arcs
    /// and goes to unused vertices of Y with the same invariant.
    fn match_isolated(&mut self, placed: usize) -> bool {
        let mut assigned = Vec::new();

        for position in placed..self.forest.len() {
            let candidate = self.forest.label_at(position).and_then(|label| {
                let invariant = self.invariants_x.get(&label).copied();
                self.free_with_invariant(invariant)
                    .first()
                    .map(|image| (label, *image))
            });

            match candidate {
                Some((label, image)) => {
                    self.assign(label, image);
                    assigned.push((label, image));
                }
                None => {
                    for (label, image) in assigned {
                        self.unassign(label, image);
                    }
                    return false;
                }
            }
        }

        true
    }

    /// Check that `mapping` sends every arc of `graph_x` to an arc of `graph_y`.
    /// Independent of any search state.
    pub fn verify_isomorphism(graph_x: &Graph, graph_y: &Graph, mapping: &IsoMap) -> bool {
        let mut edges_x = EdgeSet::new();
        let mut edges_y = EdgeSet::new();
        graph_x.collect_edges(&mut edges_x);
        graph_y.collect_edges(&mut edges_y);

        edges_x.iter().all(
            |edge| match (mapping.get(&edge.source), mapping.get(&edge.target)) {
                (Some(start), Some(end)) => edges_y.contains(&Edge::new(*start, *end)),
                _ => false,
            },
        )
    }
}

/// Forest numbering, ordered arcs with their positions and the mapping.
impl fmt::Display for Matcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, label) in self.forest.order().iter().enumerate() {
            writeln!(f, "{} :: {}", label, position)?;
        }

        for edge in self.ordered_edges.iter() {
            if let Some((_, source, target)) = self.forest.edge_key(edge) {
                writeln!(
                    f,
                    "{} -> {} | {} -> {}",
                    edge.source, edge.target, source, target
                )?;
            }
        }
        writeln!(f)?;

        for (label, image) in self.mapping.iter() {
            writeln!(f, "{} -->> {}", label, image)?;
        }
        Ok(())
    }
}
