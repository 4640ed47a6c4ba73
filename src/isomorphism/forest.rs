use custom_debug_derive::Debug;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};

use crate::{
    debug::labels_fmt,
    graph::{Edge, Graph, Invariant, Label, LabelSet},
};

/// Discovery order of a depth first spanning forest.
#[derive(Debug, Default, Clone)]
pub struct ForestNumbering {
    /// Position to label.
    #[debug(with = "labels_fmt")]
    order: Vec<Label>,
    #[debug(skip)]
    position: HashMap<Label, usize>,
}

impl ForestNumbering {
    /// Number the vertices of `graph` by a depth first forest. Trees are grown
    /// from the vertices whose invariant is the rarest according to `buckets`
    /// first, so the search branches as little as possible early on.
    pub fn new(graph: &Graph, buckets: &BTreeMap<Invariant, usize>) -> Self {
        let roots = graph
            .invariants()
            .map(|(label, invariant)| (buckets.get(&invariant).copied().unwrap_or(0), label))
            .sorted();

        let mut visited = LabelSet::new();
        let mut numbering = ForestNumbering {
            order: Vec::with_capacity(graph.size()),
            position: HashMap::with_capacity(graph.size()),
        };

        for (_, root) in roots {
            if visited.len() == graph.size() {
                break;
            }

            for label in graph.dfs_path(root, &visited) {
                numbering.position.insert(label, numbering.order.len());
                numbering.order.push(label);
                visited.insert(label);
            }
        }

        numbering
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn label_at(&self, position: usize) -> Option<Label> {
        self.order.get(position).copied()
    }

    pub fn position_of(&self, label: Label) -> Option<usize> {
        self.position.get(&label).copied()
    }

    /// Labels by position.
    pub fn order(&self) -> &[Label] {
        &self.order
    }

    /// Sort key `(max(pos(s), pos(t)), pos(s), pos(t))` of an edge.
    pub fn edge_key(&self, edge: &Edge) -> Option<(usize, usize, usize)> {
        let source = self.position_of(edge.source)?;
        let target = self.position_of(edge.target)?;
        Some((source.max(target), source, target))
    }

    /// All arcs of `graph` in forest order. A vertex is reached either as a
    /// root or by the tree edge that discovered it, before any other arc
    /// between it and earlier vertices.
    pub fn order_edges(&self, graph: &Graph) -> Vec<Edge> {
        graph
            .iterate_edges()
            .filter_map(|edge| self.edge_key(&edge).map(|key| (key, edge)))
            .sorted()
            .map(|(_, edge)| edge)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn buckets_of(graph: &Graph) -> BTreeMap<Invariant, usize> {
        graph
            .invariants()
            .map(|(_, invariant)| invariant)
            .counts()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_numbering_small_graph() {
        let mut graph = Graph::new();
        graph.set_vertex(1, &[2, 3]);
        graph.set_vertex(2, &[3]);

        let forest = ForestNumbering::new(&graph, &buckets_of(&graph));
        assert_eq!(&[1, 3, 2], forest.order());
        assert_eq!(Some(0), forest.position_of(1));
        assert_eq!(Some(2), forest.position_of(2));
        assert_eq!(Some(3), forest.label_at(1));
        assert_eq!(None, forest.label_at(3));

        assert_eq!(
            vec![Edge::new(1, 3), Edge::new(1, 2), Edge::new(2, 3)],
            forest.order_edges(&graph)
        );
    }

    #[test]
    fn test_rarest_invariant_first() {
        // The three sinks share an invariant, all other vertices are unique.
        let mut graph = Graph::new();
        graph.set_vertex(1, &[2, 3]);
        graph.set_vertex(4, &[5]);
        graph.add_vertex(6);

        let forest = ForestNumbering::new(&graph, &buckets_of(&graph));
        assert_eq!(6, forest.len());
        assert_eq!(Some(0), forest.position_of(1));
        assert_eq!(Some(3), forest.position_of(4));
        assert_eq!(Some(5), forest.position_of(6));
    }

    #[test]
    fn test_edge_order_visits_tree_edges_first() {
        let mut graph = Graph::new();
        graph.set_vertex(1, &[2]);
        graph.set_vertex(2, &[3, 1]);
        graph.set_vertex(3, &[1, 4]);
        graph.set_vertex(5, &[4]);

        let forest = ForestNumbering::new(&graph, &buckets_of(&graph));
        let edges = forest.order_edges(&graph);
        assert_eq!(graph.number_edges(), edges.len());

        let mut placed = 0;
        for edge in edges {
            let source = forest.position_of(edge.source).unwrap();
            let target = forest.position_of(edge.target).unwrap();
            // Sources of new trees may only appear as the next unplaced position.
            if source >= placed {
                assert_eq!(placed, source);
                placed = source + 1;
            }
            if target >= placed {
                assert_eq!(placed, target);
                placed += 1;
            }
        }
        assert_eq!(graph.size(), placed);
    }
}
