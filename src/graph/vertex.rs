use std::collections::BTreeSet;

use super::VertexIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    index: VertexIndex,
    in_degree: usize,
    out_degree: usize,
    edges_to: BTreeSet<VertexIndex>,
}

impl Vertex {
    pub fn new(index: VertexIndex) -> Self {
        Vertex {
            index,
            in_degree: 0,
            out_degree: 0,
            edges_to: BTreeSet::new(),
        }
    }

    pub fn index(&self) -> VertexIndex {
        self.index
    }

    pub fn in_degree(&self) -> usize {
        self.in_degree
    }

    pub fn out_degree(&self) -> usize {
        self.out_degree
    }

    /// Record an arc to `end`. Self-loops and duplicates are refused.
    /// The caller is responsible for bumping the in-degree of `end`.
    pub fn add_edge(&mut self, end: VertexIndex) -> bool {
        if end == self.index || !self.edges_to.insert(end) {
            return false;
        }
        self.out_degree += 1;
        true
    }

    pub fn add_incoming(&mut self) {
        self.in_degree += 1;
    }

    pub fn is_adjacent(&self, end: VertexIndex) -> bool {
        self.edges_to.contains(&end)
    }

    /// Adjacent indices in ascending order.
    pub fn edges_to(&self) -> impl Iterator<Item = VertexIndex> + '_ {
        self.edges_to.iter().copied()
    }

    pub(super) fn edges_to_set(&self) -> &BTreeSet<VertexIndex> {
        &self.edges_to
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_add_edge() {
        let mut vertex = Vertex::new(3);
        assert!(vertex.add_edge(1));
        assert!(vertex.add_edge(7));
        assert_eq!(2, vertex.out_degree());
        assert_eq!(0, vertex.in_degree());

        // Duplicates and loops are refused.
        assert!(!vertex.add_edge(1));
        assert!(!vertex.add_edge(3));
        assert_eq!(2, vertex.out_degree());

        assert!(vertex.is_adjacent(7));
        assert!(!vertex.is_adjacent(3));
        assert_eq!(vec![1, 7], vertex.edges_to().collect::<Vec<_>>());
    }
}
