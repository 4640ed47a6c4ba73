//! Representation of directed graphs whose
//! vertices carry external labels but are
//! stored under dense internal indices.
use std::collections::BTreeSet;

mod digraph;
pub use digraph::{AdjacentLabels, Graph};

mod vertex;
pub use vertex::Vertex;

mod generator;
pub use generator::{GeneratorError, MAX_RANDOM_FAILS};

/// External vertex identifier chosen by the caller.
pub type Label = u32;
/// Dense internal vertex identifier, never visible outside of [`Graph`].
pub type VertexIndex = usize;
/// Degree signature `P * out + in` of a vertex.
pub type Invariant = u64;

pub type LabelSet = BTreeSet<Label>;
pub type EdgeSet = BTreeSet<Edge>;

/// A directed edge between two labels.
/// Ordered by source first, then by target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub source: Label,
    pub target: Label,
}

impl Edge {
    pub fn new(source: Label, target: Label) -> Self {
        Edge { source, target }
    }
}

/// A label that is not part of the graph.
#[derive(Debug, PartialEq, Eq)]
pub struct GraphError(pub Label);

impl std::fmt::Display for GraphError {
    #[cfg(not(tarpaulin_include))]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no vertex with label {}", self.0)
    }
}
