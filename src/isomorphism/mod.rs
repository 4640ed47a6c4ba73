//! Isomorphism test for directed graphs by backtracking
//! along a depth first spanning forest of one of them.
use std::collections::BTreeMap;

use crate::graph::Label;

mod forest;
pub use forest::ForestNumbering;

mod matcher;
pub use matcher::Matcher;

/// Vertex bijection from the labels of one graph to those of the other.
pub type IsoMap = BTreeMap<Label, Label>;
