//! Debug facilities.
use itertools::Itertools;
use std::{fmt, io, path::PathBuf};

use crate::{
    graph::{GeneratorError, GraphError, Label},
    isomorphism::IsoMap,
    parser::LineError,
};

// Error types and From<...> implementations

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Graph error: {0}")]
    GraphError(GraphError),
    #[error("Line [{line}]> {error}")]
    ParseError { line: usize, error: LineError },
    #[error("Could not open file {}", path.display())]
    FileError { path: PathBuf, source: io::Error },
    #[error("I/O error: {0}")]
    IoError(io::Error),
    #[error("Invalid parameters for the random graph: {0}")]
    GeneratorError(GeneratorError),
}

impl From<GraphError> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(ge: GraphError) -> Self {
        Self::GraphError(ge)
    }
}

impl From<io::Error> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(ie: io::Error) -> Self {
        Self::IoError(ie)
    }
}

impl From<GeneratorError> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(ge: GeneratorError) -> Self {
        Self::GeneratorError(ge)
    }
}

// Custom formatter for debug printing

/// `{x -> y, ...}` in ascending order of `x`.
#[cfg(not(tarpaulin_include))]
pub fn mapping_fmt(mapping: &IsoMap, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
        f,
        "{{{}}}",
        mapping
            .iter()
            .map(|(from, to)| format!("{} -> {}", from, to))
            .join(", ")
    )
}

#[allow(clippy::ptr_arg)]
#[cfg(not(tarpaulin_include))]
pub fn labels_fmt(labels: &Vec<Label>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}]", labels.iter().join(" "))
}

// Debug macros that allow to time single expressions

#[macro_export]
macro_rules! time {
    ($i:ident, $ret:ident, $exp:expr) => {
        let before = std::time::Instant::now();
        let $ret = $exp;
        let $i = before.elapsed();
    };
}
