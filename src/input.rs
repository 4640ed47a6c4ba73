use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{
    graph::Graph,
    parser::load_adjacency_list,
    Error,
};

/// Read a graph in adjacency list format from `path`.
pub fn load_graph<P: AsRef<Path>>(path: P) -> Result<Graph, Error> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::FileError {
        path: path.to_path_buf(),
        source,
    })?;

    let mut graph = Graph::new();
    load_adjacency_list(&mut graph, BufReader::new(file))?;
    Ok(graph)
}

/// Write `graph` to `path` such that [`load_graph`] reads it back.
pub fn save_graph<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<(), Error> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::FileError {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = BufWriter::new(file);
    write!(writer, "{}", graph)?;
    writer.flush()?;
    Ok(())
}
