//! Random connected digraphs, mainly as
//! input for the isomorphism test suite.
use log::{debug, warn};
use rand::{
    distributions::{Distribution, Uniform},
    Rng,
};
use std::collections::BTreeMap;

use super::{Graph, Label, LabelSet};

/// How many random arcs in a row may be refused
/// before the generator settles for fewer edges.
pub const MAX_RANDOM_FAILS: usize = 1000 * 10;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GeneratorError {
    #[error("The number of vertices must be at least 1, got {0}")]
    TooFewVertices(Label),
    #[error("The density must lie in (0, 1], got {0}")]
    DensityOutOfRange(f64),
}

impl Graph {
    /// Build a weakly connected random digraph on the labels `1..=vertex_count`.
    ///
    /// A uniform spanning tree is drawn with loop erased random walks
    /// (Wilson's algorithm), each tree edge gets a random direction and then
    /// random arcs are added until `round(n * (n - 1) * density)` arcs exist.
    /// After [`MAX_RANDOM_FAILS`] refused arcs in a row the graph is returned as is.
    pub fn generate_random<R: Rng + ?Sized>(
        vertex_count: Label,
        density: f64,
        rng: &mut R,
    ) -> Result<Graph, GeneratorError> {
        if vertex_count < 1 {
            return Err(GeneratorError::TooFewVertices(vertex_count));
        }
        if !(density > 0.0 && density <= 1.0) {
            return Err(GeneratorError::DensityOutOfRange(density));
        }

        let labels = Uniform::new_inclusive(1, vertex_count);
        let mut in_tree = LabelSet::new();
        let mut successor: BTreeMap<Label, Label> = BTreeMap::new();

        let root = labels.sample(rng);
        in_tree.insert(root);

        let mut graph = Graph::new();
        graph.add_vertex(root);

        for label in 1..=vertex_count {
            graph.add_vertex(label);

            let mut current = label;
            while !in_tree.contains(&current) {
                let mut next = labels.sample(rng);
                while next == current {
                    next = labels.sample(rng);
                }
                successor.insert(current, next);
                current = next;
            }

            // Retrace the walk; loops were overwritten in `successor`.
            current = label;
            while in_tree.insert(current) {
                match successor.get(&current) {
                    Some(next) => current = *next,
                    None => break,
                }
            }
        }

        for (start, end) in successor {
            if rng.gen_bool(0.5) {
                graph.add_edge(start, end);
            } else {
                graph.add_edge(end, start);
            }
        }

        let n = vertex_count as f64;
        let edge_goal = (n * (n - 1.0) * density).round() as usize;
        let mut failures = 0;

        while graph.number_edges() < edge_goal {
            if failures > MAX_RANDOM_FAILS {
                warn!(
                    "Stopped random generation at {} of {} edges",
                    graph.number_edges(),
                    edge_goal
                );
                break;
            }
            failures += 1;

            if graph.add_edge(labels.sample(rng), labels.sample(rng)) {
                failures = 0;
            }
        }

        debug!(
            "Generated random graph with {} vertices and {} edges",
            graph.size(),
            graph.number_edges()
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Undirected reachability from the smallest label.
    fn weakly_connected(graph: &Graph) -> bool {
        let mut reached = LabelSet::new();
        let mut stack: Vec<Label> = graph.labels().take(1).collect();
        while let Some(label) = stack.pop() {
            if !reached.insert(label) {
                continue;
            }
            for other in graph.labels() {
                if graph.is_connection(label, other) || graph.is_connection(other, label) {
                    stack.push(other);
                }
            }
        }
        reached.len() == graph.size()
    }

    #[test]
    fn test_invalid_parameters() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            Err(GeneratorError::TooFewVertices(0)),
            Graph::generate_random(0, 0.5, &mut rng)
        );
        assert_eq!(
            Err(GeneratorError::DensityOutOfRange(0.0)),
            Graph::generate_random(5, 0.0, &mut rng)
        );
        assert_eq!(
            Err(GeneratorError::DensityOutOfRange(1.5)),
            Graph::generate_random(5, 1.5, &mut rng)
        );
        assert!(Graph::generate_random(5, f64::NAN, &mut rng).is_err());
    }

    #[test]
    fn test_single_vertex() -> Result<(), GeneratorError> {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let graph = Graph::generate_random(1, 1.0, &mut rng)?;
        assert_eq!(1, graph.size());
        assert_eq!(0, graph.number_edges());
        Ok(())
    }

    #[test]
    fn test_random_graph_shape() -> Result<(), GeneratorError> {
        let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);
        for (vertices, density) in [(2, 0.1), (10, 0.2), (30, 0.5), (25, 1.0)] {
            let graph = Graph::generate_random(vertices, density, &mut rng)?;
            assert_eq!(vertices as usize, graph.size());
            assert_eq!(
                (1..=vertices).collect::<Vec<_>>(),
                graph.labels().collect::<Vec<_>>()
            );
            assert!(weakly_connected(&graph));
            assert!(graph.number_edges() >= vertices as usize - 1);

            let n = vertices as f64;
            let goal = ((n * (n - 1.0) * density).round() as usize).max(vertices as usize - 1);
            assert!(graph.number_edges() <= goal);
            for label in graph.labels() {
                assert!(!graph.is_connection(label, label));
            }
        }
        Ok(())
    }

    #[test]
    fn test_same_seed_same_graph() -> Result<(), GeneratorError> {
        let first = Graph::generate_random(40, 0.2, &mut ChaCha8Rng::seed_from_u64(9))?;
        let second = Graph::generate_random(40, 0.2, &mut ChaCha8Rng::seed_from_u64(9))?;
        assert_eq!(first, second);
        Ok(())
    }
}
