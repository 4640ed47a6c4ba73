//! Batch of isomorphism checks with known answers.
//!
//! File cases compare pairs of graphs from a fixtures directory, random cases
//! compare a generated graph with a randomly relabeled copy of itself.
use log::{debug, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    graph::{Graph, Label},
    input::load_graph,
    isomorphism::Matcher,
    time, Error,
};

pub const RANDOM_SIZES: [Label; 7] = [5, 10, 20, 50, 100, 200, 500];
pub const RANDOM_DENSITIES: [f64; 3] = [0.1, 0.2, 0.5];

/// Fixture pairs below the fixtures directory and what checking them must yield.
const FILE_CASES: &[(&str, &str, Expectation)] = &[
    ("vertices_x.txt", "vertices_y.txt", Expectation::PreCheckFails),
    ("edges_x.txt", "edges_y.txt", Expectation::PreCheckFails),
    ("degrees_x.txt", "degrees_y.txt", Expectation::PreCheckFails),
    ("cycles_x.txt", "cycles_y.txt", Expectation::NotIsomorphic),
    ("branches_x.txt", "branches_y.txt", Expectation::NotIsomorphic),
    ("crossing_x.txt", "crossing_y.txt", Expectation::NotIsomorphic),
    ("triangle_x.txt", "triangle_y.txt", Expectation::Isomorphic),
    ("lattice_x.txt", "lattice_y.txt", Expectation::Isomorphic),
    ("scattered_x.txt", "scattered_y.txt", Expectation::Isomorphic),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// Vertex count, edge count or invariant histogram differ.
    PreCheckFails,
    /// The necessary conditions hold, but there is no isomorphism.
    NotIsomorphic,
    Isomorphic,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreCheckFails => write!(f, "pre-check fails"),
            Self::NotIsomorphic => write!(f, "not isomorphic"),
            Self::Isomorphic => write!(f, "isomorphic"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Source {
    Files { x: PathBuf, y: PathBuf },
    Random { vertices: Label, density: f64, seed: u64 },
}

#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub source: Source,
    pub expectation: Expectation,
}

#[derive(Debug)]
pub struct Outcome {
    pub name: String,
    pub passed: bool,
    pub duration: Duration,
    /// What was observed, or why the case could not run.
    pub detail: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl Tally {
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        let passed = outcomes.iter().filter(|outcome| outcome.passed).count();
        Tally {
            total: outcomes.len(),
            passed,
            failed: outcomes.len() - passed,
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {}, passed: {}, failed: {}",
            self.total, self.passed, self.failed
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({:?}): {}",
            if self.passed { " OK " } else { "FAIL" },
            self.name,
            self.duration,
            self.detail
        )
    }
}

/// The file cases below `fixtures` followed by the random cases,
/// numbered consecutively. Random case `n` uses the seed `seed + n`.
pub fn collect_cases(fixtures: &Path, seed: u64) -> Vec<TestCase> {
    let files = FILE_CASES.iter().map(|(x, y, expectation)| TestCase {
        name: format!("{} / {}", x, y),
        source: Source::Files {
            x: fixtures.join(x),
            y: fixtures.join(y),
        },
        expectation: *expectation,
    });

    let random = RANDOM_SIZES
        .iter()
        .flat_map(|vertices| RANDOM_DENSITIES.iter().map(move |density| (*vertices, *density)));

    let mut cases = files.collect::<Vec<_>>();
    let offset = cases.len();
    cases.extend(random.enumerate().map(|(number, (vertices, density))| {
        TestCase {
            name: format!("random V={} D={}", vertices, density),
            source: Source::Random {
                vertices,
                density,
                seed: seed.wrapping_add((offset + number) as u64),
            },
            expectation: Expectation::Isomorphic,
        }
    }));
    cases
}

fn load_pair(source: &Source) -> Result<(Graph, Graph), Error> {
    match source {
        Source::Files { x, y } => Ok((load_graph(x)?, load_graph(y)?)),
        Source::Random {
            vertices,
            density,
            seed,
        } => {
            let mut rng = ChaCha8Rng::seed_from_u64(*seed);
            let graph_x = Graph::generate_random(*vertices, *density, &mut rng)?;
            let graph_y = graph_x.random_isomorphic(&mut rng);
            Ok((graph_x, graph_y))
        }
    }
}

/// Check one pair of graphs against the expectation.
fn judge(graph_x: &Graph, graph_y: &Graph, expectation: Expectation) -> (bool, String) {
    let mut matcher = Matcher::new(graph_x, graph_y);
    let meets = matcher.meets_requirements();
    let found = meets && matcher.is_isomorphism();
    let verified = found && Matcher::verify_isomorphism(graph_x, graph_y, matcher.mapping());

    let observed = match (meets, found) {
        (false, _) => Expectation::PreCheckFails,
        (true, false) => Expectation::NotIsomorphic,
        (true, true) => Expectation::Isomorphic,
    };

    if found && !verified {
        return (false, "mapping does not preserve the arcs".to_string());
    }

    let passed = observed == expectation;
    let detail = if passed {
        observed.to_string()
    } else {
        format!("expected {}, got {}", expectation, observed)
    };
    (passed, detail)
}

pub fn run_case(case: &TestCase) -> Outcome {
    time!(duration, result, {
        load_pair(&case.source).map(|(graph_x, graph_y)| judge(&graph_x, &graph_y, case.expectation))
    });

    let (passed, detail) = match result {
        Ok(judgement) => judgement,
        Err(error) => {
            warn!("Case {} could not be prepared: {}", case.name, error);
            (false, error.to_string())
        }
    };
    debug!("Case {} finished after {:?}", case.name, duration);

    Outcome {
        name: case.name.clone(),
        passed,
        duration,
        detail,
    }
}

/// Run all cases in parallel. The outcomes keep the order of `cases`.
pub fn run_cases(cases: &[TestCase]) -> Vec<Outcome> {
    cases.par_iter().map(run_case).collect()
}

/// Run the whole suite, print every outcome and the tally.
pub fn run_suite(fixtures: &Path, seed: u64) -> Tally {
    let cases = collect_cases(fixtures, seed);
    println!(
        "Running {} cases with fixtures from {} and seed {}",
        cases.len(),
        fixtures.display(),
        seed
    );

    let outcomes = run_cases(&cases);
    for outcome in outcomes.iter() {
        println!("{}", outcome);
    }

    let tally = Tally::from_outcomes(&outcomes);
    println!("{}", tally);
    tally
}
