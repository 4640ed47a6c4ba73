#![warn(rust_2018_idioms)]

//! Isomorphism test for directed graphs by
//! backtracking along a depth first spanning
//! forest, pruned by degree invariants.

use clap::{Parser, Subcommand};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

mod debug;
pub use debug::Error;

mod graph;
use graph::{Graph, Label};

mod input;
use input::{load_graph, save_graph};

mod isomorphism;
use isomorphism::Matcher;

mod parser;

mod suite;
use suite::run_suite;

/// Graphs up to this size are printed along with the result.
const PRINT_LIMIT: usize = 10;

#[derive(Parser, Debug)]
#[command(
    name = "isomatch",
    version,
    about = "Isomorphism test for directed graphs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check two graphs in adjacency list format.
    Files {
        #[arg(value_name = "X")]
        graph_x: PathBuf,
        #[arg(value_name = "Y")]
        graph_y: PathBuf,
    },
    /// Check a random graph against a randomly relabeled copy.
    Random {
        #[arg(value_name = "V", help = "Number of vertices")]
        vertices: Label,
        #[arg(value_name = "D", help = "Edge density in (0, 1]")]
        density: f64,
        #[arg(long, help = "Seed of the random generator")]
        seed: Option<u64>,
    },
    /// Write a random graph to a file.
    Generate {
        #[arg(value_name = "V", help = "Number of vertices")]
        vertices: Label,
        #[arg(value_name = "D", help = "Edge density in (0, 1]")]
        density: f64,
        #[arg(value_name = "OUT")]
        out: PathBuf,
        #[arg(long, help = "Seed of the random generator")]
        seed: Option<u64>,
    },
    /// Run the batch of file and random cases.
    Suite {
        #[arg(long, default_value = "fixtures", help = "Directory of the file cases")]
        fixtures: PathBuf,
        #[arg(long, help = "Seed of the random cases")]
        seed: Option<u64>,
    },
}

/// Use the given seed or draw a fresh one, and tell which so runs can be repeated.
fn seeded_rng(seed: Option<u64>) -> (u64, ChaCha8Rng) {
    let seed = seed.unwrap_or_else(rand::random);
    info!("Using seed {}", seed);
    (seed, ChaCha8Rng::seed_from_u64(seed))
}

#[cfg(not(tarpaulin_include))]
fn report(graph_x: &Graph, graph_y: &Graph) {
    println!(
        "X: {} vertices, {} edges",
        graph_x.size(),
        graph_x.number_edges()
    );
    println!(
        "Y: {} vertices, {} edges",
        graph_y.size(),
        graph_y.number_edges()
    );
    debug!("X:\n{}", graph_x.info());
    debug!("Y:\n{}", graph_y.info());

    let mut matcher = Matcher::new(graph_x, graph_y);
    let meets = matcher.meets_requirements();
    println!(
        "Pre-check: {}",
        if meets { "passed" } else { "failed" }
    );

    time!(search_time, found, meets && matcher.is_isomorphism());
    println!(
        "Result: {} ({:?})",
        if found { "isomorphic" } else { "not isomorphic" },
        search_time
    );

    if graph_x.size() <= PRINT_LIMIT {
        println!("X:\n{}", graph_x);
        println!("Y:\n{}", graph_y);
        if found {
            println!("Mapping:");
            for (label, image) in matcher.mapping() {
                println!("{} -> {}", label, image);
            }
        }
    }

    if found && !Matcher::verify_isomorphism(graph_x, graph_y, matcher.mapping()) {
        eprintln!("The found mapping does not preserve all arcs!");
    }
}

#[cfg(not(tarpaulin_include))]
fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Files { graph_x, graph_y } => {
            let graph_x = load_graph(&graph_x)?;
            let graph_y = load_graph(&graph_y)?;
            report(&graph_x, &graph_y);
        }
        Command::Random {
            vertices,
            density,
            seed,
        } => {
            let (_, mut rng) = seeded_rng(seed);
            let graph_x = Graph::generate_random(vertices, density, &mut rng)?;
            let graph_y = graph_x.random_isomorphic(&mut rng);
            report(&graph_x, &graph_y);
        }
        Command::Generate {
            vertices,
            density,
            out,
            seed,
        } => {
            let (_, mut rng) = seeded_rng(seed);
            let graph = Graph::generate_random(vertices, density, &mut rng)?;
            save_graph(&graph, &out)?;
            println!(
                "Wrote {} vertices and {} edges to {}",
                graph.size(),
                graph.number_edges(),
                out.display()
            );
        }
        Command::Suite { fixtures, seed } => {
            let (seed, _) = seeded_rng(seed);
            let tally = run_suite(&fixtures, seed);
            if tally.failed > 0 {
                log::warn!("{} of {} cases failed", tally.failed, tally.total);
            }
        }
    }

    Ok(())
}
