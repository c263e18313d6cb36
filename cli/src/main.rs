use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use cortex::{
    config::DEFAULT_SENTINEL, report::ReportExt, sssp::reference, Config,
    Graph, Solution,
};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    version,
    about = "Distributed shortest paths over a column-partitioned matrix"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute shortest paths from vertex 0.
    Solve(SolveArgs),
    /// Write a random adjacency matrix in the input format.
    Generate(GenerateArgs),
}

#[derive(Args)]
struct SolveArgs {
    /// Input matrix; stdin if omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Where to write the tables; stdout if omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Number of workers. Must divide the vertex count.
    #[arg(short = 'p', long, default_value_t = 1)]
    workers: usize,
    /// Input value meaning "no edge".
    #[arg(long, default_value_t = DEFAULT_SENTINEL)]
    sentinel: u64,
    /// Cross-check distances against a sequential Dijkstra.
    #[arg(long)]
    verify: bool,
    /// Append a timing line to this file.
    #[arg(long)]
    bench_log: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    /// Vertex count.
    #[arg(short = 'n', long)]
    vertices: usize,
    /// Probability that any given edge exists.
    #[arg(long, default_value_t = 0.3)]
    density: f64,
    /// Largest edge weight, capped so no path length can overflow.
    #[arg(long, default_value_t = 20)]
    max_weight: u64,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    match Cli::parse().command {
        Command::Solve(args) => solve(args).await,
        Command::Generate(args) => generate(args),
    }
}

async fn solve(args: SolveArgs) -> Result<()> {
    let config = Config::builder()
        .workers(args.workers)
        .sentinel(args.sentinel)
        .build();

    let graph = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            Graph::read(file, config.sentinel)
        }
        None => Graph::read(io::stdin().lock(), config.sentinel),
    }
    .context("reading adjacency matrix")?;
    debug!(vertices = graph.order(), workers = config.workers, "loaded graph");

    let solution = cortex::solve(&graph, &config)
        .await
        .context("computing shortest paths")?;

    if args.verify {
        let expected = reference::sequential(&graph);
        let dist = solution.paths.dist();
        if let Some(v) = reference::first_mismatch(&expected, dist) {
            bail!(
                "vertex {v}: distributed distance {:?} \
                 but sequential distance {:?}",
                solution.paths.distance(v),
                expected.get(v)
            );
        }
        info!("distances match the sequential reference");
    }

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    write!(out, "{}", solution.paths.distance_table())?;
    write!(out, "{}", solution.paths.path_table())?;
    let timings = &solution.timings;
    writeln!(out, "t_w_comm: {:.6} s", timings.total().as_secs_f64())?;
    writeln!(
        out,
        "t_wo_comm: {:.6} s",
        timings.without_communication().as_secs_f64()
    )?;
    out.flush()?;

    info!(digest = %solution.paths.digest(), "done");

    if let Some(path) = &args.bench_log {
        append_bench_line(path, graph.order(), config.workers, &solution)?;
    }
    Ok(())
}

fn append_bench_line(
    path: &Path,
    vertices: usize,
    workers: usize,
    solution: &Solution,
) -> Result<()> {
    let mut log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    writeln!(
        log,
        "{}, {}, {}, {:.6}, {:.6}",
        Utc::now().to_rfc3339(),
        vertices,
        workers,
        solution.timings.total().as_secs_f64(),
        solution.timings.without_communication().as_secs_f64()
    )?;
    Ok(())
}

fn generate(args: GenerateArgs) -> Result<()> {
    if args.vertices == 0 {
        bail!("a graph needs at least one vertex");
    }
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let graph = Graph::random(
        &mut rng,
        args.vertices,
        args.density,
        args.max_weight,
    )?;

    match &args.output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write!(file, "{graph}")?;
        }
        None => print!("{graph}"),
    }
    Ok(())
}
