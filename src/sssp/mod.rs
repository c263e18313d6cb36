// Each worker runs as its own task and owns exactly one column block of the
// adjacency matrix: every row, but only the columns of the vertices it owns.
// That layout keeps relaxation local. Once the mesh agrees on the next vertex
// u, every worker already holds row u for its own columns and can update its
// distances without asking anyone.
//
// The only synchronisation is the per-round reduce-and-broadcast. A worker
// blocks there until every other worker has bid, then all of them continue
// with the same winner. Since the winner is chosen by (distance, vertex id),
// the order in which vertices settle, and with it every distance, does not
// depend on how many workers share the graph.

use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::{config::Config, error::Error};

pub mod graph;
pub mod matrix;
pub mod mesh;
pub mod partition;
pub mod paths;
pub mod reference;
pub mod state;
pub mod worker;

use graph::Graph;
use partition::Partition;
use paths::ShortestPaths;
use worker::{Worker, WorkerReport};

/// Every run measures distances from vertex 0.
pub const SOURCE: usize = 0;

/// Wall-clock breakdown of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timings {
    /// From spawning the workers until the last one finished.
    pub compute: Duration,
    /// The longest any single worker spent blocked in reductions.
    pub reduction: Duration,
    /// Assembling the global tables on the coordinator.
    pub gather: Duration,
}

impl Timings {
    pub fn total(&self) -> Duration {
        self.compute + self.gather
    }

    /// Time spent exchanging data: the longest reduction wait plus the
    /// gather.
    pub fn communication(&self) -> Duration {
        self.reduction + self.gather
    }

    /// [`Timings::total`] minus [`Timings::communication`].
    pub fn without_communication(&self) -> Duration {
        self.total().saturating_sub(self.communication())
    }
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub paths: ShortestPaths,
    pub workers: Vec<WorkerReport>,
    pub timings: Timings,
}

/// Computes shortest paths from [`SOURCE`] with `config.workers` cooperating
/// workers. Fails before any worker starts if the vertex count does not
/// split evenly. Any failure on one worker fails the whole run.
pub async fn solve(graph: &Graph, config: &Config) -> Result<Solution, Error> {
    let partition = Partition::new(graph.order(), config.workers)?;
    let blocks = partition.split(graph)?;

    let started = Instant::now();
    let (links, coordinator) = mesh::connect(partition);
    let handles = blocks
        .into_iter()
        .zip(links)
        .map(|(block, link)| {
            tokio::spawn(Worker::new(partition, block, link).run())
        });
    let outcomes = join_all(handles).await;
    let compute = started.elapsed();

    let mut reports = Vec::with_capacity(partition.workers());
    let mut failure: Option<Error> = None;
    for outcome in outcomes {
        match outcome.map_err(Error::from).and_then(|result| result) {
            Ok(report) => reports.push(report),
            Err(e) => {
                warn!(error = %e, "worker failed");
                // Keep the error that started the abort, not its echoes.
                let replaces = failure
                    .as_ref()
                    .map_or(true, |f| f.is_secondary() && !e.is_secondary());
                if replaces {
                    failure = Some(e);
                }
            }
        }
    }
    if let Some(e) = failure {
        return Err(e);
    }

    let gather_started = Instant::now();
    let paths = coordinator.assemble().await?;
    let gather = gather_started.elapsed();

    let reduction = reports
        .iter()
        .map(|r| r.blocked)
        .max()
        .unwrap_or_default();
    debug!(
        vertices = partition.vertices(),
        workers = partition.workers(),
        ?compute,
        ?reduction,
        ?gather,
        "solved"
    );

    Ok(Solution {
        paths,
        workers: reports,
        timings: Timings {
            compute,
            reduction,
            gather,
        },
    })
}

/// [`solve`] on a fresh multi-threaded runtime, for callers without one.
pub fn solve_blocking(
    graph: &Graph,
    config: &Config,
) -> Result<Solution, Error> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(solve(graph, config))
}
