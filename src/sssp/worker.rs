use std::time::{Duration, Instant};

use tracing::{debug, debug_span, trace, Instrument};

use super::{
    matrix::Matrix, mesh::Link, partition::Partition, state::LocalState,
};
use crate::error::Error;

/// What a worker reports once it has delivered its arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub rank: usize,
    /// Reductions this worker took part in.
    pub rounds: u64,
    /// Vertices this worker settled.
    pub settled: usize,
    /// Time spent blocked in the reduction.
    pub blocked: Duration,
    pub elapsed: Duration,
}

/// One rank of the computation: its column block, its state and its link
/// onto the mesh. Every worker runs the same loop; none of them is special.
pub struct Worker {
    partition: Partition,
    block: Matrix,
    link: Link,
}

impl Worker {
    pub fn new(partition: Partition, block: Matrix, link: Link) -> Self {
        Self {
            partition,
            block,
            link,
        }
    }

    pub async fn run(self) -> Result<WorkerReport, Error> {
        let rank = self.link.rank();
        let span = debug_span!("worker", rank);
        self.drive().instrument(span).await
    }

    async fn drive(self) -> Result<WorkerReport, Error> {
        let Worker {
            partition,
            block,
            mut link,
        } = self;
        let rank = link.rank();
        let started = Instant::now();

        let mut state = match LocalState::init(rank, partition, &block) {
            Ok(state) => state,
            Err(e) => {
                link.abort(e.to_string());
                return Err(e);
            }
        };
        debug!(block = partition.block(), "initialised");

        // n - 1 rounds settle every reachable vertex besides the source.
        let rounds = partition.vertices().saturating_sub(1);
        let mut settled = 0;
        for round in 0..rounds {
            let winner = link.all_reduce(state.local_min()).await?;
            let vertex = winner.vertex.filter(|_| winner.is_settleable());
            let Some(vertex) = vertex else {
                debug!(round, "no reachable unsettled vertex left");
                break;
            };
            if state.settle(vertex) {
                settled += 1;
            }
            let lowered = match state.relax(&block, winner) {
                Ok(lowered) => lowered,
                Err(e) => {
                    link.abort(e.to_string());
                    return Err(e);
                }
            };
            trace!(round, vertex, dist = winner.dist, lowered, "relaxed");
        }

        let report = WorkerReport {
            rank,
            rounds: link.rounds(),
            settled,
            blocked: link.blocked(),
            elapsed: started.elapsed(),
        };
        let (dist, pred) = state.into_parts();
        link.deliver(dist, pred)?;
        debug!(rounds = report.rounds, settled, "done");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sssp::{graph::Graph, matrix::INFINITY, mesh};

    #[tokio::test]
    async fn a_failing_worker_takes_the_others_down() {
        let graph = Graph::from_rows(&[
            [0, 1, INFINITY, INFINITY],
            [INFINITY, 0, 1, INFINITY],
            [INFINITY, INFINITY, 0, 1],
            [INFINITY, INFINITY, INFINITY, 0],
        ])
        .unwrap();
        let partition = Partition::new(4, 2).unwrap();
        let mut blocks = partition.split(&graph).unwrap();
        // A block one column short of what rank 1 owns.
        blocks[1] = Matrix::new(4, 1, vec![0; 4]).unwrap();

        let (links, _coordinator) = mesh::connect(partition);
        let handles: Vec<_> = blocks
            .into_iter()
            .zip(links)
            .map(|(block, link)| {
                tokio::spawn(Worker::new(partition, block, link).run())
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        assert!(matches!(
            results[0],
            Err(Error::Aborted {
                rank: 0,
                origin: 1,
                ..
            })
        ));
        assert!(matches!(results[1], Err(Error::DimensionMismatch { .. })));
    }

    #[tokio::test]
    async fn report_counts_settled_vertices() {
        let graph = Graph::from_rows(&[[0, 4], [INFINITY, 0]]).unwrap();
        let partition = Partition::new(2, 1).unwrap();
        let block = partition.split(&graph).unwrap().remove(0);
        let (mut links, coordinator) = mesh::connect(partition);

        let report = Worker::new(partition, block, links.remove(0))
            .run()
            .await
            .unwrap();
        assert_eq!((report.rank, report.rounds, report.settled), (0, 1, 1));

        let paths = coordinator.assemble().await.unwrap();
        assert_eq!(paths.dist(), &[0, 4]);
        assert_eq!(paths.path(1), Some(vec![0, 1]));
    }
}
