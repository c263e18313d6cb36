use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, trace};

use super::wire::{Candidate, Contribution, LocalResult, Verdict};
use crate::{
    error::Error,
    sssp::{partition::Partition, paths::ShortestPaths},
};

/// A worker's handle onto the mesh.
///
/// Dropping a link that never delivered its results tells the reducer the
/// worker is gone, which aborts the run for everyone instead of leaving the
/// remaining workers blocked in the next reduction.
pub struct Link {
    rank: usize,
    round: u64,
    contributions: mpsc::UnboundedSender<Contribution>,
    verdicts: broadcast::Receiver<Verdict>,
    results: mpsc::UnboundedSender<LocalResult>,
    blocked: Duration,
    finished: bool,
}

impl Link {
    pub(super) fn new(
        rank: usize,
        contributions: mpsc::UnboundedSender<Contribution>,
        verdicts: broadcast::Receiver<Verdict>,
        results: mpsc::UnboundedSender<LocalResult>,
    ) -> Self {
        Self {
            rank,
            round: 0,
            contributions,
            verdicts,
            results,
            blocked: Duration::ZERO,
            finished: false,
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Rounds completed so far.
    pub fn rounds(&self) -> u64 {
        self.round
    }

    /// Total time spent waiting in [`Link::all_reduce`].
    pub fn blocked(&self) -> Duration {
        self.blocked
    }

    /// Contributes `candidate` to the current round and waits until every
    /// worker has done the same. Every worker gets back the same winner.
    pub async fn all_reduce(
        &mut self,
        candidate: Candidate,
    ) -> Result<Candidate, Error> {
        let started = Instant::now();
        let bid = Contribution::Bid {
            rank: self.rank,
            round: self.round,
            candidate,
        };
        if self.contributions.send(bid).is_err() {
            // The reducer only stops early after publishing an abort, which
            // is still waiting in our receiver.
            debug!(rank = self.rank, "reducer gone before our bid");
        }

        let verdict = self.verdicts.recv().await;
        self.blocked += started.elapsed();
        match verdict {
            Ok(Verdict::Winner { round, candidate }) if round == self.round => {
                trace!(
                    rank = self.rank,
                    round,
                    vertex = ?candidate.vertex,
                    "received winner"
                );
                self.round += 1;
                Ok(candidate)
            }
            Ok(Verdict::Winner { round, .. }) => Err(Error::Protocol(format!(
                "worker {} expected round {} but got round {round}",
                self.rank, self.round
            ))),
            Ok(Verdict::Abort { origin, reason }) => {
                self.finished = true;
                Err(Error::Aborted {
                    rank: self.rank,
                    origin,
                    reason,
                })
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                Err(Error::Protocol(format!(
                    "worker {} missed {missed} verdicts",
                    self.rank
                )))
            }
            Err(broadcast::error::RecvError::Closed) => Err(Error::MeshClosed),
        }
    }

    /// Tells every other worker this one cannot continue.
    pub fn abort(mut self, reason: String) {
        self.finished = true;
        let _ = self.contributions.send(Contribution::Abort {
            rank: self.rank,
            reason,
        });
    }

    /// Hands this worker's final arrays to the coordinator.
    pub fn deliver(
        mut self,
        dist: Vec<u64>,
        pred: Vec<Option<usize>>,
    ) -> Result<(), Error> {
        self.finished = true;
        self.results
            .send(LocalResult {
                rank: self.rank,
                dist,
                pred,
            })
            .map_err(|_| Error::MissingResult { rank: self.rank })
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self
                .contributions
                .send(Contribution::Departed { rank: self.rank });
        }
    }
}

/// The capability to assemble the global result. Exactly one exists per
/// mesh; whoever holds it plays the coordinator.
pub struct Coordinator {
    partition: Partition,
    results: mpsc::UnboundedReceiver<LocalResult>,
}

impl Coordinator {
    pub(super) fn new(
        partition: Partition,
        results: mpsc::UnboundedReceiver<LocalResult>,
    ) -> Self {
        Self { partition, results }
    }

    /// Waits for every worker's arrays and concatenates them in rank order.
    pub async fn assemble(mut self) -> Result<ShortestPaths, Error> {
        let workers = self.partition.workers();
        let block = self.partition.block();
        let mut slots: Vec<Option<LocalResult>> = vec![None; workers];
        let mut received = 0;

        while received < workers {
            let Some(result) = self.results.recv().await else {
                let rank = slots.iter().position(Option::is_none).unwrap_or(0);
                return Err(Error::MissingResult { rank });
            };
            let rank = result.rank;
            if rank >= workers || slots[rank].is_some() {
                return Err(Error::Protocol(format!(
                    "unexpected result from rank {rank}"
                )));
            }
            if result.dist.len() != block || result.pred.len() != block {
                return Err(Error::Protocol(format!(
                    "rank {rank} delivered {} distances for a block of {block}",
                    result.dist.len()
                )));
            }
            slots[rank] = Some(result);
            received += 1;
        }

        let mut dist = Vec::with_capacity(self.partition.vertices());
        let mut pred = Vec::with_capacity(self.partition.vertices());
        for result in slots.into_iter().flatten() {
            dist.extend(result.dist);
            pred.extend(result.pred);
        }
        debug!(vertices = dist.len(), "assembled global result");
        Ok(ShortestPaths::new(dist, pred))
    }
}
