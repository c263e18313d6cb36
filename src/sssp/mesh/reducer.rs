use tokio::sync::{broadcast, mpsc};
use tracing::{debug, debug_span, trace, warn, Instrument};

use super::wire::{Candidate, Contribution, Verdict};

/// Runs the collective reduction for `workers` participants until the run
/// ends or a participant fails.
///
/// A round closes once every rank has bid exactly once. Its winner is
/// published on `verdicts`, which every worker subscribed to before the first
/// round, so all of them observe the same sequence of verdicts.
pub(super) async fn run(
    workers: usize,
    mut contributions: mpsc::UnboundedReceiver<Contribution>,
    verdicts: broadcast::Sender<Verdict>,
) {
    let span = debug_span!("reducer", workers);
    async move {
        debug!("reducer started");
        let mut round = 0u64;
        let mut bids = vec![false; workers];
        let mut pending = workers;
        let mut best = Candidate::NONE;

        while let Some(contribution) = contributions.recv().await {
            let (origin, reason) = match contribution {
                Contribution::Bid {
                    rank,
                    round: bid_round,
                    candidate,
                } => {
                    if rank >= workers {
                        (rank, format!("bid from unknown rank {rank}"))
                    } else if bid_round != round {
                        let reason = format!(
                            "bid for round {bid_round} during round {round}"
                        );
                        (rank, reason)
                    } else if bids[rank] {
                        (rank, format!("second bid in round {round}"))
                    } else {
                        bids[rank] = true;
                        best = best.combine(candidate);
                        pending -= 1;
                        if pending > 0 {
                            continue;
                        }

                        trace!(
                            round,
                            dist = best.dist,
                            vertex = ?best.vertex,
                            "round closed"
                        );
                        let verdict = Verdict::Winner {
                            round,
                            candidate: best,
                        };
                        if verdicts.send(verdict).is_err() {
                            debug!("no workers left to receive verdicts");
                            return;
                        }
                        round += 1;
                        bids.iter_mut().for_each(|b| *b = false);
                        pending = workers;
                        best = Candidate::NONE;
                        continue;
                    }
                }
                Contribution::Abort { rank, reason } => (rank, reason),
                Contribution::Departed { rank } => {
                    (rank, "left the mesh before finishing".to_owned())
                }
            };

            warn!(origin, round, %reason, "aborting run");
            // Receivers may already be gone if every worker has failed.
            let _ = verdicts.send(Verdict::Abort { origin, reason });
            return;
        }
        debug!(rounds = round, "reducer finished");
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(rank: usize, round: u64, dist: u64, vertex: usize) -> Contribution {
        Contribution::Bid {
            rank,
            round,
            candidate: Candidate::new(dist, vertex),
        }
    }

    #[tokio::test]
    async fn publishes_one_winner_per_round() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (vtx, mut vrx) = broadcast::channel(8);
        let reducer = tokio::spawn(run(2, rx, vtx));

        tx.send(bid(1, 0, 5, 3)).unwrap();
        tx.send(bid(0, 0, 5, 1)).unwrap();
        assert_eq!(
            vrx.recv().await.unwrap(),
            Verdict::Winner {
                round: 0,
                candidate: Candidate::new(5, 1)
            }
        );

        tx.send(Contribution::Bid {
            rank: 0,
            round: 1,
            candidate: Candidate::NONE,
        })
        .unwrap();
        tx.send(bid(1, 1, 9, 2)).unwrap();
        assert_eq!(
            vrx.recv().await.unwrap(),
            Verdict::Winner {
                round: 1,
                candidate: Candidate::new(9, 2)
            }
        );

        drop(tx);
        reducer.await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_bid_aborts() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (vtx, mut vrx) = broadcast::channel(8);
        let reducer = tokio::spawn(run(2, rx, vtx));

        tx.send(bid(0, 0, 1, 1)).unwrap();
        tx.send(bid(0, 0, 1, 1)).unwrap();
        assert!(matches!(
            vrx.recv().await.unwrap(),
            Verdict::Abort { origin: 0, .. }
        ));
        reducer.await.unwrap();
    }

    #[tokio::test]
    async fn departure_aborts_everyone() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (vtx, mut a) = broadcast::channel(8);
        let mut b = vtx.subscribe();
        let reducer = tokio::spawn(run(3, rx, vtx));

        tx.send(bid(0, 0, 1, 0)).unwrap();
        tx.send(Contribution::Departed { rank: 2 }).unwrap();
        let seen_a = a.recv().await.unwrap();
        let seen_b = b.recv().await.unwrap();
        assert_eq!(seen_a, seen_b);
        assert!(matches!(seen_a, Verdict::Abort { origin: 2, .. }));
        reducer.await.unwrap();
    }
}
