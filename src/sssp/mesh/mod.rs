use tokio::sync::{broadcast, mpsc};

use super::partition::Partition;

mod link;
mod reducer;
pub mod wire;

pub use link::{Coordinator, Link};

/// Verdicts buffered per worker. Workers consume each verdict before they
/// can bid again, so only the latest one, or an abort right behind it, is
/// ever outstanding.
const VERDICT_BUFFER: usize = 4;

/// Wires up a mesh for `partition.workers()` participants and spawns its
/// reducer. Returns one link per rank, in rank order, and the single
/// coordinator capability. Must be called inside a tokio runtime.
pub fn connect(partition: Partition) -> (Vec<Link>, Coordinator) {
    let workers = partition.workers();
    let (contributions_tx, contributions_rx) = mpsc::unbounded_channel();
    let (verdicts_tx, _) = broadcast::channel(VERDICT_BUFFER);
    let (results_tx, results_rx) = mpsc::unbounded_channel();

    let links = (0..workers)
        .map(|rank| {
            Link::new(
                rank,
                contributions_tx.clone(),
                verdicts_tx.subscribe(),
                results_tx.clone(),
            )
        })
        .collect();

    tokio::spawn(reducer::run(workers, contributions_rx, verdicts_tx));

    (links, Coordinator::new(partition, results_rx))
}

#[cfg(test)]
mod tests {
    use super::{wire::Candidate, *};
    use crate::error::Error;

    #[tokio::test]
    async fn all_workers_see_the_same_winner() {
        let partition = Partition::new(6, 3).unwrap();
        let (links, _coordinator) = connect(partition);
        let bids = [
            Candidate::new(7, 1),
            Candidate::NONE,
            Candidate::new(7, 0),
        ];

        let handles: Vec<_> = links
            .into_iter()
            .zip(bids)
            .map(|(mut link, bid)| {
                tokio::spawn(async move {
                    let winner = link.all_reduce(bid).await;
                    link.abort("test over".into());
                    winner
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), Candidate::new(7, 0));
        }
    }

    #[tokio::test]
    async fn a_dropped_link_aborts_the_others() {
        let partition = Partition::new(2, 2).unwrap();
        let (mut links, _coordinator) = connect(partition);
        let gone = links.pop().unwrap();
        let mut stay = links.pop().unwrap();
        drop(gone);

        let err = stay.all_reduce(Candidate::new(1, 0)).await.unwrap_err();
        assert!(matches!(err, Error::Aborted { rank: 0, origin: 1, .. }));
    }

    #[tokio::test]
    async fn coordinator_reassembles_in_rank_order() {
        let partition = Partition::new(4, 2).unwrap();
        let (mut links, coordinator) = connect(partition);
        let second = links.pop().unwrap();
        let first = links.pop().unwrap();

        second.deliver(vec![5, 6], vec![Some(0), None]).unwrap();
        first.deliver(vec![0, 3], vec![None, Some(0)]).unwrap();

        let paths = coordinator.assemble().await.unwrap();
        assert_eq!(paths.dist(), &[0, 3, 5, 6]);
        assert_eq!(paths.pred(), &[None, Some(0), Some(0), None]);
    }

    #[tokio::test]
    async fn coordinator_notices_a_missing_worker() {
        let partition = Partition::new(4, 2).unwrap();
        let (mut links, coordinator) = connect(partition);
        let second = links.pop().unwrap();
        let first = links.pop().unwrap();

        first.deliver(vec![0, 3], vec![None, Some(0)]).unwrap();
        second.abort("gave up".into());

        assert!(matches!(
            coordinator.assemble().await,
            Err(Error::MissingResult { rank: 1 })
        ));
    }
}
