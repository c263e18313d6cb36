use super::{
    matrix::{path_sum, Matrix, Weight, INFINITY},
    mesh::wire::Candidate,
    partition::Partition,
    SOURCE,
};
use crate::error::Error;

/// One worker's view of the vertices it owns.
///
/// Settled entries are final; unsettled distances are upper bounds that only
/// [`LocalState::relax`] lowers.
#[derive(Debug, Clone)]
pub struct LocalState {
    rank: usize,
    partition: Partition,
    dist: Vec<Weight>,
    pred: Vec<Option<usize>>,
    settled: Vec<bool>,
}

fn reserve<T>(rank: usize, len: usize) -> Result<Vec<T>, Error> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|source| Error::Allocation { rank, source })?;
    Ok(v)
}

impl LocalState {
    /// Seeds distances from row `SOURCE` of the worker's block. Only the
    /// owner of the source starts with a settled vertex.
    pub fn init(
        rank: usize,
        partition: Partition,
        block: &Matrix,
    ) -> Result<Self, Error> {
        let width = partition.block();
        let first = block.row(SOURCE).filter(|row| row.len() == width).ok_or(
            Error::DimensionMismatch {
                rows: block.rows(),
                cols: block.cols(),
                expected: partition.vertices() * width,
                found: block.rows() * block.cols(),
            },
        )?;

        let mut dist = reserve(rank, width)?;
        let mut pred = reserve(rank, width)?;
        let mut settled = reserve(rank, width)?;
        for (local, &weight) in first.iter().enumerate() {
            let vertex = partition.global(rank, local);
            let is_source = vertex == SOURCE;
            dist.push(weight);
            pred.push((!is_source && weight != INFINITY).then_some(SOURCE));
            settled.push(is_source);
        }

        Ok(Self {
            rank,
            partition,
            dist,
            pred,
            settled,
        })
    }

    /// The closest unsettled owned vertex with a finite distance, lowest id
    /// on ties, or [`Candidate::NONE`].
    pub fn local_min(&self) -> Candidate {
        let mut best = Candidate::NONE;
        let owned = self.dist.iter().zip(&self.settled).enumerate();
        for (local, (&dist, &settled)) in owned {
            if !settled && dist < best.dist {
                let vertex = self.partition.global(self.rank, local);
                best = Candidate::new(dist, vertex);
            }
        }
        best
    }

    /// Marks `vertex` settled if this worker owns it. Returns whether it did.
    pub fn settle(&mut self, vertex: usize) -> bool {
        match self.partition.local(self.rank, vertex) {
            Some(local) => {
                self.settled[local] = true;
                true
            }
            None => false,
        }
    }

    /// Lowers every unsettled owned distance that is shorter through the
    /// newly settled `winner`. Reads only row `winner.vertex` of the
    /// worker's own block.
    pub fn relax(
        &mut self,
        block: &Matrix,
        winner: Candidate,
    ) -> Result<usize, Error> {
        let Some(u) = winner.vertex else {
            return Ok(0);
        };
        let row = block.row(u).ok_or(Error::OutOfBounds {
            row: u,
            col: 0,
            rows: block.rows(),
            cols: block.cols(),
        })?;

        let mut lowered = 0;
        for (local, &weight) in row.iter().enumerate() {
            if self.settled[local] {
                continue;
            }
            let candidate = path_sum(winner.dist, weight);
            if candidate < self.dist[local] {
                self.dist[local] = candidate;
                self.pred[local] = Some(u);
                lowered += 1;
            }
        }
        Ok(lowered)
    }

    pub fn dist(&self) -> &[Weight] {
        &self.dist
    }

    pub fn pred(&self) -> &[Option<usize>] {
        &self.pred
    }

    pub fn is_settled(&self, vertex: usize) -> Option<bool> {
        self.partition
            .local(self.rank, vertex)
            .map(|local| self.settled[local])
    }

    pub fn into_parts(self) -> (Vec<Weight>, Vec<Option<usize>>) {
        (self.dist, self.pred)
    }
}
