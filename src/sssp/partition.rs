use std::ops::Range;

use tracing::debug;

use super::{graph::Graph, matrix::Matrix};
use crate::error::Error;

/// Assignment of vertices to workers in equal contiguous column blocks.
///
/// Worker `r` owns vertices `r * block .. (r + 1) * block`. The vertex count
/// must be a multiple of the worker count; there is no uneven fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    vertices: usize,
    workers: usize,
    block: usize,
}

impl Partition {
    pub fn new(vertices: usize, workers: usize) -> Result<Self, Error> {
        if workers == 0 {
            return Err(Error::NoWorkers);
        }
        if vertices == 0 {
            return Err(Error::EmptyGraph);
        }
        if vertices % workers != 0 {
            return Err(Error::Indivisible { vertices, workers });
        }
        Ok(Self {
            vertices,
            workers,
            block: vertices / workers,
        })
    }

    pub fn vertices(&self) -> usize {
        self.vertices
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Vertices per worker (`loc_n`).
    pub fn block(&self) -> usize {
        self.block
    }

    /// The rank that owns `vertex`.
    pub fn owner(&self, vertex: usize) -> usize {
        vertex / self.block
    }

    /// Global vertex ids owned by `rank`.
    pub fn range(&self, rank: usize) -> Range<usize> {
        rank * self.block..(rank + 1) * self.block
    }

    /// Local column index of `vertex` on `rank`, if `rank` owns it.
    pub fn local(&self, rank: usize, vertex: usize) -> Option<usize> {
        self.range(rank)
            .contains(&vertex)
            .then(|| vertex - rank * self.block)
    }

    pub fn global(&self, rank: usize, local: usize) -> usize {
        rank * self.block + local
    }

    /// Splits the adjacency matrix into one `n x block` column block per
    /// rank, in rank order. Local column `j` of block `r` holds
    /// `weight(i, r * block + j)` for every row `i`.
    pub fn split(&self, graph: &Graph) -> Result<Vec<Matrix>, Error> {
        if graph.order() != self.vertices {
            return Err(Error::DimensionMismatch {
                rows: graph.order(),
                cols: graph.order(),
                expected: self.vertices * self.vertices,
                found: graph.order() * graph.order(),
            });
        }
        let blocks = (0..self.workers)
            .map(|rank| {
                graph
                    .matrix()
                    .column_block(rank * self.block, self.block)
                    .map_err(|e| match e {
                        Error::MatrixAllocation { source, .. } => {
                            Error::Allocation { rank, source }
                        }
                        e => e,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            vertices = self.vertices,
            workers = self.workers,
            block = self.block,
            "partitioned adjacency matrix"
        );
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sssp::matrix::INFINITY;

    #[test]
    fn rejects_uneven_and_degenerate_splits() {
        assert!(matches!(
            Partition::new(5, 2),
            Err(Error::Indivisible {
                vertices: 5,
                workers: 2
            })
        ));
        assert!(matches!(Partition::new(4, 0), Err(Error::NoWorkers)));
        assert!(matches!(Partition::new(0, 1), Err(Error::EmptyGraph)));
    }

    #[test]
    fn ownership_is_contiguous() {
        let p = Partition::new(6, 3).unwrap();
        assert_eq!(p.block(), 2);
        assert_eq!(p.range(1), 2..4);
        assert_eq!(p.owner(5), 2);
        assert_eq!(p.local(1, 3), Some(1));
        assert_eq!(p.local(1, 4), None);
        assert_eq!(p.global(2, 1), 5);
        for v in 0..6 {
            assert!(p.range(p.owner(v)).contains(&v));
        }
    }

    #[test]
    fn split_hands_out_full_rows_of_owned_columns() {
        let g = Graph::from_rows(&[
            [0, 1, 2, INFINITY],
            [10, 0, 12, 13],
            [20, 21, 0, 23],
            [30, 31, 32, 0],
        ])
        .unwrap();
        let p = Partition::new(4, 2).unwrap();
        let blocks = p.split(&g).unwrap();
        assert_eq!(blocks.len(), 2);
        for (rank, block) in blocks.iter().enumerate() {
            assert_eq!((block.rows(), block.cols()), (4, 2));
            for i in 0..4 {
                for j in 0..2 {
                    assert_eq!(block.get(i, j), g.weight(i, p.global(rank, j)));
                }
            }
        }
        assert!(Partition::new(2, 1).unwrap().split(&g).is_err());
    }
}
