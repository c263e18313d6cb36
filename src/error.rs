use std::{collections::TryReserveError, io};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("at least one worker is required")]
    NoWorkers,
    #[error("graph has no vertices")]
    EmptyGraph,
    #[error("{vertices} vertices do not split evenly over {workers} workers")]
    Indivisible { vertices: usize, workers: usize },
    #[error("a {rows}x{cols} matrix needs {expected} weights, found {found}")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        found: usize,
    },
    #[error("adjacency matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("weight({vertex}, {vertex}) is {weight}, self loops must cost 0")]
    NonZeroDiagonal { vertex: usize, weight: u64 },
    #[error("weight({from}, {to}) is {weight}, above the limit of {limit}")]
    WeightTooLarge {
        from: usize,
        to: usize,
        weight: u64,
        limit: u64,
    },
    #[error("index ({row}, {col}) is outside a {rows}x{cols} matrix")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("token {position} ({token:?}) is not a non-negative weight")]
    BadToken { position: usize, token: String },
    #[error("input ended after {found} of {expected} values")]
    Truncated { expected: usize, found: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("worker {rank} could not allocate its local arrays")]
    Allocation {
        rank: usize,
        #[source]
        source: TryReserveError,
    },
    #[error("could not allocate a {rows}x{cols} matrix")]
    MatrixAllocation {
        rows: usize,
        cols: usize,
        #[source]
        source: TryReserveError,
    },
    #[error("worker {rank} aborted: worker {origin} failed ({reason})")]
    Aborted {
        rank: usize,
        origin: usize,
        reason: String,
    },
    #[error("mesh protocol violation: {0}")]
    Protocol(String),
    #[error("worker {rank} never delivered its results")]
    MissingResult { rank: usize },
    #[error("the reducer left the mesh")]
    MeshClosed,
    #[error("worker task failed to complete")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// True for errors a worker reports only because some other worker
    /// failed first.
    pub fn is_secondary(&self) -> bool {
        matches!(self, Error::Aborted { .. } | Error::MeshClosed)
    }
}
