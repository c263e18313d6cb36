//! Single-source shortest paths over a column-partitioned adjacency matrix.
//!
//! Every worker owns a contiguous block of columns (all rows, only its own
//! vertices). Each round the workers pick a local candidate, agree on one
//! global next vertex through a reduce-and-broadcast over the mesh, and relax
//! their own columns against the row of that vertex, which they already hold.

pub mod config;
pub mod error;
pub mod report;
pub mod sssp;

pub use config::Config;
pub use error::Error;
pub use sssp::{
    graph::{weight_limit, Graph},
    matrix::{Matrix, Weight, INFINITY},
    partition::Partition,
    paths::ShortestPaths,
    solve, solve_blocking, Solution, Timings, SOURCE,
};
