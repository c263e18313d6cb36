use std::{fmt, io::Read};

use rand::Rng;
use tracing::debug;

use super::matrix::{self, Matrix, Weight, INFINITY};
use crate::error::Error;

/// An immutable `n x n` adjacency matrix. `weight(i, j)` is the cost of the
/// edge `i -> j`, or [`INFINITY`] if there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    matrix: Matrix,
}

/// The largest finite edge weight an `order`-vertex graph may carry.
///
/// A shortest path has at most `order - 1` edges, so with every weight at
/// or below this limit no path length reaches [`INFINITY`].
pub fn weight_limit(order: usize) -> Weight {
    let edges = order.saturating_sub(1).max(1) as Weight;
    (INFINITY - 1) / edges
}

impl Graph {
    /// Validates a square matrix with a zero diagonal and finite weights
    /// within [`weight_limit`].
    pub fn new(matrix: Matrix) -> Result<Self, Error> {
        if matrix.rows() != matrix.cols() {
            return Err(Error::NotSquare {
                rows: matrix.rows(),
                cols: matrix.cols(),
            });
        }
        if matrix.rows() == 0 {
            return Err(Error::EmptyGraph);
        }
        for vertex in 0..matrix.rows() {
            let weight = matrix.try_get(vertex, vertex)?;
            if weight != 0 {
                return Err(Error::NonZeroDiagonal { vertex, weight });
            }
        }
        let limit = weight_limit(matrix.rows());
        for from in 0..matrix.rows() {
            let row = matrix.row(from).unwrap_or_default();
            let over = row.iter().position(|&w| w != INFINITY && w > limit);
            if let Some(to) = over {
                return Err(Error::WeightTooLarge {
                    from,
                    to,
                    weight: row[to],
                    limit,
                });
            }
        }
        Ok(Self { matrix })
    }

    /// Builds a graph from nested rows, mostly for tests and fixtures.
    pub fn from_rows<R: AsRef<[Weight]>>(rows: &[R]) -> Result<Self, Error> {
        let n = rows.len();
        let len = rows.iter().map(|row| row.as_ref().len()).sum();
        let mut buf = Vec::with_capacity(len);
        for row in rows {
            buf.extend_from_slice(row.as_ref());
        }
        Graph::new(Matrix::new(n, n, buf)?)
    }

    /// Parses `n` followed by `n * n` row-major weights. Tokens equal to
    /// `sentinel`, or spelled `inf`, mean "no edge".
    pub fn parse(text: &str, sentinel: Weight) -> Result<Self, Error> {
        let mut tokens = text.split_whitespace().enumerate();
        let parse = |position: usize, token: &str| -> Result<Weight, Error> {
            if token.eq_ignore_ascii_case("inf") {
                return Ok(INFINITY);
            }
            match token.parse::<Weight>() {
                Ok(w) if w == sentinel => Ok(INFINITY),
                Ok(w) => Ok(w),
                Err(_) => Err(Error::BadToken {
                    position,
                    token: token.to_owned(),
                }),
            }
        };

        let n = match tokens.next() {
            Some((position, token)) => {
                token.parse::<usize>().map_err(|_| Error::BadToken {
                    position,
                    token: token.to_owned(),
                })?
            }
            None => return Err(Error::Truncated { expected: 1, found: 0 }),
        };
        let expected = n.checked_mul(n).ok_or(Error::BadToken {
            position: 0,
            token: n.to_string(),
        })?;

        // The header is untrusted; every weight needs at least two bytes.
        let mut buf = Vec::with_capacity(expected.min(text.len() / 2 + 1));
        for (position, token) in tokens.by_ref().take(expected) {
            buf.push(parse(position, token)?);
        }
        if buf.len() < expected {
            return Err(Error::Truncated {
                expected,
                found: buf.len(),
            });
        }
        if let Some((position, token)) = tokens.next() {
            return Err(Error::BadToken {
                position,
                token: token.to_owned(),
            });
        }
        debug!(vertices = n, "parsed adjacency matrix");
        Graph::new(Matrix::new(n, n, buf)?)
    }

    /// Reads and parses a whole input stream.
    pub fn read<R: Read>(
        mut reader: R,
        sentinel: Weight,
    ) -> Result<Self, Error> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Graph::parse(&text, sentinel)
    }

    /// A random graph: every off-diagonal edge exists with probability
    /// `density` and costs `1..=max_weight`, capped at [`weight_limit`].
    pub fn random<G: Rng>(
        rng: &mut G,
        n: usize,
        density: f64,
        max_weight: Weight,
    ) -> Result<Self, Error> {
        let density = density.clamp(0.0, 1.0);
        let max_weight = max_weight.clamp(1, weight_limit(n));
        let mut buf = matrix::reserve(n, n)?;
        for i in 0..n {
            for j in 0..n {
                let weight = if i == j {
                    0
                } else if rng.gen_bool(density) {
                    rng.gen_range(1..=max_weight)
                } else {
                    INFINITY
                };
                buf.push(weight);
            }
        }
        Graph::new(Matrix::new(n, n, buf)?)
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.matrix.rows()
    }

    pub fn weight(&self, from: usize, to: usize) -> Option<Weight> {
        self.matrix.get(from, to)
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Every finite edge `(from, to, weight)`, self loops excluded.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, Weight)> + '_ {
        let n = self.order();
        (0..n).flat_map(move |from| {
            self.matrix
                .row(from)
                .into_iter()
                .flat_map(|row| row.iter().copied().enumerate())
                .filter(move |&(to, w)| to != from && w != INFINITY)
                .map(move |(to, w)| (from, to, w))
        })
    }
}

/// Writes the graph back in the input format, with `inf` for absent edges.
impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.order())?;
        for i in 0..self.order() {
            let row = self.matrix.row(i).ok_or(fmt::Error)?;
            for (j, &w) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                if w == INFINITY {
                    write!(f, "inf")?;
                } else {
                    write!(f, "{w}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
