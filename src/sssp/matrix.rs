use crate::error::Error;

/// Edge weights and path lengths.
pub type Weight = u64;

/// "No edge" / "no finite distance known". Sums saturate, so anything
/// plus infinity is still infinity.
pub const INFINITY: Weight = Weight::MAX;

/// Adds two path lengths, keeping infinity absorbing.
#[inline]
pub fn path_sum(a: Weight, b: Weight) -> Weight {
    a.saturating_add(b)
}

/// An empty buffer with room for `rows * cols` weights. Reports an
/// allocation failure instead of aborting the process.
pub(crate) fn reserve(rows: usize, cols: usize) -> Result<Vec<Weight>, Error> {
    let len = rows.checked_mul(cols).ok_or(Error::DimensionMismatch {
        rows,
        cols,
        expected: usize::MAX,
        found: 0,
    })?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|source| Error::MatrixAllocation { rows, cols, source })?;
    Ok(buf)
}

/// A dense row-major block of weights described by `(rows, cols, stride)`.
///
/// `stride` is the distance in elements between the starts of consecutive
/// rows. Owned blocks are always packed (`stride == cols`), but the
/// descriptor keeps the indexing a named operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    buf: Vec<Weight>,
    rows: usize,
    cols: usize,
    stride: usize,
}

impl Matrix {
    /// Wraps a row-major buffer holding exactly `rows * cols` weights.
    pub fn new(
        rows: usize,
        cols: usize,
        buf: Vec<Weight>,
    ) -> Result<Self, Error> {
        let expected =
            rows.checked_mul(cols).ok_or(Error::DimensionMismatch {
                rows,
                cols,
                expected: usize::MAX,
                found: buf.len(),
            })?;
        if buf.len() != expected {
            return Err(Error::DimensionMismatch {
                rows,
                cols,
                expected,
                found: buf.len(),
            });
        }
        Ok(Self {
            buf,
            rows,
            cols,
            stride: cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Bounds-checked element access.
    pub fn get(&self, row: usize, col: usize) -> Option<Weight> {
        if row < self.rows && col < self.cols {
            Some(self.buf[row * self.stride + col])
        } else {
            None
        }
    }

    /// Like [`Matrix::get`], but reports where the access fell outside.
    pub fn try_get(&self, row: usize, col: usize) -> Result<Weight, Error> {
        self.get(row, col).ok_or(Error::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// The `cols` weights of one row.
    pub fn row(&self, row: usize) -> Option<&[Weight]> {
        if row < self.rows {
            let start = row * self.stride;
            Some(&self.buf[start..start + self.cols])
        } else {
            None
        }
    }

    /// Copies columns `start..start + width` of every row into a packed
    /// `rows x width` block.
    pub fn column_block(
        &self,
        start: usize,
        width: usize,
    ) -> Result<Matrix, Error> {
        let end = start.checked_add(width).filter(|&end| end <= self.cols);
        let Some(end) = end else {
            return Err(Error::OutOfBounds {
                row: 0,
                col: start.saturating_add(width).saturating_sub(1),
                rows: self.rows,
                cols: self.cols,
            });
        };
        let mut buf = reserve(self.rows, width)?;
        for row in 0..self.rows {
            let base = row * self.stride;
            buf.extend_from_slice(&self.buf[base + start..base + end]);
        }
        Matrix::new(self.rows, width, buf)
    }
}
