//! Row-major matrix buffer
//!
//! Provides the fixed-size 2D container used for convolution inputs, kernels
//! and outputs, together with [`RowBandMut`], a mutable view over a contiguous
//! block of whole rows that lets several workers write into one output
//! without sharing a raw handle.
//!
//! # Example
//!
//! ```
//! use conv2d_bench::Matrix;
//!
//! // Create a 2x3 matrix
//! let m = Matrix::zeros(2, 3);
//! assert_eq!(m.rows(), 2);
//! assert_eq!(m.cols(), 3);
//! ```

use std::ops::{Index, IndexMut};

use crate::error::{ConvError, Result};
use crate::partition::RowRange;

/// A 2D matrix of `f64` with row-major storage
///
/// Data is stored in row-major format (C-style), where consecutive elements
/// in memory belong to the same row. The convolution inner loop walks along
/// rows, so this is the cache-friendly layout for it.
///
/// # Storage Layout
///
/// For a 2x3 matrix:
/// ```text
/// [[a, b, c],
///  [d, e, f]]
/// ```
/// Data is stored as: [a, b, c, d, e, f]
///
/// # Example
///
/// ```
/// use conv2d_bench::Matrix;
///
/// let m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// assert_eq!(m.get(0, 1), Some(&2.0));
/// assert_eq!(m[(1, 0)], 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a matrix filled with zeros
    ///
    /// # Example
    ///
    /// ```
    /// use conv2d_bench::Matrix;
    ///
    /// let m = Matrix::zeros(3, 3);
    /// assert_eq!(m.get(1, 1), Some(&0.0));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`. The convolution entry
    /// points reject such shapes with `InvalidDimensions` before allocating.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        let len = rows
            .checked_mul(cols)
            .unwrap_or_else(|| panic!("matrix shape {rows}x{cols} overflows usize"));
        Matrix {
            rows,
            cols,
            data: vec![0.0; len],
        }
    }

    /// Creates a matrix from a vector of data
    ///
    /// # Arguments
    ///
    /// * `rows` - Number of rows
    /// * `cols` - Number of columns
    /// * `data` - Vector containing matrix elements in row-major order
    ///
    /// # Errors
    ///
    /// - `ShapeOverflow` if `rows * cols` does not fit in `usize`
    /// - `SizeMismatch` if `data.len() != rows * cols`
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        let expected = rows
            .checked_mul(cols)
            .ok_or(ConvError::ShapeOverflow { rows, cols })?;
        if data.len() != expected {
            return Err(ConvError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Returns the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the shape as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Gets a reference to an element at (row, col)
    ///
    /// Returns `None` if indices are out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<&f64> {
        if row >= self.rows || col >= self.cols {
            None
        } else {
            self.data.get(row * self.cols + col)
        }
    }

    /// Gets a mutable reference to an element at (row, col)
    ///
    /// Returns `None` if indices are out of bounds
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut f64> {
        if row >= self.rows || col >= self.cols {
            None
        } else {
            let idx = row * self.cols + col;
            self.data.get_mut(idx)
        }
    }

    /// Returns one row as a slice
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()`
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Returns one row as a mutable slice
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()`
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Returns a reference to the underlying data
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Borrows the whole matrix as a single row band
    pub fn as_band_mut(&mut self) -> RowBandMut<'_> {
        RowBandMut {
            first_row: 0,
            rows: self.rows,
            cols: self.cols,
            data: &mut self.data,
        }
    }

    /// Splits the matrix into disjoint mutable row bands, one per range
    ///
    /// Ranges must be ascending and non-overlapping; gaps between them are
    /// allowed and simply left unborrowed. Empty ranges yield empty bands.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRowRange` if a range is reversed, overlaps its
    /// predecessor, or ends past the last row.
    ///
    /// # Example
    ///
    /// ```
    /// use conv2d_bench::{Matrix, RowRange};
    ///
    /// let mut m = Matrix::zeros(4, 2);
    /// let ranges = [RowRange::new(0, 1), RowRange::new(1, 4)];
    /// let mut bands = m.split_row_bands(&ranges).unwrap();
    /// bands[1].row_mut(3)[0] = 7.0;
    /// drop(bands);
    /// assert_eq!(m[(3, 0)], 7.0);
    /// ```
    pub fn split_row_bands(&mut self, ranges: &[RowRange]) -> Result<Vec<RowBandMut<'_>>> {
        let cols = self.cols;
        let total_rows = self.rows;
        let mut rest: &mut [f64] = &mut self.data;
        let mut cursor = 0;
        let mut bands = Vec::with_capacity(ranges.len());

        for range in ranges {
            if range.begin < cursor || range.end < range.begin || range.end > total_rows {
                return Err(ConvError::InvalidRowRange {
                    begin: range.begin,
                    end: range.end,
                    rows: total_rows,
                });
            }

            let skip = (range.begin - cursor) * cols;
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(skip);
            let (band, tail) = tail.split_at_mut(range.len() * cols);
            rest = tail;
            cursor = range.end;

            bands.push(RowBandMut {
                first_row: range.begin,
                rows: range.len(),
                cols,
                data: band,
            });
        }

        Ok(bands)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        debug_assert!(row < self.rows && col < self.cols);
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        debug_assert!(row < self.rows && col < self.cols);
        &mut self.data[row * self.cols + col]
    }
}

/// Mutable view over rows `[first_row, first_row + rows)` of a [`Matrix`]
///
/// Rows are addressed by their absolute index in the parent matrix, so code
/// written against a band works unchanged whether it owns the whole output
/// or one worker's share of it.
#[derive(Debug)]
pub struct RowBandMut<'a> {
    first_row: usize,
    rows: usize,
    cols: usize,
    data: &'a mut [f64],
}

impl RowBandMut<'_> {
    /// First row covered by this band
    pub fn first_row(&self) -> usize {
        self.first_row
    }

    /// Number of rows in the band
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (same as the parent matrix)
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Absolute row range covered by this band
    pub fn range(&self) -> RowRange {
        RowRange::new(self.first_row, self.first_row + self.rows)
    }

    /// Returns `true` if the band covers no rows
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Mutable slice for absolute row `row`
    ///
    /// # Panics
    ///
    /// Panics if `row` lies outside this band
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        assert!(
            self.range().contains(row),
            "row {} outside band {:?}",
            row,
            self.range()
        );
        let start = (row - self.first_row) * self.cols;
        &mut self.data[start..start + self.cols]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_zeros() {
        let m = Matrix::zeros(3, 4);
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 4);
        assert_eq!(m.shape(), (3, 4));
        assert_eq!(m.as_slice().len(), 12);
        assert!(m.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_from_vec_row_major() {
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m[(0, 2)], 3.0);
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_from_vec_invalid_size() {
        let result = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0]);
        assert_eq!(
            result,
            Err(ConvError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_from_vec_shape_overflow() {
        let result = Matrix::from_vec(usize::MAX / 2 + 1, 2, Vec::new());
        assert_eq!(
            result,
            Err(ConvError::ShapeOverflow {
                rows: usize::MAX / 2 + 1,
                cols: 2
            })
        );
    }

    #[test]
    #[should_panic(expected = "overflows usize")]
    fn test_zeros_shape_overflow_panics() {
        let _ = Matrix::zeros(usize::MAX, 2);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let m = Matrix::zeros(2, 2);
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.get(0, 2), None);
    }

    #[test]
    fn test_index_mut_offset() {
        let mut m = Matrix::zeros(3, 5);
        m[(2, 1)] = 9.0;
        // (i, j) lives at i * width + j
        assert_eq!(m.as_slice()[2 * 5 + 1], 9.0);
        *m.get_mut(0, 4).unwrap() = 1.5;
        assert_eq!(m.as_slice()[4], 1.5);
    }

    #[test]
    fn test_split_row_bands_disjoint_writes() {
        let mut m = Matrix::zeros(5, 2);
        let ranges = [
            RowRange::new(0, 2),
            RowRange::new(2, 2),
            RowRange::new(2, 5),
        ];
        {
            let mut bands = m.split_row_bands(&ranges).unwrap();
            assert_eq!(bands.len(), 3);
            assert!(bands[1].is_empty());
            for (idx, band) in bands.iter_mut().enumerate() {
                for row in band.range().begin..band.range().end {
                    band.row_mut(row).fill(idx as f64 + 1.0);
                }
            }
        }
        assert_eq!(m.row(0), &[1.0, 1.0]);
        assert_eq!(m.row(1), &[1.0, 1.0]);
        assert_eq!(m.row(2), &[3.0, 3.0]);
        assert_eq!(m.row(4), &[3.0, 3.0]);
    }

    #[test]
    fn test_split_row_bands_with_gap() {
        let mut m = Matrix::zeros(4, 1);
        let ranges = [RowRange::new(1, 2), RowRange::new(3, 4)];
        {
            let mut bands = m.split_row_bands(&ranges).unwrap();
            bands[0].row_mut(1)[0] = 1.0;
            bands[1].row_mut(3)[0] = 3.0;
        }
        assert_eq!(m.as_slice(), &[0.0, 1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_split_row_bands_rejects_overlap() {
        let mut m = Matrix::zeros(4, 1);
        let ranges = [RowRange::new(0, 3), RowRange::new(2, 4)];
        assert_eq!(
            m.split_row_bands(&ranges).unwrap_err(),
            ConvError::InvalidRowRange {
                begin: 2,
                end: 4,
                rows: 4
            }
        );
    }

    #[test]
    fn test_split_row_bands_rejects_out_of_range() {
        let mut m = Matrix::zeros(4, 1);
        assert!(m.split_row_bands(&[RowRange::new(0, 5)]).is_err());
    }

    #[test]
    #[should_panic(expected = "outside band")]
    fn test_band_row_outside_panics() {
        let mut m = Matrix::zeros(4, 1);
        let mut bands = m.split_row_bands(&[RowRange::new(0, 2)]).unwrap();
        bands[0].row_mut(2);
    }

    #[test]
    fn test_as_band_mut_covers_all_rows() {
        let mut m = Matrix::zeros(3, 2);
        let band = m.as_band_mut();
        assert_eq!(band.range(), RowRange::new(0, 3));
        assert_eq!(band.cols(), 2);
    }
}
