//! Deterministic synthetic data
//!
//! Every cell `(i, j)` gets a value in `[0, 1]` derived only from its
//! coordinates, so inputs are reproducible across runs and processes and
//! a given coordinate has the same value in matrices of any size.

use crate::matrix::Matrix;

const ROW_MULTIPLIER: u64 = 1_315_423_911;
const COL_MULTIPLIER: u64 = 2_654_435_761;
const MASK: u64 = 0xF_FFFF;

/// Value assigned to cell `(i, j)`
///
/// Computes `((i * 1315423911 + j * 2654435761) mod 2^64) & 0xFFFFF` and
/// scales it by `1 / 0xFFFFF`.
///
/// # Example
///
/// ```
/// use conv2d_bench::generator::deterministic_value;
///
/// assert_eq!(deterministic_value(0, 0), 0.0);
/// assert!((0.0..=1.0).contains(&deterministic_value(17, 42)));
/// ```
#[inline]
pub fn deterministic_value(i: usize, j: usize) -> f64 {
    let mixed = (i as u64)
        .wrapping_mul(ROW_MULTIPLIER)
        .wrapping_add((j as u64).wrapping_mul(COL_MULTIPLIER));
    (mixed & MASK) as f64 / MASK as f64
}

/// Overwrites every cell of `m` with [`deterministic_value`]
pub fn fill_deterministic(m: &mut Matrix) {
    for i in 0..m.rows() {
        for (j, cell) in m.row_mut(i).iter_mut().enumerate() {
            *cell = deterministic_value(i, j);
        }
    }
}

impl Matrix {
    /// Creates a `rows x cols` matrix filled with [`deterministic_value`]
    ///
    /// # Example
    ///
    /// ```
    /// use conv2d_bench::Matrix;
    ///
    /// let a = Matrix::deterministic(4, 6);
    /// let b = Matrix::deterministic(2, 3);
    /// assert_eq!(a[(1, 2)], b[(1, 2)]);
    /// ```
    pub fn deterministic(rows: usize, cols: usize) -> Self {
        let mut m = Matrix::zeros(rows, cols);
        fill_deterministic(&mut m);
        m
    }
}
