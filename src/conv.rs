//! Valid 2D convolution (cross-correlation) against a square kernel
//!
//! Output cell `(i, j)` is
//!
//! ```text
//! sum over ki in 0..K, kj in 0..K of input(i + ki, j + kj) * kernel(ki, kj)
//! ```
//!
//! The kernel is not flipped and no padding is applied, so an `H x W` input
//! and a `K x K` kernel give an `(H - K + 1) x (W - K + 1)` output.
//!
//! Summation order is fixed (ki ascending, then kj ascending, one `f64`
//! accumulator per cell). Each output cell is therefore bit-identical no
//! matter which worker or which row band computes it.
//!
//! # Example
//!
//! ```
//! use conv2d_bench::{conv::convolve2d_valid, Matrix};
//!
//! let input = Matrix::from_vec(3, 3, vec![
//!     1.0, 2.0, 3.0,
//!     4.0, 5.0, 6.0,
//!     7.0, 8.0, 9.0,
//! ]).unwrap();
//! let kernel = Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, 1.0]).unwrap();
//!
//! let out = convolve2d_valid(&input, &kernel).unwrap();
//! assert_eq!(out.as_slice(), &[6.0, 8.0, 12.0, 14.0]);
//! ```

use crate::error::{ConvError, Result};
use crate::matrix::{Matrix, RowBandMut};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Output shape of a valid convolution, or the reason there is none
///
/// # Errors
///
/// Returns `InvalidDimensions` if `kernel` is zero or larger than either
/// input dimension (including a zero-sized input), or if the input has
/// more than `usize::MAX` cells.
///
/// # Example
///
/// ```
/// use conv2d_bench::conv::output_shape;
///
/// assert_eq!(output_shape(3, 5, 2).unwrap(), (2, 4));
/// assert!(output_shape(3, 3, 5).is_err());
/// ```
pub fn output_shape(height: usize, width: usize, kernel: usize) -> Result<(usize, usize)> {
    if kernel == 0
        || kernel > height
        || kernel > width
        || height.checked_mul(width).is_none()
    {
        return Err(ConvError::InvalidDimensions {
            height,
            width,
            kernel,
        });
    }
    Ok((height - kernel + 1, width - kernel + 1))
}

/// Checks a kernel is square and fits the input; returns the output shape
pub(crate) fn validate_operands(input: &Matrix, kernel: &Matrix) -> Result<(usize, usize)> {
    if kernel.rows() != kernel.cols() {
        return Err(ConvError::NonSquareKernel {
            rows: kernel.rows(),
            cols: kernel.cols(),
        });
    }
    output_shape(input.rows(), input.cols(), kernel.rows())
}

/// Computes the output rows covered by `band`
///
/// This is the one arithmetic routine shared by the sequential path and by
/// every parallel worker. It performs no validation: `kernel` must be
/// square, and `band` must come from a matrix shaped
/// `(H - K + 1) x (W - K + 1)` for the given `input`. Callers reach it
/// through [`convolve2d_valid`] or the parallel driver, which check this.
pub fn convolve_rows(input: &Matrix, kernel: &Matrix, band: &mut RowBandMut<'_>) {
    let k = kernel.rows();

    for i in band.range().iter() {
        for (j, cell) in band.row_mut(i).iter_mut().enumerate() {
            let mut acc = 0.0;
            for ki in 0..k {
                let in_row = &input.row(i + ki)[j..j + k];
                let k_row = kernel.row(ki);
                for (x, w) in in_row.iter().zip(k_row) {
                    acc += x * w;
                }
            }
            *cell = acc;
        }
    }
}

/// Sequential valid convolution of `input` with a square `kernel`
///
/// # Errors
///
/// - `NonSquareKernel` if the kernel is not `K x K`
/// - `InvalidDimensions` if `K` is zero or exceeds either input dimension
#[cfg_attr(feature = "tracing", instrument(skip(input, kernel), fields(dims = %format!("{}x{} * {}x{}", input.rows(), input.cols(), kernel.rows(), kernel.cols()))))]
pub fn convolve2d_valid(input: &Matrix, kernel: &Matrix) -> Result<Matrix> {
    let (out_rows, out_cols) = validate_operands(input, kernel)?;
    let mut output = Matrix::zeros(out_rows, out_cols);
    convolve_rows(input, kernel, &mut output.as_band_mut());
    Ok(output)
}

/// Sequential valid convolution into a caller-provided output
///
/// # Errors
///
/// Same as [`convolve2d_valid`], plus `SizeMismatch` if `output` is not
/// exactly `(H - K + 1) x (W - K + 1)`.
pub fn convolve2d_valid_into(input: &Matrix, kernel: &Matrix, output: &mut Matrix) -> Result<()> {
    let (out_rows, out_cols) = validate_operands(input, kernel)?;
    check_output_shape(output, out_rows, out_cols)?;
    convolve_rows(input, kernel, &mut output.as_band_mut());
    Ok(())
}

pub(crate) fn check_output_shape(output: &Matrix, rows: usize, cols: usize) -> Result<()> {
    if output.shape() != (rows, cols) {
        return Err(ConvError::SizeMismatch {
            expected: rows * cols,
            actual: output.rows() * output.cols(),
        });
    }
    Ok(())
}

impl Matrix {
    /// Valid convolution of `self` with a square `kernel`
    ///
    /// Shorthand for [`convolve2d_valid`].
    pub fn convolve2d(&self, kernel: &Matrix) -> Result<Matrix> {
        convolve2d_valid(self, kernel)
    }
}
