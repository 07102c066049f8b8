//! conv2d-bench: valid 2D convolution, sequential and row-partitioned
//!
//! Computes the "valid" cross-correlation of a synthetic `H x W` image with
//! a synthetic `K x K` kernel, producing an `(H - K + 1) x (W - K + 1)`
//! output, either on one thread or on `T` OS threads that each own a
//! contiguous block of output rows.
//!
//! # Design Principles
//!
//! - **One arithmetic routine**: the sequential path and every worker run
//!   the same row-range kernel with a fixed summation order, so parallel
//!   output is bit-identical to sequential output
//! - **Disjointness by ownership**: workers receive non-overlapping
//!   mutable row bands split from the output, never a shared raw handle
//! - **Validate before allocating**: oversized kernels and zero thread
//!   counts are domain errors, not panics
//!
//! # Quick Start
//!
//! ```rust
//! use conv2d_bench::{conv::convolve2d_valid, parallel::convolve2d_valid_parallel, Matrix};
//!
//! let input = Matrix::deterministic(128, 96);
//! let kernel = Matrix::deterministic(3, 3);
//!
//! let seq = convolve2d_valid(&input, &kernel).unwrap();
//! let par = convolve2d_valid_parallel(&input, &kernel, 4).unwrap();
//!
//! assert_eq!(seq.shape(), (126, 94));
//! assert_eq!(seq, par);
//! ```

pub mod bench;
pub mod config;
pub mod conv;
pub mod error;
pub mod generator;
pub mod matrix;
pub mod parallel;
pub mod partition;

pub use config::ConvConfig;
pub use error::{ConvError, Result};
pub use matrix::{Matrix, RowBandMut};
pub use parallel::Dispatch;
pub use partition::RowRange;

/// Sequential entry point: `(height, width, kernel_size) -> output`
///
/// Fills an input and a kernel with [`generator::deterministic_value`] and
/// returns their valid convolution.
///
/// # Errors
///
/// Returns `InvalidDimensions` if the kernel does not fit the input
///
/// # Example
///
/// ```
/// let out = conv2d_bench::convolve_sequential(3, 3, 2).unwrap();
/// assert_eq!(out.shape(), (2, 2));
/// ```
pub fn convolve_sequential(height: usize, width: usize, kernel_size: usize) -> Result<Matrix> {
    conv::output_shape(height, width, kernel_size)?;
    let input = Matrix::deterministic(height, width);
    let kernel = Matrix::deterministic(kernel_size, kernel_size);
    conv::convolve2d_valid(&input, &kernel)
}

/// Parallel entry point: `(height, width, kernel_size, threads) -> output`
///
/// # Errors
///
/// - `InvalidDimensions` if the kernel does not fit the input
/// - `InvalidThreadCount` if `threads == 0`
pub fn convolve_parallel(
    height: usize,
    width: usize,
    kernel_size: usize,
    threads: usize,
) -> Result<Matrix> {
    ConvConfig::new(height, width, kernel_size)
        .with_threads(threads)
        .validate()?;
    let input = Matrix::deterministic(height, width);
    let kernel = Matrix::deterministic(kernel_size, kernel_size);
    parallel::convolve2d_valid_parallel(&input, &kernel, threads)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_points_agree() {
        let seq = convolve_sequential(30, 25, 4).unwrap();
        let par = convolve_parallel(30, 25, 4, 5).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_entry_points_validate() {
        assert!(matches!(
            convolve_sequential(3, 3, 5),
            Err(ConvError::InvalidDimensions { .. })
        ));
        assert_eq!(
            convolve_parallel(8, 8, 3, 0),
            Err(ConvError::InvalidThreadCount)
        );
    }
}
