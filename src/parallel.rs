//! Row-partitioned parallel convolution
//!
//! The output is split with [`partition_rows`] and each range is turned into
//! an owned [`RowBandMut`] before any worker starts. Workers share the input
//! and kernel read-only and each one can only reach its own rows of the
//! output, so no locks or atomics are needed while computing. The driver
//! returns only after every worker has been joined.
//!
//! # Example
//!
//! ```
//! use conv2d_bench::{conv::convolve2d_valid, parallel::convolve2d_valid_parallel, Matrix};
//!
//! let input = Matrix::deterministic(64, 48);
//! let kernel = Matrix::deterministic(5, 5);
//!
//! let seq = convolve2d_valid(&input, &kernel).unwrap();
//! let par = convolve2d_valid_parallel(&input, &kernel, 4).unwrap();
//! assert_eq!(seq, par);
//! ```

use crate::conv::{convolve_rows, validate_operands};
use crate::error::Result;
use crate::matrix::{Matrix, RowBandMut};
use crate::partition::{partition_rows, RowRange};

#[cfg(feature = "tracing")]
use tracing::{debug, instrument};

/// How the row bands are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dispatch {
    /// One scoped OS thread per band, all joined once at the end
    #[default]
    Threads,
    /// Bands handed to rayon's global pool
    #[cfg(feature = "parallel")]
    Rayon,
}

/// Runs `f` once per row range, each call owning a disjoint band of `output`
///
/// This is a one-shot fan-out: every band is assigned up front, no work is
/// stolen or re-queued, and the call blocks until all bands are done. A
/// panic inside `f` is re-raised on the calling thread after the join.
///
/// # Errors
///
/// Returns `InvalidRowRange` if `ranges` are not ascending, disjoint and
/// within `output`.
///
/// # Example
///
/// ```
/// use conv2d_bench::parallel::{for_each_row_band, Dispatch};
/// use conv2d_bench::partition::partition_rows;
/// use conv2d_bench::Matrix;
///
/// let mut m = Matrix::zeros(6, 2);
/// let ranges = partition_rows(6, 3).unwrap();
/// for_each_row_band(&mut m, &ranges, Dispatch::Threads, |band| {
///     for row in band.range().iter() {
///         band.row_mut(row).fill(row as f64);
///     }
/// })
/// .unwrap();
/// assert_eq!(m.row(5), &[5.0, 5.0]);
/// ```
pub fn for_each_row_band<F>(
    output: &mut Matrix,
    ranges: &[RowRange],
    dispatch: Dispatch,
    f: F,
) -> Result<()>
where
    F: Fn(&mut RowBandMut<'_>) + Sync,
{
    let bands = output.split_row_bands(ranges)?;

    match dispatch {
        Dispatch::Threads => {
            let f = &f;
            std::thread::scope(|s| {
                for mut band in bands {
                    s.spawn(move || {
                        #[cfg(feature = "tracing")]
                        debug!(range = ?band.range(), "worker started");
                        f(&mut band);
                    });
                }
            });
        }
        #[cfg(feature = "parallel")]
        Dispatch::Rayon => {
            use rayon::prelude::*;

            bands.into_par_iter().for_each(|mut band| f(&mut band));
        }
    }

    Ok(())
}

/// Parallel valid convolution using `threads` OS threads
///
/// Bit-for-bit equal to [`convolve2d_valid`](crate::conv::convolve2d_valid)
/// for every `threads >= 1`.
///
/// # Errors
///
/// - `NonSquareKernel` / `InvalidDimensions` as for the sequential path
/// - `InvalidThreadCount` if `threads == 0`
pub fn convolve2d_valid_parallel(input: &Matrix, kernel: &Matrix, threads: usize) -> Result<Matrix> {
    convolve2d_valid_parallel_with(input, kernel, threads, Dispatch::Threads)
}

/// Parallel valid convolution with an explicit [`Dispatch`]
#[cfg_attr(feature = "tracing", instrument(skip(input, kernel), fields(dims = %format!("{}x{} * {}x{}", input.rows(), input.cols(), kernel.rows(), kernel.cols()))))]
pub fn convolve2d_valid_parallel_with(
    input: &Matrix,
    kernel: &Matrix,
    threads: usize,
    dispatch: Dispatch,
) -> Result<Matrix> {
    let (out_rows, out_cols) = validate_operands(input, kernel)?;
    let ranges = partition_rows(out_rows, threads)?;

    let mut output = Matrix::zeros(out_rows, out_cols);
    for_each_row_band(&mut output, &ranges, dispatch, |band| {
        convolve_rows(input, kernel, band)
    })?;

    Ok(output)
}

impl Matrix {
    /// Valid convolution of `self` with `kernel` on `threads` workers
    ///
    /// Shorthand for [`convolve2d_valid_parallel`].
    pub fn convolve2d_parallel(&self, kernel: &Matrix, threads: usize) -> Result<Matrix> {
        convolve2d_valid_parallel(self, kernel, threads)
    }
}
