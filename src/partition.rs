//! Row-range partitioning of the output across workers
//!
//! The output's row index space `[0, Ho)` is cut into one contiguous,
//! half-open range per worker. The first `T - 1` workers each take
//! `Ho / T` rows and the last worker takes whatever is left, so the
//! remainder of the integer division always lands on the last range.
//!
//! # Example
//!
//! ```
//! use conv2d_bench::partition::{partition_rows, RowRange};
//!
//! let ranges = partition_rows(10, 3).unwrap();
//! assert_eq!(
//!     ranges,
//!     vec![RowRange::new(0, 3), RowRange::new(3, 6), RowRange::new(6, 10)]
//! );
//! ```

use crate::error::{ConvError, Result};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Half-open interval `[begin, end)` of output row indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRange {
    /// First row (inclusive)
    pub begin: usize,
    /// One past the last row
    pub end: usize,
}

impl RowRange {
    /// Creates a new range; `begin` must not exceed `end`
    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end, "reversed row range [{begin}, {end})");
        RowRange { begin, end }
    }

    /// Number of rows in the range
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// Returns `true` for a no-op range (`begin == end`)
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Returns `true` if `row` falls inside the range
    pub fn contains(&self, row: usize) -> bool {
        self.begin <= row && row < self.end
    }

    /// Iterates over the row indices in the range
    pub fn iter(&self) -> std::ops::Range<usize> {
        self.begin..self.end
    }
}

impl From<RowRange> for std::ops::Range<usize> {
    fn from(r: RowRange) -> Self {
        r.begin..r.end
    }
}

/// Splits `[0, output_rows)` into `threads` contiguous row ranges
///
/// Each of the first `threads - 1` ranges holds `output_rows / threads`
/// rows; the last range runs to `output_rows` and absorbs the remainder.
/// Exactly `threads` ranges are returned, in ascending order, pairwise
/// disjoint, and their union is `[0, output_rows)`.
///
/// When `threads > output_rows` the per-worker share rounds down to zero:
/// every range but the last is empty and the last range holds all rows.
/// That is a load imbalance, not an error.
///
/// # Errors
///
/// Returns `InvalidThreadCount` if `threads == 0`
pub fn partition_rows(output_rows: usize, threads: usize) -> Result<Vec<RowRange>> {
    if threads == 0 {
        return Err(ConvError::InvalidThreadCount);
    }

    let rows_per = output_rows / threads;

    #[cfg(feature = "tracing")]
    {
        if threads > output_rows {
            warn!(
                threads,
                output_rows, "more workers than output rows; last worker takes every row"
            );
        }
        debug!(threads, output_rows, rows_per, "partitioning output rows");
    }

    let mut ranges = Vec::with_capacity(threads);
    let mut start = 0;
    for t in 0..threads {
        let end = if t == threads - 1 {
            output_rows
        } else {
            start + rows_per
        };
        ranges.push(RowRange::new(start, end));
        start = end;
    }

    Ok(ranges)
}
