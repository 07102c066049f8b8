//! Error types for convolution operations

use thiserror::Error;

/// Result type for convolution operations
pub type Result<T> = std::result::Result<T, ConvError>;

/// Errors that can occur while setting up or running a convolution
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvError {
    /// Kernel does not fit inside the input (or a dimension is zero)
    #[error(
        "Invalid convolution dimensions: kernel {kernel}x{kernel} larger than input {height}x{width}"
    )]
    InvalidDimensions {
        /// Input rows
        height: usize,
        /// Input columns
        width: usize,
        /// Kernel side length
        kernel: usize,
    },

    /// Zero worker threads requested
    #[error("Thread count must be positive")]
    InvalidThreadCount,

    /// Buffer length or output shape does not match what the operation needs
    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Matrix element count does not fit in `usize`
    #[error("Matrix shape {rows}x{cols} overflows usize")]
    ShapeOverflow {
        /// Requested rows
        rows: usize,
        /// Requested columns
        cols: usize,
    },

    /// Row range is reversed, overlaps a previous range, or runs past the matrix
    #[error("Invalid row range [{begin}, {end}) for matrix with {rows} rows")]
    InvalidRowRange {
        /// First row of the range
        begin: usize,
        /// One past the last row
        end: usize,
        /// Rows in the matrix being split
        rows: usize,
    },

    /// Kernel matrix is not square
    #[error("Kernel must be square, got {rows}x{cols}")]
    NonSquareKernel {
        /// Kernel rows
        rows: usize,
        /// Kernel columns
        cols: usize,
    },
}
