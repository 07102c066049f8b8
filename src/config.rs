//! Run configuration
//!
//! Collects the already-parsed problem size, worker count and timing knobs
//! in one place so the CLI, benches and tests build runs the same way.
//!
//! # Examples
//!
//! ```
//! use conv2d_bench::config::ConvConfig;
//!
//! let config = ConvConfig::new(512, 384, 5)
//!     .with_threads(8)
//!     .with_warmup(2)
//!     .with_iterations(10);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.output_shape().unwrap(), (508, 380));
//! ```

use crate::conv::output_shape;
use crate::error::{ConvError, Result};
use crate::parallel::Dispatch;

/// Problem dimensions and execution settings for one benchmark run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvConfig {
    /// Input rows (H)
    pub height: usize,
    /// Input columns (W)
    pub width: usize,
    /// Kernel side length (K)
    pub kernel_size: usize,
    /// Worker count (T); ignored by sequential runs
    pub threads: usize,
    /// How parallel bands are executed
    pub dispatch: Dispatch,
    /// Untimed runs before measuring
    pub warmup: usize,
    /// Timed runs; the report averages over these
    pub iterations: usize,
}

impl Default for ConvConfig {
    fn default() -> Self {
        Self {
            height: 1024,
            width: 1024,
            kernel_size: 3,
            threads: 1,
            dispatch: Dispatch::Threads,
            warmup: 0,
            iterations: 1,
        }
    }
}

impl ConvConfig {
    /// Create a configuration for an `height x width` input and a
    /// `kernel_size x kernel_size` kernel, other settings at their defaults
    pub fn new(height: usize, width: usize, kernel_size: usize) -> Self {
        Self {
            height,
            width,
            kernel_size,
            ..Self::default()
        }
    }

    /// Set the worker count
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set how parallel bands are executed
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Set the number of untimed warmup runs
    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    /// Set the number of timed runs
    ///
    /// Zero is raised to one; a report always covers at least one run.
    ///
    /// ```
    /// use conv2d_bench::config::ConvConfig;
    ///
    /// assert_eq!(ConvConfig::default().with_iterations(0).iterations, 1);
    /// ```
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// Output shape `(H - K + 1, W - K + 1)`
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if the kernel does not fit the input
    pub fn output_shape(&self) -> Result<(usize, usize)> {
        output_shape(self.height, self.width, self.kernel_size)
    }

    /// Check dimensions and thread count before anything is allocated
    ///
    /// # Errors
    ///
    /// - `InvalidDimensions` if the kernel does not fit the input
    /// - `InvalidThreadCount` if `threads == 0`
    pub fn validate(&self) -> Result<()> {
        self.output_shape()?;
        if self.threads == 0 {
            return Err(ConvError::InvalidThreadCount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConvConfig::default();
        assert_eq!(config.threads, 1);
        assert_eq!(config.iterations, 1);
        assert_eq!(config.warmup, 0);
        assert_eq!(config.dispatch, Dispatch::Threads);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = ConvConfig::new(10, 20, 3)
            .with_threads(4)
            .with_warmup(1)
            .with_iterations(5);
        assert_eq!(config.height, 10);
        assert_eq!(config.width, 20);
        assert_eq!(config.kernel_size, 3);
        assert_eq!(config.threads, 4);
        assert_eq!(config.warmup, 1);
        assert_eq!(config.iterations, 5);
    }

    #[test]
    fn test_output_shape() {
        assert_eq!(ConvConfig::new(3, 3, 2).output_shape().unwrap(), (2, 2));
        assert_eq!(ConvConfig::new(7, 4, 4).output_shape().unwrap(), (4, 1));
    }

    #[test]
    fn test_validate_rejects_large_kernel() {
        assert_eq!(
            ConvConfig::new(3, 3, 5).validate(),
            Err(ConvError::InvalidDimensions {
                height: 3,
                width: 3,
                kernel: 5
            })
        );
    }

    #[test]
    fn test_validate_rejects_zero_threads() {
        assert_eq!(
            ConvConfig::new(8, 8, 3).with_threads(0).validate(),
            Err(ConvError::InvalidThreadCount)
        );
    }

    #[test]
    fn test_dimension_error_reported_first() {
        // Both invalid: dimensions are checked before the thread count
        assert!(matches!(
            ConvConfig::new(2, 2, 3).with_threads(0).validate(),
            Err(ConvError::InvalidDimensions { .. })
        ));
    }
}
