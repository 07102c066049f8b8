//! Timing harness
//!
//! Builds the deterministic input and kernel for a [`ConvConfig`], runs the
//! sequential or parallel convolution, and reports wall-clock time. Data
//! generation happens before the clock starts; only the convolution calls
//! are timed.

use std::fmt;
use std::time::{Duration, Instant};

use crate::config::ConvConfig;
use crate::conv::convolve2d_valid;
use crate::error::Result;
use crate::matrix::Matrix;
use crate::parallel::convolve2d_valid_parallel_with;

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// Which entry point a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Single-threaded [`convolve2d_valid`]
    Sequential,
    /// Row-partitioned driver with `threads` workers
    Parallel {
        /// Worker count
        threads: usize,
    },
}

/// Result of a timed run
#[derive(Debug, Clone, PartialEq)]
pub struct BenchReport {
    /// Entry point that was timed
    pub mode: Mode,
    /// Output rows (H - K + 1)
    pub output_rows: usize,
    /// Output columns (W - K + 1)
    pub output_cols: usize,
    /// Total time across all timed iterations
    pub elapsed: Duration,
    /// Number of timed iterations
    pub iterations: usize,
    /// Sum of the output cells from the last iteration
    pub checksum: f64,
}

impl BenchReport {
    /// Mean time per iteration, in milliseconds
    ///
    /// A report with `iterations == 0` is treated as a single run.
    pub fn avg_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0 / self.iterations.max(1) as f64
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Sequential => write!(f, "Single-thread conv took {:.3} ms", self.avg_ms()),
            Mode::Parallel { threads } => write!(
                f,
                "Multi-thread conv ({} threads) took {:.3} ms",
                threads,
                self.avg_ms()
            ),
        }
    }
}

/// Run one convolution with the chosen mode
pub fn convolve(input: &Matrix, kernel: &Matrix, mode: Mode, config: &ConvConfig) -> Result<Matrix> {
    match mode {
        Mode::Sequential => convolve2d_valid(input, kernel),
        Mode::Parallel { threads } => {
            convolve2d_valid_parallel_with(input, kernel, threads, config.dispatch)
        }
    }
}

/// Time `config.iterations` convolutions after `config.warmup` untimed ones
///
/// For [`Mode::Parallel`] the thread count comes from the mode, not from
/// `config.threads`.
///
/// # Errors
///
/// Returns the same domain errors as the convolution entry points; they are
/// raised before any matrix is allocated.
pub fn run(config: &ConvConfig, mode: Mode) -> Result<BenchReport> {
    let threads = match mode {
        Mode::Sequential => 1,
        Mode::Parallel { threads } => threads,
    };
    config.clone().with_threads(threads).validate()?;
    let (output_rows, output_cols) = config.output_shape()?;

    let input = Matrix::deterministic(config.height, config.width);
    let kernel = Matrix::deterministic(config.kernel_size, config.kernel_size);

    #[cfg(feature = "tracing")]
    debug!(
        height = config.height,
        width = config.width,
        kernel = config.kernel_size,
        ?mode,
        "inputs generated"
    );

    for _ in 0..config.warmup {
        convolve(&input, &kernel, mode, config)?;
    }

    let iterations = config.iterations.max(1);
    let mut output = None;
    let start = Instant::now();
    for _ in 0..iterations {
        output = Some(convolve(&input, &kernel, mode, config)?);
    }
    let elapsed = start.elapsed();

    let checksum = output.map_or(0.0, |m| m.as_slice().iter().sum::<f64>());

    let report = BenchReport {
        mode,
        output_rows,
        output_cols,
        elapsed,
        iterations,
        checksum,
    };

    #[cfg(feature = "tracing")]
    info!(avg_ms = report.avg_ms(), iterations, "run complete");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvError;

    #[test]
    fn test_sequential_display() {
        let report = BenchReport {
            mode: Mode::Sequential,
            output_rows: 2,
            output_cols: 2,
            elapsed: Duration::from_millis(3),
            iterations: 1,
            checksum: 0.0,
        };
        assert_eq!(report.to_string(), "Single-thread conv took 3.000 ms");
    }

    #[test]
    fn test_parallel_display_averages() {
        let report = BenchReport {
            mode: Mode::Parallel { threads: 4 },
            output_rows: 2,
            output_cols: 2,
            elapsed: Duration::from_millis(10),
            iterations: 4,
            checksum: 0.0,
        };
        assert_eq!(report.avg_ms(), 2.5);
        assert_eq!(report.to_string(), "Multi-thread conv (4 threads) took 2.500 ms");
    }

    #[test]
    fn test_display_rounds_to_microseconds() {
        let report = BenchReport {
            mode: Mode::Sequential,
            output_rows: 1,
            output_cols: 1,
            elapsed: Duration::from_nanos(1_234_567),
            iterations: 1,
            checksum: 0.0,
        };
        assert_eq!(report.to_string(), "Single-thread conv took 1.235 ms");
    }

    #[test]
    fn test_avg_ms_with_zero_iterations() {
        let report = BenchReport {
            mode: Mode::Sequential,
            output_rows: 1,
            output_cols: 1,
            elapsed: Duration::from_millis(6),
            iterations: 0,
            checksum: 0.0,
        };
        assert!(report.avg_ms().is_finite());
        assert_eq!(report.avg_ms(), 6.0);
    }

    #[test]
    fn test_run_reports_output_shape() {
        let config = ConvConfig::new(16, 12, 3).with_iterations(2);
        let report = run(&config, Mode::Sequential).unwrap();
        assert_eq!((report.output_rows, report.output_cols), (14, 10));
        assert_eq!(report.iterations, 2);
    }

    #[test]
    fn test_sequential_and_parallel_checksums_match() {
        let config = ConvConfig::new(40, 30, 5).with_warmup(1);
        let seq = run(&config, Mode::Sequential).unwrap();
        let par = run(&config, Mode::Parallel { threads: 3 }).unwrap();
        assert_eq!(seq.checksum.to_bits(), par.checksum.to_bits());
    }

    #[test]
    fn test_run_rejects_invalid_dimensions() {
        let config = ConvConfig::new(3, 3, 5);
        assert!(matches!(
            run(&config, Mode::Sequential),
            Err(ConvError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_run_rejects_zero_threads() {
        let config = ConvConfig::new(8, 8, 3);
        assert_eq!(
            run(&config, Mode::Parallel { threads: 0 }),
            Err(ConvError::InvalidThreadCount)
        );
    }
}
