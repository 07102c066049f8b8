//! conv2d-bench CLI
//!
//! Times the valid 2D convolution of a deterministic `H x W` image with a
//! deterministic `K x K` kernel.
//!
//! # Commands
//!
//! - `single H W K` - sequential convolution
//! - `multi H W K THREADS` - row-partitioned convolution on THREADS workers

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use conv2d_bench::bench::{self, BenchReport, Mode};
use conv2d_bench::{ConvConfig, Dispatch};

/// Valid 2D convolution benchmark
#[derive(Parser, Debug)]
#[command(name = "conv2d-bench")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    timing: TimingArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Single-threaded convolution
    ///
    /// Example:
    ///   conv2d-bench single 4096 4096 7
    Single {
        #[command(flatten)]
        dims: DimArgs,
    },
    /// Multi-threaded convolution, one contiguous block of output rows per thread
    ///
    /// Example:
    ///   conv2d-bench multi 4096 4096 7 8
    Multi {
        #[command(flatten)]
        dims: DimArgs,

        /// Number of worker threads
        #[arg(value_name = "THREADS")]
        threads: usize,

        /// Run bands on rayon's pool instead of dedicated threads
        #[cfg(feature = "parallel")]
        #[arg(long)]
        rayon: bool,
    },
}

#[derive(Args, Debug)]
struct DimArgs {
    /// Input height (rows)
    #[arg(value_name = "H")]
    height: usize,

    /// Input width (columns)
    #[arg(value_name = "W")]
    width: usize,

    /// Kernel side length
    #[arg(value_name = "K")]
    kernel: usize,
}

#[derive(Args, Debug)]
struct TimingArgs {
    /// Untimed runs before measuring
    #[arg(long, global = true, env = "CONV2D_WARMUP", default_value_t = 0)]
    warmup: usize,

    /// Timed runs to average over
    #[arg(short = 'n', long, global = true, env = "CONV2D_ITERATIONS", default_value_t = 1)]
    iterations: usize,

    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "CONV2D_LOG", default_value = "warn")]
    log_level: String,
}

#[derive(Serialize)]
struct JsonReport {
    mode: &'static str,
    threads: usize,
    output_rows: usize,
    output_cols: usize,
    iterations: usize,
    elapsed_ms: f64,
    avg_ms: f64,
    checksum: f64,
}

impl From<&BenchReport> for JsonReport {
    fn from(r: &BenchReport) -> Self {
        let (mode, threads) = match r.mode {
            Mode::Sequential => ("single", 1),
            Mode::Parallel { threads } => ("multi", threads),
        };
        JsonReport {
            mode,
            threads,
            output_rows: r.output_rows,
            output_cols: r.output_cols,
            iterations: r.iterations,
            elapsed_ms: r.elapsed.as_secs_f64() * 1000.0,
            avg_ms: r.avg_ms(),
            checksum: r.checksum,
        }
    }
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Map parsed arguments onto a config and mode (pure, testable)
fn plan(cli: &Cli) -> (ConvConfig, Mode) {
    let (dims, mode, dispatch) = match &cli.command {
        Commands::Single { dims } => (dims, Mode::Sequential, Dispatch::Threads),
        #[cfg(feature = "parallel")]
        Commands::Multi {
            dims,
            threads,
            rayon,
        } => {
            let dispatch = if *rayon {
                Dispatch::Rayon
            } else {
                Dispatch::Threads
            };
            (dims, Mode::Parallel { threads: *threads }, dispatch)
        }
        #[cfg(not(feature = "parallel"))]
        Commands::Multi { dims, threads } => {
            (dims, Mode::Parallel { threads: *threads }, Dispatch::Threads)
        }
    };

    let threads = match mode {
        Mode::Sequential => 1,
        Mode::Parallel { threads } => threads,
    };

    let config = ConvConfig::new(dims.height, dims.width, dims.kernel)
        .with_threads(threads)
        .with_dispatch(dispatch)
        .with_warmup(cli.timing.warmup)
        .with_iterations(cli.timing.iterations);

    (config, mode)
}

/// Run the parsed command and render its report
fn run(cli: &Cli) -> Result<String> {
    let (config, mode) = plan(cli);
    info!(?config, ?mode, "starting run");

    let report = bench::run(&config, mode).with_context(|| {
        format!(
            "cannot convolve {}x{} input with {}x{} kernel",
            config.height, config.width, config.kernel_size, config.kernel_size
        )
    })?;

    if cli.timing.json {
        serde_json::to_string(&JsonReport::from(&report)).context("failed to encode report")
    } else {
        Ok(report.to_string())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.timing.log_level);

    let line = run(&cli)?;
    println!("{line}");
    Ok(())
}
