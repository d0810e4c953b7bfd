//! Command-line surfaces of the benchmark programs
//!
//! Exit codes: `--help` prints usage and exits 0; an unknown flag or a flag
//! missing its value prints the error with usage and exits 1.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Args, Parser, ValueEnum};

use crate::config::SweepSettings;
use crate::plot::{Metric, DEFAULT_CPU_HZ};

/// Exit code for argument errors
pub const EXIT_USAGE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pattern {
    /// Strided sequential access
    Seq,
    /// Shuffled index order, no spatial locality
    Rand,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pattern::Seq => "seq",
            Pattern::Rand => "rand",
        })
    }
}

/// SAXPY with controlled footprint, stride and access order
#[derive(Debug, Clone, Parser)]
#[command(
    name = "saxpy",
    version,
    after_help = "Examples:\n  \
        saxpy --n 8388608 --stride 1           # ~32 MiB footprint, unit-stride (prefetch-friendly)\n  \
        saxpy --n 33554432 --stride 4096       # ~128 MiB footprint, 16 KiB stride (1 per page @4KiB)\n  \
        saxpy --n 16777216 --pattern rand      # random access to stress caches"
)]
pub struct SaxpyArgs {
    /// Elements per array
    #[arg(long = "n", value_name = "ELEMENTS", default_value_t = 1 << 24)]
    pub n: usize,
    /// Distance between updated elements; 0 is treated as 1
    #[arg(long, value_name = "ELEMS", default_value_t = 1)]
    pub stride: usize,
    #[arg(long, value_name = "K", default_value_t = 3)]
    pub trials: u32,
    /// Scalar multiplier
    #[arg(long, value_name = "F", default_value_t = 1.5)]
    pub alpha: f32,
    #[arg(long, value_enum, default_value_t = Pattern::Seq)]
    pub pattern: Pattern,
    /// Skip the untimed warm-up pass
    #[arg(long = "no-warm")]
    pub no_warm: bool,
    /// Hint transparent huge pages for the arrays
    #[arg(long)]
    pub huge: bool,
    /// Pin the process to this CPU
    #[arg(long, value_name = "CPU")]
    pub pin_core: Option<usize>,
    #[arg(short, long)]
    pub verbose: bool,
}

/// Options shared by the sweep programs
#[derive(Debug, Clone, Args)]
pub struct SweepOptions {
    /// JSON settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Output CSV path
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
    #[arg(long, value_name = "K")]
    pub trials: Option<u32>,
    /// Minimum timed invocations per measurement
    #[arg(long, value_name = "N")]
    pub min_invocations: Option<u32>,
    /// Minimum cumulative timed duration per measurement
    #[arg(long, value_name = "MS")]
    pub min_duration_ms: Option<f64>,
    /// Pin the process to this CPU
    #[arg(long, value_name = "CPU", conflicts_with = "no_pin")]
    pub pin_core: Option<usize>,
    /// Do not pin the process to a CPU
    #[arg(long)]
    pub no_pin: bool,
    /// Do not request elevated scheduling priority
    #[arg(long)]
    pub no_priority: bool,
    #[arg(short, long)]
    pub verbose: bool,
}

impl SweepOptions {
    /// Applies flag overrides on top of file settings.
    pub fn apply_to(&self, settings: &mut SweepSettings) {
        if let Some(trials) = self.trials {
            settings.trials = Some(trials);
        }
        if let Some(n) = self.min_invocations {
            settings.min_invocations = n;
        }
        if let Some(ms) = self.min_duration_ms {
            settings.min_duration_ms = ms;
        }
        if self.no_pin {
            settings.pin_core = None;
        } else if self.pin_core.is_some() {
            settings.pin_core = self.pin_core;
        }
        if self.no_priority {
            settings.high_priority = false;
        }
    }
}

/// SAXPY, stencil and elementwise multiply across cache-level footprints
#[derive(Debug, Clone, Parser)]
#[command(name = "kernel-sweep", version)]
pub struct KernelSweepArgs {
    #[command(flatten)]
    pub sweep: SweepOptions,
}

/// Aligned vs misaligned SAXPY across tail sizes
#[derive(Debug, Clone, Parser)]
#[command(name = "alignment", version)]
pub struct AlignmentArgs {
    #[command(flatten)]
    pub sweep: SweepOptions,
    /// Problem sizes, overriding the settings file
    #[arg(long, value_name = "N", value_delimiter = ',')]
    pub sizes: Vec<usize>,
}

/// Error-bar chart of a results CSV
#[derive(Debug, Clone, Parser)]
#[command(name = "plot-results", version)]
pub struct PlotArgs {
    /// Results CSV written by `alignment` or `kernel-sweep`
    pub input: PathBuf,
    /// Image path; `.png` renders a bitmap, anything else SVG
    #[arg(short, long, value_name = "PATH", default_value = "results.svg")]
    pub output: PathBuf,
    #[arg(long, value_enum, default_value_t = Metric::Runtime)]
    pub metric: Metric,
    /// Nominal CPU frequency in Hz, used for CPE
    #[arg(long, value_name = "HZ", default_value_t = DEFAULT_CPU_HZ)]
    pub cpu_freq: f64,
    /// Plot only this kernel
    #[arg(long)]
    pub kernel: Option<String>,
    #[arg(short, long)]
    pub verbose: bool,
}

/// Outcome of parsing: either arguments to run with or an exit code.
#[derive(Debug)]
pub enum Parsed<T> {
    Run(T),
    Exit(i32),
}

/// Parses `args`, printing help or errors. Help/version map to 0, errors to 1.
pub fn parse_from<T, I, S>(args: I) -> Parsed<T>
where
    T: Parser,
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(parsed) => Parsed::Run(parsed),
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_USAGE,
            };
            // Help goes to stdout, errors (with usage) to stderr.
            let _ = e.print();
            Parsed::Exit(code)
        }
    }
}

/// Parses the process arguments or exits with the documented code.
pub fn parse_or_exit<T: Parser>() -> T {
    match parse_from(std::env::args_os()) {
        Parsed::Run(args) => args,
        Parsed::Exit(code) => std::process::exit(code),
    }
}
