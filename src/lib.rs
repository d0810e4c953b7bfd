//! Memory-access micro-benchmark library
//!
//! This library provides the benchmark harness, aligned buffers, kernels and
//! reporting used by the `saxpy`, `kernel-sweep`, `alignment` and
//! `plot-results` programs.

pub mod cli;
pub mod config;
pub mod error;
pub mod harness;
pub mod kernels;
pub mod memory;
pub mod output;
pub mod plot;
pub mod runner;
pub mod stats;
pub mod system;
pub mod utils;

pub use error::BenchError;
pub use harness::{measure, Harness, HarnessConfig, Measurement};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
