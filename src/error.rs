//! Error taxonomy shared by all benchmark programs

use std::io;

use thiserror::Error;

use crate::memory::AllocError;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("memory allocation failed: {0}")]
    Alloc(#[from] AllocError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("plot error: {0}")]
    Plot(String),
}

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_ALLOC_FAILURE: i32 = 2;

/// How a program maps errors to process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Every error exits with [`EXIT_FAILURE`].
    Uniform,
    /// Allocation failures exit with [`EXIT_ALLOC_FAILURE`].
    DistinguishAlloc,
}

impl BenchError {
    pub fn exit_code(&self, policy: ExitPolicy) -> i32 {
        match (self, policy) {
            (BenchError::Alloc(_), ExitPolicy::DistinguishAlloc) => EXIT_ALLOC_FAILURE,
            _ => EXIT_FAILURE,
        }
    }

    pub fn is_alloc(&self) -> bool {
        matches!(self, BenchError::Alloc(_))
    }
}
