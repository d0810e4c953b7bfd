use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BenchError;
use crate::kernels::KernelKind;
use crate::stats::metrics;

/// Case column name in kernel-sweep output
pub const SWEEP_CASE_COLUMN: &str = "Vectorization";
/// Case column name in alignment output
pub const ALIGNMENT_CASE_COLUMN: &str = "Case";

/// One (kernel, size, case, trial) measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    #[serde(rename = "Kernel")]
    pub kernel: String,
    #[serde(rename = "Size")]
    pub size: usize,
    #[serde(rename = "Memory_KB")]
    pub memory_kb: f64,
    #[serde(rename = "Time_ns")]
    pub time_ns: u64,
    #[serde(rename = "GFLOPs")]
    pub gflops: f64,
    #[serde(rename = "GiB_s")]
    pub gib_s: f64,
    #[serde(rename = "Case", alias = "Vectorization")]
    pub case: String,
    #[serde(rename = "Trial")]
    pub trial: u32,
}

impl SweepRecord {
    /// Derives the throughput columns from a median time.
    pub fn new(kernel: KernelKind, size: usize, time_ns: u64, case: &str, trial: u32) -> Self {
        let t = time_ns.max(1) as f64;
        let n = size as f64;
        Self {
            kernel: kernel.name().to_string(),
            size,
            memory_kb: metrics::memory_kb(size),
            time_ns,
            gflops: metrics::gflops(kernel.flops_per_element(), n, t),
            gib_s: metrics::gib_per_s(kernel.bytes_per_element() * n, t),
            case: case.to_string(),
            trial,
        }
    }
}

/// CSV file with a fixed header row; the case column is named per program.
pub struct CsvReport {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl CsvReport {
    pub fn create(path: &Path, case_column: &str) -> Result<Self, BenchError> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
        writer.write_record([
            "Kernel",
            "Size",
            "Memory_KB",
            "Time_ns",
            "GFLOPs",
            "GiB_s",
            case_column,
            "Trial",
        ])?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            rows: 0,
        })
    }

    /// Writes and flushes one row so a later failure leaves earlier rows intact.
    pub fn write(&mut self, record: &SweepRecord) -> Result<(), BenchError> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn finish(mut self) -> Result<PathBuf, BenchError> {
        self.writer.flush()?;
        Ok(self.path)
    }
}
