//! Kernel sweep across cache-level footprints
//!
//! For each problem size, seven aligned arrays are allocated and pre-touched,
//! then every trial measures SAXPY, stencil and elementwise multiply through
//! the harness and writes one CSV row per kernel.

use std::path::Path;

use crate::config::{CacheLevels, SweepSettings, DEFAULT_SWEEP_TRIALS};
use crate::error::BenchError;
use crate::harness::Harness;
use crate::kernels::{elementwise_mult, saxpy, stencil, KernelKind, Sink};
use crate::memory::{AlignedBuffer, AllocError};
use crate::output::{CsvReport, SweepRecord, SWEEP_CASE_COLUMN};
use crate::stats::metrics;
use crate::system::{detect_cache_levels, HostInfo};

use super::progress_bar;

pub const DEFAULT_SWEEP_OUTPUT: &str = "benchmark_results.csv";
pub const VECTORIZED_CASE: &str = "Vectorized";

const SAXPY_ALPHA: f32 = 2.0;
/// Arrays allocated per size: x, y, in, out, a, b, c
const ARRAYS_PER_SIZE: usize = 7;

/// Cache levels from settings, then CPUID, then the reference defaults.
pub fn resolve_cache_levels(settings: &SweepSettings) -> CacheLevels {
    settings
        .cache_sizes
        .or_else(detect_cache_levels)
        .unwrap_or_default()
}

struct SizeBuffers {
    x: AlignedBuffer<f32>,
    y: AlignedBuffer<f32>,
    input: AlignedBuffer<f32>,
    output: AlignedBuffer<f32>,
    a: AlignedBuffer<f32>,
    b: AlignedBuffer<f32>,
    c: AlignedBuffer<f32>,
}

impl SizeBuffers {
    fn allocate(n: usize, align: usize) -> Result<Self, BenchError> {
        Ok(Self {
            x: AlignedBuffer::filled(n, align, 1.0)?,
            y: AlignedBuffer::filled(n, align, 2.0)?,
            input: AlignedBuffer::filled(n, align, 1.0)?,
            output: AlignedBuffer::filled(n, align, 0.0)?,
            a: AlignedBuffer::filled(n, align, 1.0)?,
            b: AlignedBuffer::filled(n, align, 2.0)?,
            c: AlignedBuffer::filled(n, align, 0.0)?,
        })
    }

    fn touch(&self, sink: &mut Sink) {
        sink.touch_all(&[
            &self.x[..],
            &self.y[..],
            &self.input[..],
            &self.output[..],
            &self.a[..],
            &self.b[..],
            &self.c[..],
        ]);
    }

    fn consume(&self, sink: &mut Sink) {
        for out in [&self.y, &self.output, &self.c] {
            sink.consume_sampled(out, out.len() / 1024 + 1);
        }
    }
}

/// Runs the sweep over `sizes` and writes rows to `output`.
///
/// Returns every record written, in write order, and the final sink value.
pub fn run_kernel_sweep(
    settings: &SweepSettings,
    sizes: &[usize],
    output: &Path,
) -> Result<(Vec<SweepRecord>, f64), BenchError> {
    let trials = settings.trials_or(DEFAULT_SWEEP_TRIALS);
    let harness = Harness::new(settings.harness_config());
    let host = HostInfo::collect();

    let mut report = CsvReport::create(output, SWEEP_CASE_COLUMN)?;
    let mut records = Vec::with_capacity(sizes.len() * trials as usize * KernelKind::all().len());
    let mut sink = Sink::new();

    let pb = progress_bar((sizes.len() * trials as usize) as u64, "measurements");

    for &n in sizes {
        let bytes = n
            .checked_mul(ARRAYS_PER_SIZE * metrics::F32_BYTES)
            .ok_or(AllocError::InvalidLayout {
                elements: n,
                align: settings.buffer_alignment,
            })?;
        if !host.fits_in_memory(bytes) {
            log::warn!("n = {n} needs {bytes} bytes, more than currently available");
        }
        pb.println(format!("Testing n = {} (memory: {} KB)", n, metrics::memory_kb(n)));

        let mut bufs = SizeBuffers::allocate(n, settings.buffer_alignment)?;
        bufs.touch(&mut sink);

        for trial in 1..=trials {
            pb.set_message(format!("n={n} trial {trial}/{trials}"));

            let SizeBuffers { x, y, input, output: out, a, b, c } = &mut bufs;

            let m = harness.measure(|| saxpy(SAXPY_ALPHA, &x[..], &mut y[..]));
            records.push(SweepRecord::new(KernelKind::Saxpy, n, m.median_ns, VECTORIZED_CASE, trial));

            let m = harness.measure(|| stencil(&input[..], &mut out[..]));
            records.push(SweepRecord::new(KernelKind::Stencil, n, m.median_ns, VECTORIZED_CASE, trial));

            let m = harness.measure(|| elementwise_mult(&a[..], &b[..], &mut c[..]));
            records.push(SweepRecord::new(KernelKind::Elementwise, n, m.median_ns, VECTORIZED_CASE, trial));

            for record in &records[records.len() - KernelKind::all().len()..] {
                report.write(record)?;
            }
            bufs.consume(&mut sink);
            pb.inc(1);
        }
    }
    pb.finish_with_message("sweep completed");

    let path = report.finish()?;
    log::info!("wrote {} rows to {}", records.len(), path.display());
    Ok((records, sink.value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheLevels;

    fn quick_settings() -> SweepSettings {
        SweepSettings {
            trials: Some(2),
            min_invocations: 3,
            min_duration_ms: 0.001,
            cache_sizes: Some(CacheLevels {
                l1: 1200,
                l2: 2400,
                llc: 4800,
                dram: 9600,
            }),
            pin_core: None,
            high_priority: false,
            ..SweepSettings::default()
        }
    }

    #[test]
    fn configured_cache_sizes_take_precedence() {
        let settings = quick_settings();
        assert_eq!(resolve_cache_levels(&settings), settings.cache_sizes.unwrap());
    }

    #[test]
    fn sweep_writes_one_row_per_kernel_and_trial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("benchmark_results.csv");
        let sizes = [100, 240];

        let (records, checksum) = run_kernel_sweep(&quick_settings(), &sizes, &path).unwrap();
        assert_eq!(records.len(), 2 * 2 * 3);
        assert!(checksum.is_finite());
        assert!(records.iter().all(|r| r.case == VECTORIZED_CASE && r.gflops > 0.0));

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Kernel,Size,Memory_KB,Time_ns,GFLOPs,GiB_s,Vectorization,Trial")
        );
        assert_eq!(lines.count(), records.len());
    }

    #[test]
    fn invalid_alignment_surfaces_as_alloc_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SweepSettings {
            buffer_alignment: 48,
            ..quick_settings()
        };
        let err = run_kernel_sweep(&settings, &[16], &dir.path().join("out.csv")).unwrap_err();
        assert!(err.is_alloc());
    }

    #[test]
    fn oversized_footprint_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let levels = CacheLevels {
            dram: usize::MAX,
            ..CacheLevels::default()
        };
        let biggest = *levels.footprint_sizes().last().unwrap();
        let err = run_kernel_sweep(&quick_settings(), &[biggest], &dir.path().join("out.csv")).unwrap_err();
        assert!(err.is_alloc(), "{err}");
    }
}
