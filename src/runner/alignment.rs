//! Aligned vs misaligned SAXPY over sizes with and without vector tails

use std::path::Path;

use crate::config::{SweepSettings, DEFAULT_ALIGNMENT_TRIALS};
use crate::error::BenchError;
use crate::harness::Harness;
use crate::kernels::{saxpy, KernelKind, Sink};
use crate::memory::{AlignedBuffer, AllocError};
use crate::output::{CsvReport, SweepRecord, ALIGNMENT_CASE_COLUMN};

use super::progress_bar;

pub const DEFAULT_ALIGNMENT_OUTPUT: &str = "alignment_tail_results.csv";
pub const ALIGNED_CASE: &str = "Aligned";
pub const MISALIGNED_CASE: &str = "Misaligned";

const SAXPY_ALPHA: f32 = 2.0;
/// Slack past `n` so the offset view stays in bounds
const PADDING: usize = 16;
/// Offset of the misaligned view, in elements
const MISALIGN_OFFSET: usize = 1;

pub fn run_alignment(
    settings: &SweepSettings,
    sizes: &[usize],
    output: &Path,
) -> Result<(Vec<SweepRecord>, f64), BenchError> {
    let trials = settings.trials_or(DEFAULT_ALIGNMENT_TRIALS);
    let harness = Harness::new(settings.harness_config());

    let mut report = CsvReport::create(output, ALIGNMENT_CASE_COLUMN)?;
    let mut records = Vec::with_capacity(sizes.len() * trials as usize * 2);
    let mut sink = Sink::new();

    let pb = progress_bar((sizes.len() * trials as usize) as u64, "trials");

    for &n in sizes {
        pb.println(format!("Testing n={n}"));

        let padded = n.checked_add(PADDING).ok_or(AllocError::InvalidLayout {
            elements: n,
            align: settings.buffer_alignment,
        })?;
        let x = AlignedBuffer::filled(padded, settings.buffer_alignment, 1.0f32)?;
        let mut y = AlignedBuffer::filled(padded, settings.buffer_alignment, 2.0f32)?;
        sink.touch_all(&[&x[..n], &y[..n]]);

        for trial in 1..=trials {
            pb.set_message(format!("n={n} trial {trial}/{trials}"));

            let m = harness.measure(|| saxpy(SAXPY_ALPHA, &x[..n], &mut y[..n]));
            let aligned = SweepRecord::new(KernelKind::Saxpy, n, m.median_ns, ALIGNED_CASE, trial);
            report.write(&aligned)?;
            records.push(aligned);

            let (lo, hi) = (MISALIGN_OFFSET, n + MISALIGN_OFFSET);
            let m = harness.measure(|| saxpy(SAXPY_ALPHA, &x[lo..hi], &mut y[lo..hi]));
            let misaligned = SweepRecord::new(KernelKind::Saxpy, n, m.median_ns, MISALIGNED_CASE, trial);
            report.write(&misaligned)?;
            records.push(misaligned);

            sink.consume_sampled(&y[..n], n / 1024 + 1);
            pb.inc(1);
        }
    }
    pb.finish_with_message("alignment sweep completed");

    let path = report.finish()?;
    log::info!("wrote {} rows to {}", records.len(), path.display());
    Ok((records, sink.value()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_settings() -> SweepSettings {
        SweepSettings {
            trials: Some(2),
            min_invocations: 3,
            min_duration_ms: 0.001,
            pin_core: None,
            high_priority: false,
            ..SweepSettings::default()
        }
    }

    #[test]
    fn writes_aligned_and_misaligned_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alignment_tail_results.csv");

        let (records, _) = run_alignment(&quick_settings(), &[512, 1500], &path).unwrap();
        assert_eq!(records.len(), 2 * 2 * 2);
        assert_eq!(records[0].case, ALIGNED_CASE);
        assert_eq!(records[1].case, MISALIGNED_CASE);
        assert!(records.iter().all(|r| r.kernel == "SAXPY"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Kernel,Size,Memory_KB,Time_ns,GFLOPs,GiB_s,Case,Trial\n"));
        assert_eq!(text.lines().count(), 1 + records.len());
    }

    #[test]
    fn oversized_request_is_an_alloc_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alignment.csv");
        let err = run_alignment(&quick_settings(), &[usize::MAX], &path).unwrap_err();
        assert!(err.is_alloc(), "{err}");
    }

    #[test]
    fn results_feed_the_plotter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alignment.csv");
        run_alignment(&quick_settings(), &[64, 128], &path).unwrap();

        let rows = crate::plot::load_rows(&path).unwrap();
        let series = crate::plot::summarize(&rows, crate::plot::Metric::Gflops, 2.5e9, None);
        assert_eq!(series.len(), 2);
        assert!(series.iter().all(|s| s.points.len() == 2));
    }
}
