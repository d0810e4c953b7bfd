//! Strided / random-order SAXPY
//!
//! Each trial resets `y`, times a single pass and folds a sample of `y` into
//! the checksum sink. Reports best and average trial time.

use std::time::Instant;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::cli::{Pattern, SaxpyArgs};
use crate::error::BenchError;
use crate::kernels::{saxpy_indexed, saxpy_strided, Sink};
use crate::memory::{AlignedBuffer, CACHE_LINE_BYTES};
use crate::output::SaxpyReport;
use crate::stats::metrics;

const SEED: u64 = 12345;
/// Lower bound per update: read x[i], read-modify-write y[i]
const BYTES_PER_UPDATE: f64 = (std::mem::size_of::<f32>() * 2) as f64;

#[derive(Debug, Clone, PartialEq)]
pub struct SaxpyParams {
    pub n: usize,
    pub stride: usize,
    pub trials: u32,
    pub alpha: f32,
    pub pattern: Pattern,
    pub warm: bool,
    pub huge: bool,
}

impl From<&SaxpyArgs> for SaxpyParams {
    fn from(args: &SaxpyArgs) -> Self {
        Self {
            n: args.n,
            stride: args.stride.max(1),
            trials: args.trials.max(1),
            alpha: args.alpha,
            pattern: args.pattern,
            warm: !args.no_warm,
            huge: args.huge,
        }
    }
}

impl SaxpyParams {
    /// Updates performed per pass: `ceil(n / stride)` sequential, `n` random.
    pub fn updates_per_pass(&self) -> usize {
        match self.pattern {
            Pattern::Seq => self.n.div_ceil(self.stride.max(1)),
            Pattern::Rand => self.n,
        }
    }
}

fn pass(params: &SaxpyParams, x: &[f32], y: &mut [f32], order: &[usize]) {
    match params.pattern {
        Pattern::Seq => {
            saxpy_strided(params.alpha, x, y, params.stride);
        }
        Pattern::Rand => saxpy_indexed(params.alpha, x, y, order),
    }
}

pub fn run_saxpy(params: &SaxpyParams) -> Result<SaxpyReport, BenchError> {
    let n = params.n;
    let mut x = AlignedBuffer::<f32>::new(n, CACHE_LINE_BYTES)?;
    let mut y = AlignedBuffer::<f32>::new(n, CACHE_LINE_BYTES)?;

    if params.huge {
        let granted = x.advise_huge_pages() & y.advise_huge_pages();
        log::info!("huge page hint {}", if granted { "accepted" } else { "refused" });
    }

    // Non-trivial values avoid constant folding and zero fast paths.
    let mut rng = StdRng::seed_from_u64(SEED);
    let dist = Uniform::new(0.9f32, 1.1f32);
    for (xi, yi) in x.iter_mut().zip(y.iter_mut()) {
        *xi = dist.sample(&mut rng);
        *yi = dist.sample(&mut rng);
    }

    let order: Vec<usize> = match params.pattern {
        Pattern::Rand => {
            let mut idx: Vec<usize> = (0..n).collect();
            idx.shuffle(&mut rng);
            idx
        }
        Pattern::Seq => Vec::new(),
    };

    if params.warm {
        pass(params, &x, &mut y, &order);
    }

    let mut sink = Sink::new();
    let mut best_ms = f64::INFINITY;
    let mut sum_ms = 0.0;
    let checksum_step = n / 1024 + 1;

    for trial in 0..params.trials {
        for yi in y.iter_mut() {
            *yi = dist.sample(&mut rng);
        }

        let t0 = Instant::now();
        pass(params, &x, &mut y, &order);
        let ms = t0.elapsed().as_secs_f64() * 1e3;

        sum_ms += ms;
        best_ms = best_ms.min(ms);
        let partial = sink.consume_sampled(&y, checksum_step);
        log::debug!("trial {}: {ms:.3} ms (partial checksum {partial:.6})", trial + 1);
    }

    let updates = params.updates_per_pass() as f64;
    let flops = 2.0 * updates;
    let bytes = BYTES_PER_UPDATE * updates;
    let avg_ms = sum_ms / f64::from(params.trials);
    // Guard against a zero reading on coarse clocks for tiny n.
    let best_ns = (best_ms * 1e6).max(1.0);
    let avg_ns = (avg_ms * 1e6).max(1.0);
    log::debug!("{flops} flops, {bytes} bytes per pass");

    Ok(SaxpyReport {
        n,
        stride: params.stride,
        trials: params.trials,
        pattern: params.pattern.to_string(),
        alpha: params.alpha,
        huge: params.huge,
        best_ms,
        avg_ms,
        checksum: sink.value(),
        gflops_best: flops / 1e9 / (best_ns / 1e9),
        gflops_avg: flops / 1e9 / (avg_ns / 1e9),
        gibps_best: metrics::gib_per_s(bytes, best_ns),
        gibps_avg: metrics::gib_per_s(bytes, avg_ns),
    })
}
