//! Numeric kernels under test
//!
//! Single-pass loops over caller-owned slices. Lengths are taken as the
//! minimum of the slices involved, so views of differing length never panic.

mod sink;

pub use sink::Sink;

/// Kernels reported by the sweep programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KernelKind {
    Saxpy,
    Stencil,
    Elementwise,
}

impl KernelKind {
    pub fn all() -> &'static [KernelKind] {
        &[KernelKind::Saxpy, KernelKind::Stencil, KernelKind::Elementwise]
    }

    /// Name written to the `Kernel` CSV column
    pub fn name(&self) -> &'static str {
        match self {
            KernelKind::Saxpy => "SAXPY",
            KernelKind::Stencil => "Stencil",
            KernelKind::Elementwise => "Elementwise",
        }
    }

    pub fn flops_per_element(&self) -> f64 {
        match self {
            KernelKind::Saxpy | KernelKind::Stencil => 2.0,
            KernelKind::Elementwise => 1.0,
        }
    }

    /// Minimum bytes moved per element (reads + writes, no write-allocate)
    pub fn bytes_per_element(&self) -> f64 {
        match self {
            KernelKind::Saxpy | KernelKind::Elementwise => 12.0,
            KernelKind::Stencil => 8.0,
        }
    }
}

/// `y[i] = a * x[i] + y[i]`
#[inline(never)]
pub fn saxpy(a: f32, x: &[f32], y: &mut [f32]) {
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi = a * xi + *yi;
    }
}

/// SAXPY touching every `stride`-th element. A stride of 0 is treated as 1.
///
/// Returns the number of updates performed, `ceil(n / stride)`.
#[inline(never)]
pub fn saxpy_strided(a: f32, x: &[f32], y: &mut [f32], stride: usize) -> usize {
    let n = x.len().min(y.len());
    let stride = stride.max(1);
    let mut updates = 0;
    for i in (0..n).step_by(stride) {
        y[i] = a * x[i] + y[i];
        updates += 1;
    }
    updates
}

/// SAXPY visiting elements in the order given by `order`.
///
/// Indices outside either slice are skipped.
#[inline(never)]
pub fn saxpy_indexed(a: f32, x: &[f32], y: &mut [f32], order: &[usize]) {
    let n = x.len().min(y.len());
    for &i in order {
        if i < n {
            y[i] = a * x[i] + y[i];
        }
    }
}

/// 3-point stencil: `output[i] = input[i-1] + input[i] + input[i+1]` for interior `i`.
///
/// Boundary elements of `output` are left untouched.
#[inline(never)]
pub fn stencil(input: &[f32], output: &mut [f32]) {
    let n = input.len().min(output.len());
    if n < 3 {
        return;
    }
    for (out, w) in output[1..n - 1].iter_mut().zip(input[..n].windows(3)) {
        *out = w[0] + w[1] + w[2];
    }
}

/// `c[i] = a[i] * b[i]`
#[inline(never)]
pub fn elementwise_mult(a: &[f32], b: &[f32], c: &mut [f32]) {
    for ((ci, &ai), &bi) in c.iter_mut().zip(a).zip(b) {
        *ci = ai * bi;
    }
}
