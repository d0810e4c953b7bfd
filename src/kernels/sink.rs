use std::hint::black_box;

/// Accumulator that benchmark results are fed into so no kernel output is dead.
///
/// The running value passes through [`black_box`] on every update and is
/// printed by the programs, which keeps the computation observable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sink {
    acc: f64,
}

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consume(&mut self, value: f64) {
        self.acc = black_box(self.acc + value);
    }

    /// Sums every `step`-th element of `data`, adds it and returns the partial sum.
    pub fn consume_sampled(&mut self, data: &[f32], step: usize) -> f64 {
        let partial: f64 = data.iter().step_by(step.max(1)).map(|&v| f64::from(v)).sum();
        self.consume(partial);
        partial
    }

    /// Reads every element of every slice once, pulling them into cache.
    pub fn touch_all(&mut self, slices: &[&[f32]]) {
        let mut partial = 0.0f32;
        for slice in slices {
            for &v in slice.iter() {
                partial += v;
            }
        }
        self.consume(f64::from(partial));
    }

    pub fn value(&self) -> f64 {
        black_box(self.acc)
    }
}
