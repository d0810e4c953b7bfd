/// Append-only per-invocation timings in nanoseconds, in collection order.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    samples: Vec<u64>,
    total_ns: u64,
}

impl SampleSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            total_ns: 0,
        }
    }

    pub fn push(&mut self, elapsed_ns: u64) {
        self.samples.push(elapsed_ns);
        self.total_ns = self.total_ns.saturating_add(elapsed_ns);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.samples
    }

    /// True once both the count floor and the duration floor are reached.
    pub fn satisfies(&self, min_invocations: u32, min_duration_ns: u64) -> bool {
        self.samples.len() >= min_invocations as usize && self.total_ns >= min_duration_ns
    }

    pub fn into_median(mut self) -> Option<u64> {
        median(&mut self.samples)
    }
}

/// Sorts in place and returns the element at `len / 2`.
///
/// For even counts this is the upper of the two middle values.
pub fn median(samples: &mut [u64]) -> Option<u64> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_unstable();
    Some(samples[samples.len() / 2])
}
