//! Derived throughput metrics
//!
//! Pure formulas turning a measured time into GFLOP/s, GiB/s and friends.
//! Times are in nanoseconds throughout.

const NS_PER_S: f64 = 1e9;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Bytes per f32 element.
pub const F32_BYTES: usize = std::mem::size_of::<f32>();

/// `(k * n) / (t_ns / 1e9) / 1e9`
pub fn gflops(flops_per_element: f64, elements: f64, time_ns: f64) -> f64 {
    (flops_per_element * elements) / (time_ns / NS_PER_S) / 1e9
}

pub fn gib_per_s(bytes: f64, time_ns: f64) -> f64 {
    (bytes / GIB) / (time_ns / NS_PER_S)
}

/// Footprint of three f32 arrays of `elements` each, in KiB.
pub fn memory_kb(elements: usize) -> f64 {
    elements as f64 * (F32_BYTES * 3) as f64 / 1024.0
}

/// Cycles per element at a nominal clock frequency.
pub fn cycles_per_element(time_ns: f64, cpu_hz: f64, elements: f64) -> f64 {
    (time_ns / NS_PER_S * cpu_hz) / elements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gflops_reference_vector() {
        assert!((gflops(2.0, 1_000_000.0, 1_000_000.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn elementwise_counts_one_flop() {
        assert!((gflops(1.0, 1_000_000.0, 1_000_000.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn one_gib_in_one_second() {
        assert!((gib_per_s(GIB, 1e9) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn memory_kb_of_three_arrays() {
        assert_eq!(memory_kb(1024), 12.0);
    }

    #[test]
    fn cpe_at_nominal_frequency() {
        // 1000 elements in 1 us at 2.5 GHz is 2500 cycles
        assert!((cycles_per_element(1_000.0, 2.5e9, 1_000.0) - 2.5).abs() < 1e-12);
    }
}
