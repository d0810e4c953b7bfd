//! Statistics and derived metrics for benchmark results

pub mod metrics;
pub mod robust_statistics;
