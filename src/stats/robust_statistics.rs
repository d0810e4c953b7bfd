//! Robust statistics across benchmark trials
//!
//! Each trial of a kernel yields one median latency; this module summarises
//! those per-trial values for console tables and plots.

/// Summary of a set of per-trial values
#[derive(Debug, Clone, PartialEq)]
pub struct RobustStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub stdev: f64,            // sample standard deviation (n - 1)
    pub mad: f64,              // Median Absolute Deviation - robust spread
    pub min: f64,
    pub max: f64,
    pub outliers: usize,       // values beyond MAD_OUTLIER_K * MAD from the median
}

/// |x - median| > k * MAD flags an outlier (k = 3.5 is roughly 3 sigma)
pub const MAD_OUTLIER_K: f64 = 3.5;

impl RobustStatistics {
    /// Returns `None` for an empty slice or when any value is NaN.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() || samples.iter().any(|x| x.is_nan()) {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let median = Self::percentile(&sorted, 50.0);

        let mut deviations: Vec<f64> = sorted.iter().map(|&x| (x - median).abs()).collect();
        deviations.sort_by(f64::total_cmp);
        let mad = Self::percentile(&deviations, 50.0);

        let outliers = if mad > 0.0 {
            let threshold = MAD_OUTLIER_K * mad;
            sorted.iter().filter(|&&x| (x - median).abs() > threshold).count()
        } else {
            0
        };

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let stdev = if sorted.len() > 1 {
            let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        } else {
            0.0
        };

        Some(Self {
            count: sorted.len(),
            mean,
            median,
            stdev,
            mad,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            outliers,
        })
    }

    /// Nearest-rank percentile of sorted data
    fn percentile(sorted_data: &[f64], p: f64) -> f64 {
        if sorted_data.is_empty() {
            return 0.0;
        }
        let idx = (p / 100.0 * (sorted_data.len() - 1) as f64).round() as usize;
        sorted_data[idx.min(sorted_data.len() - 1)]
    }
}
