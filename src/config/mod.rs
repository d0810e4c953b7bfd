//! Sweep settings and cache-level footprint sizing
//!
//! Settings live in an optional JSON file; command-line flags override it.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BenchError;
use crate::harness::{HarnessConfig, DEFAULT_MIN_INVOCATIONS};
use crate::memory::CACHE_LINE_BYTES;

// ============================================================================
// CACHE LEVELS
// ============================================================================

const KIB: usize = 1024;
const MIB: usize = 1024 * 1024;

/// Three f32 arrays of 4 bytes each
const BYTES_PER_ELEMENT_TRIPLE: usize = 4 * 3;

/// Cache capacities in bytes, plus a DRAM reference size beyond the last level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheLevels {
    #[serde(rename = "L1Bytes", deserialize_with = "validate_positive_usize")]
    pub l1: usize,
    #[serde(rename = "L2Bytes", deserialize_with = "validate_positive_usize")]
    pub l2: usize,
    #[serde(rename = "LlcBytes", deserialize_with = "validate_positive_usize")]
    pub llc: usize,
    #[serde(rename = "DramBytes", deserialize_with = "validate_positive_usize")]
    pub dram: usize,
}

impl Default for CacheLevels {
    fn default() -> Self {
        Self {
            l1: 384 * KIB,
            l2: 10 * MIB,
            llc: 18 * MIB,
            dram: 32 * MIB,
        }
    }
}

impl CacheLevels {
    /// Builds levels from detected capacities; the DRAM reference is at least
    /// twice the last-level cache.
    pub fn from_detected(l1: usize, l2: usize, llc: usize) -> Self {
        Self {
            l1,
            l2,
            llc,
            dram: llc.saturating_mul(2).max(Self::default().dram),
        }
    }

    /// Element counts whose three-array footprint lands in each level, plus
    /// points 20% either side of every cache boundary and 2x/4x past DRAM.
    pub fn footprint_sizes(&self) -> Vec<usize> {
        let base = |bytes: usize| bytes / BYTES_PER_ELEMENT_TRIPLE;
        let scale = |n: usize, f: f64| (n as f64 * f) as usize;

        let mut sizes = vec![base(self.l1), base(self.l2), base(self.llc), base(self.dram)];
        for level in [self.l1, self.l2, self.llc] {
            sizes.push(scale(base(level), 0.8));
            sizes.push(scale(base(level), 1.2));
        }
        let biggest = base(self.dram);
        sizes.push(biggest.saturating_mul(2));
        sizes.push(biggest.saturating_mul(4));

        sizes.retain(|&n| n > 0);
        sizes.sort_unstable();
        sizes.dedup();
        sizes
    }
}

// ============================================================================
// SWEEP SETTINGS
// ============================================================================

pub const DEFAULT_SWEEP_TRIALS: u32 = 5;
pub const DEFAULT_ALIGNMENT_TRIALS: u32 = 3;
pub const DEFAULT_ALIGNMENT_SIZES: [usize; 7] = [512, 1024, 1500, 2000, 4096, 6000, 8192];

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SweepSettings {
    /// Program default applies when absent
    #[serde(deserialize_with = "validate_optional_positive_u32")]
    pub trials: Option<u32>,
    #[serde(deserialize_with = "validate_positive_u32")]
    pub min_invocations: u32,
    #[serde(deserialize_with = "validate_positive_f64")]
    pub min_duration_ms: f64,
    /// Detected from CPUID when absent
    pub cache_sizes: Option<CacheLevels>,
    pub alignment_sizes: Vec<usize>,
    #[serde(deserialize_with = "validate_positive_usize")]
    pub buffer_alignment: usize,
    pub pin_core: Option<usize>,
    pub high_priority: bool,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            trials: None,
            min_invocations: DEFAULT_MIN_INVOCATIONS,
            min_duration_ms: 1000.0,
            cache_sizes: None,
            alignment_sizes: DEFAULT_ALIGNMENT_SIZES.to_vec(),
            buffer_alignment: CACHE_LINE_BYTES,
            pin_core: Some(0),
            high_priority: true,
        }
    }
}

impl SweepSettings {
    /// Reads settings from `path`, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, BenchError> {
        let settings = match path {
            Some(path) => {
                let content = fs::read_to_string(path)?;
                serde_json::from_str::<SweepSettings>(&content)?
            }
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), BenchError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if !self.buffer_alignment.is_power_of_two() {
            return Err(BenchError::InvalidSettings(format!(
                "buffer alignment {} is not a power of two",
                self.buffer_alignment
            )));
        }
        if !(self.min_duration_ms.is_finite() && self.min_duration_ms > 0.0) {
            return Err(BenchError::InvalidSettings(format!(
                "minimum duration {} ms must be positive",
                self.min_duration_ms
            )));
        }
        if Duration::try_from_secs_f64(self.min_duration_ms / 1000.0).is_err() {
            return Err(BenchError::InvalidSettings(format!(
                "minimum duration {} ms is too large",
                self.min_duration_ms
            )));
        }
        if self.min_invocations == 0 {
            return Err(BenchError::InvalidSettings("minimum invocations must be positive".into()));
        }
        if self.trials == Some(0) {
            return Err(BenchError::InvalidSettings("trial count must be positive".into()));
        }
        if self.alignment_sizes.contains(&0) {
            return Err(BenchError::InvalidSettings("alignment sizes must be positive".into()));
        }
        Ok(())
    }

    pub fn trials_or(&self, default: u32) -> u32 {
        self.trials.unwrap_or(default)
    }

    /// Saturates at `Duration::MAX` for values `validate` would reject.
    pub fn min_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.min_duration_ms / 1000.0).unwrap_or(Duration::MAX)
    }

    pub fn harness_config(&self) -> HarnessConfig {
        HarnessConfig::new(self.min_invocations, self.min_duration())
    }
}

// ============================================================================
// VALIDATING DESERIALIZERS
// ============================================================================

fn validate_positive_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(serde::de::Error::custom("Value must be positive"))
    }
}

fn validate_positive_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = u32::deserialize(deserializer)?;
    if value > 0 {
        Ok(value)
    } else {
        Err(serde::de::Error::custom("Value must be positive"))
    }
}

fn validate_optional_positive_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<u32>::deserialize(deserializer)? {
        Some(0) => Err(serde::de::Error::custom("Value must be positive")),
        other => Ok(other),
    }
}

fn validate_positive_usize<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = usize::deserialize(deserializer)?;
    if value > 0 {
        Ok(value)
    } else {
        Err(serde::de::Error::custom("Value must be positive"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_footprints_match_reference_machine() {
        let sizes = CacheLevels::default().footprint_sizes();
        let l1 = 384 * KIB / 12;
        assert_eq!(sizes[0], (l1 as f64 * 0.8) as usize);
        assert!(sizes.contains(&l1));
        assert!(sizes.contains(&(32 * MIB / 12 * 4)));
        assert_eq!(sizes.len(), 12);
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn detected_levels_keep_dram_past_llc() {
        let levels = CacheLevels::from_detected(48 * KIB, 2 * MIB, 64 * MIB);
        assert_eq!(levels.dram, 128 * MIB);
        let small = CacheLevels::from_detected(32 * KIB, 256 * KIB, 4 * MIB);
        assert_eq!(small.dram, 32 * MIB);
    }

    #[test]
    fn partial_settings_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "Trials": 2, "MinDurationMs": 5.0 }}"#).unwrap();

        let settings = SweepSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.trials, Some(2));
        assert_eq!(settings.min_duration(), Duration::from_millis(5));
        assert_eq!(settings.min_invocations, DEFAULT_MIN_INVOCATIONS);
        assert_eq!(settings.buffer_alignment, CACHE_LINE_BYTES);
    }

    #[test]
    fn cache_sizes_are_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "CacheSizes": {{ "L1Bytes": 1200, "L2Bytes": 2400, "LlcBytes": 4800, "DramBytes": 9600 }} }}"#
        )
        .unwrap();

        let settings = SweepSettings::load(Some(file.path())).unwrap();
        let levels = settings.cache_sizes.unwrap();
        assert_eq!(levels.footprint_sizes()[0], 80);
    }

    #[test]
    fn non_positive_values_are_rejected() {
        for body in [r#"{ "MinDurationMs": 0 }"#, r#"{ "MinInvocations": 0 }"#, r#"{ "Trials": 0 }"#] {
            assert!(serde_json::from_str::<SweepSettings>(body).is_err(), "{body}");
        }
    }

    #[test]
    fn odd_alignment_fails_validation() {
        let settings = SweepSettings {
            buffer_alignment: 48,
            ..SweepSettings::default()
        };
        assert!(matches!(settings.validate(), Err(BenchError::InvalidSettings(_))));
    }

    #[test]
    fn unrepresentable_duration_fails_validation() {
        let settings = SweepSettings {
            min_duration_ms: 1e300,
            ..SweepSettings::default()
        };
        assert!(matches!(settings.validate(), Err(BenchError::InvalidSettings(_))));
        assert_eq!(settings.min_duration(), Duration::MAX);
    }

    #[test]
    fn huge_duration_in_file_is_rejected_on_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "MinDurationMs": 1e300 }}"#).unwrap();
        let err = SweepSettings::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, BenchError::InvalidSettings(_)));
    }

    #[test]
    fn huge_dram_reference_does_not_overflow() {
        let levels = CacheLevels {
            dram: usize::MAX,
            ..CacheLevels::default()
        };
        let sizes = levels.footprint_sizes();
        assert_eq!(sizes.last(), Some(&(usize::MAX / 12 * 4)));
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn settings_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("benchsettings.json");
        let settings = SweepSettings {
            trials: Some(4),
            pin_core: None,
            ..SweepSettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(SweepSettings::load(Some(&path)).unwrap(), settings);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SweepSettings::load(Some(Path::new("/nonexistent/benchsettings.json"))).unwrap_err();
        assert!(matches!(err, BenchError::Io(_)));
    }
}
