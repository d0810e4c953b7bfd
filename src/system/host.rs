use colored::*;
use sysinfo::System;

use crate::config::CacheLevels;

/// Facts about the machine printed ahead of every run
#[derive(Debug, Clone)]
pub struct HostInfo {
    pub os: String,
    pub cpu_brand: String,
    pub logical_cpus: usize,
    pub total_memory_bytes: u64,
    pub available_memory_bytes: u64,
}

impl HostInfo {
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();

        Self {
            os: os_info::get().to_string(),
            cpu_brand: cpu_brand().unwrap_or_else(|| "Unknown".to_string()),
            logical_cpus: std::thread::available_parallelism().map_or(1, |n| n.get()),
            total_memory_bytes: sys.total_memory(),
            available_memory_bytes: sys.available_memory(),
        }
    }

    /// True if `bytes` fits in currently available memory (unknown counts as fitting).
    pub fn fits_in_memory(&self, bytes: usize) -> bool {
        self.available_memory_bytes == 0 || (bytes as u64) <= self.available_memory_bytes
    }

    pub fn print(&self) {
        const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
        println!("{}", "System Information".bold().yellow());
        println!("━━━━━━━━━━━━━━━━━━━");
        println!("OS:      {}", self.os);
        println!("CPU:     {} ({} logical)", self.cpu_brand, self.logical_cpus);
        println!(
            "Memory:  {:.1} GiB total, {:.1} GiB available",
            self.total_memory_bytes as f64 / GIB,
            self.available_memory_bytes as f64 / GIB
        );
        println!();
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn cpu_brand() -> Option<String> {
    raw_cpuid::CpuId::new()
        .get_processor_brand_string()
        .map(|brand| brand.as_str().trim().to_string())
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn cpu_brand() -> Option<String> {
    None
}

/// Per-core data cache capacities from CPUID leaf 4.
///
/// Returns `None` when the leaf is unavailable (non-Intel parts or non-x86).
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn detect_cache_levels() -> Option<CacheLevels> {
    use raw_cpuid::{CacheType, CpuId};

    let mut by_level = [0usize; 4];
    for cache in CpuId::new().get_cache_parameters()? {
        if !matches!(cache.cache_type(), CacheType::Data | CacheType::Unified) {
            continue;
        }
        let level = cache.level() as usize;
        if level == 0 || level >= by_level.len() {
            continue;
        }
        let size = cache.associativity()
            * cache.physical_line_partitions()
            * cache.coherency_line_size()
            * cache.sets();
        by_level[level] = by_level[level].max(size);
    }

    let [_, l1, l2, l3] = by_level;
    if l1 == 0 || l2 == 0 {
        return None;
    }
    let llc = if l3 > 0 { l3 } else { l2 };
    log::debug!("detected caches: L1d={l1} L2={l2} LLC={llc}");
    Some(CacheLevels::from_detected(l1, l2, llc))
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
pub fn detect_cache_levels() -> Option<CacheLevels> {
    None
}
