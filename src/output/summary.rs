use std::collections::BTreeMap;
use std::fmt;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};

use crate::output::SweepRecord;
use crate::stats::robust_statistics::RobustStatistics;

/// Outcome of the strided/random SAXPY program
#[derive(Debug, Clone, PartialEq)]
pub struct SaxpyReport {
    pub n: usize,
    pub stride: usize,
    pub trials: u32,
    pub pattern: String,
    pub alpha: f32,
    pub huge: bool,
    pub best_ms: f64,
    pub avg_ms: f64,
    pub checksum: f64,
    pub gflops_best: f64,
    pub gflops_avg: f64,
    pub gibps_best: f64,
    pub gibps_avg: f64,
}

impl SaxpyReport {
    /// Fixed-format line for scripted post-processing
    pub fn csv_line(&self) -> String {
        format!(
            "CSV,n,{},stride,{},pattern,{},best_ms,{:.3},avg_ms,{:.3}",
            self.n, self.stride, self.pattern, self.best_ms, self.avg_ms
        )
    }
}

impl fmt::Display for SaxpyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# SAXPY summary")?;
        writeln!(
            f,
            "n={} stride={} trials={} pattern={} alpha={:.2} huge={}",
            self.n,
            self.stride,
            self.trials,
            self.pattern,
            self.alpha,
            u8::from(self.huge)
        )?;
        writeln!(
            f,
            "best_ms={:.3} avg_ms={:.3} checksum={:.6}",
            self.best_ms, self.avg_ms, self.checksum
        )?;
        writeln!(
            f,
            "gflops_best={:.3} gflops_avg={:.3}  gibps_best={:.3} gibps_avg={:.3}",
            self.gflops_best, self.gflops_avg, self.gibps_best, self.gibps_avg
        )?;
        write!(f, "{}", self.csv_line())
    }
}

/// Median GFLOP/s across trials for each (kernel, case, size)
pub fn summary_table(records: &[SweepRecord]) -> Table {
    let mut groups: BTreeMap<(&str, &str, usize), Vec<&SweepRecord>> = BTreeMap::new();
    for r in records {
        groups.entry((r.kernel.as_str(), r.case.as_str(), r.size)).or_default().push(r);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Kernel",
        "Case",
        "Size",
        "Memory KB",
        "Median ns",
        "Median GFLOP/s",
        "MAD",
        "Median GiB/s",
        "Trials",
    ]);

    for ((kernel, case, size), rows) in groups {
        let gflops: Vec<f64> = rows.iter().map(|r| r.gflops).collect();
        let times: Vec<f64> = rows.iter().map(|r| r.time_ns as f64).collect();
        let bandwidth: Vec<f64> = rows.iter().map(|r| r.gib_s).collect();
        let (Some(g), Some(t), Some(b)) = (
            RobustStatistics::from_samples(&gflops),
            RobustStatistics::from_samples(&times),
            RobustStatistics::from_samples(&bandwidth),
        ) else {
            continue;
        };
        table.add_row(vec![
            Cell::new(kernel),
            Cell::new(case),
            Cell::new(size),
            Cell::new(format!("{:.1}", rows[0].memory_kb)),
            Cell::new(format!("{:.0}", t.median)),
            Cell::new(format!("{:.3}", g.median)),
            Cell::new(format!("{:.3}", g.mad)),
            Cell::new(format!("{:.3}", b.median)),
            Cell::new(g.count),
        ]);
    }
    table
}

/// Bold heading with an underline rule
pub fn print_section(title: &str) {
    println!("{}", title.bold().yellow());
    println!("{}", "━".repeat(title.chars().count().max(20)));
}

pub fn print_error(err: &dyn std::error::Error) {
    eprintln!("{} {}", "❌ Error:".bold().red(), err);
}
