//! Program orchestration
//!
//! Each benchmark program is a function here; the binaries only parse
//! arguments, perform startup and map errors to exit codes.

pub mod alignment;
pub mod saxpy;
pub mod sweep;

pub use alignment::{run_alignment, DEFAULT_ALIGNMENT_OUTPUT};
pub use saxpy::{run_saxpy, SaxpyParams};
pub use sweep::{resolve_cache_levels, run_kernel_sweep, DEFAULT_SWEEP_OUTPUT};

use indicatif::{ProgressBar, ProgressStyle};

use crate::output::print_section;
use crate::system::{HostInfo, ProcessSetup, SetupReport};

fn progress_bar(len: u64, unit: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let template = format!("{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} {{wide_msg}}");
    pb.set_style(
        ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb
}

/// Prints host details and applies the one-time process setup.
pub fn startup(title: &str, setup: ProcessSetup) -> SetupReport {
    use colored::*;

    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("{:^60}", title.bold().cyan());
    println!("{}\n", separator);

    HostInfo::collect().print();

    print_section("Process Setup");
    let report = setup.apply();
    match report.pinned_core {
        Some(core) => println!("CPU affinity:  pinned to core {core}"),
        None => println!("CPU affinity:  not pinned"),
    }
    println!(
        "Priority:      {}",
        if report.priority_raised { "raised" } else { "default" }
    );
    println!();
    report
}
