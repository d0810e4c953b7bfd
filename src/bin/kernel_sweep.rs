use std::path::PathBuf;

use kernel_bench::cli::{self, KernelSweepArgs};
use kernel_bench::config::SweepSettings;
use kernel_bench::output::{print_error, print_section, summary_table};
use kernel_bench::runner::{resolve_cache_levels, run_kernel_sweep, startup, DEFAULT_SWEEP_OUTPUT};
use kernel_bench::system::ProcessSetup;
use kernel_bench::utils::{format_bytes, init_logging};
use kernel_bench::error::ExitPolicy;
use kernel_bench::BenchError;

fn run(args: &KernelSweepArgs) -> Result<(), BenchError> {
    let mut settings = SweepSettings::load(args.sweep.config.as_deref())?;
    args.sweep.apply_to(&mut settings);
    settings.validate()?;

    startup(
        "Kernel Footprint Sweep",
        ProcessSetup {
            pin_core: settings.pin_core,
            high_priority: settings.high_priority,
        },
    );

    let levels = resolve_cache_levels(&settings);
    print_section("Cache Levels");
    println!(
        "L1: {}  L2: {}  LLC: {}  DRAM ref: {}",
        format_bytes(levels.l1),
        format_bytes(levels.l2),
        format_bytes(levels.llc),
        format_bytes(levels.dram)
    );
    println!();

    let output = args
        .sweep
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SWEEP_OUTPUT));
    let (records, checksum) = run_kernel_sweep(&settings, &levels.footprint_sizes(), &output)?;

    println!();
    print_section("Median Throughput");
    println!("{}", summary_table(&records));
    println!("checksum={checksum:.6}");
    println!("Results saved to {}", output.display());
    Ok(())
}

fn main() {
    let args: KernelSweepArgs = cli::parse_or_exit();
    init_logging(args.sweep.verbose);

    if let Err(e) = run(&args) {
        print_error(&e);
        std::process::exit(e.exit_code(ExitPolicy::Uniform));
    }
}
