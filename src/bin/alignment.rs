use std::path::PathBuf;

use kernel_bench::cli::{self, AlignmentArgs};
use kernel_bench::config::SweepSettings;
use kernel_bench::output::{print_error, print_section, summary_table};
use kernel_bench::runner::{run_alignment, startup, DEFAULT_ALIGNMENT_OUTPUT};
use kernel_bench::system::ProcessSetup;
use kernel_bench::utils::init_logging;
use kernel_bench::error::ExitPolicy;
use kernel_bench::BenchError;

fn run(args: &AlignmentArgs) -> Result<(), BenchError> {
    let mut settings = SweepSettings::load(args.sweep.config.as_deref())?;
    args.sweep.apply_to(&mut settings);
    if !args.sizes.is_empty() {
        settings.alignment_sizes = args.sizes.clone();
    }
    settings.validate()?;

    startup(
        "Alignment & Tail Effects",
        ProcessSetup {
            pin_core: settings.pin_core,
            high_priority: settings.high_priority,
        },
    );

    let output = args
        .sweep
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ALIGNMENT_OUTPUT));
    let (records, checksum) = run_alignment(&settings, &settings.alignment_sizes, &output)?;

    println!();
    print_section("Median Throughput");
    println!("{}", summary_table(&records));
    println!("checksum={checksum:.6}");
    println!("Results saved to {}", output.display());
    Ok(())
}

fn main() {
    let args: AlignmentArgs = cli::parse_or_exit();
    init_logging(args.sweep.verbose);

    if let Err(e) = run(&args) {
        print_error(&e);
        std::process::exit(e.exit_code(ExitPolicy::Uniform));
    }
}
