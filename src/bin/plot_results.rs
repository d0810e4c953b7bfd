use kernel_bench::cli::{self, PlotArgs};
use kernel_bench::output::print_error;
use kernel_bench::plot::{load_rows, render, summarize};
use kernel_bench::utils::init_logging;
use kernel_bench::error::ExitPolicy;
use kernel_bench::BenchError;

fn run(args: &PlotArgs) -> Result<(), BenchError> {
    let rows = load_rows(&args.input)?;
    log::debug!("loaded {} rows from {}", rows.len(), args.input.display());

    let series = summarize(&rows, args.metric, args.cpu_freq, args.kernel.as_deref());
    render(&series, args.metric, &args.output)?;
    println!("Chart saved to {}", args.output.display());
    Ok(())
}

fn main() {
    let args: PlotArgs = cli::parse_or_exit();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        print_error(&e);
        std::process::exit(e.exit_code(ExitPolicy::Uniform));
    }
}
