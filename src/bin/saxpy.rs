use kernel_bench::cli::{self, SaxpyArgs};
use kernel_bench::error::ExitPolicy;
use kernel_bench::output::print_error;
use kernel_bench::runner::{run_saxpy, SaxpyParams};
use kernel_bench::system::ProcessSetup;
use kernel_bench::utils::init_logging;

fn main() {
    let args: SaxpyArgs = cli::parse_or_exit();
    init_logging(args.verbose);

    ProcessSetup {
        pin_core: args.pin_core,
        high_priority: false,
    }
    .apply();

    match run_saxpy(&SaxpyParams::from(&args)) {
        Ok(report) => println!("{report}"),
        Err(e) => {
            print_error(&e);
            std::process::exit(e.exit_code(ExitPolicy::DistinguishAlloc));
        }
    }
}
