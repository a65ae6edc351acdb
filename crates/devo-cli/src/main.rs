//! Binary entrypoint for the `devo` command-line host.

use std::process::ExitCode;

fn main() -> ExitCode {
    devo_cli::run()
}
