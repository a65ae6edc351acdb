//! Runtime of the `devo` command-line host.
//!
//! Every invocation starts as a supervising parent that re-runs the same
//! executable as a monitored child (see [`supervisor`]). The child builds an
//! [`AppContext`] once, including the discovered plugin registry, and runs
//! the requested command. Its user-facing output travels back to the parent
//! as a tagged stream that the [`multiplex`] module splits onto the real
//! stdout and stderr.

use std::io::{self, Write};
use std::process::ExitCode;

use devo_config::LogSettings;
use devo_plugins::{BuiltinCatalog, SearchContext};
use tracing::{error, info};

pub mod app;
pub mod multiplex;
mod runtime_utils;
pub mod supervisor;
pub mod telemetry;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use app::{AppContext, AppError};
pub use multiplex::{MultiplexError, Outputs, StreamMultiplexer};
pub use supervisor::{ChildCommand, Role, SetupError, SuperviseError, SupervisionState};
pub use ui::TaggedUi;

use runtime_utils::exit_code_from_status;
use supervisor::{CrashReporter, crash_boundary};

const RUN_TARGET: &str = "devo_cli::run";

/// Runs devo in whichever supervision role this process has.
#[must_use]
pub fn run() -> ExitCode {
    match Role::detect() {
        Role::Parent => run_parent(),
        Role::Child => crash_boundary(run_child),
    }
}

fn run_parent() -> ExitCode {
    let (state, command) = match prepare_parent() {
        Ok(prepared) => prepared,
        Err(error) => {
            let _ = writeln!(io::stderr(), "{error}");
            return ExitCode::FAILURE;
        }
    };

    supervisor::ignore_interrupts();
    let mut reporter = CrashReporter::process();
    match state.supervise(&command, Outputs::process(), &mut reporter) {
        Ok(status) => exit_code_from_status(status),
        Err(failure) => {
            error!(target: RUN_TARGET, error = %failure, "supervision failed");
            let _ = writeln!(io::stderr(), "{failure}");
            ExitCode::FAILURE
        }
    }
}

fn prepare_parent() -> Result<(SupervisionState, ChildCommand), SetupError> {
    let settings = LogSettings::from_env().map_err(|source| SetupError::LogSettings { source })?;
    let temp_root = devo_config::temp_root().map_err(|source| SetupError::TempRoot { source })?;
    let state = SupervisionState::prepare(&settings, &temp_root)?;

    let log = state.log();
    telemetry::initialise(&settings, move || log.clone())
        .map_err(|source| SetupError::Telemetry { source })?;
    info!(
        target: RUN_TARGET,
        run_id = state.run_id(),
        diagnostic = %state.diagnostic_path().display(),
        "supervising devo"
    );

    let command = ChildCommand::current()?;
    Ok((state, command))
}

fn run_child() -> ExitCode {
    let mut ui = TaggedUi::new(io::stdout());
    let started = LogSettings::from_env()
        .map_err(|error| error.to_string())
        .and_then(|settings| {
            telemetry::initialise(&settings, io::stderr).map_err(|error| error.to_string())
        });
    if let Err(message) = started {
        let _ = ui.error(&message);
        return ExitCode::FAILURE;
    }

    info!(target: RUN_TARGET, version = app::VERSION, "devo starting");
    info!(
        target: RUN_TARGET,
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "devo target"
    );

    let context = match AppContext::bootstrap(BuiltinCatalog::standard(), &SearchContext::from_env())
    {
        Ok(context) => context,
        Err(failure) => {
            error!(target: RUN_TARGET, error = %failure, "startup failed");
            let _ = ui.error(&failure.to_string());
            return ExitCode::FAILURE;
        }
    };
    info!(
        target: RUN_TARGET,
        run_id = context.run_id().unwrap_or("unknown"),
        plugins = context.plugins().len(),
        "devo ready"
    );

    app::run(std::env::args_os(), &context, &mut ui)
}
