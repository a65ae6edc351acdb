//! Self-supervision: devo re-runs itself as a monitored child.
//!
//! The first process to start is the *parent*. It prepares a run id, the
//! log destinations and a diagnostic temp file, then launches the same
//! executable again with a role cookie set. That *child* runs the actual
//! application. The parent streams the child's tagged stdout through the
//! [`StreamMultiplexer`], tees the child's stderr (its log channel) into the
//! supervision log, watches for a crash marker, and finally exits with the
//! child's exit code.
//!
//! ```text
//!   parent                                   child
//!   ──────                                   ─────
//!   prepare ─▶ pipe ─▶ multiplexer
//!           ─▶ spawn ─────────────────────▶  run application
//!   drain stderr ◀───────────── log lines ─  tracing, crash marker
//!   stdout/stderr ◀─ multiplexer ◀─ tagged ─ TaggedUi
//!   wait ◀──────────────────────── status ─  exit
//!   join multiplexer, report crash, exit(status)
//! ```

use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::ExitStatus;

use devo_config::LogSettings;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use uuid::Uuid;

mod child;
mod crash;
mod errors;
mod log_output;

pub use child::ChildCommand;
#[cfg(test)]
pub use crash::MockCrashHandler;
pub use crash::{
    CRASH_EXIT_CODE, CRASH_MARKER, CrashHandler, CrashReport, CrashReporter, ISSUE_URL,
    crash_boundary,
};
pub use errors::{SetupError, SuperviseError};
pub use log_output::SupervisionLog;

use self::crash::CrashCapture;
use crate::multiplex::{Outputs, StreamMultiplexer};

const SUPERVISOR_TARGET: &str = "devo_cli::supervisor";

/// Prefix of the diagnostic temp file.
pub const DIAGNOSTIC_PREFIX: &str = "devo-log";

/// Which side of the supervision pair this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The supervising process; spawns the child.
    Parent,
    /// The supervised process; runs the application.
    Child,
}

impl Role {
    /// Reads the role cookie from the environment.
    #[must_use]
    pub fn detect() -> Self {
        if devo_config::env::wrapped() {
            Self::Child
        } else {
            Self::Parent
        }
    }
}

/// Resources owned by the parent for the duration of one run.
///
/// Dropping the state removes the diagnostic file.
#[derive(Debug)]
pub struct SupervisionState {
    run_id: String,
    log: SupervisionLog,
    diagnostic: NamedTempFile,
}

impl SupervisionState {
    /// Generates the run id, opens the general log destination and creates
    /// the diagnostic file under `temp_root`.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] when the log destination or the temp file
    /// cannot be created.
    pub fn prepare(settings: &LogSettings, temp_root: &Path) -> Result<Self, SetupError> {
        let general = log_output::open_destination(settings.destination())?;
        let diagnostic = tempfile::Builder::new()
            .prefix(DIAGNOSTIC_PREFIX)
            .tempfile_in(temp_root)
            .map_err(|source| SetupError::TempFile {
                root: temp_root.to_path_buf(),
                source,
            })?;
        let handle = diagnostic
            .as_file()
            .try_clone()
            .map_err(|source| SetupError::TempFile {
                root: temp_root.to_path_buf(),
                source,
            })?;

        Ok(Self {
            run_id: Uuid::new_v4().to_string(),
            log: SupervisionLog::new(handle, general),
            diagnostic,
        })
    }

    /// Identifier shared with the child.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Path of the diagnostic file.
    #[must_use]
    pub fn diagnostic_path(&self) -> &Path {
        self.diagnostic.path()
    }

    /// A writer into the supervision log.
    #[must_use]
    pub fn log(&self) -> SupervisionLog {
        self.log.clone()
    }

    /// Runs `command` as the supervised child and returns its exit code.
    ///
    /// The multiplexer is started before the child so output streams while
    /// the child runs. A child killed by signal `N` reports `128 + N`. The
    /// diagnostic file is removed when this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SuperviseError`] when the child cannot be started or waited
    /// for, when its output cannot be forwarded, or when a crash cannot be
    /// reported.
    pub fn supervise<H>(
        mut self,
        command: &ChildCommand,
        outputs: Outputs,
        handler: &mut H,
    ) -> Result<i32, SuperviseError>
    where
        H: CrashHandler + ?Sized,
    {
        let (reader, writer) = io::pipe().map_err(|source| SuperviseError::Pipe { source })?;
        let multiplexer = StreamMultiplexer::new(outputs).run(reader)?;

        let mut child = command
            .spawn(&self.run_id, &writer)
            .map_err(|source| SuperviseError::Spawn { source })?;
        info!(
            target: SUPERVISOR_TARGET,
            pid = child.id(),
            run_id = %self.run_id,
            "spawned supervised child"
        );

        let drained = match child.stderr.take() {
            Some(stderr) => drain_log_channel(stderr, &mut self.log),
            None => Ok(None),
        };
        let status = child
            .wait()
            .map_err(|source| SuperviseError::Wait { source })?;
        drop(writer);
        let forwarded = multiplexer.wait();

        let crash = drained.map_err(|source| SuperviseError::LogStream { source })?;
        let code = exit_code(status);
        debug!(target: SUPERVISOR_TARGET, code, "supervised child exited");

        // A crash is reported even when the user's output has gone away.
        let reported = match crash {
            Some(crash) => {
                warn!(target: SUPERVISOR_TARGET, code, "supervised child crashed");
                handler
                    .handle(&crash, self.diagnostic.path())
                    .map_err(|source| SuperviseError::CrashReport { source })
            }
            None => Ok(()),
        };
        forwarded?;
        reported?;
        Ok(code)
    }
}

/// Copies the child's log channel into the supervision log until EOF.
///
/// Reading continues after a failed log write so the child never blocks on a
/// full pipe; the first write error is returned once the stream ends.
fn drain_log_channel<R, W>(stream: R, log: &mut W) -> io::Result<Option<CrashReport>>
where
    R: Read,
    W: Write,
{
    let mut reader = BufReader::new(stream);
    let mut capture = CrashCapture::default();
    let mut write_error = None;
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if write_error.is_none() {
            write_error = log.write_all(&line).err();
        }
        capture.observe(&line);
    }
    match write_error {
        Some(error) => Err(error),
        None => Ok(capture.finish()),
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Ignores SIGINT in the parent so the child decides how to react to it.
///
/// Registration failures are logged; supervision continues either way.
#[cfg(unix)]
pub fn ignore_interrupts() {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    let interrupted = Arc::new(AtomicBool::new(false));
    if let Err(error) =
        signal_hook::flag::register(signal_hook::consts::SIGINT, interrupted)
    {
        warn!(
            target: SUPERVISOR_TARGET,
            error = %error,
            "could not ignore interrupts in the supervising process"
        );
    }
}

/// Interrupt handling is left to the platform default.
#[cfg(not(unix))]
pub fn ignore_interrupts() {}
