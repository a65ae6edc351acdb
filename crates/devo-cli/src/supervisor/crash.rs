//! Crash capture: the child's last-resort failure boundary and the parent's
//! report.
//!
//! Expected failures travel as `Result`s. Anything that panics inside the
//! child is caught by [`crash_boundary`], whose hook writes a marker line
//! followed by the panic details to the child's stderr. The parent watches
//! that stream; everything after the marker becomes the [`CrashReport`]
//! handed to a [`CrashHandler`].

use std::backtrace::Backtrace;
use std::fs;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Line prefix announcing a crash on the child's log channel.
pub const CRASH_MARKER: &str = "devo-crash:";

/// Exit code of a child that crashed.
pub const CRASH_EXIT_CODE: u8 = 101;

/// Where crash reports are filed.
pub const ISSUE_URL: &str = "https://github.com/devopracy/devopracy-cli/issues";

const BANNER: &str = "!!!!!!!!!!!!!!!!!!!!!!!!!!! DEVO CRASH !!!!!!!!!!!!!!!!!!!!!!!!!!!!";

/// Runs `body`, turning a panic into a crash report on stderr and
/// [`CRASH_EXIT_CODE`].
pub fn crash_boundary<F>(body: F) -> ExitCode
where
    F: FnOnce() -> ExitCode,
{
    panic::set_hook(Box::new(|info| {
        let report = describe_panic(info);
        let _ = io::stderr().lock().write_all(report.as_bytes());
    }));
    panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or(ExitCode::from(CRASH_EXIT_CODE))
}

fn describe_panic(info: &PanicHookInfo<'_>) -> String {
    let payload = info
        .payload()
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("unknown panic payload"));
    let location = info
        .location()
        .map_or_else(String::new, |location| format!("\nat {location}"));
    format!(
        "{CRASH_MARKER} {payload}{location}\n\n{}\n",
        Backtrace::force_capture()
    )
}

/// Text the child produced after announcing a crash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashReport {
    payload: String,
}

impl CrashReport {
    /// Wraps captured crash text.
    #[must_use]
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Panic message, location and backtrace.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Scans the child's log channel line by line for the crash marker.
#[derive(Debug, Default)]
pub(super) struct CrashCapture {
    payload: Option<Vec<u8>>,
}

impl CrashCapture {
    pub(super) fn observe(&mut self, line: &[u8]) {
        match &mut self.payload {
            Some(payload) => payload.extend_from_slice(line),
            None => {
                if let Some(rest) = line.strip_prefix(CRASH_MARKER.as_bytes()) {
                    self.payload = Some(rest.trim_ascii_start().to_vec());
                }
            }
        }
    }

    pub(super) fn finish(self) -> Option<CrashReport> {
        self.payload
            .map(|payload| CrashReport::new(String::from_utf8_lossy(&payload).into_owned()))
    }
}

/// Produces the user-facing report for a crashed child.
#[cfg_attr(test, mockall::automock)]
pub trait CrashHandler {
    /// Reports `crash`; `diagnostic` is the run's full log file.
    ///
    /// # Errors
    ///
    /// Returns an error when the report cannot be written.
    fn handle(&mut self, crash: &CrashReport, diagnostic: &Path) -> io::Result<()>;
}

/// Prints the crash banner and writes `crash.log`.
#[derive(Debug)]
pub struct CrashReporter<W> {
    out: W,
    crash_log: PathBuf,
}

impl<W: Write> CrashReporter<W> {
    /// Reports to `out`, writing the crash log to `crash_log`.
    pub fn new(out: W, crash_log: impl Into<PathBuf>) -> Self {
        Self {
            out,
            crash_log: crash_log.into(),
        }
    }
}

impl CrashReporter<io::Stderr> {
    /// Reports to stderr and `crash.log` in the working directory.
    #[must_use]
    pub fn process() -> Self {
        Self::new(io::stderr(), "crash.log")
    }
}

impl<W: Write> CrashHandler for CrashReporter<W> {
    fn handle(&mut self, crash: &CrashReport, diagnostic: &Path) -> io::Result<()> {
        let mut contents = fs::read(diagnostic)?;
        contents.extend_from_slice(b"\n\n");
        contents.extend_from_slice(crash.payload().as_bytes());
        fs::write(&self.crash_log, contents)?;

        writeln!(self.out, "\n{BANNER}\n")?;
        writeln!(
            self.out,
            "Devo crashed! This is always indicative of a bug within Devo.\n\
             A crash log has been placed at {:?} relative to your current\n\
             working directory. It would be immensely helpful if you could please\n\
             report the crash with Devo[1] so that we can fix this.\n\n\
             [1]: {ISSUE_URL}\n",
            self.crash_log.display().to_string(),
        )?;
        writeln!(self.out, "{BANNER}")?;
        self.out.flush()
    }
}
