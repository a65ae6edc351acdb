//! Describes how the supervised child is launched.

use std::ffi::OsString;
use std::io::{self, PipeWriter};
use std::process::{Child, Command, Stdio};

use devo_config::env;

use super::errors::SetupError;

/// Program and arguments of the supervised child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl ChildCommand {
    /// Runs `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Re-runs the current executable with this process's arguments.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Executable`] when the executable path is
    /// unavailable.
    pub fn current() -> Result<Self, SetupError> {
        let program = std::env::current_exe().map_err(|source| SetupError::Executable { source })?;
        Ok(Self::new(program).args(std::env::args_os().skip(1)))
    }

    /// Appends arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Starts the child with the role cookie and run id set, the user's log
    /// variables removed, stdout connected to `stdout` and stderr piped.
    pub(super) fn spawn(&self, run_id: &str, stdout: &PipeWriter) -> io::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .env(env::WRAPPED_COOKIE_KEY, env::WRAPPED_COOKIE_VALUE)
            .env(env::RUN_ID, run_id)
            .env_remove(env::LOG)
            .env_remove(env::LOG_PATH)
            .stdin(Stdio::inherit())
            .stdout(Stdio::from(stdout.try_clone()?))
            .stderr(Stdio::piped())
            .spawn()
    }
}
