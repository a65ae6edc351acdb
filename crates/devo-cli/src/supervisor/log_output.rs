//! The parent's combined log writer.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use devo_config::LogDestination;

use super::errors::SetupError;

struct LogSinks {
    diagnostic: File,
    general: Box<dyn Write + Send>,
}

/// Writes every byte to the diagnostic file and the general log destination.
///
/// Clones share the same sinks, so the child's log stream and the parent's
/// own tracing output interleave at write granularity.
#[derive(Clone)]
pub struct SupervisionLog {
    sinks: Arc<Mutex<LogSinks>>,
}

impl SupervisionLog {
    pub(super) fn new(diagnostic: File, general: Box<dyn Write + Send>) -> Self {
        Self {
            sinks: Arc::new(Mutex::new(LogSinks {
                diagnostic,
                general,
            })),
        }
    }

    fn with_sinks<T>(&self, action: impl FnOnce(&mut LogSinks) -> io::Result<T>) -> io::Result<T> {
        let mut sinks = self
            .sinks
            .lock()
            .map_err(|_| io::Error::other("supervision log lock poisoned"))?;
        action(&mut sinks)
    }
}

impl Write for SupervisionLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_sinks(|sinks| {
            sinks.diagnostic.write_all(buf)?;
            sinks.general.write_all(buf)?;
            Ok(buf.len())
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_sinks(|sinks| {
            sinks.diagnostic.flush()?;
            sinks.general.flush()
        })
    }
}

impl std::fmt::Debug for SupervisionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupervisionLog").finish_non_exhaustive()
    }
}

/// Opens the general log destination requested by the user.
pub(super) fn open_destination(
    destination: &LogDestination,
) -> Result<Box<dyn Write + Send>, SetupError> {
    match destination {
        LogDestination::Discard => Ok(Box::new(io::sink())),
        LogDestination::Stderr => Ok(Box::new(io::stderr())),
        LogDestination::File(path) => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map(|file| Box::new(file) as Box<dyn Write + Send>)
            .map_err(|source| SetupError::LogFile {
                path: path.clone(),
                source,
            }),
    }
}
