//! Demultiplexing of the child's tagged output stream.
//!
//! The supervised child writes everything meant for the user to a single
//! pipe. Each line carries a tag naming its destination:
//!
//! ```text
//! e:something went wrong      -> parent stderr (tag stripped)
//! o:build finished            -> parent stdout (tag stripped)
//! anything else               -> parent stdout (verbatim)
//! ```
//!
//! A splitter thread reads lines and hands them to three copy threads, one
//! per sub-stream. The output and default copiers share the stdout sink and
//! write in the order the splitter saw the lines, so tagged and untagged
//! output never reorder relative to each other.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::debug;

mod sink;

use self::sink::OrderedSink;

const MULTIPLEX_TARGET: &str = "devo_cli::multiplex";

/// Prefix routing a line to the error destination.
pub const ERROR_TAG: &[u8] = b"e:";

/// Prefix routing a line to the output destination.
pub const OUTPUT_TAG: &[u8] = b"o:";

/// Lines buffered per sub-stream before the splitter blocks.
const CHANNEL_CAPACITY: usize = 64;

/// Destination marker carried by each line of the combined stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// `e:` lines, routed to stderr.
    Error,
    /// `o:` lines, routed to stdout.
    Output,
    /// Untagged lines, routed to stdout unchanged.
    Default,
}

impl Tag {
    const ALL: [Self; 3] = [Self::Error, Self::Output, Self::Default];

    /// Splits a line into its tag and the bytes to forward.
    #[must_use]
    pub fn classify(line: &[u8]) -> (Self, &[u8]) {
        if let Some(rest) = line.strip_prefix(ERROR_TAG) {
            (Self::Error, rest)
        } else if let Some(rest) = line.strip_prefix(OUTPUT_TAG) {
            (Self::Output, rest)
        } else {
            (Self::Default, line)
        }
    }

    const fn thread_name(self) -> &'static str {
        match self {
            Self::Error => "devo-copy-error",
            Self::Output => "devo-copy-output",
            Self::Default => "devo-copy-default",
        }
    }
}

/// Errors raised while forwarding the child's output.
#[derive(Debug, Error)]
pub enum MultiplexError {
    /// Reading the combined stream failed.
    #[error("failed to read child output: {source}")]
    Read {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Writing to a destination failed.
    #[error("failed to forward child output to {destination}: {source}")]
    Write {
        /// `stdout` or `stderr`.
        destination: &'static str,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A copy task stopped before the stream ended.
    #[error("{tag:?} output task stopped before the stream ended")]
    Disconnected {
        /// Sub-stream whose task went away.
        tag: Tag,
    },
    /// A forwarding thread could not be started.
    #[error("failed to start output thread: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A forwarding task panicked.
    #[error("output task '{task}' panicked")]
    TaskPanicked {
        /// Thread or destination name.
        task: &'static str,
    },
}

impl MultiplexError {
    /// Disconnection only echoes a failure reported by another task.
    const fn is_secondary(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}

/// Destinations the combined stream is split into.
pub struct Outputs {
    stdout: Box<dyn Write + Send>,
    stderr: Box<dyn Write + Send>,
}

impl Outputs {
    /// Routes to arbitrary writers.
    #[must_use]
    pub fn new(stdout: impl Write + Send + 'static, stderr: impl Write + Send + 'static) -> Self {
        Self {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
        }
    }

    /// Routes to this process's standard streams.
    #[must_use]
    pub fn process() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl std::fmt::Debug for Outputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outputs").finish_non_exhaustive()
    }
}

type TaskResult = Result<(), MultiplexError>;
type Chunk = (u64, Vec<u8>);

/// Splits a tagged stream into stdout and stderr.
#[derive(Debug)]
pub struct StreamMultiplexer {
    outputs: Outputs,
}

impl StreamMultiplexer {
    /// Creates a multiplexer writing to `outputs`.
    #[must_use]
    pub const fn new(outputs: Outputs) -> Self {
        Self { outputs }
    }

    /// Starts forwarding `input` in the background.
    ///
    /// The returned handle completes once the input reaches end-of-stream and
    /// all three copy tasks have drained.
    ///
    /// # Errors
    ///
    /// Returns [`MultiplexError::Spawn`] when a thread cannot be started.
    pub fn run<R>(self, input: R) -> Result<MultiplexHandle, MultiplexError>
    where
        R: Read + Send + 'static,
    {
        let stderr = Arc::new(OrderedSink::new("stderr", self.outputs.stderr));
        let stdout = Arc::new(OrderedSink::new("stdout", self.outputs.stdout));

        let mut senders = Vec::with_capacity(Tag::ALL.len());
        let mut copiers = Vec::with_capacity(Tag::ALL.len());
        for tag in Tag::ALL {
            let (sender, receiver) = sync_channel::<Chunk>(CHANNEL_CAPACITY);
            let sink = match tag {
                Tag::Error => Arc::clone(&stderr),
                Tag::Output | Tag::Default => Arc::clone(&stdout),
            };
            let handle = spawn(tag.thread_name(), move || copy(&receiver, &sink))?;
            senders.push((tag, sender));
            copiers.push((tag.thread_name(), handle));
        }

        let splitter = spawn("devo-split", move || split(input, &senders))?;
        Ok(MultiplexHandle { splitter, copiers })
    }
}

/// Completion signal for a running [`StreamMultiplexer`].
#[derive(Debug)]
pub struct MultiplexHandle {
    splitter: JoinHandle<TaskResult>,
    copiers: Vec<(&'static str, JoinHandle<TaskResult>)>,
}

impl MultiplexHandle {
    /// Blocks until the input is exhausted and every copy task has finished.
    ///
    /// # Errors
    ///
    /// Returns the first failure reported by any task. Failures caused by
    /// another task stopping early are only reported when nothing else went
    /// wrong.
    pub fn wait(self) -> Result<(), MultiplexError> {
        let mut errors = Vec::new();
        for (task, handle) in std::iter::once(("devo-split", self.splitter)).chain(self.copiers) {
            let outcome = handle
                .join()
                .unwrap_or(Err(MultiplexError::TaskPanicked { task }));
            if let Err(error) = outcome {
                errors.push(error);
            }
        }

        let primary = errors.iter().position(|error| !error.is_secondary());
        match primary {
            Some(index) => Err(errors.swap_remove(index)),
            None => errors.into_iter().next().map_or(Ok(()), Err),
        }
    }
}

fn spawn<F>(name: &'static str, task: F) -> Result<JoinHandle<TaskResult>, MultiplexError>
where
    F: FnOnce() -> TaskResult + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_owned())
        .spawn(task)
        .map_err(|source| MultiplexError::Spawn { source })
}

fn split<R: Read>(input: R, senders: &[(Tag, SyncSender<Chunk>)]) -> TaskResult {
    let mut reader = BufReader::new(input);
    let mut line = Vec::new();
    // Tickets are allocated per sink so shared sinks can restore read order.
    let mut stdout_ticket = 0_u64;
    let mut stderr_ticket = 0_u64;

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|source| MultiplexError::Read { source })?;
        if read == 0 {
            debug!(target: MULTIPLEX_TARGET, "child output reached end of stream");
            return Ok(());
        }

        let (tag, payload) = Tag::classify(&line);
        let counter = match tag {
            Tag::Error => &mut stderr_ticket,
            Tag::Output | Tag::Default => &mut stdout_ticket,
        };
        let sent = senders
            .iter()
            .find(|(candidate, _)| *candidate == tag)
            .is_some_and(|(_, sender)| sender.send((*counter, payload.to_vec())).is_ok());
        if !sent {
            // Keep the pipe drained so the child never blocks on a full pipe.
            let _ = io::copy(&mut reader, &mut io::sink());
            return Err(MultiplexError::Disconnected { tag });
        }
        *counter += 1;
    }
}

fn copy(receiver: &Receiver<Chunk>, sink: &OrderedSink) -> TaskResult {
    for (ticket, bytes) in receiver {
        if !sink.write_in_turn(ticket, &bytes)? {
            return Ok(());
        }
    }
    sink.flush()
}
