//! A writer shared by several copy tasks that preserves read order.

use std::io::Write;
use std::sync::{Condvar, Mutex, MutexGuard};

use super::MultiplexError;

struct SinkState {
    writer: Box<dyn Write + Send>,
    next: u64,
    failed: bool,
}

/// Serialises writes from several tasks by ticket number.
///
/// Ticket `n` is written only after tickets `0..n`, whichever task holds
/// them. Once any write fails the sink is poisoned and waiting tasks give up.
pub(super) struct OrderedSink {
    destination: &'static str,
    state: Mutex<SinkState>,
    turn: Condvar,
}

impl OrderedSink {
    pub(super) fn new(destination: &'static str, writer: Box<dyn Write + Send>) -> Self {
        Self {
            destination,
            state: Mutex::new(SinkState {
                writer,
                next: 0,
                failed: false,
            }),
            turn: Condvar::new(),
        }
    }

    /// Writes `bytes` once every lower ticket has been written.
    ///
    /// Returns `Ok(false)` when the sink failed in another task.
    pub(super) fn write_in_turn(&self, ticket: u64, bytes: &[u8]) -> Result<bool, MultiplexError> {
        let mut state = self.lock()?;
        while state.next != ticket && !state.failed {
            state = self.turn.wait(state).map_err(|_| self.panicked())?;
        }
        if state.failed {
            return Ok(false);
        }

        let writer = &mut state.writer;
        let written = writer.write_all(bytes).and_then(|()| writer.flush());
        match written {
            Ok(()) => {
                state.next += 1;
                self.turn.notify_all();
                Ok(true)
            }
            Err(source) => {
                state.failed = true;
                self.turn.notify_all();
                Err(MultiplexError::Write {
                    destination: self.destination,
                    source,
                })
            }
        }
    }

    pub(super) fn flush(&self) -> Result<(), MultiplexError> {
        let mut state = self.lock()?;
        if state.failed {
            return Ok(());
        }
        state
            .writer
            .flush()
            .map_err(|source| MultiplexError::Write {
                destination: self.destination,
                source,
            })
    }

    fn lock(&self) -> Result<MutexGuard<'_, SinkState>, MultiplexError> {
        self.state.lock().map_err(|_| self.panicked())
    }

    const fn panicked(&self) -> MultiplexError {
        MultiplexError::TaskPanicked {
            task: self.destination,
        }
    }
}
