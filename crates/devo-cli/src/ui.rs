//! User-facing output from the supervised child.
//!
//! The child's stdout is the parent's multiplexer input, so every line the
//! user should see is tagged with its destination.

use std::io::{self, Write};

use crate::multiplex::{ERROR_TAG, OUTPUT_TAG};

/// Writes tagged lines for the parent to route.
#[derive(Debug)]
pub struct TaggedUi<W> {
    out: W,
}

impl<W: Write> TaggedUi<W> {
    /// Wraps the child's stdout (or any writer in tests).
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Writes `message` for the user's stdout.
    ///
    /// # Errors
    ///
    /// Returns the underlying write error.
    pub fn output(&mut self, message: &str) -> io::Result<()> {
        self.tagged(OUTPUT_TAG, message)
    }

    /// Writes `message` for the user's stderr.
    ///
    /// # Errors
    ///
    /// Returns the underlying write error.
    pub fn error(&mut self, message: &str) -> io::Result<()> {
        self.tagged(ERROR_TAG, message)
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn tagged(&mut self, tag: &[u8], message: &str) -> io::Result<()> {
        if message.is_empty() {
            self.out.write_all(tag)?;
            self.out.write_all(b"\n")?;
        }
        for line in message.lines() {
            self.out.write_all(tag)?;
            self.out.write_all(line.as_bytes())?;
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }
}
