//! JSON Lines writer for result records.

use std::fs::File;
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::ResultRecord;

/// Writer that treats a closed downstream pipe as success.
///
/// Lets `safe_link_scanner ... | head -1` exit cleanly.
pub struct IgnoreBrokenPipe<W: Write> {
    inner: W,
}

impl<W: Write> IgnoreBrokenPipe<W> {
    /// Wraps `inner`.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for IgnoreBrokenPipe<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.inner.write(buf) {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(buf.len()),
            other => other,
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.inner.flush() {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
    }
}

/// Serializes result records to a file or stdout.
pub struct JsonlWriter {
    out: Box<dyn Write + Send>,
    pretty: bool,
    written: usize,
}

impl JsonlWriter {
    /// Writes to `path`, or to stdout when `path` is `None`.
    ///
    /// `pretty` switches to indented JSON, which is no longer one record per
    /// line. The batch runner only allows it for a single URL.
    pub fn create(path: Option<&Path>, pretty: bool) -> Result<Self> {
        let out: Box<dyn Write + Send> = match path {
            Some(path) => {
                let file = File::create(path).with_context(|| {
                    format!("Failed to create output file: {}", path.display())
                })?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(IgnoreBrokenPipe::new(io::stdout())),
        };
        Ok(Self::from_writer(out, pretty))
    }

    /// Writes to an arbitrary sink.
    pub fn from_writer(out: Box<dyn Write + Send>, pretty: bool) -> Self {
        Self {
            out,
            pretty,
            written: 0,
        }
    }

    /// Appends one record and flushes, so partial batches survive a crash.
    pub fn write_record(&mut self, record: &ResultRecord) -> Result<()> {
        let serialized = if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, record)
        } else {
            serde_json::to_writer(&mut self.out, record)
        };
        serialized.context("Failed to serialize result record")?;
        self.out
            .write_all(b"\n")
            .and_then(|()| self.out.flush())
            .context("Failed to write result record")?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }
}
