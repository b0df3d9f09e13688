//! Pass-through decorators that mirror stream traffic to a diagnostic sink.
//!
//! A [`Tee`] performs the wrapped read or write first and then copies exactly
//! the bytes that were transferred. Results, errors and blocking behaviour are
//! those of the wrapped stream; sink failures are swallowed.

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

use tracing::trace;

/// Log target for stream mirroring.
const TEE_TARGET: &str = "acute_launcher::tee";

/// Write-only destination for mirrored protocol bytes.
///
/// Clones share the same underlying writer.
#[derive(Clone)]
pub struct DiagnosticSink {
    target: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl DiagnosticSink {
    /// Creates a sink writing to `writer`.
    #[must_use]
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            target: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Creates a sink writing to the process's standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Writes `bytes` to the sink as text.
    ///
    /// Each call is decoded on its own: invalid UTF-8, including a multi-byte
    /// character split across two transfers, shows up as U+FFFD. Only the
    /// mirrored copy is affected. Failures are dropped so the mirrored stream
    /// never observes them.
    pub fn mirror(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(bytes);
        let mut target = self
            .target
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        if let Err(error) = target.write_all(text.as_bytes()).and_then(|()| target.flush()) {
            trace!(
                target: TEE_TARGET,
                %error,
                "diagnostic sink rejected mirrored bytes"
            );
        }
    }
}

impl fmt::Debug for DiagnosticSink {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("DiagnosticSink").finish_non_exhaustive()
    }
}

/// Wraps a reader or writer, optionally mirroring its traffic.
///
/// Without a sink the wrapper forwards calls unchanged.
#[derive(Debug)]
pub struct Tee<T> {
    inner: T,
    sink: Option<DiagnosticSink>,
}

impl<T> Tee<T> {
    /// Wraps `inner`, mirroring to `sink` when one is supplied.
    pub const fn new(inner: T, sink: Option<DiagnosticSink>) -> Self {
        Self { inner, sink }
    }

    /// Wraps `inner` without mirroring.
    pub const fn passthrough(inner: T) -> Self {
        Self::new(inner, None)
    }

    /// Whether traffic is mirrored.
    pub const fn is_mirroring(&self) -> bool {
        self.sink.is_some()
    }

    /// Borrows the wrapped stream.
    pub const fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Unwraps the decorator.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<R: Read> Read for Tee<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = self.inner.read(buf)?;
        if let Some(sink) = &self.sink
            && let Some(transferred) = buf.get(..count)
        {
            sink.mirror(transferred);
        }
        Ok(count)
    }
}

impl<W: Write> Write for Tee<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let count = self.inner.write(buf)?;
        if let Some(sink) = &self.sink
            && let Some(transferred) = buf.get(..count)
        {
            sink.mirror(transferred);
        }
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
