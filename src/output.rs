//! Console output shared between sort workers
//!
//! Every worker message goes through one `Mutex`-guarded writer, so lines from
//! concurrent workers never interleave mid-line. The lock guards output only;
//! the data being sorted is never behind it.

use std::io::{self, Write};
use std::sync::Mutex;

/// Line-oriented writer safe to share across threads
pub struct OutputSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl OutputSink {
    /// Wrap any writer
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Sink that drops everything (benchmarks, quiet runs)
    pub fn discard() -> Self {
        Self::new(io::sink())
    }

    /// Write one complete line
    ///
    /// The whole line, newline included, is written while the lock is held.
    /// Write failures are logged and otherwise ignored: losing a progress
    /// line must not fail a sort.
    pub fn line(&self, message: impl AsRef<str>) {
        // A worker that panicked while holding the lock leaves it poisoned;
        // the writer itself is still usable.
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Err(e) = writeln!(writer, "{}", message.as_ref()).and_then(|_| writer.flush()) {
            tracing::warn!("Failed to write output line: {}", e);
        }
    }
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSink").finish_non_exhaustive()
    }
}

/// In-memory writer for inspecting sink output in tests
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CaptureBuffer(std::sync::Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl CaptureBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

#[cfg(test)]
impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
