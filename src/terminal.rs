//! Terminal Sinks
//!
//! Where unbuffered command output ends up. The shell session owns one
//! terminal and hands it to every top-level `CommandContext`.

use std::io::Write;
use std::sync::Mutex;

/// Output sink for direct (non-buffered) command output.
pub trait Terminal: Send + Sync {
    fn write(&self, text: &str);
}

/// Writes straight to the process's stdout.
#[derive(Debug, Default)]
pub struct StdoutTerminal;

impl Terminal for StdoutTerminal {
    fn write(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout is not worth failing a command over
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

/// Accumulates everything written to it.
#[derive(Debug, Default)]
pub struct CaptureTerminal {
    buffer: Mutex<String>,
}

impl CaptureTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Return the captured text and clear the buffer.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buffer.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl Terminal for CaptureTerminal {
    fn write(&self, text: &str) {
        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_terminal() {
        let term = CaptureTerminal::new();
        term.write("hello ");
        term.write("world\n");
        assert_eq!(term.contents(), "hello world\n");
        assert_eq!(term.take(), "hello world\n");
        assert_eq!(term.contents(), "");
    }
}
