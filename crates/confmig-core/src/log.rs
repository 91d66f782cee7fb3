//! User-facing log channels
//!
//! Lines written here are part of the command's output contract: their text
//! and order are fixed. Internal diagnostics go through `tracing` instead.

use parking_lot::Mutex;
use std::io::Write;

/// Destination for contract log lines
///
/// `info` goes to the standard channel, `warn` and `error` to the error
/// channel. Implementations add the config prefix to each line.
pub trait LogSink: Send + Sync {
    /// Standard channel line
    fn info(&self, message: &str);

    /// Error channel warning
    fn warn(&self, message: &str);

    /// Error channel error
    fn error(&self, message: &str);

    /// Raw text on the standard channel, no prefix
    ///
    /// Console sinks end the text with a newline; captured entries hold the
    /// text as given.
    fn write_stdout(&self, text: &str);
}

/// Log sink writing to the process's stdout and stderr
#[derive(Debug, Clone)]
pub struct ConsoleLog {
    prefix: String,
}

impl ConsoleLog {
    /// Create sink prefixing lines with `prefix`
    #[inline]
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl LogSink for ConsoleLog {
    fn info(&self, message: &str) {
        println!("{} {message}", self.prefix);
    }

    fn warn(&self, message: &str) {
        eprintln!("{} {message}", self.prefix);
    }

    fn error(&self, message: &str) {
        eprintln!("{} {message}", self.prefix);
    }

    fn write_stdout(&self, text: &str) {
        // Nothing sensible to do if stdout is gone
        let _ = write_line(&mut std::io::stdout().lock(), text);
    }
}

fn write_line(out: &mut impl Write, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes())?;
    out.write_all(b"\n")?;
    out.flush()
}

/// Log sink capturing lines in memory
#[derive(Debug, Default)]
pub struct MemoryLog {
    prefix: String,
    stdout: Mutex<Vec<String>>,
    stderr: Mutex<Vec<String>>,
}

impl MemoryLog {
    /// Create capturing sink prefixing lines with `prefix`
    #[inline]
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Captured standard channel entries, in order
    #[must_use]
    pub fn stdout(&self) -> Vec<String> {
        self.stdout.lock().clone()
    }

    /// Captured error channel entries, in order
    #[must_use]
    pub fn stderr(&self) -> Vec<String> {
        self.stderr.lock().clone()
    }

    /// Drop everything captured so far
    pub fn clear(&self) {
        self.stdout.lock().clear();
        self.stderr.lock().clear();
    }

    fn line(&self, message: &str) -> String {
        format!("{} {message}", self.prefix)
    }
}

impl LogSink for MemoryLog {
    fn info(&self, message: &str) {
        self.stdout.lock().push(self.line(message));
    }

    fn warn(&self, message: &str) {
        self.stderr.lock().push(self.line(message));
    }

    fn error(&self, message: &str) {
        self.stderr.lock().push(self.line(message));
    }

    fn write_stdout(&self, text: &str) {
        self.stdout.lock().push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_log_captures_channels() {
        let log = MemoryLog::new("[percy]");
        log.info("Found config file: .percy.yml");
        log.error("Error: Config file not found");
        log.warn("Config is already the latest version");
        log.write_stdout("\nversion: 2");

        assert_eq!(log.stdout(), ["[percy] Found config file: .percy.yml", "\nversion: 2"]);
        assert_eq!(
            log.stderr(),
            [
                "[percy] Error: Config file not found",
                "[percy] Config is already the latest version"
            ]
        );
    }

    #[test]
    fn console_output_ends_with_newline() {
        let mut out = Vec::new();
        write_line(&mut out, "\nversion: 2").unwrap();
        assert_eq!(out, b"\nversion: 2\n");
    }

    #[test]
    fn memory_log_clear() {
        let log = MemoryLog::new("[percy]");
        log.info("line");
        log.clear();
        assert!(log.stdout().is_empty());
        assert!(log.stderr().is_empty());
    }
}
