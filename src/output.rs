//! Leveled, colorized diagnostic output.
//!
//! All console output of a run goes through a [`Logger`] handle that is created
//! once in `main` and passed down explicitly. Each record is written as
//! `[name] - LEVEL - message`, colored by severity when color is enabled.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Write};

/// Severity of a log record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// Returns the upper-case label printed in each record.
    pub fn label(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    fn paint(self, line: &str) -> ColoredString {
        match self {
            Level::Debug => line.cyan(),
            Level::Info => line.green(),
            Level::Warning => line.yellow(),
            Level::Error => line.red(),
            Level::Critical => line.red().bold(),
        }
    }
}

/// Logger handle writing formatted records to a sink.
///
/// The binary writes to stderr; tests use a `Vec<u8>` and inspect it with
/// [`Logger::get_ref`] or [`Logger::into_inner`].
///
/// # Example
///
/// ```
/// use extpack::output::{Level, Logger};
///
/// let mut logger = Logger::new("extpack", Vec::new()).with_min_level(Level::Info);
/// logger.debug("hidden");
/// logger.info("Source Directory read successfully.");
///
/// let text = String::from_utf8(logger.into_inner()).unwrap();
/// assert_eq!(text, "[extpack] - INFO - Source Directory read successfully.\n");
/// ```
pub struct Logger<W: Write = io::Stderr> {
    name: String,
    sink: W,
    min_level: Level,
    color: bool,
    interactive: bool,
}

impl Logger<io::Stderr> {
    /// Creates a logger on stderr, colored only when stderr is a terminal.
    pub fn stderr(name: &str) -> Self {
        let interactive = io::stderr().is_terminal();
        Self {
            name: name.to_string(),
            sink: io::stderr(),
            min_level: Level::Debug,
            color: interactive,
            interactive,
        }
    }
}

impl<W: Write> Logger<W> {
    /// Creates an uncolored, non-interactive logger on an arbitrary sink.
    pub fn new(name: &str, sink: W) -> Self {
        Self {
            name: name.to_string(),
            sink,
            min_level: Level::Debug,
            color: false,
            interactive: false,
        }
    }

    /// Drops records below `level`.
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Returns true if a record at `level` would be written.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    /// Writes one record. Write failures on the diagnostic stream are ignored.
    pub fn log(&mut self, level: Level, message: &str) {
        if !self.enabled(level) {
            return;
        }

        let line = format!("[{}] - {} - {}", self.name, level.label(), message);
        let _ = if self.color {
            writeln!(self.sink, "{}", level.paint(&line))
        } else {
            writeln!(self.sink, "{}", line)
        };
        let _ = self.sink.flush();
    }

    pub fn debug(&mut self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn info(&mut self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warning(&mut self, message: &str) {
        self.log(Level::Warning, message);
    }

    pub fn error(&mut self, message: &str) {
        self.log(Level::Error, message);
    }

    pub fn critical(&mut self, message: &str) {
        self.log(Level::Critical, message);
    }

    /// Writes an empty separator line between groups.
    pub fn blank_line(&mut self) {
        let _ = writeln!(self.sink);
    }

    /// Creates a progress bar for moving `total` entries.
    ///
    /// The bar is hidden unless the logger writes to a terminal, so it never
    /// interleaves with captured output.
    pub fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.interactive {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
