//! Colored terminal output for release runs

use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
///
/// Write failures are ignored: losing a progress line must never fail a release.
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    fn emit(&self, symbol: &str, spec: Option<ColorSpec>, message: &str) {
        if self.quiet {
            return;
        }

        let mut buffer = self.bufwtr.buffer();
        if let Some(spec) = spec {
            let _ = buffer.set_color(&spec);
        }
        let _ = write!(&mut buffer, "{symbol}");
        let _ = buffer.reset();
        let _ = writeln!(&mut buffer, " {message}");
        let _ = self.bufwtr.print(&buffer);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        self.emit("ℹ", Some(ColorSpec::new().set_fg(Some(Color::Cyan)).clone()), message);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        self.emit(
            "✓",
            Some(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true).clone()),
            message,
        );
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        self.emit(
            "⚠",
            Some(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true).clone()),
            message,
        );
    }

    /// Print an error message (always shown, on stderr)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();

        if buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true)).is_err()
            || write!(&mut buffer, "✗").is_err()
            || buffer.reset().is_err()
            || writeln!(&mut buffer, " {}", message).is_err()
            || bufwtr.print(&buffer).is_err()
        {
            eprintln!("✗ {}", message);
        }
    }

    /// Print a detail line (verbose mode only)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            self.emit("→", Some(ColorSpec::new().set_fg(Some(Color::Blue)).clone()), message);
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        if self.quiet {
            return;
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer);
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
        let _ = writeln!(&mut buffer, "═══ {} ═══", title);
        let _ = buffer.reset();
        let _ = self.bufwtr.print(&buffer);
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) {
        self.emit("   ", None, message);
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.quiet {
            return;
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer, "{}", message);
        let _ = self.bufwtr.print(&buffer);
    }
}
