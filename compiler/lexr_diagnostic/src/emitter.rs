//! Terminal rendering of diagnostics.
//!
//! ```text
//! error[L1002]: undefined definition `digit`
//!   --> scanner.l:4:1
//!    |
//!  4 | {digit}+    { return NUM; }
//!    | ^^^^^^^ referenced here
//!    = note: ...
//! ```

use std::io::{self, Write};

use crate::span_utils::LineOffsetTable;
use crate::{Diagnostic, Severity};

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m";
    pub const WARNING: &str = "\x1b[1;33m";
    pub const NOTE: &str = "\x1b[1;36m";
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m";
    pub const RESET: &str = "\x1b[0m";
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode for the terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Use colors when the output is a TTY.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Trait for emitting diagnostics.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic) -> io::Result<()>;

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) -> io::Result<()> {
        for diag in diagnostics {
            self.emit(diag)?;
        }
        Ok(())
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) -> io::Result<()>;
}

/// Human-readable emitter with source snippets.
pub struct TerminalEmitter<'s, W: Write> {
    writer: W,
    colors: bool,
    path: &'s str,
    source: &'s str,
    lines: LineOffsetTable,
}

impl<'s, W: Write> TerminalEmitter<'s, W> {
    pub fn new(writer: W, path: &'s str, source: &'s str, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            path,
            source,
            lines: LineOffsetTable::build(source),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn paint(&mut self, text: &str, color: &str) -> io::Result<()> {
        if self.colors {
            write!(self.writer, "{color}{text}{}", colors::RESET)
        } else {
            write!(self.writer, "{text}")
        }
    }

    fn severity_color(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        }
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        let header = format!("{}[{}]", diagnostic.severity, diagnostic.code);
        self.paint(&header, Self::severity_color(diagnostic.severity))?;
        writeln!(self.writer, ": {}", diagnostic.message)?;

        for label in &diagnostic.labels {
            let (line, col) = self.lines.offset_to_line_col(self.source, label.span.start);
            let gutter = line.to_string().len();
            let marker = if label.is_primary { "-->" } else { ":::" };
            writeln!(
                self.writer,
                "{:gutter$}{marker} {}:{line}:{col}",
                "", self.path
            )?;
            writeln!(self.writer, "{:gutter$} |", "")?;
            let text = self.lines.line_text(self.source, line).to_owned();
            writeln!(self.writer, "{line} | {text}")?;

            let width = text.chars().count().saturating_sub(col as usize - 1);
            let underline_len = (label.span.len() as usize).clamp(1, width.max(1));
            let underline = if label.is_primary { "^" } else { "-" }.repeat(underline_len);
            write!(self.writer, "{:gutter$} | {:pad$}", "", "", pad = col as usize - 1)?;
            let color = if label.is_primary {
                Self::severity_color(diagnostic.severity)
            } else {
                colors::SECONDARY
            };
            self.paint(&format!("{underline} {}", label.message), color)?;
            writeln!(self.writer)?;
        }

        for note in &diagnostic.notes {
            self.paint("  = note", colors::BOLD)?;
            writeln!(self.writer, ": {note}")?;
        }
        for suggestion in &diagnostic.suggestions {
            self.paint("  = help", colors::BOLD)?;
            writeln!(self.writer, ": {suggestion}")?;
        }
        Ok(())
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) -> io::Result<()> {
        if error_count > 0 {
            let text = format!(
                "error: could not compile `{}` due to {error_count} error{}",
                self.path,
                plural_s(error_count)
            );
            self.paint(&text, colors::ERROR)?;
            if warning_count > 0 {
                write!(
                    self.writer,
                    "; {warning_count} warning{} emitted",
                    plural_s(warning_count)
                )?;
            }
            writeln!(self.writer)?;
        } else if warning_count > 0 {
            let text = format!("warning: {warning_count} warning{} emitted", plural_s(warning_count));
            self.paint(&text, colors::WARNING)?;
            writeln!(self.writer)?;
        }
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests;
