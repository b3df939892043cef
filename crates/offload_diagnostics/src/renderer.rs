//! Human-readable rendering of diagnostics.

use crate::diagnostic::Diagnostic;
use offload_source::SourceDb;

/// Formats a diagnostic for some output target.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in a rustc-style terminal format:
///
/// ```text
/// error[P102]: expected ')'
///  --> src/f.js:3:12
///   |
/// 3 | parallel.map(x => x
///   |            ^ here
///   = note: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let head = format!("{}[{}]", diag.severity, diag.code);
        if self.color {
            let color = if diag.severity.is_error() { "31" } else { "33" };
            format!("\x1b[1;{color}m{head}\x1b[0m: {}\n", diag.message)
        } else {
            format!("{head}: {}\n", diag.message)
        }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = self.header(diag);

        if let Some(file) = source_db.get(diag.primary_span.file) {
            let resolved = source_db.resolve_span(diag.primary_span);
            let (line, col) = file.line_col(diag.primary_span.start);
            let line_num = line.to_string();
            let padding = " ".repeat(line_num.len());
            let line_content = get_source_line(&file.content, diag.primary_span.start);

            out.push_str(&format!("{padding}--> {resolved}\n"));
            out.push_str(&format!("{padding} |\n"));
            out.push_str(&format!("{line_num} | {line_content}\n"));

            let carets = "^".repeat(diag.primary_span.len().max(1) as usize);
            let col_padding = " ".repeat((col as usize).saturating_sub(1));
            let label = diag
                .label
                .as_ref()
                .map(|l| format!(" {l}"))
                .unwrap_or_default();
            out.push_str(&format!("{padding} | {col_padding}{carets}{label}\n"));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}

fn get_source_line(content: &str, byte_offset: u32) -> &str {
    let offset = (byte_offset as usize).min(content.len());
    let start = content[..offset].rfind('\n').map_or(0, |pos| pos + 1);
    let end = content[offset..]
        .find('\n')
        .map_or(content.len(), |pos| offset + pos);
    &content[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use offload_source::Span;

    #[test]
    fn render_error_with_span() {
        let mut source_db = SourceDb::new();
        let file = source_db.add_source("src/f.js", "a();\nparallel.map(x => x\n".to_string());
        let span = Span::new(file, 18, 19);
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Parse, 102), "expected ')'", span)
            .with_label("here");

        let output = TerminalRenderer::new(false).render(&diag, &source_db);
        assert!(output.starts_with("error[P102]: expected ')'\n"));
        assert!(output.contains("--> src/f.js:2:14"));
        assert!(output.contains("2 | parallel.map(x => x"));
        assert!(output.contains("^ here"));
    }

    #[test]
    fn render_without_location() {
        let source_db = SourceDb::new();
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Worker, 401),
            "worker compilation failed",
            Span::DUMMY,
        )
        .with_note("no worker bundle was emitted");

        let output = TerminalRenderer::new(false).render(&diag, &source_db);
        assert!(output.contains("error[W401]: worker compilation failed"));
        assert!(!output.contains("-->"));
        assert!(output.contains("= note: no worker bundle was emitted"));
    }

    #[test]
    fn color_wraps_header() {
        let source_db = SourceDb::new();
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Build, 301),
            "module not found",
            Span::DUMMY,
        );
        let output = TerminalRenderer::new(true).render(&diag, &source_db);
        assert!(output.starts_with("\x1b[1;31merror[B301]"));
    }
}
