//! Diagnostic accumulation.
//!
//! The compiler never aborts on the first error (spec §7): each pass
//! records a `Diagnostic` into a shared `DiagnosticSink` and keeps going so
//! later passes can surface further problems in the same run. Message text
//! is table-driven (`data::DIAGNOSTIC_MESSAGES`) so every call site reports
//! a diagnostic by code rather than formatting its own string by hand.

mod data;

pub use data::{diagnostic_codes, diagnostic_messages, DiagnosticMessage, DIAGNOSTIC_MESSAGES};

use crate::span::Span;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Error,
    Warning,
}

/// A single reported problem, ready for rendering.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: PathBuf,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    /// Renders as `file:line:col: error[E0200]: message`-style text, the
    /// (line, column) piece left for the caller since rendering needs a
    /// `LineMap` it doesn't own.
    #[must_use]
    pub fn code_tag(&self) -> String {
        format!("E{:04}", self.code)
    }
}

fn lookup(code: u32) -> &'static DiagnosticMessage {
    DIAGNOSTIC_MESSAGES
        .iter()
        .find(|m| m.code == code)
        .unwrap_or_else(|| panic!("no diagnostic message registered for code {code}"))
}

/// Substitutes `{0}`, `{1}`, ... placeholders in a message template.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        if ch == '{' {
            if let Some(close) = template[i..].find('}') {
                let idx_str = &template[i + 1..i + close];
                if let Ok(idx) = idx_str.parse::<usize>() {
                    out.push_str(args.get(idx).copied().unwrap_or(""));
                    for _ in 0..close {
                        chars.next();
                    }
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out
}

/// Accumulates diagnostics for a compilation run (spec §7's "process-wide
/// error/warning counters"). One sink is shared across resolve/check/flow.
#[derive(Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    error_count: u32,
    warning_count: u32,
}

impl DiagnosticSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a diagnostic by code, formatting its template with `args`.
    pub fn report(&mut self, file: PathBuf, span: Span, code: u32, args: &[&str]) {
        let entry = lookup(code);
        let message = format_message(entry.message, args);
        match entry.category {
            DiagnosticCategory::Error => self.error_count += 1,
            DiagnosticCategory::Warning => self.warning_count += 1,
        }
        self.diagnostics.push(Diagnostic { category: entry.category, code, file, span, message });
    }

    #[must_use]
    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    #[must_use]
    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Merges another sink's diagnostics in, for combining per-file sinks
    /// from parallel-friendly early passes into one run-level report.
    pub fn extend(&mut self, other: DiagnosticSink) {
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.diagnostics.extend(other.diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::diagnostic_codes;

    #[test]
    fn format_message_substitutes_positional_args() {
        let out = format_message("expected {0}, found {1}", &["')'", "'}'"]);
        assert_eq!(out, "expected ')', found '}'");
    }

    #[test]
    fn report_increments_error_count() {
        let mut sink = DiagnosticSink::new();
        sink.report(PathBuf::from("a.cone"), Span::new(0, 3), diagnostic_codes::UNKNOWN_NAME, &[
            "foo",
        ]);
        assert_eq!(sink.error_count(), 1);
        assert!(sink.has_errors());
        assert_eq!(sink.diagnostics()[0].message, "unknown name 'foo'");
        assert_eq!(sink.diagnostics()[0].code_tag(), "E0200");
    }

    #[test]
    fn warning_does_not_count_as_error() {
        let mut sink = DiagnosticSink::new();
        sink.report(
            PathBuf::from("a.cone"),
            Span::new(0, 3),
            diagnostic_codes::UNUSED_IMPORT,
            &["io"],
        );
        assert_eq!(sink.warning_count(), 1);
        assert!(!sink.has_errors());
    }

    #[test]
    fn extend_merges_counts_and_diagnostics() {
        let mut a = DiagnosticSink::new();
        a.report(PathBuf::from("a.cone"), Span::new(0, 1), diagnostic_codes::WRONG_ARITY, &[
            "1", "2",
        ]);
        let mut b = DiagnosticSink::new();
        b.report(PathBuf::from("b.cone"), Span::new(0, 1), diagnostic_codes::TYPE_MISMATCH, &[
            "int32", "bool",
        ]);
        a.extend(b);
        assert_eq!(a.error_count(), 2);
        assert_eq!(a.diagnostics().len(), 2);
    }
}
