//! Diagnostic sink and per-file reports.
//!
//! Findings are appended in discovery order. Nested sinks let a caller
//! collect a handler's findings separately and only [`absorb`](DiagnosticSink::absorb)
//! them once the handler has been processed without an internal fault, so a
//! report never contains half of a handler.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// Append-only accumulator for one pass.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Moves every finding of `other` to the end of this sink.
    pub fn absorb(&mut self, other: DiagnosticSink) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// All findings for one source unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub path: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of findings of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind() == kind).count()
    }

    /// Kinds of all findings, in report order.
    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.diagnostics.iter().map(Diagnostic::kind).collect()
    }

    /// One `path:line:column: kind: message` line per finding.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for d in &self.diagnostics {
            let loc = d.location();
            let _ = writeln!(out, "{}:{}:{}: {}: {}", self.path, loc.line, loc.column, d.kind(), d);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ReturnGap;
    use routecheck_core::span::Span;

    fn empty_return(line: u32) -> Diagnostic {
        Diagnostic::MissingEmptyReturn {
            location: Span::new(line, 3),
            handler: "A.b".into(),
            decorator: "Response".into(),
            gap: ReturnGap::EmptyReturn,
        }
    }

    #[test]
    fn absorb_appends_in_order() {
        let mut outer = DiagnosticSink::new();
        outer.report(empty_return(1));
        let mut inner = DiagnosticSink::new();
        inner.report(empty_return(2));
        inner.report(empty_return(3));
        outer.absorb(inner);
        let lines: Vec<u32> = outer.iter().map(|d| d.location().line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
        assert_eq!(outer.len(), 3);
    }

    #[test]
    fn render_text_lists_location_and_kind() {
        let report = Report {
            path: "src/user.ts".into(),
            diagnostics: vec![empty_return(7)],
        };
        assert_eq!(
            report.render_text(),
            "src/user.ts:7:3: missingEmptyReturn: Return statement is empty, but @Response decorators are defined.\n"
        );
        assert_eq!(report.count(DiagnosticKind::MissingEmptyReturn), 1);
        assert!(!report.is_clean());
    }
}
