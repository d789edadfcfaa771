//! Findings produced by the checker.
//!
//! [`Diagnostic`] captures full context for every finding: where it is, which
//! handler it belongs to, and the structured data (statuses, expected types,
//! the offending tag) needed to render a precise message without re-deriving
//! anything from the tree. Serialized form is tagged by `"kind"`.

use std::fmt;

use routecheck_core::span::Span;
use serde::{Deserialize, Serialize};

/// A finding detected during a checker pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// A contract annotation whose status or type cannot be read.
    #[error("@{decorator} must be called as @{decorator}(status, Type): {problem}")]
    MalformedAnnotation {
        location: Span,
        handler: String,
        decorator: String,
        problem: AnnotationProblem,
    },

    /// A second contract for a status already declared on the same handler.
    #[error("Duplicate @{decorator} for status {status}.")]
    DuplicateStatus {
        location: Span,
        handler: String,
        decorator: String,
        status: u16,
        /// Where the canonical (first) declaration of `status` is.
        first: Span,
    },

    /// A return site uses a status the handler never declared.
    #[error("Returned status {status} is not defined in @{decorator}.")]
    InvalidStatus {
        location: Span,
        handler: String,
        decorator: String,
        status: u16,
        declared: Vec<u16>,
    },

    /// A return site not in the canonical `return this.rtn(status, res)` form.
    #[error("Return must be in the form: return this.{method}(status, res)")]
    MalformedReturn {
        location: Span,
        handler: String,
        method: String,
    },

    /// The canonical call's first argument is not a numeric status literal.
    #[error("First argument to this.{method} must be a numeric status code")]
    StatusNotNumeric {
        location: Span,
        handler: String,
        method: String,
    },

    /// Contracts exist but a return is empty or no return is reachable.
    #[error("{}", .gap.message(.handler, .decorator))]
    MissingEmptyReturn {
        location: Span,
        handler: String,
        decorator: String,
        gap: ReturnGap,
    },

    /// The canonical call does not state its result type.
    #[error(
        "this.{method}(...) must state its result type, e.g. this.{method}<{suggested}>(...) for status {status}.",
        suggested = .expected.first().map(String::as_str).unwrap_or("T")
    )]
    MissingTypeTag {
        location: Span,
        handler: String,
        method: String,
        status: u16,
        expected: Vec<String>,
    },

    /// The type tag is not among the accepted types for the status.
    #[error(
        "Generic type '{actual}' does not match any of expected type '{expected_list}' for status {status}.",
        expected_list = .expected.join(", ")
    )]
    TypeMismatch {
        location: Span,
        handler: String,
        status: u16,
        expected: Vec<String>,
        actual: String,
    },
}

/// Why a contract annotation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum AnnotationProblem {
    /// The annotation is not a call with exactly two arguments.
    WrongArity { found: usize },
    /// The first argument is not an integral numeric literal in status range.
    StatusNotLiteral,
    /// The second argument (or one of its union members) is not a type
    /// identifier or member reference.
    UnresolvableType,
    /// The second argument is an empty list.
    EmptyUnion,
}

impl fmt::Display for AnnotationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationProblem::WrongArity { found } => {
                write!(f, "expected 2 arguments, found {}", found)
            }
            AnnotationProblem::StatusNotLiteral => {
                write!(f, "status must be an integer literal")
            }
            AnnotationProblem::UnresolvableType => {
                write!(f, "type must be an identifier, a member reference, or a list of them")
            }
            AnnotationProblem::EmptyUnion => write!(f, "type list is empty"),
        }
    }
}

/// Which of the two "missing return" situations was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReturnGap {
    /// A reachable `return;` without an argument.
    EmptyReturn,
    /// The handler body has no reachable return statement at all.
    NoReachableReturn,
}

impl ReturnGap {
    fn message(&self, handler: &str, decorator: &str) -> String {
        match self {
            ReturnGap::EmptyReturn => format!(
                "Return statement is empty, but @{} decorators are defined.",
                decorator
            ),
            ReturnGap::NoReachableReturn => format!(
                "Handler '{}' declares @{} but has no reachable return statement.",
                handler, decorator
            ),
        }
    }
}

/// Stable, data-free tag for each diagnostic variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    MalformedAnnotation,
    DuplicateStatus,
    InvalidStatus,
    MalformedReturn,
    StatusNotNumeric,
    MissingEmptyReturn,
    MissingTypeTag,
    TypeMismatch,
}

impl DiagnosticKind {
    pub const ALL: [DiagnosticKind; 8] = [
        DiagnosticKind::MalformedAnnotation,
        DiagnosticKind::DuplicateStatus,
        DiagnosticKind::InvalidStatus,
        DiagnosticKind::MalformedReturn,
        DiagnosticKind::StatusNotNumeric,
        DiagnosticKind::MissingEmptyReturn,
        DiagnosticKind::MissingTypeTag,
        DiagnosticKind::TypeMismatch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::MalformedAnnotation => "malformedAnnotation",
            DiagnosticKind::DuplicateStatus => "duplicateStatus",
            DiagnosticKind::InvalidStatus => "invalidStatus",
            DiagnosticKind::MalformedReturn => "malformedReturn",
            DiagnosticKind::StatusNotNumeric => "statusNotNumeric",
            DiagnosticKind::MissingEmptyReturn => "missingEmptyReturn",
            DiagnosticKind::MissingTypeTag => "missingTypeTag",
            DiagnosticKind::TypeMismatch => "typeMismatch",
        }
    }

    pub fn parse(tag: &str) -> Option<DiagnosticKind> {
        Self::ALL.into_iter().find(|k| k.as_str() == tag)
    }

    /// Message template with the stock decorator and method names.
    pub fn template(self) -> &'static str {
        match self {
            DiagnosticKind::MalformedAnnotation => {
                "@Response must be called as @Response(status, Type): {reason}"
            }
            DiagnosticKind::DuplicateStatus => "Duplicate @Response for status {status}.",
            DiagnosticKind::InvalidStatus => "Returned status {status} is not defined in @Response.",
            DiagnosticKind::MalformedReturn => "Return must be in the form: return this.rtn(status, res)",
            DiagnosticKind::StatusNotNumeric => {
                "First argument to this.rtn must be a numeric status code"
            }
            DiagnosticKind::MissingEmptyReturn => {
                "Return statement is empty, but @Response decorators are defined."
            }
            DiagnosticKind::MissingTypeTag => {
                "this.rtn(...) must state its result type, e.g. this.rtn<{expected}>(...) for status {status}."
            }
            DiagnosticKind::TypeMismatch => {
                "Generic type '{actual}' does not match any of expected type '{expected}' for status {status}."
            }
        }
    }

    /// One-line description of the rule behind this kind.
    pub fn description(self) -> &'static str {
        match self {
            DiagnosticKind::MalformedAnnotation => {
                "A response contract annotation must be a call with a numeric status literal and a type reference (identifier, member reference, or a list of them)."
            }
            DiagnosticKind::DuplicateStatus => {
                "Each status may be declared once per handler; later declarations are reported and the first one is used."
            }
            DiagnosticKind::InvalidStatus => {
                "A returned status must be one of the statuses declared on the handler."
            }
            DiagnosticKind::MalformedReturn => {
                "Every return in a handler with contracts must call the canonical return method on `this` with (status, value)."
            }
            DiagnosticKind::StatusNotNumeric => {
                "The status passed to the canonical return method must be an integer literal, not a variable or expression."
            }
            DiagnosticKind::MissingEmptyReturn => {
                "A handler with contracts needs at least one reachable return, and every return must have a value."
            }
            DiagnosticKind::MissingTypeTag => {
                "The canonical return call must name its result type as an explicit type argument."
            }
            DiagnosticKind::TypeMismatch => {
                "The type argument of a return must be one of the types declared for that status."
            }
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Diagnostic {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::MalformedAnnotation { .. } => DiagnosticKind::MalformedAnnotation,
            Diagnostic::DuplicateStatus { .. } => DiagnosticKind::DuplicateStatus,
            Diagnostic::InvalidStatus { .. } => DiagnosticKind::InvalidStatus,
            Diagnostic::MalformedReturn { .. } => DiagnosticKind::MalformedReturn,
            Diagnostic::StatusNotNumeric { .. } => DiagnosticKind::StatusNotNumeric,
            Diagnostic::MissingEmptyReturn { .. } => DiagnosticKind::MissingEmptyReturn,
            Diagnostic::MissingTypeTag { .. } => DiagnosticKind::MissingTypeTag,
            Diagnostic::TypeMismatch { .. } => DiagnosticKind::TypeMismatch,
        }
    }

    pub fn location(&self) -> Span {
        match self {
            Diagnostic::MalformedAnnotation { location, .. }
            | Diagnostic::DuplicateStatus { location, .. }
            | Diagnostic::InvalidStatus { location, .. }
            | Diagnostic::MalformedReturn { location, .. }
            | Diagnostic::StatusNotNumeric { location, .. }
            | Diagnostic::MissingEmptyReturn { location, .. }
            | Diagnostic::MissingTypeTag { location, .. }
            | Diagnostic::TypeMismatch { location, .. } => *location,
        }
    }

    /// `Class.method` of the handler the finding belongs to.
    pub fn handler(&self) -> &str {
        match self {
            Diagnostic::MalformedAnnotation { handler, .. }
            | Diagnostic::DuplicateStatus { handler, .. }
            | Diagnostic::InvalidStatus { handler, .. }
            | Diagnostic::MalformedReturn { handler, .. }
            | Diagnostic::StatusNotNumeric { handler, .. }
            | Diagnostic::MissingEmptyReturn { handler, .. }
            | Diagnostic::MissingTypeTag { handler, .. }
            | Diagnostic::TypeMismatch { handler, .. } => handler,
        }
    }
}
