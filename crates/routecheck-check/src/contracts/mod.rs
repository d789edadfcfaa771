//! Response contracts declared on controller handlers.
//!
//! The [`collector`] turns decorated controller methods into
//! [`HandlerDeclaration`]s; the [`registry`] stores them for the rest of the
//! pass and answers status lookups. Both live for a single source unit only.

pub mod collector;
pub mod registry;

use std::fmt;

use indexmap::IndexSet;
use routecheck_core::id::{MethodId, StmtId};
use routecheck_core::span::Span;
use serde::{Deserialize, Serialize};

pub use collector::{collect_handlers, is_controller, CollectedMethod};
pub use registry::ContractRegistry;

/// Index of a handler in the pass-local [`ContractRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandlerId(pub u32);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One `@Response(status, Type)` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseContract {
    pub status: u16,
    /// Accepted type identifiers, deduplicated, in declaration order.
    pub accepted_types: IndexSet<String>,
    /// Location of the originating decorator.
    pub span: Span,
}

impl ResponseContract {
    pub fn accepts_identifier(&self, name: &str) -> bool {
        self.accepted_types.contains(name)
    }

    pub fn accepted_list(&self) -> Vec<String> {
        self.accepted_types.iter().cloned().collect()
    }
}

/// A controller method with at least one valid contract.
#[derive(Debug, Clone)]
pub struct HandlerDeclaration {
    pub method: MethodId,
    pub class_name: String,
    pub name: String,
    /// All valid contracts in declaration order, duplicates included.
    pub contracts: Vec<ResponseContract>,
    pub body: Option<StmtId>,
    pub span: Span,
}

impl HandlerDeclaration {
    /// `Class.method`, as used in diagnostics.
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.class_name, &self.name)
    }
}

pub(crate) fn qualified_name(class_name: &str, method_name: &str) -> String {
    format!("{}.{}", class_name, method_name)
}

/// Reads an HTTP-style status out of a numeric literal.
///
/// Only integral values that fit a `u16` qualify; `200.5`, `-1` and `1e6`
/// are rejected.
pub fn status_from_literal(value: f64) -> Option<u16> {
    if value.is_finite() && value.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&value) {
        Some(value as u16)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_literals_must_be_integral_and_in_range() {
        assert_eq!(status_from_literal(200.0), Some(200));
        assert_eq!(status_from_literal(0.0), Some(0));
        assert_eq!(status_from_literal(65535.0), Some(65535));
        assert_eq!(status_from_literal(200.5), None);
        assert_eq!(status_from_literal(-1.0), None);
        assert_eq!(status_from_literal(70000.0), None);
        assert_eq!(status_from_literal(f64::NAN), None);
    }

    #[test]
    fn accepted_list_preserves_order() {
        let contract = ResponseContract {
            status: 200,
            accepted_types: IndexSet::from(["UserDTO".to_string(), "SomethingDTO".to_string()]),
            span: Span::default(),
        };
        assert_eq!(contract.accepted_list(), vec!["UserDTO", "SomethingDTO"]);
        assert!(contract.accepts_identifier("SomethingDTO"));
        assert!(!contract.accepts_identifier("Other"));
    }
}
