//! Return-site analysis for registered handlers.
//!
//! Each handler body is walked by the [`locator`] to find its reachable
//! return statements. Every site then goes through the [`shape`] check
//! (is it `return this.rtn(<literal>, value)`?) and, if canonical, the
//! [`matcher`] (is the status declared, and does the type tag fit?). A site
//! yields at most one diagnostic: the first failing stage wins.

pub mod locator;
pub mod matcher;
pub mod shape;

use routecheck_core::id::StmtId;
use routecheck_core::span::Span;

use crate::contracts::HandlerId;

pub use locator::locate_returns;
pub use matcher::{MatchedBy, TypeMatcher};
pub use shape::{validate_shape, CanonicalReturn, ShapeCheck};

/// A reachable return statement and the handler it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnSite {
    pub stmt: StmtId,
    pub handler: HandlerId,
    pub span: Span,
}
