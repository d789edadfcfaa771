//! Return-shape validation.
//!
//! The only sanctioned return form in a handler with contracts is
//! `return this.rtn<Tag>(<status literal>, value)`. Anything else stops the
//! site with a single diagnostic.

use routecheck_core::ast::{ExprKind, StmtKind, TypeRef};
use routecheck_core::id::ExprId;
use routecheck_core::span::Span;
use routecheck_core::{CoreError, SourceUnit};

use crate::config::CheckerConfig;
use crate::contracts::status_from_literal;
use crate::diagnostics::{Diagnostic, ReturnGap};
use crate::returns::ReturnSite;

/// A return site that passed the shape check.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalReturn<'u> {
    pub call: ExprId,
    pub call_span: Span,
    pub status: u16,
    pub status_span: Span,
    /// First explicit type argument, if any.
    pub type_tag: Option<&'u TypeRef>,
}

/// Outcome of [`validate_shape`].
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeCheck<'u> {
    Canonical(CanonicalReturn<'u>),
    Rejected(Diagnostic),
}

/// Checks that a return site is a canonical return call.
pub fn validate_shape<'u>(
    unit: &'u SourceUnit,
    site: &ReturnSite,
    handler_name: &str,
    config: &CheckerConfig,
) -> Result<ShapeCheck<'u>, CoreError> {
    let malformed = || {
        ShapeCheck::Rejected(Diagnostic::MalformedReturn {
            location: site.span,
            handler: handler_name.to_string(),
            method: config.return_method.clone(),
        })
    };

    let StmtKind::Return { argument } = &unit.stmt(site.stmt)?.kind else {
        return Ok(malformed());
    };
    let Some(argument) = argument else {
        return Ok(ShapeCheck::Rejected(Diagnostic::MissingEmptyReturn {
            location: site.span,
            handler: handler_name.to_string(),
            decorator: config.contract_decorator.clone(),
            gap: ReturnGap::EmptyReturn,
        }));
    };

    let call = unit.expr(*argument)?;
    let ExprKind::Call {
        callee,
        type_args,
        args,
    } = &call.kind
    else {
        return Ok(malformed());
    };
    if !is_this_method(unit, *callee, &config.return_method)? {
        return Ok(malformed());
    }
    let [status_arg, _value] = args.as_slice() else {
        return Ok(malformed());
    };

    let status_expr = unit.expr(*status_arg)?;
    let status = match status_expr.kind {
        ExprKind::Number(value) => status_from_literal(value),
        _ => None,
    };
    let Some(status) = status else {
        return Ok(ShapeCheck::Rejected(Diagnostic::StatusNotNumeric {
            location: site.span,
            handler: handler_name.to_string(),
            method: config.return_method.clone(),
        }));
    };

    Ok(ShapeCheck::Canonical(CanonicalReturn {
        call: *argument,
        call_span: call.span,
        status,
        status_span: status_expr.span,
        type_tag: type_args.first(),
    }))
}

/// `this.<method>`
fn is_this_method(unit: &SourceUnit, callee: ExprId, method: &str) -> Result<bool, CoreError> {
    let ExprKind::Member { object, property } = &unit.expr(callee)?.kind else {
        return Ok(false);
    };
    Ok(property == method && matches!(unit.expr(*object)?.kind, ExprKind::This))
}
