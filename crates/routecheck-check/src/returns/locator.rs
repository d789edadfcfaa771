//! Return-site locator: enumerates the return statements of a handler body.
//!
//! The walk is an explicit depth-first traversal over the closed statement
//! set. It enters both branches of `if`, every `case` body of a `switch`,
//! loop bodies, all three parts of `try`, and labeled statements. A `return`
//! ends its own path but not the walk. Nested function declarations are
//! independent callables and are not entered; function expressions are never
//! reached because expressions are not walked at all.
//!
//! Sites are produced in source pre-order. Each statement is visited at most
//! once, so shared or cyclic child references in a malformed arena cannot
//! loop or duplicate sites.

use std::collections::HashSet;

use routecheck_core::ast::StmtKind;
use routecheck_core::id::StmtId;
use routecheck_core::{CoreError, SourceUnit};

use crate::contracts::HandlerId;
use crate::returns::ReturnSite;

/// Finds every return statement reachable from `body`.
pub fn locate_returns(
    unit: &SourceUnit,
    handler: HandlerId,
    body: StmtId,
) -> Result<Vec<ReturnSite>, CoreError> {
    let mut sites = Vec::new();
    let mut visited: HashSet<StmtId> = HashSet::new();
    let mut stack = vec![body];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let stmt = unit.stmt(id)?;
        match &stmt.kind {
            StmtKind::Block(children) => stack.extend(children.iter().rev()),
            StmtKind::If {
                consequent,
                alternate,
                ..
            } => {
                stack.extend(alternate);
                stack.push(*consequent);
            }
            StmtKind::Switch { cases, .. } => {
                for case in cases.iter().rev() {
                    stack.extend(case.body.iter().rev());
                }
            }
            StmtKind::Loop { body, .. } | StmtKind::Labeled { body, .. } => stack.push(*body),
            StmtKind::Try {
                block,
                handler: catch,
                finalizer,
            } => {
                stack.extend(finalizer);
                stack.extend(catch);
                stack.push(*block);
            }
            StmtKind::Return { .. } => sites.push(ReturnSite {
                stmt: id,
                handler,
                span: stmt.span,
            }),
            StmtKind::FunctionDecl { .. } | StmtKind::Expr(_) | StmtKind::Other => {}
        }
    }

    Ok(sites)
}
