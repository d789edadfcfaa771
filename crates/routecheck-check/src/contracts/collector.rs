//! Declaration collector: finds controller handlers and their contracts.
//!
//! A class is a controller when one of its decorators calls a configured
//! marker (`@BasePath(...)`, `@Controller(...)`). Every plain method of a
//! controller is scanned for contract decorators in declaration order.
//! Unreadable contracts are reported and dropped; methods left without any
//! valid contract are not handlers.

use indexmap::IndexSet;
use routecheck_core::ast::{ClassDecl, Decorator, ExprKind, MethodKind};
use routecheck_core::id::{ClassId, ExprId, MethodId};
use routecheck_core::{CoreError, SourceUnit};
use tracing::{debug, warn};

use crate::config::CheckerConfig;
use crate::contracts::{qualified_name, status_from_literal, HandlerDeclaration, ResponseContract};
use crate::diagnostics::{AnnotationProblem, Diagnostic};
use crate::sink::DiagnosticSink;

/// Returns `true` if any class decorator calls a controller marker.
pub fn is_controller(
    unit: &SourceUnit,
    class: &ClassDecl,
    config: &CheckerConfig,
) -> Result<bool, CoreError> {
    for decorator in &class.decorators {
        if let Some(name) = unit.called_ident(decorator.expr)? {
            if config.is_controller_marker(name) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// One scanned method: its annotation findings and, if at least one
/// contract was valid, its handler declaration.
#[derive(Debug)]
pub struct CollectedMethod {
    pub handler: Option<HandlerDeclaration>,
    pub findings: DiagnosticSink,
}

/// Collects the methods of one class, in declaration order.
///
/// Returns an empty list for non-controllers. A method's malformed
/// annotations stay in its own [`CollectedMethod::findings`] so they can be
/// discarded together with the rest of that handler. A fault while reading
/// one method's decorators drops that method and moves on to the next.
pub fn collect_handlers(
    unit: &SourceUnit,
    class_id: ClassId,
    config: &CheckerConfig,
) -> Result<Vec<CollectedMethod>, CoreError> {
    let class = unit.class(class_id)?;
    if !is_controller(unit, class, config)? {
        debug!(class = %class.name, "not a controller, skipping");
        return Ok(Vec::new());
    }

    let mut collected = Vec::new();
    for (index, method) in class.methods.iter().enumerate() {
        if method.kind != MethodKind::Method {
            continue;
        }
        let method_id = MethodId {
            class: class_id,
            index: index as u32,
        };
        let handler_name = qualified_name(&class.name, &method.name);
        let mut findings = DiagnosticSink::new();
        let contracts = match extract_contracts(
            unit,
            &method.decorators,
            &handler_name,
            config,
            &mut findings,
        ) {
            Ok(contracts) => contracts,
            Err(err) => {
                warn!(handler = %handler_name, method = %method_id, error = %err, "skipping handler with unreadable decorators");
                continue;
            }
        };

        let handler = if contracts.is_empty() {
            None
        } else {
            debug!(handler = %handler_name, method = %method_id, contracts = contracts.len(), "collected handler");
            Some(HandlerDeclaration {
                method: method_id,
                class_name: class.name.clone(),
                name: method.name.clone(),
                contracts,
                body: method.body,
                span: method.span,
            })
        };
        if handler.is_some() || !findings.is_empty() {
            collected.push(CollectedMethod { handler, findings });
        }
    }
    Ok(collected)
}

/// Reads every contract decorator on a method, in declaration order.
fn extract_contracts(
    unit: &SourceUnit,
    decorators: &[Decorator],
    handler_name: &str,
    config: &CheckerConfig,
    sink: &mut DiagnosticSink,
) -> Result<Vec<ResponseContract>, CoreError> {
    let mut contracts = Vec::new();
    for decorator in decorators {
        if unit.called_ident(decorator.expr)? != Some(config.contract_decorator.as_str()) {
            continue;
        }
        match parse_contract(unit, decorator, config)? {
            Ok(contract) => contracts.push(contract),
            Err(problem) => sink.report(Diagnostic::MalformedAnnotation {
                location: decorator.span,
                handler: handler_name.to_string(),
                decorator: config.contract_decorator.clone(),
                problem,
            }),
        }
    }
    Ok(contracts)
}

/// Parses `Response(status, Type | [Type, ...])`.
fn parse_contract(
    unit: &SourceUnit,
    decorator: &Decorator,
    config: &CheckerConfig,
) -> Result<Result<ResponseContract, AnnotationProblem>, CoreError> {
    let ExprKind::Call { args, .. } = &unit.expr(decorator.expr)?.kind else {
        return Ok(Err(AnnotationProblem::WrongArity { found: 0 }));
    };
    let [status_arg, type_arg] = args.as_slice() else {
        return Ok(Err(AnnotationProblem::WrongArity { found: args.len() }));
    };

    let status = match &unit.expr(*status_arg)?.kind {
        ExprKind::Number(value) => status_from_literal(*value),
        _ => None,
    };
    let Some(status) = status else {
        return Ok(Err(AnnotationProblem::StatusNotLiteral));
    };

    let mut accepted_types = IndexSet::new();
    match &unit.expr(*type_arg)?.kind {
        ExprKind::Array(elements) => {
            if elements.is_empty() {
                return Ok(Err(AnnotationProblem::EmptyUnion));
            }
            for element in elements {
                match type_name(unit, *element, config)? {
                    Some(name) => {
                        accepted_types.insert(name);
                    }
                    None => return Ok(Err(AnnotationProblem::UnresolvableType)),
                }
            }
        }
        _ => match type_name(unit, *type_arg, config)? {
            Some(name) => {
                accepted_types.insert(name);
            }
            None => return Ok(Err(AnnotationProblem::UnresolvableType)),
        },
    }

    Ok(Ok(ResponseContract {
        status,
        accepted_types,
        span: decorator.span,
    }))
}

/// Names the type an annotation argument refers to.
///
/// `UserDTO` names `UserDTO`; `UserDTO.z` (a schema accessor) also names
/// `UserDTO`; `Schemas.UserDTO` names `Schemas.UserDTO`. Anything that is
/// not an identifier or a member path yields `None`.
pub fn type_name(
    unit: &SourceUnit,
    expr: ExprId,
    config: &CheckerConfig,
) -> Result<Option<String>, CoreError> {
    match &unit.expr(expr)?.kind {
        ExprKind::Member { object, property } if config.is_schema_accessor(property) => {
            member_path(unit, *object)
        }
        _ => member_path(unit, expr),
    }
}

fn member_path(unit: &SourceUnit, expr: ExprId) -> Result<Option<String>, CoreError> {
    match &unit.expr(expr)?.kind {
        ExprKind::Ident(name) => Ok(Some(name.clone())),
        ExprKind::Member { object, property } => Ok(member_path(unit, *object)?
            .map(|prefix| format!("{}.{}", prefix, property))),
        _ => Ok(None),
    }
}
