//! Static response-contract checker for decorated controller classes.
//!
//! A pass over one [`SourceUnit`]:
//! - [`contracts::collect_handlers`] finds controller handlers and reads their
//!   `@Response(status, Type)` contracts,
//! - [`contracts::ContractRegistry`] builds per-handler status tables and
//!   flags duplicate statuses,
//! - [`returns::locate_returns`] enumerates every reachable return site,
//! - [`returns::validate_shape`] and [`returns::TypeMatcher`] check each site.
//!
//! Findings are [`Diagnostic`] values collected into a [`Report`]. Internal
//! faults (dangling arena IDs) drop the affected handler or class, are logged,
//! and never abort the pass.

pub mod config;
pub mod contracts;
pub mod diagnostics;
pub mod resolve;
pub mod returns;
pub mod sink;

pub use config::{CheckerConfig, ConfigError, TypeMatching};
pub use diagnostics::{AnnotationProblem, Diagnostic, DiagnosticKind, ReturnGap};
pub use resolve::TypeResolver;
pub use sink::{DiagnosticSink, Report};

use routecheck_core::{CoreError, SourceFile, SourceUnit};
use tracing::{debug, warn};

use contracts::{collect_handlers, ContractRegistry, HandlerId};
use returns::{locate_returns, validate_shape, ShapeCheck, TypeMatcher};

/// A configured checker, reusable across source units.
pub struct Checker<'a> {
    config: &'a CheckerConfig,
    resolver: Option<&'a dyn TypeResolver>,
}

impl<'a> Checker<'a> {
    pub fn new(config: &'a CheckerConfig) -> Self {
        Checker {
            config,
            resolver: None,
        }
    }

    /// Enables assignability checks through `resolver`.
    pub fn with_resolver(mut self, resolver: &'a dyn TypeResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn check(&self, unit: &SourceUnit) -> Report {
        check_unit(unit, self.resolver, self.config)
    }
}

/// Runs a full pass over one source unit.
pub fn check_unit(
    unit: &SourceUnit,
    resolver: Option<&dyn TypeResolver>,
    config: &CheckerConfig,
) -> Report {
    let mut sink = DiagnosticSink::new();
    let mut registry = ContractRegistry::new();

    for (class_id, class) in unit.classes() {
        let methods = match collect_handlers(unit, class_id, config) {
            Ok(methods) => methods,
            Err(err) => {
                warn!(class = %class.name, error = %err, "skipping class after internal fault");
                continue;
            }
        };

        for method in methods {
            let Some(handler) = method.handler else {
                sink.absorb(method.findings);
                continue;
            };
            let name = handler.qualified_name();
            let method_id = handler.method;
            let mut handler_sink = method.findings;
            let id = registry.register(handler, &config.contract_decorator, &mut handler_sink);
            match check_handler(unit, &registry, id, resolver, config, &mut handler_sink) {
                Ok(()) => sink.absorb(handler_sink),
                Err(err) => {
                    warn!(handler = %name, method = %method_id, error = %err, "dropping handler findings after internal fault");
                }
            }
        }
    }

    debug!(path = %unit.path, handlers = registry.len(), findings = sink.len(), "pass complete");
    Report {
        path: unit.path.clone(),
        diagnostics: sink.into_diagnostics(),
    }
}

/// Lowers a parsed file and checks it.
///
/// Type declarations are only lowered, and used as the resolver, when
/// assignability matching is configured; identifier matching never reads
/// them.
pub fn check_source(file: &SourceFile, config: &CheckerConfig) -> Result<Report, CoreError> {
    match config.strict_type_matching {
        TypeMatching::Assignability => {
            let (unit, types) = file.lower()?;
            Ok(check_unit(&unit, Some(&types), config))
        }
        TypeMatching::Identifier => Ok(check_unit(&file.lower_unit(), None, config)),
    }
}

fn check_handler(
    unit: &SourceUnit,
    registry: &ContractRegistry,
    id: HandlerId,
    resolver: Option<&dyn TypeResolver>,
    config: &CheckerConfig,
    sink: &mut DiagnosticSink,
) -> Result<(), CoreError> {
    let Some(handler) = registry.handler(id) else {
        return Ok(());
    };
    let name = handler.qualified_name();

    let sites = match handler.body {
        Some(body) => locate_returns(unit, id, body)?,
        None => Vec::new(),
    };
    if sites.is_empty() {
        sink.report(Diagnostic::MissingEmptyReturn {
            location: handler.span,
            handler: name,
            decorator: config.contract_decorator.clone(),
            gap: ReturnGap::NoReachableReturn,
        });
        return Ok(());
    }

    let matcher = TypeMatcher::new(config, resolver);
    for site in &sites {
        match validate_shape(unit, site, &name, config)? {
            ShapeCheck::Rejected(diagnostic) => {
                debug!(handler = %name, line = site.span.line, kind = %diagnostic.kind(), "return rejected");
                sink.report(diagnostic);
            }
            ShapeCheck::Canonical(canonical) => {
                if let Some(diagnostic) = matcher.check(registry, id, &canonical, &name) {
                    debug!(handler = %name, line = site.span.line, kind = %diagnostic.kind(), "return mismatched");
                    sink.report(diagnostic);
                }
            }
        }
    }
    Ok(())
}
