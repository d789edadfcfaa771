//! Status and type-tag matching for canonical return sites.

use routecheck_core::ast::TypeRefKind;
use tracing::{debug, trace};

use crate::config::{CheckerConfig, TypeMatching};
use crate::contracts::{ContractRegistry, HandlerId, ResponseContract};
use crate::diagnostics::Diagnostic;
use crate::resolve::TypeResolver;
use crate::returns::CanonicalReturn;

/// How an accepted type tag was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    Identifier,
    Assignability,
    /// Nothing to compare: the tag is an inline type (`rtn<{ id: number }>`)
    /// in identifier mode. Such returns pass unchecked; run with
    /// `RUST_LOG=routecheck_check=debug` to list them.
    Skipped,
}

pub struct TypeMatcher<'a> {
    config: &'a CheckerConfig,
    resolver: Option<&'a dyn TypeResolver>,
}

impl<'a> TypeMatcher<'a> {
    pub fn new(config: &'a CheckerConfig, resolver: Option<&'a dyn TypeResolver>) -> Self {
        TypeMatcher { config, resolver }
    }

    /// Checks a canonical return against the handler's contracts.
    ///
    /// Returns at most one diagnostic: an undeclared status wins over
    /// anything about the type tag.
    pub fn check(
        &self,
        registry: &ContractRegistry,
        handler: HandlerId,
        site: &CanonicalReturn<'_>,
        handler_name: &str,
    ) -> Option<Diagnostic> {
        let Some(contract) = registry.lookup(handler, site.status) else {
            return Some(Diagnostic::InvalidStatus {
                location: site.status_span,
                handler: handler_name.to_string(),
                decorator: self.config.contract_decorator.clone(),
                status: site.status,
                declared: registry.statuses(handler),
            });
        };

        let Some(tag) = site.type_tag else {
            if !self.config.require_explicit_type_tag {
                return None;
            }
            return Some(Diagnostic::MissingTypeTag {
                location: site.call_span,
                handler: handler_name.to_string(),
                method: self.config.return_method.clone(),
                status: site.status,
                expected: contract.accepted_list(),
            });
        };

        let matched = match &tag.kind {
            TypeRefKind::Anonymous { text } => match self.config.strict_type_matching {
                TypeMatching::Identifier => {
                    debug!(handler = handler_name, status = site.status, tag = %text, "inline type tag not checked");
                    Some(MatchedBy::Skipped)
                }
                TypeMatching::Assignability => None,
            },
            TypeRefKind::Named { path } => self.match_named(&path.join("."), contract),
        };

        match matched {
            Some(by) => {
                trace!(handler = handler_name, status = site.status, matched_by = ?by, "return accepted");
                None
            }
            None => Some(Diagnostic::TypeMismatch {
                location: tag.span,
                handler: handler_name.to_string(),
                status: site.status,
                expected: contract.accepted_list(),
                actual: tag.display_text(),
            }),
        }
    }

    fn match_named(&self, actual: &str, contract: &ResponseContract) -> Option<MatchedBy> {
        let by_identifier = contract.accepts_identifier(actual);
        match self.config.strict_type_matching {
            TypeMatching::Identifier => by_identifier.then_some(MatchedBy::Identifier),
            TypeMatching::Assignability => {
                if by_identifier && self.config.identifier_shortcut {
                    return Some(MatchedBy::Identifier);
                }
                let Some(resolver) = self.resolver else {
                    return by_identifier.then_some(MatchedBy::Identifier);
                };
                let from = resolver.resolve(actual)?;
                contract
                    .accepted_types
                    .iter()
                    .filter_map(|name| resolver.resolve(name))
                    .any(|to| resolver.is_assignable(from, to))
                    .then_some(MatchedBy::Assignability)
            }
        }
    }
}
