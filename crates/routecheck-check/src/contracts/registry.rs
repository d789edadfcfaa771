//! Contract registry: per-handler status tables for one pass.
//!
//! Handlers are stored in registration order and addressed by [`HandlerId`],
//! so return sites can point back at their handler by index. Each handler's
//! status table maps a status to the first contract that declared it; later
//! declarations of the same status are reported as duplicates but kept in the
//! handler's contract list.

use indexmap::IndexMap;

use crate::contracts::{HandlerDeclaration, HandlerId, ResponseContract};
use crate::diagnostics::Diagnostic;
use crate::sink::DiagnosticSink;

#[derive(Debug, Default)]
pub struct ContractRegistry {
    handlers: Vec<HandlerDeclaration>,
    /// status -> index into the handler's `contracts`, indexed by HandlerId.0
    tables: Vec<IndexMap<u16, usize>>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler and builds its status table.
    ///
    /// Emits [`Diagnostic::DuplicateStatus`] against every later contract that
    /// repeats an already declared status.
    pub fn register(
        &mut self,
        handler: HandlerDeclaration,
        decorator: &str,
        sink: &mut DiagnosticSink,
    ) -> HandlerId {
        let mut table: IndexMap<u16, usize> = IndexMap::with_capacity(handler.contracts.len());
        for (index, contract) in handler.contracts.iter().enumerate() {
            if let Some(&first) = table.get(&contract.status) {
                sink.report(Diagnostic::DuplicateStatus {
                    location: contract.span,
                    handler: handler.qualified_name(),
                    decorator: decorator.to_string(),
                    status: contract.status,
                    first: handler.contracts[first].span,
                });
            } else {
                table.insert(contract.status, index);
            }
        }

        let id = HandlerId(self.handlers.len() as u32);
        self.handlers.push(handler);
        self.tables.push(table);
        id
    }

    pub fn handler(&self, id: HandlerId) -> Option<&HandlerDeclaration> {
        self.handlers.get(id.0 as usize)
    }

    /// The canonical contract for `status`, if the handler declares it.
    pub fn lookup(&self, id: HandlerId, status: u16) -> Option<&ResponseContract> {
        let index = *self.tables.get(id.0 as usize)?.get(&status)?;
        self.handler(id)?.contracts.get(index)
    }

    /// Declared statuses in declaration order, without duplicates.
    pub fn statuses(&self, id: HandlerId) -> Vec<u16> {
        self.tables
            .get(id.0 as usize)
            .map(|table| table.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Number of handlers registered so far in this pass.
    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }
}
