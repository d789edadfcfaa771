//! Core error types for routecheck-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! dangling arena references, type registration, and malformed tree input.

use crate::id::{ClassId, ExprId, MethodId, StmtId};
use crate::type_id::TypeId;
use thiserror::Error;

/// Core errors produced by the routecheck-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Attempting to register a type name that already exists in the registry.
    #[error("duplicate type name: '{name}'")]
    DuplicateTypeName { name: String },

    /// A TypeId was not found in the type registry.
    #[error("type not found: {id}")]
    TypeNotFound { id: TypeId },

    /// A type declaration references a name that was never declared.
    #[error("unknown type name '{name}' referenced by '{referenced_by}'")]
    UnknownTypeName { name: String, referenced_by: String },

    /// A statement ID does not index the statement arena.
    #[error("statement not found: StmtId({id})")]
    StmtNotFound { id: StmtId },

    /// An expression ID does not index the expression arena.
    #[error("expression not found: ExprId({id})")]
    ExprNotFound { id: ExprId },

    /// A class ID was not found.
    #[error("class not found: ClassId({id})")]
    ClassNotFound { id: ClassId },

    /// The serialized tree could not be decoded.
    #[error("malformed source tree: {0}")]
    MalformedTree(#[from] serde_json::Error),

    /// A method ID was not found.
    #[error("method not found: MethodId({id})")]
    MethodNotFound { id: MethodId },
}
