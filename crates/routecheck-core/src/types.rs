//! Declared-type shapes known to the type registry.
//!
//! Object shapes use [`IndexMap`] so fields keep their declaration order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::type_id::TypeId;

/// The shape of a declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclaredType {
    /// Built-in primitive.
    Primitive(Primitive),

    /// Structural object type: `{ id: number; name: string }`.
    Object { fields: IndexMap<String, TypeId> },

    /// `type A = B`. Resolved transparently by assignability checks.
    Alias(TypeId),

    /// `A | B`.
    Union(Vec<TypeId>),

    /// `T[]`.
    Array(TypeId),

    /// A class-like type compared by identity only.
    Nominal,
}

/// Built-in primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Primitive {
    Unknown,
    Never,
    Null,
    Boolean,
    Number,
    String,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Unknown => "unknown",
            Primitive::Never => "never",
            Primitive::Null => "null",
            Primitive::Boolean => "boolean",
            Primitive::Number => "number",
            Primitive::String => "string",
        }
    }
}
