//! TypeId and TypeRegistry: the declared types a source unit can refer to.
//!
//! Every declared type has a unique [`TypeId`] providing O(1) identity
//! comparison. The [`TypeRegistry`] manages registration and name lookup,
//! pre-registering the primitive types on construction, and answers
//! assignability questions between registered types.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DeclaredType, Primitive};

/// Unique identifier for a type in the type registry.
///
/// The inner value is an index into the [`TypeRegistry`]'s type vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Pre-registered TypeId constants for built-in types.
impl TypeId {
    pub const UNKNOWN: TypeId = TypeId(0);
    pub const NEVER: TypeId = TypeId(1);
    pub const NULL: TypeId = TypeId(2);
    pub const BOOLEAN: TypeId = TypeId(3);
    pub const NUMBER: TypeId = TypeId(4);
    pub const STRING: TypeId = TypeId(5);
}

/// Registry of declared types, providing nominal identity via [`TypeId`]
/// and structural assignability between them.
///
/// On construction, the registry pre-registers the 6 built-in primitives
/// under their lowercase names (`unknown`, `never`, `null`, `boolean`,
/// `number`, `string`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRegistry {
    /// Types indexed by TypeId.0
    types: Vec<DeclaredType>,
    /// Declared name of each type, if any, indexed by TypeId.0
    type_names: Vec<Option<String>>,
    /// Named type lookup
    names: HashMap<String, TypeId>,
}

impl TypeRegistry {
    const BUILTINS: [Primitive; 6] = [
        Primitive::Unknown,
        Primitive::Never,
        Primitive::Null,
        Primitive::Boolean,
        Primitive::Number,
        Primitive::String,
    ];

    /// Creates a new type registry with the built-in primitives registered.
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            types: Vec::new(),
            type_names: Vec::new(),
            names: HashMap::new(),
        };
        for primitive in Self::BUILTINS {
            let id = registry.register(DeclaredType::Primitive(primitive));
            registry.type_names[id.0 as usize] = Some(primitive.name().to_string());
            registry.names.insert(primitive.name().to_string(), id);
        }
        registry
    }

    /// Registers an anonymous type and returns its new [`TypeId`].
    pub fn register(&mut self, ty: DeclaredType) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        self.type_names.push(None);
        id
    }

    /// Registers a named type, returning its [`TypeId`].
    ///
    /// Returns [`CoreError::DuplicateTypeName`] if a type with the same name
    /// already exists.
    pub fn register_named(&mut self, name: &str, ty: DeclaredType) -> Result<TypeId, CoreError> {
        if self.names.contains_key(name) {
            return Err(CoreError::DuplicateTypeName {
                name: name.to_string(),
            });
        }
        let id = self.register(ty);
        self.type_names[id.0 as usize] = Some(name.to_string());
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Replaces the shape of an already registered type.
    ///
    /// Used to declare names first and fill in their shapes afterwards, so
    /// declarations may refer to each other in any order.
    pub fn define(&mut self, id: TypeId, ty: DeclaredType) -> Result<(), CoreError> {
        let slot = self
            .types
            .get_mut(id.0 as usize)
            .ok_or(CoreError::TypeNotFound { id })?;
        *slot = ty;
        Ok(())
    }

    /// Looks up a type by its [`TypeId`].
    pub fn get(&self, id: TypeId) -> Option<&DeclaredType> {
        self.types.get(id.0 as usize)
    }

    /// Looks up a named type's [`TypeId`] by name.
    pub fn get_by_name(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    /// The declared name of a type, if it has one.
    pub fn name_of(&self, id: TypeId) -> Option<&str> {
        self.type_names.get(id.0 as usize)?.as_deref()
    }

    /// Number of registered types, built-ins included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Follows alias chains to the underlying type.
    ///
    /// Returns `None` for unknown IDs and for alias cycles.
    pub fn resolve_alias(&self, id: TypeId) -> Option<TypeId> {
        let mut current = id;
        let mut seen = HashSet::new();
        loop {
            if !seen.insert(current) {
                return None;
            }
            match self.get(current)? {
                DeclaredType::Alias(target) => current = *target,
                _ => return Some(current),
            }
        }
    }

    /// Returns `true` if a value of type `from` may be used where `to` is
    /// expected.
    ///
    /// Aliases are transparent, objects compare structurally (the source must
    /// provide every target field with an assignable type), arrays are
    /// covariant and nominal types match only themselves.
    pub fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        let mut assuming = HashSet::new();
        self.assignable(from, to, &mut assuming)
    }

    fn assignable(
        &self,
        from: TypeId,
        to: TypeId,
        assuming: &mut HashSet<(TypeId, TypeId)>,
    ) -> bool {
        let (Some(from), Some(to)) = (self.resolve_alias(from), self.resolve_alias(to)) else {
            return false;
        };
        if from == to || to == TypeId::UNKNOWN || from == TypeId::NEVER {
            return true;
        }
        // Recursive object types: a pair already under comparison holds.
        if !assuming.insert((from, to)) {
            return true;
        }

        let result = match (self.get(from), self.get(to)) {
            (Some(DeclaredType::Union(members)), _) => {
                members.iter().all(|m| self.assignable(*m, to, assuming))
            }
            (_, Some(DeclaredType::Union(members))) => {
                members.iter().any(|m| self.assignable(from, *m, assuming))
            }
            (Some(DeclaredType::Object { fields: source }), Some(DeclaredType::Object { fields: target })) => {
                target.iter().all(|(field, expected)| {
                    source
                        .get(field)
                        .is_some_and(|actual| self.assignable(*actual, *expected, assuming))
                })
            }
            (Some(DeclaredType::Array(a)), Some(DeclaredType::Array(b))) => {
                self.assignable(*a, *b, assuming)
            }
            _ => false,
        };

        assuming.remove(&(from, to));
        result
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
