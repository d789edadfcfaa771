//! The type-resolution seam.
//!
//! The checker only needs two questions answered: what a type name refers to,
//! and whether one resolved type may stand in for another. Without a resolver,
//! type matching degrades to identifier equality.

use routecheck_core::type_id::{TypeId, TypeRegistry};

pub trait TypeResolver {
    /// Resolves a (possibly dotted) type name declared in scope.
    fn resolve(&self, name: &str) -> Option<TypeId>;

    /// Whether a value of type `from` may be used where `to` is expected.
    fn is_assignable(&self, from: TypeId, to: TypeId) -> bool;
}

impl TypeResolver for TypeRegistry {
    fn resolve(&self, name: &str) -> Option<TypeId> {
        self.get_by_name(name)
    }

    fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        TypeRegistry::is_assignable(self, from, to)
    }
}
