pub mod ast;
pub mod error;
pub mod id;
pub mod span;
pub mod tree;
pub mod type_id;
pub mod types;
pub mod unit;

// Re-export commonly used types
pub use ast::{ClassDecl, Decorator, Expr, ExprKind, MethodDecl, MethodKind, Stmt, StmtKind, TypeRef, TypeRefKind};
pub use error::CoreError;
pub use id::{ClassId, ExprId, MethodId, StmtId};
pub use span::Span;
pub use tree::SourceFile;
pub use type_id::{TypeId, TypeRegistry};
pub use types::{DeclaredType, Primitive};
pub use unit::SourceUnit;
