//! Node kinds of the parsed source tree.
//!
//! Statements and expressions live in the arenas of a
//! [`SourceUnit`](crate::unit::SourceUnit) and refer to their children by ID.
//! The statement set is closed: control-flow walkers match on [`StmtKind`]
//! exhaustively instead of reflecting over arbitrary node properties.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::id::{ExprId, StmtId};
use crate::span::Span;

/// A class declaration with its decorators and members, in source order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub decorators: Vec<Decorator>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

/// A decorator (annotation) attached to a class or method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Decorator {
    /// The decorator expression, usually a call such as `Response(200, T)`.
    pub expr: ExprId,
    pub span: Span,
}

/// What kind of class member a method is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MethodKind {
    #[default]
    Method,
    Constructor,
    Getter,
    Setter,
}

/// A method member of a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub kind: MethodKind,
    pub decorators: Vec<Decorator>,
    /// Root block of the body. `None` for abstract and overload signatures.
    pub body: Option<StmtId>,
    pub span: Span,
}

/// A statement node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Loop flavours. All of them are walked the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoopKind {
    While,
    DoWhile,
    For,
    ForIn,
    ForOf,
}

/// One `case`/`default` arm of a switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchCase {
    /// `None` for the `default` arm.
    pub test: Option<ExprId>,
    pub body: Vec<StmtId>,
    pub span: Span,
}

/// The closed set of statement kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StmtKind {
    Block(Vec<StmtId>),
    If {
        test: ExprId,
        consequent: StmtId,
        alternate: Option<StmtId>,
    },
    Switch {
        discriminant: ExprId,
        cases: Vec<SwitchCase>,
    },
    Loop {
        kind: LoopKind,
        body: StmtId,
    },
    Try {
        block: StmtId,
        handler: Option<StmtId>,
        finalizer: Option<StmtId>,
    },
    Labeled {
        label: String,
        body: StmtId,
    },
    Return {
        argument: Option<ExprId>,
    },
    Expr(ExprId),
    /// A nested function declaration: an independent callable scope.
    FunctionDecl {
        name: String,
        body: StmtId,
    },
    /// Declarations, `throw`, `break`, and anything else without nested
    /// statements.
    Other,
}

/// An expression node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// A type argument written at a call site, e.g. the `UserDTO` in
/// `this.rtn<UserDTO>(...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRefKind {
    /// A (possibly qualified) type name: `["Ns", "UserDTO"]`.
    Named { path: Vec<String> },
    /// Inline object types, unions, literal types and the like.
    Anonymous { text: String },
}

impl TypeRef {
    /// Dotted name for named references, `None` for anonymous ones.
    pub fn dotted_name(&self) -> Option<String> {
        match &self.kind {
            TypeRefKind::Named { path } => Some(path.join(".")),
            TypeRefKind::Anonymous { .. } => None,
        }
    }

    /// Source-ish rendering used in diagnostics.
    pub fn display_text(&self) -> String {
        match &self.kind {
            TypeRefKind::Named { path } => path.join("."),
            TypeRefKind::Anonymous { text } => text.clone(),
        }
    }
}

/// Expression kinds. Only the shapes the checker inspects are modelled in
/// detail; the rest collapse into [`ExprKind::Other`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
    Ident(String),
    This,
    Member {
        object: ExprId,
        property: String,
    },
    Call {
        callee: ExprId,
        type_args: Vec<TypeRef>,
        args: SmallVec<[ExprId; 2]>,
    },
    New {
        callee: ExprId,
        args: SmallVec<[ExprId; 2]>,
    },
    Array(Vec<ExprId>),
    Object(Vec<(String, ExprId)>),
    /// Arrow function or function expression: an independent callable scope.
    Function {
        body: StmtId,
    },
    Other(String),
}
