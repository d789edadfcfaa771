//! Nested, serde-friendly source-tree format.
//!
//! Host parsers hand a file over as a [`SourceFile`]: classes with their
//! decorators and method bodies as nested statement/expression nodes tagged
//! by `"type"`, plus the type declarations visible in the file. [`SourceFile::lower`]
//! flattens it into a [`SourceUnit`] arena and a [`TypeRegistry`].
//!
//! The same node types double as a compact builder API for tests:
//!
//! ```
//! use routecheck_core::tree::{ClassNode, ExprNode, MethodNode, StmtNode};
//!
//! let class = ClassNode::new("UserController")
//!     .decorator(ExprNode::decorator("BasePath", vec![ExprNode::string("/user")]))
//!     .method(
//!         MethodNode::new("getUser")
//!             .decorator(ExprNode::decorator(
//!                 "Response",
//!                 vec![ExprNode::num(200), ExprNode::ident("UserDTO")],
//!             ))
//!             .body(vec![StmtNode::ret(ExprNode::this_call(
//!                 "rtn",
//!                 Some("UserDTO"),
//!                 vec![ExprNode::num(200), ExprNode::object(vec![])],
//!             ))]),
//!     );
//! assert_eq!(class.methods.len(), 1);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ast::{
    ClassDecl, Decorator, ExprKind, LoopKind, MethodDecl, MethodKind, StmtKind, SwitchCase,
    TypeRef, TypeRefKind,
};
use crate::error::CoreError;
use crate::id::{ExprId, StmtId};
use crate::span::Span;
use crate::type_id::{TypeId, TypeRegistry};
use crate::types::DeclaredType;
use crate::unit::SourceUnit;

/// One file as delivered by a host parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    #[serde(default)]
    pub classes: Vec<ClassNode>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassNode {
    pub name: String,
    #[serde(default)]
    pub decorators: Vec<ExprNode>,
    #[serde(default)]
    pub methods: Vec<MethodNode>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodNode {
    pub name: String,
    #[serde(default)]
    pub kind: MethodKind,
    #[serde(default)]
    pub decorators: Vec<ExprNode>,
    /// Statements of the body block; absent for signatures without a body.
    #[serde(default)]
    pub body: Option<Vec<StmtNode>>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseNode {
    #[serde(default)]
    pub test: Option<ExprNode>,
    #[serde(default)]
    pub body: Vec<StmtNode>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StmtNode {
    Block {
        body: Vec<StmtNode>,
        #[serde(default)]
        span: Span,
    },
    If {
        test: ExprNode,
        consequent: Box<StmtNode>,
        #[serde(default)]
        alternate: Option<Box<StmtNode>>,
        #[serde(default)]
        span: Span,
    },
    Switch {
        discriminant: ExprNode,
        cases: Vec<CaseNode>,
        #[serde(default)]
        span: Span,
    },
    Loop {
        kind: LoopKind,
        body: Box<StmtNode>,
        #[serde(default)]
        span: Span,
    },
    Try {
        block: Box<StmtNode>,
        #[serde(default)]
        handler: Option<Box<StmtNode>>,
        #[serde(default)]
        finalizer: Option<Box<StmtNode>>,
        #[serde(default)]
        span: Span,
    },
    Labeled {
        label: String,
        body: Box<StmtNode>,
        #[serde(default)]
        span: Span,
    },
    Return {
        #[serde(default)]
        argument: Option<ExprNode>,
        #[serde(default)]
        span: Span,
    },
    Expr {
        expr: ExprNode,
        #[serde(default)]
        span: Span,
    },
    Function {
        name: String,
        body: Vec<StmtNode>,
        #[serde(default)]
        span: Span,
    },
    Other {
        #[serde(default)]
        span: Span,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExprNode {
    Number {
        value: f64,
        #[serde(default)]
        span: Span,
    },
    String {
        value: String,
        #[serde(default)]
        span: Span,
    },
    Bool {
        value: bool,
        #[serde(default)]
        span: Span,
    },
    Null {
        #[serde(default)]
        span: Span,
    },
    Ident {
        name: String,
        #[serde(default)]
        span: Span,
    },
    This {
        #[serde(default)]
        span: Span,
    },
    Member {
        object: Box<ExprNode>,
        property: String,
        #[serde(default)]
        span: Span,
    },
    Call {
        callee: Box<ExprNode>,
        #[serde(default, rename = "typeArgs")]
        type_args: Vec<TypeNode>,
        #[serde(default)]
        args: Vec<ExprNode>,
        #[serde(default)]
        span: Span,
    },
    New {
        callee: Box<ExprNode>,
        #[serde(default)]
        args: Vec<ExprNode>,
        #[serde(default)]
        span: Span,
    },
    Array {
        elements: Vec<ExprNode>,
        #[serde(default)]
        span: Span,
    },
    Object {
        #[serde(default)]
        properties: Vec<(String, ExprNode)>,
        #[serde(default)]
        span: Span,
    },
    Function {
        body: Vec<StmtNode>,
        #[serde(default)]
        span: Span,
    },
    Other {
        #[serde(default)]
        text: String,
        #[serde(default)]
        span: Span,
    },
}

/// A call-site type argument: `{ "name": "Ns.UserDTO" }` or
/// `{ "text": "{ id: number }" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeNode {
    Named {
        name: String,
        #[serde(default)]
        span: Span,
    },
    Anonymous {
        text: String,
        #[serde(default)]
        span: Span,
    },
}

/// A named type declaration. Type expressions are names, with a `[]` suffix
/// for arrays (`"UserDTO[]"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub shape: ShapeNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ShapeNode {
    Object { fields: IndexMap<String, String> },
    Alias { target: String },
    Union { members: Vec<String> },
    Array { element: String },
    Nominal,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

impl ClassNode {
    pub fn new(name: &str) -> Self {
        ClassNode {
            name: name.to_string(),
            decorators: Vec::new(),
            methods: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn decorator(mut self, expr: ExprNode) -> Self {
        self.decorators.push(expr);
        self
    }

    pub fn method(mut self, method: MethodNode) -> Self {
        self.methods.push(method);
        self
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.span = Span::new(line, column);
        self
    }
}

impl MethodNode {
    pub fn new(name: &str) -> Self {
        MethodNode {
            name: name.to_string(),
            kind: MethodKind::Method,
            decorators: Vec::new(),
            body: None,
            span: Span::default(),
        }
    }

    pub fn kind(mut self, kind: MethodKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn decorator(mut self, expr: ExprNode) -> Self {
        self.decorators.push(expr);
        self
    }

    pub fn body(mut self, stmts: Vec<StmtNode>) -> Self {
        self.body = Some(stmts);
        self
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.span = Span::new(line, column);
        self
    }
}

impl StmtNode {
    pub fn block(body: Vec<StmtNode>) -> Self {
        StmtNode::Block {
            body,
            span: Span::default(),
        }
    }

    pub fn if_else(test: ExprNode, consequent: StmtNode, alternate: Option<StmtNode>) -> Self {
        StmtNode::If {
            test,
            consequent: Box::new(consequent),
            alternate: alternate.map(Box::new),
            span: Span::default(),
        }
    }

    pub fn switch(discriminant: ExprNode, cases: Vec<CaseNode>) -> Self {
        StmtNode::Switch {
            discriminant,
            cases,
            span: Span::default(),
        }
    }

    pub fn looped(kind: LoopKind, body: StmtNode) -> Self {
        StmtNode::Loop {
            kind,
            body: Box::new(body),
            span: Span::default(),
        }
    }

    pub fn try_catch(block: StmtNode, handler: Option<StmtNode>, finalizer: Option<StmtNode>) -> Self {
        StmtNode::Try {
            block: Box::new(block),
            handler: handler.map(Box::new),
            finalizer: finalizer.map(Box::new),
            span: Span::default(),
        }
    }

    pub fn ret(argument: ExprNode) -> Self {
        StmtNode::Return {
            argument: Some(argument),
            span: Span::default(),
        }
    }

    pub fn ret_empty() -> Self {
        StmtNode::Return {
            argument: None,
            span: Span::default(),
        }
    }

    pub fn expr(expr: ExprNode) -> Self {
        StmtNode::Expr {
            expr,
            span: Span::default(),
        }
    }

    pub fn function(name: &str, body: Vec<StmtNode>) -> Self {
        StmtNode::Function {
            name: name.to_string(),
            body,
            span: Span::default(),
        }
    }

    pub fn other() -> Self {
        StmtNode::Other {
            span: Span::default(),
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        *self.span_mut() = Span::new(line, column);
        self
    }

    pub fn span(&self) -> Span {
        match self {
            StmtNode::Block { span, .. }
            | StmtNode::If { span, .. }
            | StmtNode::Switch { span, .. }
            | StmtNode::Loop { span, .. }
            | StmtNode::Try { span, .. }
            | StmtNode::Labeled { span, .. }
            | StmtNode::Return { span, .. }
            | StmtNode::Expr { span, .. }
            | StmtNode::Function { span, .. }
            | StmtNode::Other { span } => *span,
        }
    }

    fn span_mut(&mut self) -> &mut Span {
        match self {
            StmtNode::Block { span, .. }
            | StmtNode::If { span, .. }
            | StmtNode::Switch { span, .. }
            | StmtNode::Loop { span, .. }
            | StmtNode::Try { span, .. }
            | StmtNode::Labeled { span, .. }
            | StmtNode::Return { span, .. }
            | StmtNode::Expr { span, .. }
            | StmtNode::Function { span, .. }
            | StmtNode::Other { span } => span,
        }
    }
}

impl CaseNode {
    pub fn case(test: ExprNode, body: Vec<StmtNode>) -> Self {
        CaseNode {
            test: Some(test),
            body,
            span: Span::default(),
        }
    }

    pub fn default(body: Vec<StmtNode>) -> Self {
        CaseNode {
            test: None,
            body,
            span: Span::default(),
        }
    }
}

impl ExprNode {
    pub fn num(value: impl Into<f64>) -> Self {
        ExprNode::Number {
            value: value.into(),
            span: Span::default(),
        }
    }

    pub fn string(value: &str) -> Self {
        ExprNode::String {
            value: value.to_string(),
            span: Span::default(),
        }
    }

    pub fn ident(name: &str) -> Self {
        ExprNode::Ident {
            name: name.to_string(),
            span: Span::default(),
        }
    }

    pub fn this() -> Self {
        ExprNode::This {
            span: Span::default(),
        }
    }

    pub fn member(object: ExprNode, property: &str) -> Self {
        ExprNode::Member {
            object: Box::new(object),
            property: property.to_string(),
            span: Span::default(),
        }
    }

    pub fn call(callee: ExprNode, type_args: Vec<TypeNode>, args: Vec<ExprNode>) -> Self {
        ExprNode::Call {
            callee: Box::new(callee),
            type_args,
            args,
            span: Span::default(),
        }
    }

    /// `this.<method><tag>(args...)`.
    pub fn this_call(method: &str, tag: Option<&str>, args: Vec<ExprNode>) -> Self {
        let type_args = tag.map(TypeNode::named).into_iter().collect();
        ExprNode::call(ExprNode::member(ExprNode::this(), method), type_args, args)
    }

    /// `@name(args...)` as a decorator expression.
    pub fn decorator(name: &str, args: Vec<ExprNode>) -> Self {
        ExprNode::call(ExprNode::ident(name), Vec::new(), args)
    }

    pub fn array(elements: Vec<ExprNode>) -> Self {
        ExprNode::Array {
            elements,
            span: Span::default(),
        }
    }

    pub fn object(properties: Vec<(&str, ExprNode)>) -> Self {
        ExprNode::Object {
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            span: Span::default(),
        }
    }

    pub fn function(body: Vec<StmtNode>) -> Self {
        ExprNode::Function {
            body,
            span: Span::default(),
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        *self.span_mut() = Span::new(line, column);
        self
    }

    pub fn span(&self) -> Span {
        match self {
            ExprNode::Number { span, .. }
            | ExprNode::String { span, .. }
            | ExprNode::Bool { span, .. }
            | ExprNode::Null { span }
            | ExprNode::Ident { span, .. }
            | ExprNode::This { span }
            | ExprNode::Member { span, .. }
            | ExprNode::Call { span, .. }
            | ExprNode::New { span, .. }
            | ExprNode::Array { span, .. }
            | ExprNode::Object { span, .. }
            | ExprNode::Function { span, .. }
            | ExprNode::Other { span, .. } => *span,
        }
    }

    fn span_mut(&mut self) -> &mut Span {
        match self {
            ExprNode::Number { span, .. }
            | ExprNode::String { span, .. }
            | ExprNode::Bool { span, .. }
            | ExprNode::Null { span }
            | ExprNode::Ident { span, .. }
            | ExprNode::This { span }
            | ExprNode::Member { span, .. }
            | ExprNode::Call { span, .. }
            | ExprNode::New { span, .. }
            | ExprNode::Array { span, .. }
            | ExprNode::Object { span, .. }
            | ExprNode::Function { span, .. }
            | ExprNode::Other { span, .. } => span,
        }
    }
}

impl TypeNode {
    pub fn named(name: &str) -> Self {
        TypeNode::Named {
            name: name.to_string(),
            span: Span::default(),
        }
    }

    pub fn anonymous(text: &str) -> Self {
        TypeNode::Anonymous {
            text: text.to_string(),
            span: Span::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Lowering
// ---------------------------------------------------------------------------

impl SourceFile {
    /// Parses the JSON form produced by host parsers.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Flattens the nested tree into an arena and builds the file's type
    /// registry.
    pub fn lower(&self) -> Result<(SourceUnit, TypeRegistry), CoreError> {
        Ok((self.lower_unit(), lower_types(&self.types)?))
    }

    /// Flattens only the syntax tree.
    pub fn lower_unit(&self) -> SourceUnit {
        let mut unit = SourceUnit::new(&self.path);
        for class in &self.classes {
            let decl = ClassDecl {
                name: class.name.clone(),
                decorators: class
                    .decorators
                    .iter()
                    .map(|d| lower_decorator(&mut unit, d))
                    .collect(),
                methods: class
                    .methods
                    .iter()
                    .map(|m| lower_method(&mut unit, m))
                    .collect(),
                span: class.span,
            };
            unit.add_class(decl);
        }
        unit
    }
}

fn lower_decorator(unit: &mut SourceUnit, expr: &ExprNode) -> Decorator {
    Decorator {
        expr: lower_expr(unit, expr),
        span: expr.span(),
    }
}

fn lower_method(unit: &mut SourceUnit, method: &MethodNode) -> MethodDecl {
    let decorators = method
        .decorators
        .iter()
        .map(|d| lower_decorator(unit, d))
        .collect();
    let body = method.body.as_ref().map(|stmts| {
        let children = lower_stmts(unit, stmts);
        unit.add_stmt(StmtKind::Block(children), method.span)
    });
    MethodDecl {
        name: method.name.clone(),
        kind: method.kind,
        decorators,
        body,
        span: method.span,
    }
}

fn lower_stmts(unit: &mut SourceUnit, stmts: &[StmtNode]) -> Vec<StmtId> {
    stmts.iter().map(|s| lower_stmt(unit, s)).collect()
}

fn lower_stmt(unit: &mut SourceUnit, stmt: &StmtNode) -> StmtId {
    let kind = match stmt {
        StmtNode::Block { body, .. } => StmtKind::Block(lower_stmts(unit, body)),
        StmtNode::If {
            test,
            consequent,
            alternate,
            ..
        } => StmtKind::If {
            test: lower_expr(unit, test),
            consequent: lower_stmt(unit, consequent),
            alternate: alternate.as_deref().map(|s| lower_stmt(unit, s)),
        },
        StmtNode::Switch {
            discriminant,
            cases,
            ..
        } => StmtKind::Switch {
            discriminant: lower_expr(unit, discriminant),
            cases: cases
                .iter()
                .map(|case| SwitchCase {
                    test: case.test.as_ref().map(|t| lower_expr(unit, t)),
                    body: lower_stmts(unit, &case.body),
                    span: case.span,
                })
                .collect(),
        },
        StmtNode::Loop { kind, body, .. } => StmtKind::Loop {
            kind: *kind,
            body: lower_stmt(unit, body),
        },
        StmtNode::Try {
            block,
            handler,
            finalizer,
            ..
        } => StmtKind::Try {
            block: lower_stmt(unit, block),
            handler: handler.as_deref().map(|s| lower_stmt(unit, s)),
            finalizer: finalizer.as_deref().map(|s| lower_stmt(unit, s)),
        },
        StmtNode::Labeled { label, body, .. } => StmtKind::Labeled {
            label: label.clone(),
            body: lower_stmt(unit, body),
        },
        StmtNode::Return { argument, .. } => StmtKind::Return {
            argument: argument.as_ref().map(|a| lower_expr(unit, a)),
        },
        StmtNode::Expr { expr, .. } => StmtKind::Expr(lower_expr(unit, expr)),
        StmtNode::Function { name, body, span } => {
            let children = lower_stmts(unit, body);
            StmtKind::FunctionDecl {
                name: name.clone(),
                body: unit.add_stmt(StmtKind::Block(children), *span),
            }
        }
        StmtNode::Other { .. } => StmtKind::Other,
    };
    unit.add_stmt(kind, stmt.span())
}

fn lower_args(unit: &mut SourceUnit, args: &[ExprNode]) -> SmallVec<[ExprId; 2]> {
    args.iter().map(|a| lower_expr(unit, a)).collect()
}

fn lower_expr(unit: &mut SourceUnit, expr: &ExprNode) -> ExprId {
    let kind = match expr {
        ExprNode::Number { value, .. } => ExprKind::Number(*value),
        ExprNode::String { value, .. } => ExprKind::String(value.clone()),
        ExprNode::Bool { value, .. } => ExprKind::Bool(*value),
        ExprNode::Null { .. } => ExprKind::Null,
        ExprNode::Ident { name, .. } => ExprKind::Ident(name.clone()),
        ExprNode::This { .. } => ExprKind::This,
        ExprNode::Member {
            object, property, ..
        } => ExprKind::Member {
            object: lower_expr(unit, object),
            property: property.clone(),
        },
        ExprNode::Call {
            callee,
            type_args,
            args,
            ..
        } => ExprKind::Call {
            callee: lower_expr(unit, callee),
            type_args: type_args.iter().map(lower_type_arg).collect(),
            args: lower_args(unit, args),
        },
        ExprNode::New { callee, args, .. } => ExprKind::New {
            callee: lower_expr(unit, callee),
            args: lower_args(unit, args),
        },
        ExprNode::Array { elements, .. } => ExprKind::Array(
            elements.iter().map(|e| lower_expr(unit, e)).collect(),
        ),
        ExprNode::Object { properties, .. } => ExprKind::Object(
            properties
                .iter()
                .map(|(key, value)| (key.clone(), lower_expr(unit, value)))
                .collect(),
        ),
        ExprNode::Function { body, span } => {
            let children = lower_stmts(unit, body);
            ExprKind::Function {
                body: unit.add_stmt(StmtKind::Block(children), *span),
            }
        }
        ExprNode::Other { text, .. } => ExprKind::Other(text.clone()),
    };
    unit.add_expr(kind, expr.span())
}

fn lower_type_arg(node: &TypeNode) -> TypeRef {
    match node {
        TypeNode::Named { name, span } => TypeRef {
            kind: TypeRefKind::Named {
                path: name.split('.').map(str::to_string).collect(),
            },
            span: *span,
        },
        TypeNode::Anonymous { text, span } => TypeRef {
            kind: TypeRefKind::Anonymous { text: text.clone() },
            span: *span,
        },
    }
}

/// Builds a registry from declarations. Names are registered first so shapes
/// may reference declarations in any order.
fn lower_types(decls: &[TypeDecl]) -> Result<TypeRegistry, CoreError> {
    let mut registry = TypeRegistry::new();
    let mut ids = Vec::with_capacity(decls.len());
    for decl in decls {
        ids.push(registry.register_named(&decl.name, DeclaredType::Nominal)?);
    }

    for (decl, id) in decls.iter().zip(ids) {
        let mut resolve = |name: &str| type_expr(&mut registry, name, &decl.name);
        let shape = match &decl.shape {
            ShapeNode::Object { fields } => {
                let mut lowered = IndexMap::with_capacity(fields.len());
                for (field, ty) in fields {
                    lowered.insert(field.clone(), resolve(ty)?);
                }
                DeclaredType::Object { fields: lowered }
            }
            ShapeNode::Alias { target } => DeclaredType::Alias(resolve(target)?),
            ShapeNode::Union { members } => DeclaredType::Union(
                members
                    .iter()
                    .map(|m| resolve(m))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            ShapeNode::Array { element } => DeclaredType::Array(resolve(element)?),
            ShapeNode::Nominal => DeclaredType::Nominal,
        };
        registry.define(id, shape)?;
    }
    Ok(registry)
}

fn type_expr(registry: &mut TypeRegistry, name: &str, referenced_by: &str) -> Result<TypeId, CoreError> {
    let name = name.trim();
    if let Some(element) = name.strip_suffix("[]") {
        let element = type_expr(registry, element, referenced_by)?;
        return Ok(registry.register(DeclaredType::Array(element)));
    }
    registry
        .get_by_name(name)
        .ok_or_else(|| CoreError::UnknownTypeName {
            name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        })
}
