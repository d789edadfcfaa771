//! SourceUnit: the arena holding one parsed compilation unit.
//!
//! [`SourceUnit`] is the single entry point for constructing and querying a
//! parsed file. Classes, statements and expressions are stored in flat
//! vectors and addressed by the ID newtypes in [`crate::id`]; children refer
//! to each other by ID only, so the arena owns every node and analysis
//! passes can key their own side tables by ID.
//!
//! Because children are plain indices, nothing prevents a malformed unit from
//! containing a reference to an ancestor. Walkers over the arena must guard
//! against revisiting nodes.

use serde::{Deserialize, Serialize};

use crate::ast::{ClassDecl, Expr, ExprKind, MethodDecl, Stmt, StmtKind};
use crate::error::CoreError;
use crate::id::{ClassId, ExprId, MethodId, StmtId};
use crate::span::Span;

/// One parsed compilation unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Path of the file this unit was parsed from, used in reports.
    pub path: String,
    classes: Vec<ClassDecl>,
    stmts: Vec<Stmt>,
    exprs: Vec<Expr>,
}

impl SourceUnit {
    /// Creates an empty unit for `path`.
    pub fn new(path: &str) -> Self {
        SourceUnit {
            path: path.to_string(),
            ..Default::default()
        }
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    /// Appends a statement and returns its ID.
    pub fn add_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        let id = StmtId(self.stmts.len() as u32);
        self.stmts.push(Stmt { kind, span });
        id
    }

    /// Appends an expression and returns its ID.
    pub fn add_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(Expr { kind, span });
        id
    }

    /// Appends a class declaration and returns its ID.
    pub fn add_class(&mut self, class: ClassDecl) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(class);
        id
    }

    /// Replaces the kind of an existing statement.
    ///
    /// Lets callers wire up child references after both nodes exist.
    pub fn set_stmt_kind(&mut self, id: StmtId, kind: StmtKind) -> Result<(), CoreError> {
        let stmt = self
            .stmts
            .get_mut(id.index())
            .ok_or(CoreError::StmtNotFound { id })?;
        stmt.kind = kind;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All classes in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDecl)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, c)| (ClassId(i as u32), c))
    }

    pub fn class(&self, id: ClassId) -> Result<&ClassDecl, CoreError> {
        self.classes
            .get(id.0 as usize)
            .ok_or(CoreError::ClassNotFound { id })
    }

    pub fn method(&self, id: MethodId) -> Result<&MethodDecl, CoreError> {
        self.class(id.class)?
            .methods
            .get(id.index as usize)
            .ok_or(CoreError::MethodNotFound { id })
    }

    pub fn stmt(&self, id: StmtId) -> Result<&Stmt, CoreError> {
        self.stmts
            .get(id.index())
            .ok_or(CoreError::StmtNotFound { id })
    }

    pub fn expr(&self, id: ExprId) -> Result<&Expr, CoreError> {
        self.exprs
            .get(id.index())
            .ok_or(CoreError::ExprNotFound { id })
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Name of the callee when `id` is a call to a plain identifier, as in
    /// `Response(200, T)`.
    pub fn called_ident(&self, id: ExprId) -> Result<Option<&str>, CoreError> {
        let ExprKind::Call { callee, .. } = &self.expr(id)?.kind else {
            return Ok(None);
        };
        match &self.expr(*callee)?.kind {
            ExprKind::Ident(name) => Ok(Some(name.as_str())),
            _ => Ok(None),
        }
    }
}
