//! Stable ID newtypes for source-tree entities.
//!
//! All IDs are distinct newtype wrappers over `u32` indexing into the arenas
//! owned by a [`SourceUnit`](crate::unit::SourceUnit), so that a `StmtId`
//! cannot be accidentally used where an `ExprId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Class declaration identity within a source unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub u32);

/// Method identity: the owning class plus the member position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodId {
    pub class: ClassId,
    pub index: u32,
}

/// Statement identifier. Indexes the unit's statement arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StmtId(pub u32);

/// Expression identifier. Indexes the unit's expression arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExprId(pub u32);

// Display implementations -- just print the inner value.

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class.0, self.index)
    }
}

impl fmt::Display for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StmtId {
    /// Arena slot for this statement.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ExprId {
    /// Arena slot for this expression.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
