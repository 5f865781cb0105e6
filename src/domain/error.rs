//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeKind;

/// Domain errors are contract violations against the tree model.
/// They propagate to the immediate caller; nothing in the domain masks them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("row {row} out of range (child count {len})")]
    IndexOutOfRange { row: usize, len: usize },

    #[error("node is not attached to the tree")]
    DetachedNode,

    #[error("operation not valid for {kind} node")]
    InvalidKind { kind: NodeKind },
}

/// Malformed ST source text. Raised by the grammar front-end before any
/// structural event is handed to the builder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error at {line}:{column}: {message}")]
pub struct ParseError {
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
