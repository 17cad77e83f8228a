//! Domain-specific errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("refusing to write outside the output directory: {0}")]
    UnsafePath(String),
    #[error("empty file path")]
    EmptyPath,
    #[error("path clashes with an already written file or directory: {0}")]
    PathConflict(String),
}
