//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent invalid input values.
///
/// The subtree engine itself never fails: malformed relationship data is
/// normalized and an unknown root yields an empty subtree.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid member id '{value}': {message}")]
    InvalidMemberId { value: String, message: String },

    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("invalid family data in {path}: {message}")]
    InvalidFamilyData { path: PathBuf, message: String },

    #[error("unsupported family file format: {0}")]
    UnsupportedFormat(PathBuf),
}
