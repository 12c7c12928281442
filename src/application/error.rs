//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, MemberId};

/// Application errors wrap domain errors and add caller-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// The requested root produced an empty subtree.
    #[error("member not found: {0}")]
    RootNotFound(MemberId),

    #[error("no root member: pass --root or mark a member with isRoot")]
    NoRootMember,

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
