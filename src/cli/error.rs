//! CLI-level errors (wraps infrastructure errors)

use std::io;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Converter { .. } => crate::exitcode::UNAVAILABLE,
                InfraError::Application(e) => match e {
                    ApplicationError::RootNotFound(_) | ApplicationError::NoRootMember => {
                        crate::exitcode::NOINPUT
                    }
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { source, .. } => {
                        match source.downcast_ref::<io::Error>() {
                            Some(e) if e.kind() == io::ErrorKind::NotFound => {
                                crate::exitcode::NOINPUT
                            }
                            _ => crate::exitcode::IOERR,
                        }
                    }
                    ApplicationError::Domain(e) => match e {
                        DomainError::InvalidFamilyData { .. }
                        | DomainError::UnsupportedFormat(_) => crate::exitcode::DATAERR,
                        DomainError::InvalidMemberId { .. } | DomainError::InvalidValue { .. } => {
                            crate::exitcode::USAGE
                        }
                    },
                },
            },
        }
    }
}
