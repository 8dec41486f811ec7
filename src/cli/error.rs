//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

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
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                    ApplicationError::InvalidDump { .. } => crate::exitcode::DATAERR,
                    ApplicationError::ModuleNotFound { .. } => crate::exitcode::NOINPUT,
                    ApplicationError::DumpFailed { .. } => crate::exitcode::UNAVAILABLE,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_domain_error_when_mapping_then_dataerr() {
        let err: CliError = ApplicationError::from(DomainError::UnsupportedAccess {
            name: "trap".into(),
            access: "notify".into(),
        })
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_pipeline_errors_when_mapping_then_distinct_codes() {
        let dump: CliError = ApplicationError::DumpFailed {
            command: "mibdump".into(),
            exit_code: Some(2),
            stderr: String::new(),
        }
        .into();
        let module: CliError = ApplicationError::ModuleNotFound {
            expected: "ACME-MIB".into(),
            found: None,
        }
        .into();

        assert_eq!(dump.exit_code(), crate::exitcode::UNAVAILABLE);
        assert_eq!(module.exit_code(), crate::exitcode::NOINPUT);
    }
}
