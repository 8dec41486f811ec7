//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add pipeline-level context.
///
/// The dump and module variants are raised before any tree is built, so they
/// never overlap with the domain errors in diagnostics.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("mib dump command `{command}` failed (exit code {}): {stderr}", exit_code.map(|c| c.to_string()).unwrap_or_else(|| "none".into()))]
    DumpFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("unparsable mib dump from {origin}: {message}")]
    InvalidDump { origin: String, message: String },

    #[error("expected mib module {expected} not found in dump (found: {})", found.as_deref().unwrap_or("nothing"))]
    ModuleNotFound {
        expected: String,
        found: Option<String>,
    },

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
