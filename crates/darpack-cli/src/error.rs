//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use darpack_core::CoreError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Configuration file or option problem
    #[error("Configuration error: {message}")]
    #[diagnostic(code(darpack::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Archive could not be written or read
    #[error("Archive error: {message}")]
    #[diagnostic(code(darpack::cli::archive))]
    Archive { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(darpack::cli::io))]
    Io { message: String },

    /// Anything else
    #[error("{message}")]
    #[diagnostic(code(darpack::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Archive { .. } => exit_codes::ARCHIVE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Exit code for a report returned by a command
    pub fn exit_code_for(report: &miette::Report) -> i32 {
        report
            .downcast_ref::<CliError>()
            .map_or(exit_codes::ERROR, CliError::exit_code)
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidConfig { message } => CliError::Config {
                message,
                help: Some("see `darpack package --help` for the available options".to_string()),
            },
            CoreError::Io(e) => CliError::Io {
                message: e.to_string(),
            },
            CoreError::Archive { message } => CliError::Archive { message },
            other => CliError::Other {
                message: other.to_string(),
            },
        }
    }
}

/// Extension trait to turn core results into diagnostics carrying an exit code
pub trait IntoCliResult<T> {
    fn into_cli_result(self) -> miette::Result<T>;
}

impl<T> IntoCliResult<T> for darpack_core::Result<T> {
    fn into_cli_result(self) -> miette::Result<T> {
        self.map_err(|e| miette::Report::new(CliError::from(e)))
    }
}
