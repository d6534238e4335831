//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to parse source document {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize resource: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {message}")]
    Archive { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl From<zip::result::ZipError> for CoreError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => CoreError::Io(e),
            other => CoreError::Archive {
                message: other.to_string(),
            },
        }
    }
}

impl CoreError {
    /// Whether this is a malformed-input failure rather than an environment fault
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, CoreError::Parse { .. })
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
