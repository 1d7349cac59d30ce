//! Core shared types and errors (backend-agnostic).

use std::io;

use thiserror::Error;

/// Why a resource could not be produced.
///
/// Providers collapse every variant to an absent result at the engine
/// boundary; the variants only exist for diagnostics and the `try_*` loaders.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Resource '{name}' is unreadable: {reason}")]
    Corrupt { name: String, reason: String },
    #[error("Unsupported platform feature: {0}")]
    UnsupportedFeature(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ResourceError {
    pub fn corrupt(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Corrupt {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Maps an I/O failure on `name` to `NotFound` when the OS says so,
    /// otherwise keeps it as a plain I/O error.
    pub fn from_io(name: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(name.to_owned()),
            _ => Self::Io(err),
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type ResourceResult<T> = Result<T, ResourceError>;
