//! Error types

use std::path::PathBuf;
use thiserror::Error;

/// Failure while building or inspecting a function archive
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write archive {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Failure while installing a function
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Packaging failed: {0}")]
    Package(#[from] PackageError),

    #[error("Cannot read package {path}: {source}")]
    ReadPackage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("DeleteFunction failed for '{function}': {message}")]
    Delete { function: String, message: String },

    #[error("CreateFunction failed for '{function}': {message}")]
    Create { function: String, message: String },

    #[error("CreateFunction for '{0}' returned no function ARN")]
    MissingArn(String),
}

impl InstallError {
    pub fn delete(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Delete {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn create(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Create {
            function: function.into(),
            message: message.into(),
        }
    }
}
