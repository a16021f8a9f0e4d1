//! Lambda invocation types

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Failed to start {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} {status}")]
    ExitStatus { path: PathBuf, status: ExitStatus },

    #[error("Output is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

impl InvocationError {
    /// Value of the `Lambda-Runtime-Function-Error-Type` header
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => "Runtime.InvalidPayload",
            Self::Spawn { .. } => "Runtime.SpawnError",
            Self::ExitStatus { .. } => "Runtime.ExitError",
            Self::Decode(_) => "Runtime.DecodeError",
        }
    }
}

/// Pending invocation, as delivered by `/runtime/invocation/next`
#[derive(Debug, Clone)]
pub struct Invocation {
    pub request_id: String,
    pub function_arn: String,
    pub deadline_ms: i64,
    pub payload: Bytes,
}

/// Successful invocation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerOutput {
    pub output: String,
}

/// Lambda error response format
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaErrorResponse {
    pub error_message: String,
    pub error_type: String,
}

impl LambdaErrorResponse {
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
            error_type: error_type.into(),
        }
    }
}

impl From<&InvocationError> for LambdaErrorResponse {
    fn from(error: &InvocationError) -> Self {
        Self::new(error.error_type(), error.to_string())
    }
}
