//! Runs the bundled binary for one invocation

use crate::invocation::{HandlerOutput, InvocationError};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Archive entry the packager stores the caller's executable under
const BINARY_ENTRY: &str = "binary";

/// Invokes one executable, passing the event as positional arguments
#[derive(Debug, Clone)]
pub struct Handler {
    binary: PathBuf,
}

impl Handler {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// `$LAMBDA_TASK_ROOT/binary`, or `./binary` outside Lambda
    pub fn from_env() -> Self {
        let root = std::env::var_os("LAMBDA_TASK_ROOT")
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        Self::new(root.join(BINARY_ENTRY))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Decode a raw Runtime API payload and handle it
    pub async fn handle_payload(&self, payload: &[u8]) -> Result<HandlerOutput, InvocationError> {
        let event: Value = serde_json::from_slice(payload)
            .map_err(|e| InvocationError::InvalidPayload(e.to_string()))?;
        self.handle(event).await
    }

    /// Run the binary with the event's elements as arguments and return its
    /// standard output.
    ///
    /// Standard error is inherited so it ends up in the function's log stream.
    pub async fn handle(&self, event: Value) -> Result<HandlerOutput, InvocationError> {
        let args = event_arguments(event)?;
        debug!(binary = %self.binary.display(), ?args, "Running binary");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|source| InvocationError::Spawn {
                path: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(InvocationError::ExitStatus {
                path: self.binary.clone(),
                status: output.status,
            });
        }

        Ok(HandlerOutput {
            output: String::from_utf8(output.stdout)?,
        })
    }
}

/// Text form of every element of a JSON array event.
///
/// Strings are passed through unquoted; other values use their JSON text.
pub fn event_arguments(event: Value) -> Result<Vec<String>, InvocationError> {
    match event {
        Value::Array(values) => Ok(values.into_iter().map(to_argument).collect()),
        other => Err(InvocationError::InvalidPayload(format!(
            "expected a JSON array, got {}",
            kind(&other)
        ))),
    }
}

fn to_argument(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
