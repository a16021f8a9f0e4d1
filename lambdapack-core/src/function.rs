//! Lambda function models

/// Archive entry holding the caller's executable
pub const BINARY_ENTRY: &str = "binary";

/// Archive entry holding the entry point; custom runtimes start this file
pub const BOOTSTRAP_ENTRY: &str = "bootstrap";

/// Handler name passed to CreateFunction
pub const HANDLER: &str = "bootstrap";

/// Function timeout in seconds
pub const TIMEOUT_SECONDS: i32 = 60;

/// Memory allocation in megabytes
pub const MEMORY_SIZE_MB: i32 = 3008;

/// Custom runtime that starts the `bootstrap` entry
pub const RUNTIME: &str = "provided.al2023";

/// Settings for a function about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSettings {
    pub function_name: String,
    pub role: String,
    pub runtime: String,
    pub handler: String,
    pub timeout: i32,
    pub memory_size: i32,
}

impl FunctionSettings {
    /// Settings with the fixed runtime, handler, timeout and memory
    pub fn new(function_name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            role: role.into(),
            runtime: RUNTIME.to_string(),
            handler: HANDLER.to_string(),
            timeout: TIMEOUT_SECONDS,
            memory_size: MEMORY_SIZE_MB,
        }
    }
}

/// What CreateFunction reported back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedFunction {
    pub function_name: String,
    pub function_arn: String,
    /// Base64 SHA-256 of the deployed code, as computed by Lambda
    pub code_sha256: Option<String>,
}
