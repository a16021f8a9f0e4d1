//! Lambda function installation for lambdapack
//!
//! Uploads a packaged function through the Lambda management API.

pub mod install;
pub mod service;

pub use install::{deploy, install_lambda_package, DeployPlan};
pub use service::{FunctionService, LambdaFunctionService};
