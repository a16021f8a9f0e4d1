//! Lambda custom runtime for lambdapack
//!
//! Polls the Lambda Runtime API, runs the bundled `binary` with the
//! invocation's arguments and returns its standard output.

pub mod handler;
pub mod invocation;
pub mod runtime;

pub use handler::Handler;
pub use invocation::{HandlerOutput, Invocation, InvocationError, LambdaErrorResponse};
pub use runtime::{RuntimeApiError, RuntimeClient};
