//! Lambda Runtime API client
//!
//! Implements the runtime side of the Lambda Runtime API: poll for the next
//! invocation, then post either a response or an error for it.

use crate::handler::Handler;
use crate::invocation::{Invocation, InvocationError, LambdaErrorResponse};
use reqwest::{header::HeaderMap, Client, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info_span, Instrument};

const API_VERSION: &str = "2018-06-01";

const REQUEST_ID_HEADER: &str = "Lambda-Runtime-Aws-Request-Id";
const FUNCTION_ARN_HEADER: &str = "Lambda-Runtime-Invoked-Function-Arn";
const DEADLINE_HEADER: &str = "Lambda-Runtime-Deadline-Ms";
const ERROR_TYPE_HEADER: &str = "Lambda-Runtime-Function-Error-Type";

#[derive(Debug, Error)]
pub enum RuntimeApiError {
    #[error("AWS_LAMBDA_RUNTIME_API is not set")]
    MissingEndpoint,

    #[error("Runtime API response is missing the {0} header")]
    MissingHeader(&'static str),

    #[error("Runtime API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client for one runtime's Runtime API endpoint
pub struct RuntimeClient {
    base_url: String,
    client: Client,
}

impl RuntimeClient {
    /// `api_endpoint` is `host:port`, as found in `AWS_LAMBDA_RUNTIME_API`
    pub fn new(api_endpoint: &str) -> Self {
        let origin = if api_endpoint.starts_with("http://") || api_endpoint.starts_with("https://")
        {
            api_endpoint.trim_end_matches('/').to_string()
        } else {
            format!("http://{api_endpoint}")
        };

        // No request timeout: `next` long-polls until an invocation arrives
        Self {
            base_url: format!("{origin}/{API_VERSION}/runtime"),
            client: Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, RuntimeApiError> {
        let endpoint =
            std::env::var("AWS_LAMBDA_RUNTIME_API").map_err(|_| RuntimeApiError::MissingEndpoint)?;
        Ok(Self::new(&endpoint))
    }

    /// GET /runtime/invocation/next
    pub async fn next_invocation(&self) -> Result<Invocation, RuntimeApiError> {
        let response = self
            .client
            .get(format!("{}/invocation/next", self.base_url))
            .send()
            .await?;
        let response = check_status(response).await?;

        let headers = response.headers();
        let request_id = header(headers, REQUEST_ID_HEADER)
            .ok_or(RuntimeApiError::MissingHeader(REQUEST_ID_HEADER))?
            .to_string();
        let function_arn = header(headers, FUNCTION_ARN_HEADER)
            .unwrap_or_default()
            .to_string();
        let deadline_ms: i64 = header(headers, DEADLINE_HEADER)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        let payload = response.bytes().await?;

        Ok(Invocation {
            request_id,
            function_arn,
            deadline_ms,
            payload,
        })
    }

    /// POST /runtime/invocation/{requestId}/response
    pub async fn send_response<T: Serialize + ?Sized>(
        &self,
        request_id: &str,
        body: &T,
    ) -> Result<(), RuntimeApiError> {
        let response = self
            .client
            .post(format!("{}/invocation/{request_id}/response", self.base_url))
            .json(body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// POST /runtime/invocation/{requestId}/error
    pub async fn send_error(
        &self,
        request_id: &str,
        error: &InvocationError,
    ) -> Result<(), RuntimeApiError> {
        let response = self
            .client
            .post(format!("{}/invocation/{request_id}/error", self.base_url))
            .header(ERROR_TYPE_HEADER, error.error_type())
            .json(&LambdaErrorResponse::from(error))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// POST /runtime/init/error
    pub async fn send_init_error(&self, message: &str) -> Result<(), RuntimeApiError> {
        const INIT_ERROR: &str = "Runtime.InitError";

        let response = self
            .client
            .post(format!("{}/init/error", self.base_url))
            .header(ERROR_TYPE_HEADER, INIT_ERROR)
            .json(&LambdaErrorResponse::new(INIT_ERROR, message))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Fetch one invocation, run it, and report the outcome.
    ///
    /// A failing handler is reported to the Runtime API and is not an error
    /// here; only Runtime API failures are.
    pub async fn process_next(&self, handler: &Handler) -> Result<(), RuntimeApiError> {
        let invocation = self.next_invocation().await?;
        let span = info_span!("invocation", request_id = %invocation.request_id);

        async {
            debug!(
                function_arn = %invocation.function_arn,
                deadline_ms = invocation.deadline_ms,
                "Received invocation"
            );

            match handler.handle_payload(&invocation.payload).await {
                Ok(output) => self.send_response(&invocation.request_id, &output).await,
                Err(e) => {
                    error!(error = %e, "Invocation failed");
                    self.send_error(&invocation.request_id, &e).await
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Process invocations until the Runtime API fails
    pub async fn run(&self, handler: &Handler) -> Result<(), RuntimeApiError> {
        loop {
            self.process_next(handler).await?;
        }
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn check_status(response: Response) -> Result<Response, RuntimeApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(RuntimeApiError::Status {
        status: status.as_u16(),
        body,
    })
}
