//! Lambda management API access

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_lambda::{
    error::DisplayErrorContext,
    primitives::Blob,
    types::{FunctionCode, Runtime},
    Client,
};
use lambdapack_core::{CreatedFunction, FunctionSettings, InstallError};
use tracing::debug;

/// The two management operations the installer needs
#[async_trait]
pub trait FunctionService: Send + Sync {
    async fn delete_function(&self, function_name: &str) -> Result<(), InstallError>;

    async fn create_function(
        &self,
        settings: &FunctionSettings,
        code: Vec<u8>,
    ) -> Result<CreatedFunction, InstallError>;
}

/// [`FunctionService`] backed by the AWS SDK
pub struct LambdaFunctionService {
    client: Client,
}

impl LambdaFunctionService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration.
    ///
    /// Credentials always come from the SDK's default provider chain. `region`
    /// and `endpoint_url` override what the environment provides.
    pub async fn from_env(region: Option<String>, endpoint_url: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint_url) = endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let config = loader.load().await;

        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl FunctionService for LambdaFunctionService {
    async fn delete_function(&self, function_name: &str) -> Result<(), InstallError> {
        debug!(function_name, "DeleteFunction");

        self.client
            .delete_function()
            .function_name(function_name)
            .send()
            .await
            .map_err(|e| InstallError::delete(function_name, DisplayErrorContext(e).to_string()))?;

        Ok(())
    }

    async fn create_function(
        &self,
        settings: &FunctionSettings,
        code: Vec<u8>,
    ) -> Result<CreatedFunction, InstallError> {
        debug!(
            function_name = %settings.function_name,
            runtime = settings.runtime.as_str(),
            code_size = code.len(),
            "CreateFunction"
        );

        let output = self
            .client
            .create_function()
            .function_name(&settings.function_name)
            .runtime(Runtime::from(settings.runtime.as_str()))
            .role(&settings.role)
            .handler(&settings.handler)
            .code(FunctionCode::builder().zip_file(Blob::new(code)).build())
            .timeout(settings.timeout)
            .memory_size(settings.memory_size)
            .send()
            .await
            .map_err(|e| {
                InstallError::create(&settings.function_name, DisplayErrorContext(e).to_string())
            })?;

        let function_arn = output
            .function_arn()
            .ok_or_else(|| InstallError::MissingArn(settings.function_name.clone()))?;

        Ok(CreatedFunction {
            function_name: output
                .function_name()
                .unwrap_or(&settings.function_name)
                .to_string(),
            function_arn: function_arn.to_string(),
            code_sha256: output.code_sha256().map(str::to_string),
        })
    }
}
