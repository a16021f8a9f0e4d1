//! lambdapack - package a binary and install it as an AWS Lambda function
//!
//! Zips the binary together with the `lambdapack-bootstrap` entry point,
//! (re)creates the named function from the archive, then removes the archive.

mod config;

use clap::Parser;
use crate::config::{FileConfig, Overrides};
use lambdapack_deploy::{deploy, LambdaFunctionService};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "lambdapack")]
#[command(about = "Generate and install Lambda functions", long_about = None)]
struct Args {
    /// Delete an existing function with the same name before creating it
    #[arg(long, env = "LAMBDAPACK_DELETE")]
    delete: bool,

    /// Execution role ARN for the function
    #[arg(long, env = "LAMBDAPACK_ROLE")]
    role: Option<String>,

    /// AWS region (defaults to the SDK's region resolution)
    #[arg(long, env = "LAMBDAPACK_REGION")]
    region: Option<String>,

    /// Function name, also the archive's base name (defaults to the binary's file name)
    #[arg(long, env = "LAMBDAPACK_NAME")]
    name: Option<String>,

    /// Executable to package
    #[arg(long, env = "LAMBDAPACK_BINARY")]
    binary: Option<PathBuf>,

    /// Entry point executable (defaults to lambdapack-bootstrap next to this program)
    #[arg(long, env = "LAMBDAPACK_BOOTSTRAP")]
    bootstrap: Option<PathBuf>,

    /// Lambda API endpoint override, e.g. a local emulator
    #[arg(long, env = "LAMBDAPACK_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Configuration file (defaults to ./lambdapack.toml when present)
    #[arg(long, env = "LAMBDAPACK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LAMBDAPACK_LOG_LEVEL")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            role: self.role.clone(),
            region: self.region.clone(),
            name: self.name.clone(),
            binary: self.binary.clone(),
            bootstrap: self.bootstrap.clone(),
            endpoint_url: self.endpoint_url.clone(),
            delete: self.delete,
        }
    }
}

/// `lambdapack-bootstrap` installed alongside this executable
fn default_bootstrap() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.with_file_name(format!(
        "lambdapack-bootstrap{}",
        std::env::consts::EXE_SUFFIX
    )))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "lambdapack={0},lambdapack_deploy={0},lambdapack_core={0}",
                    args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Everything required is checked before anything touches disk or network
    let settings = FileConfig::load(args.config.as_deref())?
        .resolve(args.overrides(), default_bootstrap())?;

    info!(
        function_name = %settings.name,
        binary = %settings.binary.display(),
        region = settings.region.as_deref().unwrap_or("<default>"),
        "Packaging lambda function"
    );

    let service =
        LambdaFunctionService::from_env(settings.region.clone(), settings.endpoint_url.clone())
            .await;
    let plan = settings.plan(std::env::current_dir()?);

    let created = deploy(&service, &plan).await?;

    println!(
        "Created function '{}' ({}).",
        created.function_name, created.function_arn
    );

    Ok(())
}
