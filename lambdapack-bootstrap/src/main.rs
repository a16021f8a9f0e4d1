//! Lambda entry point for functions packaged by lambdapack
//!
//! Shipped as the archive's `bootstrap` entry; Lambda's custom runtimes start
//! it and it serves invocations until the sandbox is torn down.

use lambdapack_bootstrap::{Handler, RuntimeClient};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // CloudWatch timestamps every line and does not render colours
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lambdapack_bootstrap=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .without_time(),
        )
        .init();

    let client = RuntimeClient::from_env()?;
    let handler = Handler::from_env();

    if !handler.binary().is_file() {
        let message = format!("Bundled binary not found at {}", handler.binary().display());
        client.send_init_error(&message).await?;
        anyhow::bail!(message);
    }

    info!(binary = %handler.binary().display(), "Bootstrap ready");

    client.run(&handler).await?;

    Ok(())
}
