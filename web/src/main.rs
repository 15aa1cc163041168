use anyhow::Context;
use baselinker_core::{BaselinkerClient, Settings};
use tokio::net::TcpListener;

const ADDR_VAR: &str = "BASELINKER_WEB_ADDR";
const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let settings = Settings::from_env()?;
    let addr = std::env::var(ADDR_VAR).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(endpoint = %settings.endpoint, "product manager on http://{addr}");

    baselinker_web::run(listener, BaselinkerClient::new(&settings)).await?;
    Ok(())
}
