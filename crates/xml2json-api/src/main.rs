#![forbid(unsafe_code)]

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use xml2json_api::{AppConfig, app};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();
    let addr = config.addr();

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%addr, %err, "failed to bind");
            return;
        }
    };

    info!(%addr, max_depth = config.xml.max_depth, "listening");
    if let Err(err) = axum::serve(listener, app(&config)).await {
        error!(%err, "server error");
    }
}
