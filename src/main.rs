use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use clubactiv::config::AppConfig;
use clubactiv::web::{self, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    info!("Backend API at {}", config.api_url);

    let host = config.host.clone();
    let port = config.port;
    let state = AppState::new(config).context("building the backend client")?;
    let app = web::app(state, "assets");

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", host, port))?;

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            let fallback_port = port.checked_add(1).context("no fallback port above 65535")?;
            warn!(
                "Could not bind {}: {}. Trying {}:{}",
                addr, e, host, fallback_port
            );
            let fallback: SocketAddr = format!("{}:{}", host, fallback_port)
                .parse()
                .context("invalid fallback address")?;
            tokio::net::TcpListener::bind(fallback)
                .await
                .context("binding fallback port")?
        }
    };

    let bound_addr = listener.local_addr()?;
    info!("Listening on http://{}", bound_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
