//! enzenem_server - HTTP front end for song order intake
//!
//! Configuration comes from the environment (a `.env` file is loaded first).
//! Static pages are served from `PUBLIC_DIR` (default `public`); unknown
//! paths fall back to its `index.html`.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use enzenem::api::{create_router, with_frontend, AppState};
use enzenem::AppConfig;

const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enzenem=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let state = AppState::from_config(&config)?;

    // Idle rate-limit windows are dropped periodically
    let limiter = state.rate_limiter.clone();
    let window = state.checkout_window;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = limiter.evict_idle(window, Instant::now());
            if removed > 0 {
                tracing::debug!(removed, "Evicted idle rate-limit windows");
            }
        }
    });

    let public_dir = std::env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string());
    let app = with_frontend(create_router(state), public_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        %addr,
        composer = config.composer.api_key.is_some(),
        generation = config.generation.api_key.is_some(),
        resend = config.delivery.resend_api_key.is_some(),
        smtp = config.delivery.smtp.is_some(),
        "EnZenem server listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
