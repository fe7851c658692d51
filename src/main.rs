use anyhow::{Context, Result};
use locale_routing::config::Config;
use locale_routing::web::{self, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_routing=info".parse()?),
        )
        .init();

    info!("Starting locale routing service");

    // Load configuration from environment
    let config = Config::from_env()?;
    let session = config.build_session()?;

    info!(
        "Serving locales [{}] at {}",
        session
            .supported_locales()
            .iter()
            .map(|d| d.code.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        config.base_url
    );

    let app = web::router(AppState::new(session));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
