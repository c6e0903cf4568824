// backend/src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use branchvisit_api::{build_router, config::Config, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("branchvisit_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::connect(&config).await?;
    if config.run_migrations {
        db::migrate(&pool).await?;
    }

    tracing::info!(tz = %config.business_tz, "business calendar");
    let state = AppState { pool, feedback: config.feedback, tz: config.business_tz };
    let api = build_router(state, &config.cors_allow_origin);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API listening");

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}
