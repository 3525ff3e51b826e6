use dotenvy::dotenv;
use std::sync::Arc;
use storefront::{
    api::{self, AppState},
    config::{self, database},
    core::auth::TokenService,
    errors::Result,
    mail::LogMailer,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Non-secret settings from config.toml, secrets from the environment
    let app_config = config::load_app_config()?;
    let secret = config::app::jwt_secret()
        .inspect_err(|e| error!("JWT_SECRET is not usable: {}", e))?;
    let tokens = TokenService::new(&secret, app_config.auth.access_token_ttl_secs);

    // 4. Database and schema
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Serve
    let bind_addr = app_config.server.bind_addr.clone();
    let state = AppState::new(db, tokens, app_config, Arc::new(LogMailer));
    let listener = TcpListener::bind(&bind_addr)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind_addr, e))?;
    info!("Listening on {}", bind_addr);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
