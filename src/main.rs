mod app;
mod auth;
mod config;
mod error;
mod extract;
mod state;
mod users;

use crate::{app::build_app, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "account_service=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!(error = %format!("{e:#}"), "invalid environment variables");
        e
    })?;
    let addr = config.listen_addr()?;
    tracing::info!(env = ?config.env, "starting");

    let app_state = AppState::init(config).await?;
    app::serve(build_app(app_state), addr).await
}
