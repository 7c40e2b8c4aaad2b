//! Payline API Server
//!
//! Main entry point for the payroll and leave backend.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payline_api::{AppState, create_router};
use payline_core::cache::MokaTtlStore;
use payline_core::payroll::RunSettings;
use payline_db::{DbAuditSink, connect_with_pool};
use payline_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payline=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let run_settings =
        RunSettings::from_config(&config.payroll).context("invalid [payroll] configuration")?;
    info!(
        formula = %run_settings.formula,
        missing_salary = ?run_settings.missing_salary,
        "Payroll settings loaded"
    );

    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    let jwt_service = JwtService::new(&JwtConfig {
        secret: config.jwt.secret.clone(),
    });

    let state = AppState {
        audit: Arc::new(DbAuditSink::new(db.clone())),
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        payrun_cache: Arc::new(MokaTtlStore::with_config(
            config.cache.max_capacity,
            config.cache.ttl_secs,
        )),
        run_settings: Arc::new(run_settings),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
