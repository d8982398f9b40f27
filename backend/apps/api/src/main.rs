//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors are rendered by the
//! `auth` and `market` error types.

mod config;

use std::sync::Arc;
use std::time::Duration;

use auth::{AuthConfig, PgAuthRepository, auth_router, users_router};
use axum::{
    Router,
    http::{Method, header},
};
use market::{ExpireOverdueUseCase, MarketConfig, PgMarketRepository, market_router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,market=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_store = Arc::new(PgAuthRepository::new(pool.clone()));
    let market_store = Arc::new(PgMarketRepository::new(pool.clone()));

    // Startup sweep: bounties whose deadline passed while the server was down
    // Errors here should not prevent server startup
    match ExpireOverdueUseCase::new(market_store.clone())
        .execute(chrono::Utc::now())
        .await
    {
        Ok(expired) => {
            tracing::info!(bounties_expired = expired, "Deadline sweep completed");
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Deadline sweep failed, continuing anyway"
            );
        }
    }

    if let Some(every) = config.expire_sweep_interval {
        tokio::spawn(expire_overdue_periodically(market_store.clone(), every));
    }

    let market_config = MarketConfig::default().with_preview_base_url(&config.preview_base_url);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(config.frontend_origins.clone())
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new()
        .nest(
            "/api/auth",
            auth_router(auth_store.clone(), AuthConfig::default()),
        )
        .nest(
            "/api/users",
            users_router(auth_store.clone(), AuthConfig::default()),
        )
        .nest(
            "/api",
            market_router(market_store, auth_store, market_config),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Flips bounties past their deadline to `expired` while the server runs.
/// Submissions to an overdue bounty are refused regardless; this keeps
/// listings current.
async fn expire_overdue_periodically(store: Arc<PgMarketRepository>, every: Duration) {
    let sweep = ExpireOverdueUseCase::new(store);
    let mut ticker = tokio::time::interval(every);
    // The first tick fires immediately and the startup sweep already ran
    ticker.tick().await;
    loop {
        ticker.tick().await;
        match sweep.execute(chrono::Utc::now()).await {
            Ok(0) => {}
            Ok(expired) => tracing::info!(bounties_expired = expired, "Deadline sweep completed"),
            Err(e) => tracing::warn!(error = %e, "Deadline sweep failed"),
        }
    }
}
