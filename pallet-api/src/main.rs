use anyhow::Context;
use pallet_api::{app, AppState};
use pallet_core::SystemClock;
use pallet_fulfillment::FulfillmentAnalytics;
use pallet_store::{app_config::Config, DbClient, PgFulfillmentStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pallet_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Pallet fulfillment analytics on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to order store")?;
    db.ping().await.context("Order store did not answer")?;

    let store = Arc::new(PgFulfillmentStore::new(db.pool.clone()));
    let analytics = FulfillmentAnalytics::new(store, config.analytics.clone());
    let app_state = AppState::new(analytics, Arc::new(SystemClock))?;

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
