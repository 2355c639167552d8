mod config;
mod errors;
mod insights_client;
mod models;
mod personalized;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::insights_client::InsightsClient;
use crate::personalized::resolver::ResolverSettings;
use crate::personalized::service::PersonalizedService;
use crate::personalized::view::ViewRegistry;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Insights API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the insights backend client
    let client = InsightsClient::new(
        &config.insights_api_url,
        Duration::from_secs(config.fetch_timeout_secs),
    )?;
    info!(
        "Insights client initialized (backend: {}, timeout: {}s)",
        client.base_url(),
        config.fetch_timeout_secs
    );
    let api = Arc::new(client);

    let settings = ResolverSettings {
        skill_match_limit: config.skill_match_limit,
        fallback_cap: config.fallback_posting_cap,
    };
    info!(
        "Recommendation settings: skill_match_limit={} fallback_cap={} suggestion_limit={}",
        settings.skill_match_limit, settings.fallback_cap, config.suggestion_limit
    );

    // Build app state
    let state = AppState {
        personalized: PersonalizedService::new(api.clone(), settings, config.suggestion_limit),
        api,
        views: Arc::new(ViewRegistry::new(Duration::from_secs(config.view_idle_ttl_secs))),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the dashboard host once it is deployed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
