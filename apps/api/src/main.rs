mod config;
mod credits;
mod errors;
mod extract;
mod llm_client;
mod routes;
mod state;
mod workflow;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::credits::ledger::CreditLedger;
use crate::credits::registry::AccessCodeRegistry;
use crate::credits::store::JsonStore;
use crate::llm_client::{Composer, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cover Letter API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the access-code registry; seed the admin code on first run
    let registry = AccessCodeRegistry::new(JsonStore::new(config.access_codes_path()));
    registry.bootstrap()?;
    info!(
        "Access code registry ready ({} codes issued)",
        registry.load().len()
    );

    // Initialize the credit ledger
    let ledger = CreditLedger::new(JsonStore::new(config.user_data_path()));
    info!(
        "Credit ledger ready ({} codes seen)",
        ledger.load().len()
    );

    // Initialize the LLM-backed composer
    let composer: Arc<dyn Composer> = Arc::new(LlmClient::new(config.anthropic_api_key.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    if config.is_development() {
        info!("Development mode: admin access-code issuance is exposed");
    }

    // Build app state
    let state = AppState {
        ledger: Arc::new(ledger),
        registry: Arc::new(registry),
        composer,
        sessions: Arc::new(RwLock::new(HashMap::new())),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
