//! Huddle - scripted group-project conversation server
//!
//! Three simulated classmates talk a user through picking a presentation
//! topic, outlining it and splitting up the work.

mod api;
mod config;
mod llm;
mod orchestrator;
mod polish;
mod state_machine;

use api::{create_router, AppState};
use config::ServerConfig;
use llm::LlmConfig;
use orchestrator::Orchestrator;
use polish::LlmPolisher;
use state_machine::RandomSelector;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "huddle=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = ServerConfig::from_env();
    let llm_config = LlmConfig::from_env();

    let llm = llm_config.connect()?;
    match &llm {
        Some(service) => tracing::info!(model = %service.model_id(), "LLM client initialized"),
        None => tracing::warn!("No LLM credentials configured. Set OPENAI_API_KEY or LLM_GATEWAY."),
    }

    let mut orchestrator = Orchestrator::new(Arc::new(RandomSelector));
    match (&llm, config.polish_enabled) {
        (Some(service), true) => {
            orchestrator = orchestrator.with_polisher(
                Arc::new(LlmPolisher::new(service.clone())),
                config.polish_timeout,
            );
            tracing::info!(budget_ms = %config.polish_timeout.as_millis(), "Line polishing enabled");
        }
        (Some(_), false) => tracing::info!("Line polishing disabled by configuration"),
        (None, _) => {}
    }

    if let Some(dir) = &config.static_dir {
        tracing::info!(path = %dir.display(), "Serving browser client");
    }

    let state = AppState::new(orchestrator, llm).with_static_dir(config.static_dir.clone());

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Huddle server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
