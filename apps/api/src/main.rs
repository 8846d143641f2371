mod backend;
mod chat;
mod config;
mod errors;
mod llm_client;
mod quiz;
mod recommendations;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend::client::BackendClient;
use crate::backend::session::{AuthSession, FileTokenStore};
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::quiz::history::LearningPathHistory;
use crate::quiz::sessions::QuizSessions;
use crate::recommendations::service::ContentService;
use crate::recommendations::videos::VideoService;
use crate::routes::build_router;
use crate::state::AppState;

const RETRY_DELAY: Duration = Duration::from_millis(1000);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Ascend API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(config.gemini_api_key.clone(), config.gemini_api_url.clone())?
        .with_retries(config.inference_max_retries, RETRY_DELAY);
    info!(
        "LLM client initialized (model: {}, retries: {})",
        llm_client::MODEL,
        config.inference_max_retries
    );

    let videos = VideoService::new(
        config.youtube_api_key.clone(),
        config.youtube_api_url.clone(),
        config.video_cache_ttl,
    )?;
    if config.youtube_api_key.is_none() {
        info!("No YouTube API key, serving demo videos");
    }
    let content = ContentService::new(config.course_cache_ttl, config.content_seed, videos);

    let store = Arc::new(FileTokenStore::new(config.session_store_path.clone()));
    let backend = BackendClient::new(
        config.backend_api_url.clone(),
        Arc::new(AuthSession::new(store)),
    )?;
    if let Err(e) = backend.init().await {
        warn!("Backend session not restored: {e}");
    }
    info!(
        "Backend client initialized ({}, authenticated: {})",
        config.backend_api_url,
        backend.session().is_authenticated()
    );

    let state = AppState {
        llm: Arc::new(llm),
        sessions: Arc::new(QuizSessions::new()),
        history: Arc::new(LearningPathHistory::new()),
        content: Arc::new(content),
        backend: Arc::new(backend),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
