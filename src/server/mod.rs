pub mod handlers;
mod page;
pub mod types;

use crate::{
    Result,
    assistant::MedicalAssistant,
    config::Config,
    llm::{LlmClient, OpenAiClient},
    session::SessionStore,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::info;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Room for multipart boundaries and part headers on top of the image itself.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Builds the app; `max_upload_bytes` caps the image, not the whole request.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/health", get(handlers::health_check))
        .route("/api/sessions", post(handlers::create_session))
        .route(
            "/api/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/api/sessions/:id/upload", post(handlers::upload))
        .route("/api/sessions/:id/analyze", post(handlers::analyze))
        .route("/api/sessions/:id/simplify", post(handlers::simplify))
        .layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let llm_client: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(&config.llm));
    let assistant = MedicalAssistant::new(llm_client, &config.llm);

    let upload_dir = config.server.upload_dir();
    tokio::fs::create_dir_all(&upload_dir).await?;
    let sessions = Arc::new(SessionStore::new(
        upload_dir.clone(),
        Duration::from_secs(config.server.session_timeout_secs),
    ));

    let cleanup_sessions = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            cleanup_sessions.cleanup_expired().await;
        }
    });

    let app_state = AppState {
        sessions,
        assistant: Arc::new(assistant),
    };
    let app = router(app_state, config.server.max_upload_bytes);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!(
        "Starting server on {} (uploads in {})",
        addr,
        upload_dir.display()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
