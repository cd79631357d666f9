mod config;
mod errors;
mod llm_client;
mod models;
mod profiles;
mod rewrite;
mod routes;
mod state;
mod storage;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::profiles::workflow::DraftRegistry;
use crate::rewrite::LlmRewriter;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::s3::{build_client, S3ImageStore};
use crate::storage::PhotoUploader;
use crate::store::{seed_records, RecordStore};

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

    info!("Starting Portfolio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize S3 / MinIO
    let s3 = build_client(&config).await;
    let images = S3ImageStore::new(
        s3,
        config.s3_bucket.clone(),
        config.public_asset_url.clone(),
    );
    info!("S3 image store initialized (bucket: {})", config.s3_bucket);

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let store = if config.seed_demo_data {
        RecordStore::new(seed_records())
    } else {
        RecordStore::default()
    };
    info!("Record store ready with {} profiles", store.len());

    let state = AppState {
        store,
        drafts: DraftRegistry::default(),
        uploader: PhotoUploader::new(Arc::new(images)),
        rewriter: Arc::new(LlmRewriter::new(llm)),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
