mod analysis;
mod builder;
mod config;
mod convert;
mod errors;
mod identity;
mod llm_client;
mod models;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::engine::{Collaborators, WorkflowEngine};
use crate::builder::sessions::SessionStore;
use crate::config::Config;
use crate::convert::PdftoppmConverter;
use crate::llm_client::inference::ResumeInference;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::redis_kv::RedisStore;
use crate::storage::s3::S3BlobStore;
use crate::storage::{BlobStore, ResumeRepository};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillSnap API v{}", env!("CARGO_PKG_VERSION"));

    // Key-value store for Document Records
    let redis = redis::Client::open(config.redis_url.clone())?;
    let records = ResumeRepository::new(Arc::new(RedisStore::new(redis)));
    info!("Redis client initialized");

    // Blob store for resumes and previews
    let s3 = build_s3_client(&config).await;
    let blobs: Arc<dyn BlobStore> = Arc::new(S3BlobStore::new(s3, config.s3_bucket.clone()));
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    let llm = LlmClient::new(config.anthropic_api_key.clone());
    if llm.is_configured() {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
    } else {
        tracing::warn!("ANTHROPIC_API_KEY is not set; analysis and generation will be refused");
    }

    let engine = WorkflowEngine::new(
        Collaborators {
            blobs: blobs.clone(),
            records: records.clone(),
            converter: Arc::new(PdftoppmConverter::new(
                config.pdftoppm_bin.clone(),
                config.render_dpi,
            )),
            inference: Arc::new(ResumeInference::new(llm.clone(), blobs)),
        },
        config.stage_timeout,
    );
    info!("Workflow engine ready (stage timeout: {:?})", config.stage_timeout);

    let sessions = SessionStore::new(config.builder_session_ttl);
    spawn_session_sweeper(sessions.clone());
    info!("Builder sessions expire after {:?} idle", config.builder_session_ttl);

    let state = AppState {
        engine,
        records,
        llm,
        sessions,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drops idle builder sessions, so memory is reclaimed even when
/// nobody starts a new one.
fn spawn_session_sweeper(sessions: SessionStore) {
    let period = (sessions.ttl() / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sessions.evict_idle().await;
        }
    });
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "skillsnap-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}
