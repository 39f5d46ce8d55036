//! Dashboard API Server
//!
//! Serves normalized avalanche forecast bundles for each region.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use dashboard_api::config::{DeployMode, ServiceConfig, DEFAULT_DATA_ROOT, DEFAULT_LISTEN_ADDR};
use dashboard_api::state::AppState;

/// Dashboard API Server
#[derive(Parser, Debug)]
#[command(name = "dashboard-api")]
#[command(about = "Regional avalanche forecast bundle server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = DEFAULT_LISTEN_ADDR, env = "DASHBOARD_LISTEN_ADDR")]
    listen: String,

    /// Root of the published data tree
    #[arg(long, default_value = DEFAULT_DATA_ROOT, env = "DASHBOARD_DATA_ROOT")]
    data_root: PathBuf,

    /// Deployment mode (production caches bundles, development does not)
    #[arg(long, value_enum, default_value_t = DeployMode::Development, env = "DASHBOARD_MODE")]
    mode: DeployMode,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "DASHBOARD_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .expect("Failed to create Tokio runtime");

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let config = ServiceConfig::new(args.data_root, args.mode);
    info!(
        data_root = %config.data_root.display(),
        mode = %config.mode,
        "Starting dashboard API server"
    );
    if !config.data_root.is_dir() {
        warn!(data_root = %config.data_root.display(), "Data root does not exist yet");
    }

    let state = Arc::new(AppState::new(config));

    let app = dashboard_api::build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("Dashboard API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
