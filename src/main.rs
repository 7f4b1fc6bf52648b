//! Pairwatch - moderation & session-state engine for live video pairing.
//!
//! Tracks each participant's access status (free / quarantined /
//! banned), enforces time-bounded restrictions with lazy expiry,
//! tracks live call sessions, and queues user reports for triage.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `clock` - Injectable time source
//! - `database` - MongoDB integration and store traits
//! - `engine` - StatusResolver, ModerationEngine, CallTracker,
//!   ReportQueue, PresenceRegistry
//! - `http` - Thin route layer over the engine

mod clock;
mod config;
mod database;
mod engine;
mod error;
mod http;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use database::Database;
use database::repository::{CallRepository, ReportRepository, UserRepository};
use engine::{
    CallTracker, ModerationEngine, PresenceRegistry, QuarantinePolicy, ReportQueue, StatusResolver,
};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // Initialize logging with sensible defaults
    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pairwatch=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting pairwatch...");

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded successfully");

    // Connect to MongoDB; the handle is owned here and closed on exit
    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    info!("Database connected");

    let users = Arc::new(UserRepository::new(&db));
    let calls = Arc::new(CallRepository::new(&db));
    let reports = Arc::new(ReportRepository::new(&db));

    let policy = QuarantinePolicy::new(config.quarantine_levels.clone());
    let clock = clock::system_clock();

    let state = Arc::new(http::AppState {
        resolver: StatusResolver::new(Arc::clone(&users), clock.clone()),
        moderation: ModerationEngine::new(Arc::clone(&users), policy, clock.clone()),
        calls: CallTracker::new(calls, clock.clone()),
        reports: ReportQueue::new(reports, Arc::clone(&users), clock.clone()),
        presence: PresenceRegistry::new(users, clock),
    });

    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    db.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
