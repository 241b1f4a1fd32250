//! Supplyline Listener
//!
//! Daemon that tails supply-chain contract events from the ledger and
//! reconciles them into the order/delivery/inventory database.

mod config;
mod shutdown;

use clap::Parser;
use config::{FileConfig, get_database_url};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use supplyline_core::directory::PgUserDirectory;
use supplyline_core::processors::{Reconciler, Supervisor};
use supplyline_core::store::PgDomainStore;
use supplyline_ledger::HttpLedgerClient;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Supplyline - ledger event listener for the supply-chain database
#[derive(Parser, Debug)]
#[command(name = "supplyline-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./supplyline.toml")]
    config: PathBuf,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting supplyline-server v{}", env!("CARGO_PKG_VERSION"));

    let file_config = FileConfig::load(&args.config).map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    let client = Arc::new(HttpLedgerClient::new(file_config.ledger.endpoint.clone())?);
    let reconciler = Arc::new(Reconciler::new(
        Arc::new(PgDomainStore::new(db_pool.clone())),
        Arc::new(PgUserDirectory::new(db_pool.clone())),
    ));
    let supervisor = Supervisor::new(client, reconciler, file_config.listener_settings());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown::shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    tracing::info!(
        ledger = %file_config.ledger.endpoint,
        "Starting event listener"
    );
    let result = supervisor.run(shutdown_rx).await;

    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
