use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use draftboard_server::{seed, AppState, ServerConfig, UploadStore};
use draftboard_store::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,draftboard_server=debug")),
        )
        .init();

    info!("Starting draftboard server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");
    if config.uses_default_token() {
        warn!("API_TOKEN not set, using the development default");
    }

    // -----------------------------------------------------------------------
    // 3. Open storage and seed the reserved accounts
    // -----------------------------------------------------------------------
    let database = match &config.db_path {
        Some(path) => Database::open_at(path)?,
        None => Database::new()?,
    };
    seed::ensure_defaults(&database, &config)?;

    let uploads = UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes).await?;

    let state = AppState {
        db: Arc::new(Mutex::new(database)),
        uploads,
        config: Arc::new(config.clone()),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = draftboard_server::serve(state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
