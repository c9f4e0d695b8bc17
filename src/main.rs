use std::sync::Arc;

use tracing::{error, info};

use linkdrop::{Config, Database, LocalBlobStore, ShareService, SqliteEntryStore, UrlSigner};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = linkdrop::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        linkdrop::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    info!("linkdrop - file and message sharing");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    if config.links.signing_secret.is_empty() {
        info!("No signing secret configured; links will not survive a restart");
    }
    let blobs = match LocalBlobStore::new(
        &config.storage.path,
        &config.storage.public_base_url,
        UrlSigner::new(&config.links.signing_secret),
    ) {
        Ok(blobs) => blobs,
        Err(e) => {
            error!("Failed to open blob store: {e}");
            std::process::exit(1);
        }
    };

    let service = ShareService::from_config(
        &config,
        Arc::new(SqliteEntryStore::new(db.pool().clone())),
        Arc::new(blobs),
    );

    info!("Database: {}", config.database.path);
    info!("Blob store: {}", config.storage.path);
    info!(
        "Links valid for {}s, uploads up to {}MB",
        service.link_validity().as_secs(),
        config.storage.max_upload_size_mb
    );
    info!("Expiry dates shown in {}", service.timezone());
}
