use tracing::{error, info};

use ponkesdes_gallery::{Catalog, Config, ContentRepository, Database};

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
    if let Err(e) = ponkesdes_gallery::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        ponkesdes_gallery::logging::init_console_only(&config.logging.level);
    }

    info!("Ponkesdes gallery");

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database {}: {e}", config.database.path);
            std::process::exit(1);
        }
    };

    let storage = match ponkesdes_gallery::storage::from_config(&config.storage) {
        Ok(storage) => storage,
        Err(e) => {
            error!("Failed to set up storage: {e}");
            std::process::exit(1);
        }
    };
    info!("Storage backend: {}", storage.backend_name());

    let repo = ContentRepository::new(&db);
    let mut catalog = Catalog::new();
    match catalog.refresh(&repo).await {
        Ok(folders) => {
            let images: usize = folders.iter().map(|f| f.image_count()).sum();
            info!("Gallery loaded: {} folders, {} images", folders.len(), images);
        }
        Err(e) => error!("Failed to load gallery: {e}"),
    }
}
