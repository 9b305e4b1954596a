use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gbfs_server::gbfs::{FeedClient, FeedClientConfig};
use gbfs_server::store::{Store, StoreConfig};
use gbfs_server::sync::{SyncConfig, Synchronizer};

/// Default snapshot file when GBFS_STORE_PATH is not set.
const DEFAULT_STORE_PATH: &str = "gbfs-store.json";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut sync_config = SyncConfig::new();
    if let Ok(url) = std::env::var("GBFS_DIRECTORY_URL") {
        sync_config = sync_config.with_directory_url(url);
    }
    if let Ok(secs) = std::env::var("GBFS_FEED_DELAY_SECS") {
        match secs.parse::<u64>() {
            Ok(secs) => sync_config = sync_config.with_delay(Duration::from_secs(secs)),
            Err(_) => eprintln!("Warning: ignoring unparseable GBFS_FEED_DELAY_SECS={secs:?}"),
        }
    }

    let store_path =
        std::env::var("GBFS_STORE_PATH").unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string());
    let store = Store::open(StoreConfig::at_path(&store_path)).expect("Failed to open store");

    let client = FeedClient::new(FeedClientConfig::new()).expect("Failed to create feed client");

    info!(
        directory = %sync_config.directory_url,
        store = %store_path,
        "starting synchronization pass"
    );

    let synchronizer = Synchronizer::new(client, Arc::new(store), sync_config);
    match synchronizer.run().await {
        Ok(report) => {
            info!(
                providers = report.providers,
                feeds_written = report.feeds_written,
                failed = report.failed.len(),
                "finished"
            );
        }
        Err(e) => {
            error!(error = %e, "synchronization pass aborted");
            std::process::exit(1);
        }
    }
}
