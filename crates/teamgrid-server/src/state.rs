use crate::broadcast::BroadcastHub;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use teamgrid_core::config::{ServerConfig, StorageKind};
use teamgrid_core::store::{MemoryStore, RedbStore, Store};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub hub: BroadcastHub,
    /// Interval between SSE keep-alive comments.
    pub keep_alive: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, keep_alive: Duration) -> Self {
        Self {
            store,
            hub: BroadcastHub::new(),
            keep_alive,
        }
    }

    /// Empty in-memory store with the default keep-alive.
    pub fn in_memory() -> Self {
        let config = ServerConfig::default();
        Self::new(
            Arc::new(MemoryStore::new()),
            Duration::from_secs(config.keep_alive_secs),
        )
    }

    /// State for a server rooted at `root`, using the configured storage.
    pub fn open(root: &Path, config: &ServerConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn Store> = match config.storage {
            StorageKind::Memory => Arc::new(MemoryStore::new()),
            StorageKind::Redb => {
                let path = config.db_path(root);
                tracing::info!(path = %path.display(), "using redb storage");
                Arc::new(RedbStore::open(&path)?)
            }
        };
        Ok(Self::new(store, Duration::from_secs(config.keep_alive_secs)))
    }
}
