use crate::error::Result;
use crate::{io, paths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// StorageKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Process-local; everything is lost on restart.
    Memory,
    /// Embedded redb file at `db_path`.
    #[default]
    Redb,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7878
}

fn default_db_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_DB_FILE)
}

fn default_keep_alive_secs() -> u64 {
    15
}

/// `.teamgrid/config.yaml`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub storage: StorageKind,
    /// Relative paths resolve against the project root.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Interval between SSE keep-alive comments.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage: StorageKind::default(),
            db_path: default_db_path(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

impl ServerConfig {
    /// Read the config under `root`, or the defaults if there is none.
    pub fn load(root: &Path) -> Result<Self> {
        io::read_yaml_or_default(&paths::config_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::write_yaml(&paths::config_path(root), self)
    }

    pub fn db_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.db_path)
    }

    /// Origin clients use to reach the server.
    pub fn base_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" => "127.0.0.1",
            h => h,
        };
        format!("http://{host}:{}", self.port)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
