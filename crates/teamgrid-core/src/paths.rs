use crate::error::{GridError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TEAMGRID_DIR: &str = ".teamgrid";
pub const CONFIG_FILE: &str = ".teamgrid/config.yaml";
pub const VIEWS_FILE: &str = ".teamgrid/views.yaml";
pub const DEFAULT_DB_FILE: &str = ".teamgrid/teamgrid.redb";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn teamgrid_dir(root: &Path) -> PathBuf {
    root.join(TEAMGRID_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn views_path(root: &Path) -> PathBuf {
    root.join(VIEWS_FILE)
}

/// Resolve a configured path against `root` unless it is already absolute.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

// ---------------------------------------------------------------------------
// Id validation
// ---------------------------------------------------------------------------

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_re() -> &'static Regex {
    ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

/// Project and user ids are lowercase slugs; generated UUIDs also qualify.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !id_re().is_match(id) {
        return Err(GridError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// A fresh id for records created without one.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
