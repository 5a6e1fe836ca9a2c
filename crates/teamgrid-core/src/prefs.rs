//! Local per-project view preferences, kept in `.teamgrid/views.yaml`.
//!
//! These never leave the machine: two people looking at the same project
//! can sit on different windows.

use crate::error::Result;
use crate::{io, paths};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewPrefs {
    /// Last window start shown, by project id.
    #[serde(default)]
    pub window_starts: BTreeMap<String, NaiveDate>,
}

impl ViewPrefs {
    pub fn load(root: &Path) -> Result<Self> {
        io::read_yaml_or_default(&paths::views_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::write_yaml(&paths::views_path(root), self)
    }

    pub fn window_start(&self, project_id: &str) -> Option<NaiveDate> {
        self.window_starts.get(project_id).copied()
    }

    pub fn set_window_start(&mut self, project_id: &str, start: NaiveDate) {
        self.window_starts.insert(project_id.to_string(), start);
    }
}
