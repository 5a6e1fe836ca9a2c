//! Durable store backed by a single redb file.
//!
//! # Table design
//!
//! Three tables, each keyed by string with a JSON-encoded value:
//! ```text
//! users         id                          -> User
//! projects      id                          -> Project
//! availability  {user}/{YYYY-MM-DD}/{PART}  -> AvailabilityRecord
//! ```
//!
//! Availability keys share the `{user}/` prefix and ISO dates sort
//! lexicographically, so one range scan returns a user's records in date
//! order.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;

use super::Store;
use crate::error::{GridError, Result};
use crate::member::User;
use crate::project::Project;
use crate::record::{AvailabilityRecord, CellPosition};
use crate::types::Status;

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;

const USERS: JsonTable = TableDefinition::new("users");
const PROJECTS: JsonTable = TableDefinition::new("projects");
const AVAILABILITY: JsonTable = TableDefinition::new("availability");

fn db_err(e: impl std::fmt::Display) -> GridError {
    GridError::Store(e.to_string())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(db_err)
}

// ---------------------------------------------------------------------------
// RedbStore
// ---------------------------------------------------------------------------

pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create the database at `path`, creating parent directories
    /// and all tables.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(USERS).map_err(db_err)?;
        wt.open_table(PROJECTS).map_err(db_err)?;
        wt.open_table(AVAILABILITY).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        tracing::debug!(path = %path.display(), "opened availability database");
        Ok(Self { db })
    }

    fn get<T: DeserializeOwned>(
        &self,
        def: JsonTable,
        key: &str,
    ) -> Result<Option<T>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(def).map_err(db_err)?;
        let value = table.get(key).map_err(db_err)?;
        let decoded = value.map(|v| decode(v.value())).transpose()?;
        Ok(decoded)
    }

    fn list<T: DeserializeOwned>(&self, def: JsonTable) -> Result<Vec<T>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(def).map_err(db_err)?;
        let mut result = Vec::new();
        for entry in table.iter().map_err(db_err)? {
            let (_, v) = entry.map_err(db_err)?;
            result.push(decode(v.value())?);
        }
        Ok(result)
    }

    /// Write `value` under `key` unless the key is taken. Returns false
    /// when it was.
    fn insert_new(&self, def: JsonTable, key: &str, value: &[u8]) -> Result<bool> {
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = wt.open_table(def).map_err(db_err)?;
            if table.get(key).map_err(db_err)?.is_some() {
                return Ok(false);
            }
            table.insert(key, value).map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(true)
    }
}

impl Store for RedbStore {
    fn list_users(&self) -> Result<Vec<User>> {
        self.list(USERS)
    }

    fn get_user(&self, id: &str) -> Result<User> {
        self.get(USERS, id)?
            .ok_or_else(|| GridError::UserNotFound(id.to_string()))
    }

    fn create_user(&self, user: User) -> Result<User> {
        let value = serde_json::to_vec(&user)?;
        if !self.insert_new(USERS, &user.id, &value)? {
            return Err(GridError::UserExists(user.id));
        }
        Ok(user)
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        self.list(PROJECTS)
    }

    fn get_project(&self, id: &str) -> Result<Project> {
        self.get(PROJECTS, id)?
            .ok_or_else(|| GridError::ProjectNotFound(id.to_string()))
    }

    fn create_project(&self, project: Project) -> Result<Project> {
        let value = serde_json::to_vec(&project)?;
        if !self.insert_new(PROJECTS, &project.id, &value)? {
            return Err(GridError::ProjectExists(project.id));
        }
        Ok(project)
    }

    /// Runs inside one write transaction; a failed `change` aborts it.
    fn update_project(
        &self,
        id: &str,
        change: &mut dyn FnMut(&mut Project) -> Result<bool>,
    ) -> Result<Project> {
        let wt = self.db.begin_write().map_err(db_err)?;
        let project = {
            let mut table = wt.open_table(PROJECTS).map_err(db_err)?;
            let mut project: Project = match table.get(id).map_err(db_err)? {
                Some(v) => decode(v.value())?,
                None => return Err(GridError::ProjectNotFound(id.to_string())),
            };
            if !change(&mut project)? {
                return Ok(project);
            }
            let value = serde_json::to_vec(&project)?;
            table.insert(id, value.as_slice()).map_err(db_err)?;
            project
        };
        wt.commit().map_err(db_err)?;
        Ok(project)
    }

    fn user_availability(&self, user_id: &str) -> Result<Vec<AvailabilityRecord>> {
        let lo = format!("{user_id}/");
        let hi = format!("{user_id}0");
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(AVAILABILITY).map_err(db_err)?;
        let mut result = Vec::new();
        for entry in table.range(lo.as_str()..hi.as_str()).map_err(db_err)? {
            let (_, v) = entry.map_err(db_err)?;
            result.push(decode(v.value())?);
        }
        Ok(result)
    }

    /// Read and write happen in one write transaction, so concurrent upserts
    /// of the same cell never produce two records.
    fn upsert_availability(
        &self,
        cell: &CellPosition,
        status: Status,
    ) -> Result<AvailabilityRecord> {
        let key = cell.storage_key();
        let wt = self.db.begin_write().map_err(db_err)?;
        let record = {
            let mut table = wt.open_table(AVAILABILITY).map_err(db_err)?;
            let existing: Option<AvailabilityRecord> = match table.get(key.as_str()).map_err(db_err)? {
                Some(v) => Some(decode(v.value())?),
                None => None,
            };
            let record = match existing {
                Some(mut r) => {
                    r.status = status;
                    r
                }
                None => AvailabilityRecord::create(cell, status),
            };
            let value = serde_json::to_vec(&record)?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(db_err)?;
            record
        };
        wt.commit().map_err(db_err)?;
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
