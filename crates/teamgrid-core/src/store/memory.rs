use super::Store;
use crate::error::{GridError, Result};
use crate::member::User;
use crate::project::Project;
use crate::record::{AvailabilityRecord, CellPosition};
use crate::types::Status;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
struct Tables {
    users: BTreeMap<String, User>,
    projects: BTreeMap<String, Project>,
    /// Keyed by [`CellPosition::storage_key`].
    availability: BTreeMap<String, AvailabilityRecord>,
}

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.tables.read().users.values().cloned().collect())
    }

    fn get_user(&self, id: &str) -> Result<User> {
        self.tables
            .read()
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| GridError::UserNotFound(id.to_string()))
    }

    fn create_user(&self, user: User) -> Result<User> {
        let mut tables = self.tables.write();
        if tables.users.contains_key(&user.id) {
            return Err(GridError::UserExists(user.id));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.tables.read().projects.values().cloned().collect())
    }

    fn get_project(&self, id: &str) -> Result<Project> {
        self.tables
            .read()
            .projects
            .get(id)
            .cloned()
            .ok_or_else(|| GridError::ProjectNotFound(id.to_string()))
    }

    fn create_project(&self, project: Project) -> Result<Project> {
        let mut tables = self.tables.write();
        if tables.projects.contains_key(&project.id) {
            return Err(GridError::ProjectExists(project.id));
        }
        tables.projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn update_project(
        &self,
        id: &str,
        change: &mut dyn FnMut(&mut Project) -> Result<bool>,
    ) -> Result<Project> {
        let mut tables = self.tables.write();
        let stored = tables
            .projects
            .get_mut(id)
            .ok_or_else(|| GridError::ProjectNotFound(id.to_string()))?;
        let mut updated = stored.clone();
        if change(&mut updated)? {
            *stored = updated;
        }
        Ok(stored.clone())
    }

    fn user_availability(&self, user_id: &str) -> Result<Vec<AvailabilityRecord>> {
        // '0' sorts directly after '/', so this covers exactly the user's keys.
        let lo = format!("{user_id}/");
        let hi = format!("{user_id}0");
        Ok(self
            .tables
            .read()
            .availability
            .range(lo..hi)
            .map(|(_, r)| r.clone())
            .collect())
    }

    fn upsert_availability(
        &self,
        cell: &CellPosition,
        status: Status,
    ) -> Result<AvailabilityRecord> {
        let mut tables = self.tables.write();
        let record = tables
            .availability
            .entry(cell.storage_key())
            .and_modify(|r| r.status = status)
            .or_insert_with(|| AvailabilityRecord::create(cell, status));
        Ok(record.clone())
    }
}
