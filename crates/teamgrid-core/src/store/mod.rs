//! Persistence for users, projects, and availability records.
//!
//! The grid never talks to a [`Store`] directly; the server owns one and
//! exposes it over HTTP. Implementations are synchronous and are expected to
//! be called from blocking tasks.

mod embedded;
mod memory;

pub use embedded::RedbStore;
pub use memory::MemoryStore;

use crate::error::{GridError, Result};
use crate::member::{ProjectMember, User};
use crate::project::{Project, ProjectDetail};
use crate::record::{AvailabilityRecord, CellPosition};
use crate::types::Status;
use chrono::NaiveDate;

pub trait Store: Send + Sync {
    fn list_users(&self) -> Result<Vec<User>>;

    /// `GridError::UserNotFound` when absent.
    fn get_user(&self, id: &str) -> Result<User>;

    /// `GridError::UserExists` when the id is taken.
    fn create_user(&self, user: User) -> Result<User>;

    fn list_projects(&self) -> Result<Vec<Project>>;

    /// `GridError::ProjectNotFound` when absent.
    fn get_project(&self, id: &str) -> Result<Project>;

    /// `GridError::ProjectExists` when the id is taken.
    fn create_project(&self, project: Project) -> Result<Project>;

    /// Read-modify-write of one project as a single atomic step.
    ///
    /// `change` returns whether it modified the project; nothing is written
    /// when it returns false or an error. Returns the project as stored
    /// afterwards. `GridError::ProjectNotFound` when absent.
    fn update_project(
        &self,
        id: &str,
        change: &mut dyn FnMut(&mut Project) -> Result<bool>,
    ) -> Result<Project>;

    /// Every stored record for one user, ordered by date.
    fn user_availability(&self, user_id: &str) -> Result<Vec<AvailabilityRecord>>;

    /// Insert or update the record for `cell`. The existing id is kept on
    /// update; a new one is assigned on insert.
    fn upsert_availability(&self, cell: &CellPosition, status: Status)
        -> Result<AvailabilityRecord>;

    // ---------------------------------------------------------------------------
    // Provided
    // ---------------------------------------------------------------------------

    /// Members of `project` in membership order. Ids with no user record are skipped.
    fn project_members(&self, project: &Project) -> Result<Vec<ProjectMember>> {
        let mut members = Vec::with_capacity(project.member_ids.len());
        for id in &project.member_ids {
            match self.get_user(id) {
                Ok(user) => members.push(ProjectMember::from(&user)),
                Err(GridError::UserNotFound(_)) => {
                    tracing::warn!(project = %project.id, user = %id, "member has no user record");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(members)
    }

    fn project_detail(&self, id: &str) -> Result<ProjectDetail> {
        let project = self.get_project(id)?;
        let members = self.project_members(&project)?;
        Ok(ProjectDetail { project, members })
    }

    /// All records for the project's current members, regardless of date.
    fn list_project_availability(&self, project_id: &str) -> Result<Vec<AvailabilityRecord>> {
        let project = self.get_project(project_id)?;
        let mut records = Vec::new();
        for user_id in &project.member_ids {
            records.extend(self.user_availability(user_id)?);
        }
        Ok(records)
    }

    fn add_member(&self, project_id: &str, user_id: &str) -> Result<ProjectDetail> {
        self.get_project(project_id)?;
        self.get_user(user_id)?;
        let project = self.update_project(project_id, &mut |p| Ok(p.add_member(user_id)))?;
        let members = self.project_members(&project)?;
        Ok(ProjectDetail { project, members })
    }

    /// `GridError::NotAMember` when the user is not in the project.
    fn remove_member(&self, project_id: &str, user_id: &str) -> Result<ProjectDetail> {
        let project = self.update_project(project_id, &mut |p| {
            if p.remove_member(user_id) {
                Ok(true)
            } else {
                Err(GridError::NotAMember {
                    project: project_id.to_string(),
                    user: user_id.to_string(),
                })
            }
        })?;
        let members = self.project_members(&project)?;
        Ok(ProjectDetail { project, members })
    }

    fn add_sprint(&self, project_id: &str, start: NaiveDate) -> Result<Vec<NaiveDate>> {
        let project = self.update_project(project_id, &mut |p| Ok(p.add_sprint(start)))?;
        Ok(project.sprints)
    }

    fn remove_sprint(&self, project_id: &str, start: NaiveDate) -> Result<Vec<NaiveDate>> {
        let project = self.update_project(project_id, &mut |p| Ok(p.remove_sprint(start)))?;
        Ok(project.sprints)
    }

    /// Upsert for a registered user. `GridError::UserNotFound` otherwise.
    fn upsert_user_availability(
        &self,
        cell: &CellPosition,
        status: Status,
    ) -> Result<AvailabilityRecord> {
        self.get_user(&cell.user_id)?;
        self.upsert_availability(cell, status)
    }
}

// ---------------------------------------------------------------------------
// Shared contract tests
// ---------------------------------------------------------------------------
