use crate::calendar::{self, iso_date};
use crate::error::{GridError, Result};
use crate::member::ProjectMember;
use crate::paths;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

fn default_sprint_start_day() -> u8 {
    1
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "iso_date")]
    pub start_date: NaiveDate,
    /// Sunday-first weekday index on which sprints begin.
    #[serde(default = "default_sprint_start_day")]
    pub sprint_start_day: u8,
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub sprints: Vec<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>, start_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            start_date,
            sprint_start_day: default_sprint_start_day(),
            member_ids: Vec::new(),
            sprints: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<()> {
        paths::validate_id(&self.id)?;
        if self.name.trim().is_empty() {
            return Err(GridError::MissingName);
        }
        if self.sprint_start_day > 6 {
            return Err(GridError::InvalidSprintStartDay(self.sprint_start_day));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Editable range
    // ---------------------------------------------------------------------------

    /// First editable date: the Sunday starting the week of `start_date`.
    pub fn editable_from(&self) -> NaiveDate {
        calendar::start_of_week(self.start_date)
    }

    pub fn is_editable(&self, date: NaiveDate) -> bool {
        date >= self.editable_from()
    }

    // ---------------------------------------------------------------------------
    // Members
    // ---------------------------------------------------------------------------

    pub fn has_member(&self, user_id: &str) -> bool {
        self.member_ids.iter().any(|m| m == user_id)
    }

    /// Returns false if the user was already a member.
    pub fn add_member(&mut self, user_id: &str) -> bool {
        if self.has_member(user_id) {
            return false;
        }
        self.member_ids.push(user_id.to_string());
        self.updated_at = Utc::now();
        true
    }

    /// Returns false if the user was not a member.
    pub fn remove_member(&mut self, user_id: &str) -> bool {
        let before = self.member_ids.len();
        self.member_ids.retain(|m| m != user_id);
        let removed = self.member_ids.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    // ---------------------------------------------------------------------------
    // Sprints
    // ---------------------------------------------------------------------------

    /// Record a sprint start date. Kept sorted and free of duplicates.
    pub fn add_sprint(&mut self, start: NaiveDate) -> bool {
        match self.sprints.binary_search(&start) {
            Ok(_) => false,
            Err(pos) => {
                self.sprints.insert(pos, start);
                self.updated_at = Utc::now();
                true
            }
        }
    }

    pub fn remove_sprint(&mut self, start: NaiveDate) -> bool {
        let before = self.sprints.len();
        self.sprints.retain(|s| *s != start);
        let removed = self.sprints.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// ProjectDetail
// ---------------------------------------------------------------------------

/// A project together with its resolved members, as served to grid clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub members: Vec<ProjectMember>,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of a project create. The id is derived from the name when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "iso_date")]
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_start_day: Option<u8>,
}

impl NewProject {
    pub fn into_project(self) -> Result<Project> {
        let id = match self.id {
            Some(id) => id,
            None => slugify(&self.name),
        };
        let mut project = Project::new(id, self.name.trim(), self.start_date);
        project.description = self.description.filter(|d| !d.trim().is_empty());
        if let Some(day) = self.sprint_start_day {
            project.sprint_start_day = day;
        }
        project.validate()?;
        Ok(project)
    }
}

/// Body of a project update. `name` is always required; other fields are
/// left alone when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "iso_date::option"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_start_day: Option<u8>,
}

impl ProjectPatch {
    pub fn apply(self, project: &mut Project) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GridError::MissingName);
        }
        let mut updated = project.clone();
        updated.name = self.name.trim().to_string();
        if let Some(description) = self.description {
            updated.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(start) = self.start_date {
            updated.start_date = start;
        }
        if let Some(day) = self.sprint_start_day {
            updated.sprint_start_day = day;
        }
        updated.validate()?;
        updated.updated_at = Utc::now();
        *project = updated;
        Ok(())
    }
}

/// Lowercase slug from a display name: "Apollo Launch!" → "apollo-launch".
pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
