use crate::error::{GridError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};

/// A registered person who can be added to projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Body of a user create. A fresh id is generated when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn into_user(self) -> Result<User> {
        let id = self.id.unwrap_or_else(paths::generate_id);
        paths::validate_id(&id)?;
        if !self.email.contains('@') {
            return Err(GridError::InvalidEmail(self.email));
        }
        Ok(User::new(id, self.name.trim(), self.email.trim()))
    }
}

/// The one member shape the grid works with, however the member was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

impl From<&User> for ProjectMember {
    fn from(user: &User) -> Self {
        let display_name = if user.name.trim().is_empty() {
            user.email.clone()
        } else {
            user.name.clone()
        };
        Self {
            id: user.id.clone(),
            display_name,
            email: user.email.clone(),
        }
    }
}
