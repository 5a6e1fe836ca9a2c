use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("project already exists: {0}")]
    ProjectExists(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("user already exists: {0}")]
    UserExists(String),

    #[error("invalid id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidId(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid day part: {0}")]
    InvalidDayPart(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid sprint start day {0}: expected 0 (Sunday) through 6 (Saturday)")]
    InvalidSprintStartDay(u8),

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("project name is required")]
    MissingName,

    #[error("{user} is not a member of {project}")]
    NotAMember { project: String, user: String },

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("write rejected: {0}")]
    WriteRejected(String),

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GridError>;
