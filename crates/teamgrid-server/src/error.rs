use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use teamgrid_core::error::GridError;

// ---------------------------------------------------------------------------
// Sentinel errors for explicit status codes
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 400 through the `anyhow::Error` chain.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

/// Carries an explicit HTTP 404 through the `anyhow::Error` chain.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. Bodies are `{ "error": "..." }`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }

    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<BadRequestError>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        if self.0.downcast_ref::<NotFoundError>().is_some() {
            return StatusCode::NOT_FOUND;
        }
        match self.0.downcast_ref::<GridError>() {
            Some(e) => match e {
                GridError::ProjectNotFound(_)
                | GridError::UserNotFound(_)
                | GridError::NotAMember { .. } => StatusCode::NOT_FOUND,
                GridError::ProjectExists(_) | GridError::UserExists(_) => StatusCode::CONFLICT,
                GridError::InvalidId(_)
                | GridError::InvalidStatus(_)
                | GridError::InvalidDayPart(_)
                | GridError::InvalidDate(_)
                | GridError::InvalidSprintStartDay(_)
                | GridError::InvalidEmail(_)
                | GridError::MissingName => StatusCode::BAD_REQUEST,
                GridError::WriteRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
                GridError::Api { .. } | GridError::Http(_) => StatusCode::BAD_GATEWAY,
                GridError::Store(_)
                | GridError::Io(_)
                | GridError::Yaml(_)
                | GridError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
