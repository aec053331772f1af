use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nestboard_auth::AuthError;
use nestboard_db::ListingError;
use tracing::error;

use crate::schema::SchemaError;
use crate::views;

/// A structured error carrying a status code and human-readable message.
/// Every failure path funnels through its `IntoResponse`, which renders the
/// shared error view.
#[derive(Debug)]
pub struct PageError {
    pub status: StatusCode,
    pub message: String,
}

impl PageError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal_server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let body = views::error_page(self.status, &self.message);
        (self.status, body).into_response()
    }
}

impl From<SchemaError> for PageError {
    fn from(error: SchemaError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl From<ListingError> for PageError {
    fn from(error: ListingError) -> Self {
        match error {
            ListingError::NotFound => Self::not_found("Listing not found"),
            ListingError::InvalidId => Self::bad_request("Invalid listing identifier"),
            ListingError::Database(err) => {
                error!(error = ?err, "database error");
                Self::internal_server_error()
            }
        }
    }
}

impl From<AuthError> for PageError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::UserExists => Self::bad_request(error.to_string()),
            AuthError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, error.to_string())
            }
            AuthError::UserNotFound => Self::not_found("User not found"),
            AuthError::SessionNotFound
            | AuthError::SessionExpired
            | AuthError::InvalidSession => Self::new(StatusCode::UNAUTHORIZED, error.to_string()),
            AuthError::Database(_) | AuthError::PasswordHash(_) => {
                error!(error = ?error, "auth error");
                Self::internal_server_error()
            }
        }
    }
}
