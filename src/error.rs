use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

/// AppError
///
/// The application-wide error taxonomy. Every fallible operation in the
/// validation, auth, and repository layers returns one of these variants,
/// replacing implicit raise-and-catch control flow with tagged results.
///
/// - `Validation`: a missing or malformed required field. User-correctable.
/// - `Conflict`: a uniqueness or referential-integrity violation. User-correctable.
/// - `Auth`: bad credentials. Rendered as a single generic message so the
///   response does not reveal whether the username exists.
/// - `Store`: an unexpected persistence failure. The insert rolls back and a
///   generic message is surfaced; never fatal to the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("invalid username or password")]
    Auth,

    #[error("storage failure: {0}")]
    Store(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("store error: {:?}", e);
        AppError::Store(e.to_string())
    }
}

impl AppError {
    /// user_message
    ///
    /// The inline status line shown to the user. Validation and conflict
    /// details are safe to echo; store internals are not.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => format!("Error: {msg}"),
            AppError::Conflict(msg) => format!("Error: {msg}"),
            AppError::Auth => "Error: invalid username or password".to_string(),
            AppError::Store(_) => "Error: the record could not be saved".to_string(),
        }
    }
}

/// IntoResponse
///
/// Fallback mapping for errors that escape a handler (e.g. the listing query
/// itself failing). Most handlers catch `AppError` earlier and re-render the
/// page with an inline message instead.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Auth => StatusCode::UNAUTHORIZED,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Html(format!("<p>{}</p>", self.user_message()))).into_response()
    }
}
