//! HTTP surface
//!
//! Every editor is mounted at `POST /resources/{editor}` and accepts a
//! url-encoded form body. Successful writes answer with `303 See Other` and
//! a one-shot toast cookie; rejected submissions answer with the submission
//! record as JSON so the form can render its errors inline.

mod form;
mod handlers;
mod router;
mod state;

pub use form::{FORM_CONTENT_TYPE, decode_form};
pub use handlers::{TOAST_COOKIE, decode_toast, toast_cookie};
pub use router::build_router;
pub use state::AppState;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::auth::AuthError;
use crate::core::StoreError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum WebError {
    Unauthenticated,
    UnknownEditor(String),
    UnsupportedMediaType(String),
    Persistence(StoreError),
    Internal(String),
}

impl From<AuthError> for WebError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => Self::Unauthenticated,
        }
    }
}

impl From<StoreError> for WebError {
    fn from(err: StoreError) -> Self {
        WebError::Persistence(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            WebError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "authentication required".to_string(),
                "unauthenticated",
            ),
            WebError::UnknownEditor(name) => (
                StatusCode::NOT_FOUND,
                format!("no editor named '{name}'"),
                "not_found",
            ),
            WebError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                msg,
                "unsupported_media_type",
            ),
            // Details stay in the log; clients get a generic message.
            WebError::Persistence(err) => {
                error!(error = %err, "persistence failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    "internal_error",
                )
            }
            WebError::Internal(msg) => {
                error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    "internal_error",
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
