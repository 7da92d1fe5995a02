use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::form::decode_form;
use super::state::AppState;
use super::{Result, WebError};
use crate::editor::{EditorSession, Notification, Redirect, RejectedSubmission, SubmissionReply};
use crate::schema::{INTENT_FIELD, Submission};

/// Cookie carrying the flash notification to the page after a redirect.
pub const TOAST_COOKIE: &str = "clubroom_toast";

const TOAST_MAX_AGE_SECS: u32 = 60;

#[derive(Debug, Serialize)]
struct RejectedBody {
    status: &'static str,
    submission: Submission,
}

pub async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn submit(
    State(state): State<AppState>,
    Path(editor): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let principal = state.resolver.current_principal(&headers).await?;
    let config = state
        .editors
        .get(&editor)
        .ok_or_else(|| WebError::UnknownEditor(editor.clone()))?;
    let raw = decode_form(headers.get(CONTENT_TYPE), &body)?;

    let intent = raw.get(INTENT_FIELD).unwrap_or_default().to_string();
    let reply = EditorSession::new(&config, state.store.as_ref())
        .submit(&principal, raw)
        .await?;

    match reply {
        SubmissionReply::Redirect(redirect) => {
            info!(editor = %editor, intent = %intent, principal = %principal, location = %redirect.path, "submission applied");
            see_other(redirect)
        }
        SubmissionReply::Rejected(RejectedSubmission { reason, submission }) => {
            debug!(editor = %editor, intent = %intent, reason = ?reason, "submission rejected");
            let body = Json(RejectedBody {
                status: "error",
                submission,
            });
            Ok((reason.status_code(), body).into_response())
        }
    }
}

fn see_other(redirect: Redirect) -> Result<Response> {
    let location = HeaderValue::try_from(redirect.path.as_str())
        .map_err(|err| WebError::Internal(format!("invalid redirect location: {err}")))?;
    let cookie = toast_cookie(&redirect.notification)?;

    let mut response = StatusCode::SEE_OTHER.into_response();
    response.headers_mut().insert(LOCATION, location);
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}

/// `Set-Cookie` value carrying `notification` as url-encoded JSON.
pub fn toast_cookie(notification: &Notification) -> Result<HeaderValue> {
    let payload = serde_json::to_string(notification)
        .map_err(|err| WebError::Internal(format!("toast serialization failed: {err}")))?;
    let encoded: String = url::form_urlencoded::byte_serialize(payload.as_bytes()).collect();
    let cookie = format!(
        "{TOAST_COOKIE}={encoded}; Path=/; Max-Age={TOAST_MAX_AGE_SECS}; HttpOnly; SameSite=Lax"
    );
    HeaderValue::try_from(cookie)
        .map_err(|err| WebError::Internal(format!("invalid toast cookie: {err}")))
}

/// Reads the toast back from a `Cookie` (or `Set-Cookie`) header value.
pub fn decode_toast(headers: &HeaderMap) -> Option<Notification> {
    let encoded = headers
        .get_all(COOKIE)
        .iter()
        .chain(headers.get_all(SET_COOKIE).iter())
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOAST_COOKIE)
        .map(|(_, value)| value.to_string())?;

    let query = format!("toast={encoded}");
    let (_, payload) = url::form_urlencoded::parse(query.as_bytes()).next()?;
    serde_json::from_str(&payload).ok()
}
