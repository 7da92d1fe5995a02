//! Submission correlation
//!
//! Several rows on one page can post to the same action endpoint with
//! different intents. `correlate` decides, from the single request currently
//! in flight, whether a given row is the one waiting on the network.
//!
//! The in-flight request is an explicit argument here; [`SubmissionChannel`]
//! is the small state holder that owns it on the client side.

mod channel;

pub use channel::{RowControl, SubmissionChannel, Ticket};

use http::Method;
use serde::Serialize;

use crate::schema::{INTENT_FIELD, RawFields};

/// Client-observed state of one submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// Recorded result of a completed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettledOutcome {
    Success,
    Error,
}

impl SettledOutcome {
    /// 2xx and 3xx (redirect after a successful write) count as success.
    pub fn from_status(status: u16) -> Self {
        if (200..400).contains(&status) {
            Self::Success
        } else {
            Self::Error
        }
    }
}

impl From<SettledOutcome> for SubmissionStatus {
    fn from(outcome: SettledOutcome) -> Self {
        match outcome {
            SettledOutcome::Success => Self::Success,
            SettledOutcome::Error => Self::Error,
        }
    }
}

/// The (action, intent, method) triple identifying one submit control.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationKey {
    pub action: String,
    pub intent: String,
    pub method: Method,
}

impl CorrelationKey {
    /// Key of a row's own submit control; rows always post.
    pub fn for_row(action: &str, intent: &str) -> Self {
        Self {
            action: normalize_action(action).to_string(),
            intent: intent.to_string(),
            method: Method::POST,
        }
    }
}

/// A request the network layer reports as currently submitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlightRequest {
    pub action: String,
    pub method: Method,
    pub fields: RawFields,
}

impl InFlightRequest {
    pub fn new(method: Method, action: impl Into<String>, fields: RawFields) -> Self {
        Self {
            action: action.into(),
            method,
            fields,
        }
    }

    pub fn post(action: impl Into<String>, fields: RawFields) -> Self {
        Self::new(Method::POST, action, fields)
    }

    /// Raw intent value as submitted, target suffix included.
    pub fn intent(&self) -> Option<&str> {
        self.fields.get(INTENT_FIELD)
    }

    pub fn key(&self) -> Option<CorrelationKey> {
        Some(CorrelationKey {
            action: normalize_action(&self.action).to_string(),
            intent: self.intent()?.to_string(),
            method: self.method.clone(),
        })
    }

    /// All three predicates of the correlation key must hold.
    pub fn matches(&self, row_intent: &str, row_action: &str) -> bool {
        normalize_action(&self.action) == normalize_action(row_action)
            && self.intent() == Some(row_intent)
            && self.method == Method::POST
    }
}

/// Status of the row identified by `row_intent` / `row_action`.
///
/// With a request in flight the row is `Pending` only when the request
/// carries exactly this row's correlation key, and `Idle` otherwise. With
/// nothing in flight the row shows its own settled outcome, if any.
pub fn correlate(
    in_flight: Option<&InFlightRequest>,
    row_intent: &str,
    row_action: &str,
    settled: Option<SettledOutcome>,
) -> SubmissionStatus {
    match in_flight {
        Some(request) if request.matches(row_intent, row_action) => SubmissionStatus::Pending,
        Some(_) => SubmissionStatus::Idle,
        None => settled.map_or(SubmissionStatus::Idle, SubmissionStatus::from),
    }
}

fn normalize_action(action: &str) -> &str {
    let trimmed = action.trim();
    match trimmed.trim_end_matches('/') {
        "" => "/",
        path => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTION: &str = "/resources/member-editor";

    fn delete_request(intent: &str) -> InFlightRequest {
        InFlightRequest::post(ACTION, RawFields::new().with(INTENT_FIELD, intent))
    }

    #[test]
    fn pending_requires_action_intent_and_method() {
        let request = delete_request("delete-member:1");
        assert_eq!(
            correlate(Some(&request), "delete-member:1", ACTION, None),
            SubmissionStatus::Pending
        );
        assert_eq!(
            correlate(Some(&request), "delete-member:1", "/resources/team-editor", None),
            SubmissionStatus::Idle
        );

        let get = InFlightRequest::new(
            Method::GET,
            ACTION,
            RawFields::new().with(INTENT_FIELD, "delete-member:1"),
        );
        assert_eq!(
            correlate(Some(&get), "delete-member:1", ACTION, None),
            SubmissionStatus::Idle
        );
    }

    #[test]
    fn settled_outcome_shows_only_when_idle_network() {
        assert_eq!(
            correlate(None, "delete-member:1", ACTION, Some(SettledOutcome::Error)),
            SubmissionStatus::Error
        );
        assert_eq!(correlate(None, "delete-member:1", ACTION, None), SubmissionStatus::Idle);

        let other = delete_request("delete-member:2");
        assert_eq!(
            correlate(Some(&other), "delete-member:1", ACTION, Some(SettledOutcome::Success)),
            SubmissionStatus::Idle
        );
    }

    #[test]
    fn trailing_slash_does_not_break_action_match() {
        let request = delete_request("delete-team:7");
        assert!(request.matches("delete-team:7", "/resources/member-editor/"));
        assert_eq!(normalize_action("/"), "/");
    }

    #[test]
    fn outcome_from_http_status() {
        assert_eq!(SettledOutcome::from_status(303), SettledOutcome::Success);
        assert_eq!(SettledOutcome::from_status(400), SettledOutcome::Error);
        assert_eq!(SettledOutcome::from_status(500), SettledOutcome::Error);
    }
}
