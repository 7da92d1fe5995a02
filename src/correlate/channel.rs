use std::collections::HashMap;

use super::{
    CorrelationKey, InFlightRequest, SettledOutcome, SubmissionStatus, correlate,
};

/// Handle returned by [`SubmissionChannel::begin`]; settling with a stale
/// ticket is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// What a row's submit control should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowControl {
    pub status: SubmissionStatus,
    pub disabled: bool,
}

/// Client-side model of the one network channel a page submits through.
///
/// Holds at most one in-flight request. Starting a new request supersedes the
/// previous one; its late response no longer affects any row.
#[derive(Debug, Default)]
pub struct SubmissionChannel {
    in_flight: Option<(Ticket, InFlightRequest)>,
    settled: HashMap<CorrelationKey, SettledOutcome>,
    next_ticket: u64,
}

impl SubmissionChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, request: InFlightRequest) -> Ticket {
        if let Some(key) = request.key() {
            self.settled.remove(&key);
        }
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.in_flight = Some((ticket, request));
        ticket
    }

    /// Records the response for `ticket`. Returns `false` when the request was
    /// already superseded.
    pub fn settle(&mut self, ticket: Ticket, outcome: SettledOutcome) -> bool {
        match self.in_flight.take() {
            Some((current, request)) if current == ticket => {
                if let Some(key) = request.key() {
                    self.settled.insert(key, outcome);
                }
                true
            }
            other => {
                self.in_flight = other;
                false
            }
        }
    }

    /// Navigation away from the page: nothing is pending and stale
    /// outcomes no longer apply.
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.settled.clear();
    }

    pub fn in_flight(&self) -> Option<&InFlightRequest> {
        self.in_flight.as_ref().map(|(_, request)| request)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn status(&self, row_intent: &str, row_action: &str) -> SubmissionStatus {
        let settled = self
            .settled
            .get(&CorrelationKey::for_row(row_action, row_intent))
            .copied();
        correlate(self.in_flight(), row_intent, row_action, settled)
    }

    /// Controls stay disabled while anything is in flight on the channel.
    pub fn control(&self, row_intent: &str, row_action: &str) -> RowControl {
        RowControl {
            status: self.status(row_intent, row_action),
            disabled: self.is_busy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{INTENT_FIELD, RawFields};

    const ACTION: &str = "/resources/team-editor";

    fn request(intent: &str) -> InFlightRequest {
        InFlightRequest::post(ACTION, RawFields::new().with(INTENT_FIELD, intent))
    }

    #[test]
    fn settled_outcome_sticks_to_its_own_row() {
        let mut channel = SubmissionChannel::new();
        let ticket = channel.begin(request("delete-team:1"));
        assert!(channel.control("delete-team:2", ACTION).disabled);

        assert!(channel.settle(ticket, SettledOutcome::Error));
        assert_eq!(channel.status("delete-team:1", ACTION), SubmissionStatus::Error);
        assert_eq!(channel.status("delete-team:2", ACTION), SubmissionStatus::Idle);
        assert!(!channel.is_busy());
    }

    #[test]
    fn superseded_response_is_ignored() {
        let mut channel = SubmissionChannel::new();
        let first = channel.begin(request("delete-team:1"));
        let second = channel.begin(request("delete-team:2"));

        assert!(!channel.settle(first, SettledOutcome::Success));
        assert_eq!(channel.status("delete-team:2", ACTION), SubmissionStatus::Pending);
        assert_eq!(channel.status("delete-team:1", ACTION), SubmissionStatus::Idle);

        assert!(channel.settle(second, SettledOutcome::Success));
        assert_eq!(channel.status("delete-team:1", ACTION), SubmissionStatus::Idle);
        assert_eq!(channel.status("delete-team:2", ACTION), SubmissionStatus::Success);
    }

    #[test]
    fn resubmission_clears_previous_outcome() {
        let mut channel = SubmissionChannel::new();
        let ticket = channel.begin(request("upsert-team"));
        channel.settle(ticket, SettledOutcome::Error);

        let retry = channel.begin(request("upsert-team"));
        assert_eq!(channel.status("upsert-team", ACTION), SubmissionStatus::Pending);

        channel.reset();
        assert!(!channel.settle(retry, SettledOutcome::Success));
        assert_eq!(channel.status("upsert-team", ACTION), SubmissionStatus::Idle);
    }
}
