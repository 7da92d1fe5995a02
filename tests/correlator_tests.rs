use clubroom::correlate::{InFlightRequest, SettledOutcome};
use clubroom::schema::INTENT_FIELD;
use clubroom::{RawFields, SubmissionChannel, SubmissionStatus, correlate};

const MEMBERS: &str = "/resources/member-editor";

fn delete_member(id: &str) -> InFlightRequest {
    InFlightRequest::post(
        MEMBERS,
        RawFields::new()
            .with(INTENT_FIELD, format!("delete-member:{id}"))
            .with("id", id)
            .with("clubId", "c1"),
    )
}

#[test]
fn only_the_submitting_row_is_pending() {
    let in_flight = delete_member("1");
    assert_eq!(
        correlate(Some(&in_flight), "delete-member:1", MEMBERS, None),
        SubmissionStatus::Pending
    );
    assert_eq!(
        correlate(Some(&in_flight), "delete-member:2", MEMBERS, None),
        SubmissionStatus::Idle
    );
}

#[test]
fn idle_network_means_idle_rows() {
    assert_eq!(
        correlate(None, "delete-member:1", MEMBERS, None),
        SubmissionStatus::Idle
    );
}

#[test]
fn channel_walks_a_row_through_pending_to_error() {
    let mut channel = SubmissionChannel::new();
    assert!(!channel.control("delete-member:1", MEMBERS).disabled);

    let ticket = channel.begin(delete_member("1"));
    let row_one = channel.control("delete-member:1", MEMBERS);
    let row_two = channel.control("delete-member:2", MEMBERS);
    assert_eq!(row_one.status, SubmissionStatus::Pending);
    assert_eq!(row_two.status, SubmissionStatus::Idle);
    assert!(row_one.disabled && row_two.disabled);

    assert!(channel.settle(ticket, SettledOutcome::from_status(404)));
    assert_eq!(
        channel.status("delete-member:1", MEMBERS),
        SubmissionStatus::Error
    );
    assert!(!channel.control("delete-member:2", MEMBERS).disabled);
}

#[test]
fn late_response_of_superseded_request_changes_nothing() {
    let mut channel = SubmissionChannel::new();
    let first = channel.begin(delete_member("1"));
    let second = channel.begin(delete_member("2"));

    assert!(!channel.settle(first, SettledOutcome::Error));
    assert_eq!(
        channel.status("delete-member:1", MEMBERS),
        SubmissionStatus::Idle
    );
    assert_eq!(
        channel.status("delete-member:2", MEMBERS),
        SubmissionStatus::Pending
    );

    assert!(channel.settle(second, SettledOutcome::from_status(303)));
    assert_eq!(
        channel.status("delete-member:2", MEMBERS),
        SubmissionStatus::Success
    );
    assert_eq!(
        channel.status("delete-member:1", MEMBERS),
        SubmissionStatus::Idle
    );
}
