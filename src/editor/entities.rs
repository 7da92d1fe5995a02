use lazy_static::lazy_static;
use url::Url;

use crate::core::{EntityKind, FieldValue, FormValue};
use crate::schema::{ErrorSet, FieldSpec, FormSpec};
use crate::upsert::{AccessRule, UpsertTarget};

use super::{EditorAdapter, ID_FIELD, Outcome};

const CLUB_ID: &str = "clubId";

/// Team formats offered by the team editor.
pub const TEAM_TYPES: [(&str, &str); 8] = [
    ("open6", "Open 6s"),
    ("ladies6", "Ladies 6s"),
    ("mens6", "Mens 6s"),
    ("mixed6", "Mixed 6s"),
    ("open4", "Open 4s"),
    ("ladies4", "Ladies 4s"),
    ("mens4", "Mens 4s"),
    ("mixed4", "Mixed 4s"),
];

fn id_field() -> FieldSpec {
    FieldSpec::text(ID_FIELD).optional()
}

fn club_field() -> FieldSpec {
    FieldSpec::text(CLUB_ID)
}

fn delete_form(intent: &'static str, club_scoped: bool) -> FormSpec {
    let mut fields = vec![FieldSpec::text(ID_FIELD)];
    if club_scoped {
        fields.push(club_field());
    }
    FormSpec::new(intent, fields)
}

lazy_static! {
    static ref APP_ROOT: Url = Url::parse("http://clubroom.local/").expect("app root url is valid");
}

/// `/clubs/{clubId}/{section}` with the club id escaped as a path segment.
fn club_path(value: &FormValue, section: &str) -> String {
    let club = value.text(CLUB_ID).unwrap_or_default();
    let mut url = APP_ROOT.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().extend(["clubs", club, section]);
    }
    url.path().to_string()
}

fn default_text(value: &mut FormValue, field: &str) {
    value.set_default(field, FieldValue::Text(String::new()));
}

pub struct ClubEditor;

impl EditorAdapter for ClubEditor {
    fn editor_name(&self) -> &'static str {
        "club-editor"
    }

    fn target(&self) -> UpsertTarget {
        UpsertTarget::new(EntityKind::Club, AccessRule::Owner)
    }

    fn upsert_form(&self) -> FormSpec {
        FormSpec::new(
            "upsert-club",
            vec![
                id_field(),
                FieldSpec::text("name").min_length(1),
                FieldSpec::text("description").optional(),
            ],
        )
    }

    fn delete_form(&self) -> FormSpec {
        delete_form("delete-club", false)
    }

    fn apply_defaults(&self, value: &mut FormValue) {
        default_text(value, "description");
    }

    fn redirect_path(&self, _value: &FormValue) -> String {
        "/clubs".to_string()
    }

    fn title(&self, outcome: Outcome) -> String {
        match outcome {
            Outcome::Created => "Club created",
            Outcome::Updated => "Club updated",
            Outcome::Removed => "Club deleted",
        }
        .to_string()
    }
}

pub struct MemberEditor;

impl EditorAdapter for MemberEditor {
    fn editor_name(&self) -> &'static str {
        "member-editor"
    }

    fn target(&self) -> UpsertTarget {
        UpsertTarget::new(EntityKind::Member, AccessRule::Owner)
    }

    fn upsert_form(&self) -> FormSpec {
        FormSpec::new(
            "upsert-member",
            vec![
                id_field(),
                club_field(),
                FieldSpec::text("name").min_length(1),
                FieldSpec::text("email").email(),
                FieldSpec::text("mobile").optional(),
            ],
        )
    }

    fn delete_form(&self) -> FormSpec {
        delete_form("delete-member", true)
    }

    fn apply_defaults(&self, value: &mut FormValue) {
        default_text(value, "mobile");
    }

    fn redirect_path(&self, value: &FormValue) -> String {
        club_path(value, "members")
    }
}

pub struct SeasonEditor;

impl EditorAdapter for SeasonEditor {
    fn editor_name(&self) -> &'static str {
        "season-editor"
    }

    fn target(&self) -> UpsertTarget {
        UpsertTarget::new(EntityKind::Season, AccessRule::Owner)
    }

    fn upsert_form(&self) -> FormSpec {
        FormSpec::new(
            "upsert-season",
            vec![
                id_field(),
                club_field(),
                FieldSpec::text("name").min_length(1),
                FieldSpec::date("start"),
                FieldSpec::date("end"),
            ],
        )
    }

    fn delete_form(&self) -> FormSpec {
        delete_form("delete-season", true)
    }

    fn check(&self, value: &FormValue, errors: &mut ErrorSet) {
        if let (Some(start), Some(end)) = (value.date("start"), value.date("end")) {
            if end < start {
                errors.push_form("Season must not end before it starts");
            }
        }
    }

    fn redirect_path(&self, value: &FormValue) -> String {
        club_path(value, "seasons")
    }
}

pub struct TeamEditor;

impl EditorAdapter for TeamEditor {
    fn editor_name(&self) -> &'static str {
        "team-editor"
    }

    fn target(&self) -> UpsertTarget {
        UpsertTarget::new(EntityKind::Team, AccessRule::Owner).with_relations(&["members"])
    }

    fn upsert_form(&self) -> FormSpec {
        FormSpec::new(
            "upsert-team",
            vec![
                id_field(),
                club_field(),
                FieldSpec::text("seasonId"),
                FieldSpec::enumeration("teamType", TEAM_TYPES),
                FieldSpec::ids("members"),
                FieldSpec::text("name").min_length(1),
            ],
        )
    }

    fn delete_form(&self) -> FormSpec {
        delete_form("delete-team", true)
    }

    fn redirect_path(&self, value: &FormValue) -> String {
        club_path(value, "teams")
    }
}

pub struct MatchEditor;

impl EditorAdapter for MatchEditor {
    fn editor_name(&self) -> &'static str {
        "match-editor"
    }

    fn target(&self) -> UpsertTarget {
        UpsertTarget::new(EntityKind::Match, AccessRule::Owner)
    }

    fn upsert_form(&self) -> FormSpec {
        FormSpec::new(
            "upsert-match",
            vec![
                id_field(),
                club_field(),
                FieldSpec::text("teamId"),
                FieldSpec::text("oppositionTeamId"),
                FieldSpec::date_time("startDateTime"),
            ],
        )
    }

    fn delete_form(&self) -> FormSpec {
        delete_form("delete-match", true)
    }

    fn check(&self, value: &FormValue, errors: &mut ErrorSet) {
        if value.text("teamId").is_some() && value.text("teamId") == value.text("oppositionTeamId") {
            errors.push_form("A team cannot play against itself");
        }
    }

    fn redirect_path(&self, value: &FormValue) -> String {
        club_path(value, "matches")
    }
}

pub struct MembershipTypeEditor;

impl EditorAdapter for MembershipTypeEditor {
    fn editor_name(&self) -> &'static str {
        "membership-type-editor"
    }

    fn target(&self) -> UpsertTarget {
        UpsertTarget::new(EntityKind::MembershipType, AccessRule::Owner)
    }

    fn upsert_form(&self) -> FormSpec {
        FormSpec::new(
            "upsert-membershipType",
            vec![
                id_field(),
                club_field(),
                FieldSpec::text("title").min_length(1),
                FieldSpec::number("cost"),
            ],
        )
    }

    fn delete_form(&self) -> FormSpec {
        delete_form("delete-membershipType", true)
    }

    fn redirect_path(&self, value: &FormValue) -> String {
        club_path(value, "membershipTypes")
    }
}

/// Sports are a shared catalogue without an owner.
pub struct SportEditor;

impl EditorAdapter for SportEditor {
    fn editor_name(&self) -> &'static str {
        "sports-editor"
    }

    fn target(&self) -> UpsertTarget {
        UpsertTarget::new(EntityKind::Sport, AccessRule::Existence)
    }

    fn upsert_form(&self) -> FormSpec {
        FormSpec::new(
            "upsert-sport",
            vec![id_field(), FieldSpec::text("name").min_length(1)],
        )
    }

    fn delete_form(&self) -> FormSpec {
        delete_form("delete-sport", false)
    }

    fn redirect_path(&self, _value: &FormValue) -> String {
        "/sports".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{INTENT_FIELD, RawFields, validate};

    #[test]
    fn club_id_is_escaped_as_a_path_segment() {
        let mut value = FormValue::new();
        value.insert(CLUB_ID, FieldValue::Text("a b/c".to_string()));
        assert_eq!(club_path(&value, "members"), "/clubs/a%20b%2Fc/members");

        value.insert(CLUB_ID, FieldValue::Text("c1".to_string()));
        assert_eq!(club_path(&value, "teams"), "/clubs/c1/teams");
    }

    #[test]
    fn season_must_not_end_before_start() {
        let editor = SeasonEditor;
        let raw = RawFields::new()
            .with(INTENT_FIELD, "upsert-season")
            .with("clubId", "c1")
            .with("name", "Winter")
            .with("start", "2024-03-01")
            .with("end", "2024-02-01");
        let value = validate(&raw, &editor.upsert_form()).unwrap();

        let mut errors = ErrorSet::new();
        editor.check(&value, &mut errors);
        assert_eq!(
            errors.form_errors(),
            &["Season must not end before it starts".to_string()]
        );
    }

    #[test]
    fn match_needs_distinct_opposition() {
        let editor = MatchEditor;
        let raw = RawFields::new()
            .with(INTENT_FIELD, "upsert-match")
            .with("clubId", "c1")
            .with("teamId", "t1")
            .with("oppositionTeamId", "t1")
            .with("startDateTime", "2024-03-01T19:30");
        let value = validate(&raw, &editor.upsert_form()).unwrap();

        let mut errors = ErrorSet::new();
        editor.check(&value, &mut errors);
        assert!(!errors.is_empty());
    }

    #[test]
    fn club_scoped_paths_and_titles() {
        let mut value = FormValue::new();
        value.insert(CLUB_ID, FieldValue::Text("c9".into()));
        assert_eq!(MembershipTypeEditor.redirect_path(&value), "/clubs/c9/membershipTypes");
        assert_eq!(MembershipTypeEditor.title(Outcome::Created), "Membership type created");
        assert_eq!(MemberEditor.title(Outcome::Removed), "Member removed");
        assert_eq!(ClubEditor.title(Outcome::Removed), "Club deleted");
    }

    #[test]
    fn team_type_outside_domain_is_rejected() {
        let raw = RawFields::new()
            .with(INTENT_FIELD, "upsert-team")
            .with("clubId", "c1")
            .with("seasonId", "s1")
            .with("teamType", "beach2")
            .with("name", "Spikers");
        let err = validate(&raw, &TeamEditor.upsert_form()).unwrap_err();
        assert!(err.to_string().contains("teamType"));
    }
}
