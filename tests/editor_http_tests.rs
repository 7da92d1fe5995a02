use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use clubroom::editor::ToastVariant;
use clubroom::persist::AccessScope;
use clubroom::web::decode_toast;
use clubroom::{
    AppState, EntityId, EntityKind, InMemoryStore, PrincipalId, SessionRegistry, build_router,
};

const ALICE_TOKEN: &str = "alice-token";
const BOB_TOKEN: &str = "bob-token";

struct TestApp {
    router: axum::Router,
    store: Arc<InMemoryStore>,
}

fn app() -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let sessions = SessionRegistry::from_seed(&format!(
        "{ALICE_TOKEN}=alice,{BOB_TOKEN}=bob"
    ))
    .expect("seed should parse");
    let router = build_router(AppState::new(store.clone(), Arc::new(sessions)));
    TestApp { router, store }
}

struct Reply {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    json: Value,
}

async fn post_form(app: &TestApp, editor: &str, token: Option<&str>, body: &str) -> Reply {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(format!("/resources/{editor}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("clubroom_session={token}"));
    }
    let request = builder
        .body(Body::from(body.to_string()))
        .expect("request should build");

    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("response expected");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");

    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("body should be valid JSON")
    };
    Reply {
        status,
        headers,
        json,
    }
}

async fn only_team(app: &TestApp) -> clubroom::persist::EntityRecord {
    let mut teams = app
        .store
        .list(EntityKind::Team, &AccessScope::Any)
        .await
        .unwrap();
    assert_eq!(teams.len(), 1);
    teams.remove(0)
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unauthenticated_post_is_rejected_before_validation() {
    let app = app();
    let reply = post_form(&app, "team-editor", None, "intent=nonsense").await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json["code"], "unauthenticated");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn unknown_editor_is_404() {
    let app = app();
    let reply = post_form(&app, "trophy-editor", Some(ALICE_TOKEN), "intent=upsert-trophy").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json["code"], "not_found");
}

#[tokio::test]
async fn invalid_submission_returns_field_errors() {
    let app = app();
    let reply = post_form(
        &app,
        "season-editor",
        Some(ALICE_TOKEN),
        "intent=upsert-season&clubId=c1&start=not-a-date&end=2024-06-30",
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json["status"], "error");
    let errors = &reply.json["submission"]["errors"];
    assert_eq!(errors["name"][0], "Required");
    assert_eq!(errors["start"][0], "Invalid date");
    assert_eq!(reply.json["submission"]["rawFields"]["clubId"][0], "c1");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn successful_create_redirects_with_toast() {
    let app = app();
    let reply = post_form(
        &app,
        "team-editor",
        Some(ALICE_TOKEN),
        "intent=upsert-team&clubId=c1&seasonId=s1&teamType=mixed6&name=Spikers&members=m1&members=m2",
    )
    .await;

    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.headers[header::LOCATION], "/clubs/c1/teams");
    let toast = decode_toast(&reply.headers).expect("toast cookie expected");
    assert_eq!(toast.title, "Team created");
    assert_eq!(toast.variant, ToastVariant::Default);

    let team = only_team(&app).await;
    assert_eq!(team.owner, Some(PrincipalId::from("alice")));
    assert_eq!(
        team.relation("members"),
        [EntityId::from("m1"), EntityId::from("m2")].into_iter().collect::<BTreeSet<_>>()
    );
}

#[tokio::test]
async fn update_replaces_member_set() {
    let app = app();
    post_form(
        &app,
        "team-editor",
        Some(ALICE_TOKEN),
        "intent=upsert-team&clubId=c1&seasonId=s1&teamType=mixed6&name=Spikers&members=m1&members=m2&members=m3",
    )
    .await;
    let id = only_team(&app).await.id;

    let reply = post_form(
        &app,
        "team-editor",
        Some(ALICE_TOKEN),
        &format!(
            "intent=upsert-team&id={id}&clubId=c1&seasonId=s1&teamType=mixed6&name=Spikers&members=m2&members=m4"
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(decode_toast(&reply.headers).unwrap().title, "Team updated");
    assert_eq!(
        only_team(&app).await.relation("members"),
        [EntityId::from("m2"), EntityId::from("m4")].into_iter().collect::<BTreeSet<_>>()
    );
}

#[tokio::test]
async fn foreign_update_is_not_found_and_changes_nothing() {
    let app = app();
    post_form(
        &app,
        "team-editor",
        Some(ALICE_TOKEN),
        "intent=upsert-team&clubId=c1&seasonId=s1&teamType=open6&name=Spikers&members=m1",
    )
    .await;
    let id = only_team(&app).await.id;

    let reply = post_form(
        &app,
        "team-editor",
        Some(BOB_TOKEN),
        &format!("intent=upsert-team&id={id}&clubId=c1&seasonId=s1&teamType=open6&name=Mine"),
    )
    .await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json["submission"]["formErrors"][0], "Team not found");
    assert_eq!(only_team(&app).await.text("name"), Some("Spikers"));
}

#[tokio::test]
async fn delete_redirects_with_destructive_toast() {
    let app = app();
    post_form(
        &app,
        "member-editor",
        Some(ALICE_TOKEN),
        "intent=upsert-member&clubId=c1&name=Dana&email=dana%40example.com",
    )
    .await;
    let members = app
        .store
        .list(EntityKind::Member, &AccessScope::Any)
        .await
        .unwrap();
    let id = members[0].id.clone();
    assert_eq!(members[0].text("mobile"), Some(""));

    let reply = post_form(
        &app,
        "member-editor",
        Some(ALICE_TOKEN),
        &format!("intent=delete-member:{id}&id={id}&clubId=c1"),
    )
    .await;

    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.headers[header::LOCATION], "/clubs/c1/members");
    let toast = decode_toast(&reply.headers).unwrap();
    assert_eq!(toast.title, "Member removed");
    assert_eq!(toast.variant, ToastVariant::Destructive);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn delete_of_missing_member_is_404() {
    let app = app();
    let reply = post_form(
        &app,
        "member-editor",
        Some(ALICE_TOKEN),
        "intent=delete-member:ghost&id=ghost&clubId=c1",
    )
    .await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json["submission"]["formErrors"][0], "Member not found");
    assert!(app.store.operations().await.is_empty());
}

#[tokio::test]
async fn delete_targeting_one_row_with_another_rows_id_is_refused() {
    let app = app();
    for name in ["Dana", "Eli"] {
        post_form(
            &app,
            "member-editor",
            Some(ALICE_TOKEN),
            &format!("intent=upsert-member&clubId=c1&name={name}&email={name}%40example.com"),
        )
        .await;
    }
    let members = app
        .store
        .list(EntityKind::Member, &AccessScope::Any)
        .await
        .unwrap();
    let (first, second) = (members[0].id.clone(), members[1].id.clone());

    let reply = post_form(
        &app,
        "member-editor",
        Some(ALICE_TOKEN),
        &format!("intent=delete-member:{first}&id={second}&clubId=c1"),
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json["status"], "error");
    assert!(
        reply.json["submission"]["formErrors"][0]
            .as_str()
            .unwrap()
            .starts_with("intent mismatch")
    );
    let remaining = app
        .store
        .list(EntityKind::Member, &AccessScope::Any)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 2);
}

#[tokio::test]
async fn intent_for_another_editor_is_a_bad_request() {
    let app = app();
    let reply = post_form(
        &app,
        "sports-editor",
        Some(ALICE_TOKEN),
        "intent=upsert-club&name=Harbour",
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn store_outage_is_generic_500() {
    let app = app();
    app.store.set_unavailable(true);
    let reply = post_form(
        &app,
        "sports-editor",
        Some(ALICE_TOKEN),
        "intent=upsert-sport&name=Volleyball",
    )
    .await;

    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.json["error"], "internal server error");
}
