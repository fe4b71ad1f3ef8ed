//! Tests for the complaint handlers.

use super::*;
use crate::domain::ports::AccountsCommand;
use crate::domain::{LoginCredentials, Registration, Role};
use crate::inbound::http::error::{json_config, path_config};
use crate::test_support::{ScriptedSentimentScorer, TestServices};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test};
use rstest::rstest;
use serde_json::{Value, json};

struct Caller {
    id: AccountId,
    token: String,
}

async fn sign_in(services: &TestServices, name: &str, role: Role) -> Caller {
    let email = format!("{}@campus.test", name.to_lowercase());
    let registration =
        Registration::try_from_parts(name, &email, "pw", Some(role.as_str())).expect("valid");
    let account = services
        .account_service
        .register(registration)
        .await
        .expect("register");
    let outcome = services
        .account_service
        .login(LoginCredentials::try_from_parts(&email, "pw").expect("valid"))
        .await
        .expect("login");
    Caller {
        id: account.id,
        token: outcome.token.as_str().to_owned(),
    }
}

async fn send(
    services: &TestServices,
    req: test::TestRequest,
    caller: Option<&Caller>,
) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(services.http_state()))
            .app_data(json_config())
            .app_data(path_config())
            .service(web::scope("/api").configure(configure)),
    )
    .await;
    let req = match caller {
        Some(caller) => req.insert_header((AUTHORIZATION, format!("Bearer {}", caller.token))),
        None => req,
    };
    let res = test::call_service(&app, req.to_request()).await;
    let status = res.status();
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

async fn submit(services: &TestServices, caller: &Caller, body: &str, category: &str) -> String {
    let (status, created) = send(
        services,
        test::TestRequest::post()
            .uri("/api/complaints")
            .set_json(json!({"body": body, "category": category})),
        Some(caller),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    created["id"].as_str().expect("id").to_owned()
}

#[actix_web::test]
async fn created_complaints_start_pending_with_the_score() {
    let services = TestServices::new(ScriptedSentimentScorer::new([Ok(-0.4)]));
    let ana = sign_in(&services, "Ana", Role::Student).await;

    let (status, body) = send(
        &services,
        test::TestRequest::post().uri("/api/complaints").set_json(json!({
            "title": "Wifi",
            "body": "Wifi down",
            "category": "WiFi",
            "status": "resolved",
            "votes": 99
        })),
        Some(&ana),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["votes"], 0);
    assert_eq!(body["votedBy"], json!([]));
    assert_eq!(body["sentiment"], -0.4);
    assert_eq!(body["author"], ana.id.to_string());
    assert!(body.get("authorName").is_none());
}

#[actix_web::test]
async fn creating_without_a_token_is_unauthorised() {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let (status, body) = send(
        &services,
        test::TestRequest::post()
            .uri("/api/complaints")
            .set_json(json!({"body": "x", "category": "WiFi"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "no token");
}

#[rstest]
#[case::blank_body(json!({"body": "  ", "category": "WiFi"}), "body")]
#[case::missing_category(json!({"body": "Wifi down"}), "category")]
#[actix_web::test]
async fn invalid_drafts_name_the_field(#[case] payload: Value, #[case] field: &str) {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let ana = sign_in(&services, "Ana", Role::Student).await;
    let (status, body) = send(
        &services,
        test::TestRequest::post().uri("/api/complaints").set_json(payload),
        Some(&ana),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn scorer_outage_still_creates_the_complaint() {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let ana = sign_in(&services, "Ana", Role::Student).await;
    let (status, body) = send(
        &services,
        test::TestRequest::post()
            .uri("/api/complaints")
            .set_json(json!({"body": "Mess food cold", "category": "Mess"})),
        Some(&ana),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sentiment"], Value::Null);
}

#[actix_web::test]
async fn authenticated_listing_resolves_author_names() {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let ana = sign_in(&services, "Ana", Role::Student).await;
    submit(&services, &ana, "Wifi down", "WiFi").await;

    let (status, listed) = send(
        &services,
        test::TestRequest::get().uri("/api/complaints"),
        Some(&ana),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["authorName"], "Ana");

    let (status, public) =
        send(&services, test::TestRequest::get().uri("/api/complaints/all"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public.as_array().map(Vec::len), Some(1));
    assert!(public[0].get("authorName").is_none());
}

#[actix_web::test]
async fn listing_requires_a_token() {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let (status, _) = send(&services, test::TestRequest::get().uri("/api/complaints"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case::unknown("/api/complaints/3fa85f64-5717-4562-b3fc-2c963f66afa6", StatusCode::NOT_FOUND)]
#[case::not_a_uuid("/api/complaints/nope", StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn get_rejects_missing_or_bad_ids(#[case] uri: &str, #[case] expected: StatusCode) {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let (status, _) = send(&services, test::TestRequest::get().uri(uri), None).await;
    assert_eq!(status, expected);
}

#[actix_web::test]
async fn repeat_votes_conflict_and_leave_the_count() {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let ana = sign_in(&services, "Ana", Role::Student).await;
    let ben = sign_in(&services, "Ben", Role::Student).await;
    let id = submit(&services, &ana, "Hostel water", "Hostel").await;
    let uri = format!("/api/complaints/{id}/vote");

    let (status, voted) = send(&services, test::TestRequest::post().uri(&uri), Some(&ben)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voted["votes"], 1);
    assert_eq!(voted["lastVoter"], ben.id.to_string());

    let (status, body) = send(&services, test::TestRequest::post().uri(&uri), Some(&ben)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["code"], "duplicate_vote");

    let (_, fetched) = send(
        &services,
        test::TestRequest::get().uri(&format!("/api/complaints/{id}")),
        None,
    )
    .await;
    assert_eq!(fetched["votes"], 1);
}

#[rstest]
#[case::canonical("/api/complaints/{id}/status")]
#[case::admin_alias("/api/admin/complaints/{id}/status")]
#[actix_web::test]
async fn admins_can_resolve_and_reopen(#[case] template: &str) {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let ana = sign_in(&services, "Ana", Role::Student).await;
    let root = sign_in(&services, "Root", Role::Admin).await;
    let id = submit(&services, &ana, "Lab projector broken", "Academics").await;
    let uri = template.replace("{id}", &id);

    for status in ["resolved", "pending"] {
        let (code, body) = send(
            &services,
            test::TestRequest::put()
                .uri(&uri)
                .set_json(json!({ "status": status })),
            Some(&root),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["status"], status);
    }
}

#[rstest]
#[case::student(Role::Student, "resolved", StatusCode::FORBIDDEN)]
#[case::student_bad_status(Role::Student, "closed", StatusCode::FORBIDDEN)]
#[case::admin_bad_status(Role::Admin, "closed", StatusCode::BAD_REQUEST)]
#[case::admin_wrong_case(Role::Admin, "Resolved", StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn status_updates_check_role_then_value(
    #[case] role: Role,
    #[case] status: &str,
    #[case] expected: StatusCode,
) {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let ana = sign_in(&services, "Ana", Role::Student).await;
    let caller = sign_in(&services, "Caller", role).await;
    let id = submit(&services, &ana, "Gym closed", "Sports").await;

    let (code, _) = send(
        &services,
        test::TestRequest::put()
            .uri(&format!("/api/complaints/{id}/status"))
            .set_json(json!({ "status": status })),
        Some(&caller),
    )
    .await;
    assert_eq!(code, expected);
}

#[rstest]
#[case::student(Role::Student, StatusCode::FORBIDDEN)]
#[case::admin(Role::Admin, StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn malformed_status_bodies_are_refused_by_role_first(
    #[case] role: Role,
    #[case] expected: StatusCode,
) {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let ana = sign_in(&services, "Ana", Role::Student).await;
    let caller = sign_in(&services, "Caller", role).await;
    let id = submit(&services, &ana, "Gym closed", "Sports").await;

    let (code, body) = send(
        &services,
        test::TestRequest::put()
            .uri(&format!("/api/admin/complaints/{id}/status"))
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json"),
        Some(&caller),
    )
    .await;
    assert_eq!(code, expected);
    if role == Role::Admin {
        assert_eq!(body["details"]["code"], "malformed_json");
    }
}

#[actix_web::test]
async fn status_update_on_unknown_id_is_not_found() {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let root = sign_in(&services, "Root", Role::Admin).await;
    let (code, _) = send(
        &services,
        test::TestRequest::put()
            .uri("/api/complaints/3fa85f64-5717-4562-b3fc-2c963f66afa6/status")
            .set_json(json!({"status": "rejected"})),
        Some(&root),
    )
    .await;
    assert_eq!(code, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn summary_counts_for_admins_only() {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let ana = sign_in(&services, "Ana", Role::Student).await;
    let root = sign_in(&services, "Root", Role::Admin).await;
    submit(&services, &ana, "Wifi down", "WiFi").await;
    submit(&services, &ana, "Wifi slow", "WiFi").await;
    let id = submit(&services, &ana, "Cold food", "Mess").await;
    send(
        &services,
        test::TestRequest::put()
            .uri(&format!("/api/complaints/{id}/status"))
            .set_json(json!({"status": "resolved"})),
        Some(&root),
    )
    .await;

    let (status, _) = send(
        &services,
        test::TestRequest::get().uri("/api/complaints/summary"),
        Some(&ana),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &services,
        test::TestRequest::get().uri("/api/complaints/summary"),
        Some(&root),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "total": 3,
            "pending": 2,
            "resolved": 1,
            "rejected": 0,
            "byCategory": {"Mess": 1, "WiFi": 2}
        })
    );
}
