mod common;

use common::*;
use loan_backoffice::api;
use loan_backoffice::application_port::{AccessToken, TokenCodec};
use loan_backoffice::domain_model::{AdminUserId, ChainStage};
use loan_backoffice::domain_port::AdminUserRepo;
use loan_backoffice::infra_memory::FakeCreditBureauApi;
use serde_json::{Value, json};
use warp::Filter;
use warp::http::{Response, StatusCode};
use warp::hyper::body::Bytes;
use warp::test::RequestBuilder;

async fn call(app: &TestApp, request: RequestBuilder) -> Response<Bytes> {
    let routes = api::v1::routes(app.server.clone()).recover(api::v1::recover_error);
    request.reply(&routes).await
}

fn json_body(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap()
}

async fn register(app: &TestApp, username: &str, email: &str) -> (StatusCode, Value) {
    let body = multipart_body(
        &registration_fields(username, email),
        Some(("me.png", &b"\x89PNG\r\n\x1a\n"[..])),
    );
    let response = call(
        app,
        warp::test::request()
            .method("POST")
            .path("/register")
            .header("content-type", content_type())
            .body(body),
    )
    .await;
    (response.status(), json_body(response.body()))
}

async fn login(app: &TestApp, username: &str, password: &str) -> (StatusCode, Value) {
    let response = call(
        app,
        warp::test::request()
            .method("POST")
            .path("/login")
            .json(&json!({ "username": username, "password": password })),
    )
    .await;
    (response.status(), json_body(response.body()))
}

async fn login_token(app: &TestApp, username: &str) -> String {
    let (status, body) = login(app, username, PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

fn update_body(phone: &str, username: &str, email: &str) -> Value {
    json!({
        "fullName": "Alice Okafor",
        "email": email,
        "phone": phone,
        "username": username,
        "password": PASSWORD,
        "jobRole": "Credit Analyst",
        "userType": "staff"
    })
}

#[tokio::test]
async fn register_login_update_and_list() {
    let app = TestApp::new();

    let (status, body) = register(&app, "alice", "Alice@Example.com").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let alice_id: AdminUserId = body["data"]["id"].as_str().unwrap().parse().unwrap();

    let stored = app.repo.get(alice_id).await.unwrap().unwrap();
    assert_eq!(stored.email, "alice@example.com");
    assert_ne!(stored.password_hash, PASSWORD);
    assert!(stored.password_hash.starts_with("$argon2"));

    let (status, body) = login(&app, "alice", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["username"], "alice");
    assert!(body["data"]["user"].get("password").is_none());
    let token = body["data"]["token"].as_str().unwrap().to_string();
    let decoded = app
        .codec
        .verify_access_token(&AccessToken(token.clone()))
        .await
        .unwrap();
    assert_eq!(decoded.user_id, alice_id);

    let response = call(
        &app,
        warp::test::request()
            .method("PUT")
            .path(&format!("/update/{alice_id}"))
            .header("authorization", format!("Bearer {token}"))
            .json(&update_body("08099990000", "alice", "alice@example.com")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response.body())["data"]["phone"], "08099990000");

    let response = call(
        &app,
        warp::test::request()
            .method("GET")
            .path("/users"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.body());
    let users = body["data"]["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["phone"], "08099990000");
    assert_eq!(users[0]["fullName"], "Alice Okafor");
    let photo = users[0]["photo"].as_str().unwrap();
    assert!(photo.ends_with("-me.png"));
    assert_eq!(
        users[0]["imageUrl"],
        format!("http://backoffice.test/uploads/{photo}")
    );

    let after = app.repo.get(alice_id).await.unwrap().unwrap();
    assert_eq!(after.password_hash, stored.password_hash);
}

#[tokio::test]
async fn duplicate_email_in_other_case_is_a_conflict() {
    let app = TestApp::new();
    let (status, _) = register(&app, "alice", "alice@example.com").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = register(&app, "alice2", "ALICE@example.com").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "EmailTaken");

    let (status, body) = register(&app, "alice", "other@example.com").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "UsernameTaken");
}

#[tokio::test]
async fn registration_without_photo_is_rejected() {
    let app = TestApp::new();
    let body = multipart_body(&registration_fields("alice", "alice@example.com"), None);
    let response = call(
        &app,
        warp::test::request()
            .method("POST")
            .path("/register")
            .header("content-type", content_type())
            .body(body),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.body());
    assert_eq!(body["error"]["code"], "MissingInput");
    assert_eq!(body["error"]["message"], "All input is required");
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let app = TestApp::new();
    register(&app, "alice", "alice@example.com").await;

    let (status, body) = login(&app, "alice", "not-the-password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "InvalidCredentials");

    let (status, body) = login(&app, "", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MissingInput");
}

#[tokio::test]
async fn staff_deleting_a_missing_user_is_not_found() {
    let app = TestApp::new();
    let (_, body) = register(&app, "root", "root@example.com").await;
    let root_id = body["data"]["id"].as_str().unwrap().to_string();
    let token = login_token(&app, "root").await;

    for id in [AdminUserId::new().to_string(), "not-a-uuid".to_string()] {
        let response = call(
            &app,
            warp::test::request()
                .method("DELETE")
                .path(&format!("/users/{id}"))
                .header("authorization", format!("Bearer {token}")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response.body())["error"]["code"], "NotFound");
    }

    let response = call(
        &app,
        warp::test::request()
            .method("DELETE")
            .path(&format!("/users/{root_id}"))
            .header("authorization", format!("Bearer {token}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.repo.list().await.unwrap().len(), 0);
}

#[tokio::test]
async fn mutations_require_a_valid_bearer_token() {
    let app = TestApp::new();
    let (_, body) = register(&app, "alice", "alice@example.com").await;
    let alice_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = call(
        &app,
        warp::test::request()
            .method("PUT")
            .path(&format!("/update/{alice_id}"))
            .json(&update_body("0800", "alice", "alice@example.com")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = call(
        &app,
        warp::test::request()
            .method("DELETE")
            .path(&format!("/users/{alice_id}"))
            .header("authorization", "Bearer not.a.jwt"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response.body())["error"]["code"], "InvalidToken");
}

#[tokio::test]
async fn staff_cannot_modify_other_users() {
    let app = TestApp::new();
    register(&app, "alice", "alice@example.com").await;
    let (_, body) = register(&app, "bob", "bob@example.com").await;
    let bob_id = body["data"]["id"].as_str().unwrap().to_string();
    let alice_token = login_token(&app, "alice").await;

    let response = call(
        &app,
        warp::test::request()
            .method("PUT")
            .path(&format!("/update/{bob_id}"))
            .header("authorization", format!("Bearer {alice_token}"))
            .json(&update_body("0800", "bob", "bob@example.com")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = call(
        &app,
        warp::test::request()
            .method("DELETE")
            .path(&format!("/users/{bob_id}"))
            .header("authorization", format!("Bearer {alice_token}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.repo.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn staff_updating_a_missing_user_is_not_found() {
    let app = TestApp::new();
    register(&app, "alice", "alice@example.com").await;
    let token = login_token(&app, "alice").await;

    let response = call(
        &app,
        warp::test::request()
            .method("PUT")
            .path(&format!("/update/{}", AdminUserId::new()))
            .header("authorization", format!("Bearer {token}"))
            .json(&update_body("0800", "alice", "alice@example.com")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response.body())["error"]["code"], "NotFound");
}

#[tokio::test]
async fn staff_cannot_raise_their_own_user_type() {
    let app = TestApp::new();
    let (_, body) = register(&app, "alice", "alice@example.com").await;
    let alice_id = body["data"]["id"].as_str().unwrap().to_string();
    let (_, body) = register(&app, "bob", "bob@example.com").await;
    let bob_id = body["data"]["id"].as_str().unwrap().to_string();
    let token = login_token(&app, "alice").await;

    let mut promote = update_body("0800", "alice", "alice@example.com");
    promote["userType"] = json!("admin");
    let response = call(
        &app,
        warp::test::request()
            .method("PUT")
            .path(&format!("/update/{alice_id}"))
            .header("authorization", format!("Bearer {token}"))
            .json(&promote),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response.body())["error"]["code"], "Forbidden");

    let response = call(
        &app,
        warp::test::request()
            .method("DELETE")
            .path(&format!("/users/{bob_id}"))
            .header("authorization", format!("Bearer {token}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.repo.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = TestApp::new();
    register(&app, "alice", "alice@example.com").await;
    let token = login_token(&app, "alice").await;

    let response = call(
        &app,
        warp::test::request()
            .method("POST")
            .path("/logout")
            .header("authorization", format!("Bearer {token}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = call(
        &app,
        warp::test::request()
            .method("POST")
            .path("/firstcentralreport")
            .header("authorization", format!("Bearer {token}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn credit_report_runs_the_bureau_chain() {
    let app = TestApp::new();
    register(&app, "alice", "alice@example.com").await;
    let token = login_token(&app, "alice").await;

    let response = call(
        &app,
        warp::test::request()
            .method("POST")
            .path("/firstcentralreport")
            .header("authorization", format!("Bearer {token}"))
            .json(&json!({ "identifier": "12345678901" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.body());
    assert_eq!(
        body["data"]["message"],
        "First central api called successfully"
    );
    assert_eq!(
        body["data"]["data"]["CreditAccountSummary"]["TotalOutstandingdebt"],
        "0.00"
    );
    assert_eq!(
        app.bureau.calls(),
        vec![ChainStage::Login, ChainStage::ConsumerMatch, ChainStage::Report]
    );

    let response = call(
        &app,
        warp::test::request()
            .method("POST")
            .path("/firstcentralreport"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn credit_report_without_a_match_is_not_found() {
    let app = TestApp::with_bureau(FakeCreditBureauApi::new().with_matches(Vec::new()));
    register(&app, "alice", "alice@example.com").await;
    let token = login_token(&app, "alice").await;

    let response = call(
        &app,
        warp::test::request()
            .method("POST")
            .path("/firstcentralreport")
            .header("authorization", format!("Bearer {token}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response.body())["error"]["code"],
        "NoConsumerMatch"
    );
}

#[tokio::test]
async fn bureau_without_ticket_is_a_bad_gateway() {
    let app = TestApp::with_bureau(FakeCreditBureauApi::new().with_ticket(None));
    register(&app, "alice", "alice@example.com").await;
    let token = login_token(&app, "alice").await;

    let response = call(
        &app,
        warp::test::request()
            .method("POST")
            .path("/firstcentralreport")
            .header("authorization", format!("Bearer {token}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(app.bureau.calls(), vec![ChainStage::Login]);
}

#[tokio::test]
async fn unknown_routes_and_methods() {
    let app = TestApp::new();

    let response = call(
        &app,
        warp::test::request()
            .method("GET")
            .path("/nowhere"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = call(
        &app,
        warp::test::request()
            .method("PATCH")
            .path("/users"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
