// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{Value, json};

#[actix_web::test]
async fn register_returns_user_id() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.services.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "a-long-password",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("User registered successfully")
    );
    assert!(body.get("user_id").and_then(Value::as_u64).is_some());
}

#[actix_web::test]
async fn register_rejects_invalid_payload() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.services.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({
            "email": "not-an-email",
            "password": "short",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    let errors = body.get("errors").expect("errors object");
    assert!(errors.get("name").is_some());
    assert!(errors.get("email").is_some());
    assert!(errors.get("password").is_some());

    let message = body.get("message").and_then(Value::as_str).expect("message");
    assert!(message.contains("(and 2 more error"));
}

#[actix_web::test]
async fn register_rejects_duplicate_email() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.services.clone())).await;

    common::register_user(&app, "Ada", "ada@example.com", "a-long-password").await;

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({
            "name": "Imposter",
            "email": "ada@example.com",
            "password": "another-password",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["errors"]["email"][0].as_str(),
        Some("The email has already been taken.")
    );
}

#[actix_web::test]
async fn login_returns_token_and_user() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.services.clone())).await;

    let user_id = common::register_user(
        &app,
        common::USER_NAME,
        common::USER_EMAIL,
        common::USER_PASSWORD,
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({
            "email": common::USER_EMAIL,
            "password": common::USER_PASSWORD,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("token").and_then(Value::as_str).is_some());
    assert_eq!(body["User"]["id"].as_u64(), Some(user_id));
    assert_eq!(body["User"]["email"].as_str(), Some(common::USER_EMAIL));
}

#[actix_web::test]
async fn login_with_wrong_password_reports_bad_credentials() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.services.clone())).await;

    common::register_user(
        &app,
        common::USER_NAME,
        common::USER_EMAIL,
        common::USER_PASSWORD,
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({
            "email": common::USER_EMAIL,
            "password": "definitely-wrong",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["errors"]["email"][0].as_str(),
        Some("The provided credentials are incorrect.")
    );
}

#[actix_web::test]
async fn login_with_unknown_email_reports_bad_credentials() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.services.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({
            "email": "nobody@example.com",
            "password": "whatever-password",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["errors"]["email"][0].as_str(),
        Some("The provided credentials are incorrect.")
    );
}

#[actix_web::test]
async fn protected_routes_require_a_token() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.services.clone())).await;

    for uri in ["/api/user", "/api/translations", "/api/tags"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "uri {}", uri);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("Unauthenticated.")
        );
    }
}

#[actix_web::test]
async fn garbage_token_is_rejected() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.services.clone())).await;

    let req = common::bearer(test::TestRequest::get().uri("/api/user"), "not-a-jwt").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn user_endpoint_returns_current_user_without_password() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.services.clone())).await;
    let token = common::authenticated_token(&app).await;

    let req = common::bearer(test::TestRequest::get().uri("/api/user"), &token).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body.get("email").and_then(Value::as_str), Some(common::USER_EMAIL));
    assert_eq!(body.get("name").and_then(Value::as_str), Some(common::USER_NAME));
    assert!(body.get("password_hash").is_none());
}

#[actix_web::test]
async fn logout_revokes_the_token() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.services.clone())).await;
    let token = common::authenticated_token(&app).await;

    let req = common::bearer(test::TestRequest::post().uri("/api/logout"), &token).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("Logged out successfully")
    );

    // The same token no longer opens the guarded scope.
    let req = common::bearer(test::TestRequest::get().uri("/api/user"), &token).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // A fresh login works again.
    let token = common::login(&app, common::USER_EMAIL, common::USER_PASSWORD).await;
    let req = common::bearer(test::TestRequest::get().uri("/api/user"), &token).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
