// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test};
use lingod::AppServices;
use lingod::config::{
    AuthConfig, CacheConfig, JwtConfig, LoggingConfig, ServerConfig, StorageConfig,
    ValidatedConfig,
};
use lingod::store::Datastore;
use serde_json::{Value, json};
use std::sync::Arc;

pub const USER_NAME: &str = "Test User";
pub const USER_EMAIL: &str = "user@example.com";
pub const USER_PASSWORD: &str = "correct-horse-battery";

pub struct TestHarness {
    pub store: Arc<Datastore>,
    pub config: ValidatedConfig,
    pub services: AppServices,
}

impl TestHarness {
    pub fn new() -> Self {
        let config = build_config();
        let store = Arc::new(Datastore::in_memory());
        let services = AppServices::new(store.clone(), &config);
        Self {
            store,
            config,
            services,
        }
    }
}

fn build_config() -> ValidatedConfig {
    ValidatedConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: 1,
        },
        auth: AuthConfig {
            jwt: JwtConfig {
                secret: "integration-test-secret-0123456789abcdef".to_string(),
                expiration_hours: 1,
            },
        },
        storage: StorageConfig::default(),
        cache: CacheConfig::default(),
        logging: LoggingConfig::default(),
    }
}

pub fn build_test_app(
    services: AppServices,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .configure(move |cfg| services.register(cfg))
        .configure(lingod::configure_api)
}

pub fn bearer(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
}

pub async fn register_user<S, B>(app: &S, name: &str, email: &str, password: &str) -> u64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({"name": name, "email": email, "password": password}))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    body.get("user_id")
        .and_then(Value::as_u64)
        .expect("user_id in register response")
}

pub async fn login<S, B>(app: &S, email: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"email": email, "password": password}))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    body.get("token")
        .and_then(Value::as_str)
        .expect("token in login response")
        .to_string()
}

/// Registers the default test user and returns a bearer token for it.
pub async fn authenticated_token<S, B>(app: &S) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    register_user(app, USER_NAME, USER_EMAIL, USER_PASSWORD).await;
    login(app, USER_EMAIL, USER_PASSWORD).await
}

pub async fn create_translation<S, B>(
    app: &S,
    token: &str,
    group: &str,
    key: &str,
    locale: &str,
    value: &str,
) -> u64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = bearer(test::TestRequest::post().uri("/api/translations"), token)
        .set_json(json!({"group": group, "key": key, "locale": locale, "value": value}))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    body.get("id")
        .and_then(Value::as_u64)
        .expect("id in translation response")
}

pub async fn create_tag<S, B>(app: &S, token: &str, name: &str) -> u64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = bearer(test::TestRequest::post().uri("/api/tags"), token)
        .set_json(json!({"name": name}))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    body.get("id")
        .and_then(Value::as_u64)
        .expect("id in tag response")
}
