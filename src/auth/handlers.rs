// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::jwt::{RevokedTokens, TokenService};
use super::middleware::AuthRequest;
use super::password;
use crate::app_state::AppState;
use crate::store::{NewUser, UserStore};
use crate::validation::{
    MAX_TEXT_CHARS, MIN_PASSWORD_CHARS, ValidationErrors, add_taken, check_email_format,
    check_max_chars, check_min_chars, check_required,
};

/// Routes reachable without a token.
pub fn configure_public(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/login", web::post().to(login));
}

/// Routes inside the bearer-guarded scope.
pub fn configure_protected(cfg: &mut web::ServiceConfig) {
    cfg.route("/logout", web::post().to(logout))
        .route("/user", web::get().to(current_user));
}

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    email: Option<String>,
    password: Option<String>,
}

async fn register(
    payload: web::Json<RegisterPayload>,
    users: web::Data<Arc<dyn UserStore>>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let mut errors = ValidationErrors::new();

    if let Some(name) = check_required(&mut errors, "name", payload.name.as_deref()) {
        check_max_chars(&mut errors, "name", name, MAX_TEXT_CHARS);
    }
    let email = check_required(&mut errors, "email", payload.email.as_deref());
    if let Some(email) = email {
        check_max_chars(&mut errors, "email", email, MAX_TEXT_CHARS);
        check_email_format(&mut errors, "email", email);

        // The cache answers for addresses registered moments ago; the
        // store answers for everything older.
        let taken = state.registered_emails.contains(&AppState::email_key(email))
            || match users.email_taken(email) {
                Ok(taken) => taken,
                Err(err) => {
                    log::error!("Email uniqueness probe failed: {}", err);
                    return registration_failed(&err.to_string());
                }
            };
        if taken {
            add_taken(&mut errors, "email");
        }
    }
    if let Some(password) = check_required(&mut errors, "password", payload.password.as_deref()) {
        check_min_chars(&mut errors, "password", password, MIN_PASSWORD_CHARS);
    }

    if !errors.is_empty() {
        return errors.to_response();
    }

    // All three are present once validation passed.
    let (Some(name), Some(email), Some(plain)) = (
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.password.as_deref(),
    ) else {
        return registration_failed("incomplete payload");
    };

    let password_hash = match password::hash_password(plain) {
        Ok(hash) => hash,
        Err(err) => {
            log::error!("Password hashing failed during registration: {}", err);
            return registration_failed(&err.to_string());
        }
    };

    let user = match users.create_user(NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password_hash,
    }) {
        Ok(user) => user,
        Err(err) => {
            log::error!("User registration failed: {}", err);
            return registration_failed(&err.to_string());
        }
    };

    state
        .registered_emails
        .put(AppState::email_key(&user.email), user.id);

    HttpResponse::Created().json(json!({
        "message": "User registered successfully",
        "user_id": user.id,
    }))
}

async fn login(
    payload: web::Json<LoginPayload>,
    users: web::Data<Arc<dyn UserStore>>,
    tokens: web::Data<TokenService>,
) -> HttpResponse {
    let mut errors = ValidationErrors::new();
    if let Some(email) = check_required(&mut errors, "email", payload.email.as_deref()) {
        check_email_format(&mut errors, "email", email);
    }
    check_required(&mut errors, "password", payload.password.as_deref());
    if !errors.is_empty() {
        return errors.to_response();
    }

    let (Some(email), Some(plain)) = (payload.email.as_deref(), payload.password.as_deref()) else {
        return bad_credentials();
    };

    let user = match users.user_by_email(email) {
        Ok(Some(user)) => user,
        Ok(None) => return bad_credentials(),
        Err(err) => {
            log::error!("User lookup failed during login: {}", err);
            return internal_error();
        }
    };
    if !password::verify_password(plain, &user.password_hash) {
        return bad_credentials();
    }

    let token = match tokens.create_token(&user) {
        Ok(token) => token,
        Err(err) => {
            log::error!("Token creation failed during login: {}", err);
            return internal_error();
        }
    };

    HttpResponse::Ok().json(json!({
        "token": token,
        "User": {
            "id": user.id,
            "email": user.email,
        },
    }))
}

async fn logout(req: HttpRequest, revoked: web::Data<RevokedTokens>) -> HttpResponse {
    let Some(claims) = req.token_claims() else {
        return HttpResponse::Unauthorized().json(json!({"message": "Unauthenticated."}));
    };
    revoked.revoke(&claims.jti);
    HttpResponse::Ok().json(json!({"message": "Logged out successfully"}))
}

async fn current_user(req: HttpRequest) -> HttpResponse {
    match req.current_user() {
        Some(user) => HttpResponse::Ok().json(user),
        None => HttpResponse::Unauthorized().json(json!({"message": "Unauthenticated."})),
    }
}

/// Failed credentials surface as a validation error on the email field, so
/// a probing client cannot tell a wrong password from an unknown address.
fn bad_credentials() -> HttpResponse {
    let mut errors = ValidationErrors::new();
    errors.add(
        "email",
        "The provided credentials are incorrect.".to_string(),
    );
    errors.to_response()
}

fn registration_failed(detail: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({
        "message": "Registration failed",
        "error": detail,
    }))
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({"message": "Internal Server Error"}))
}
