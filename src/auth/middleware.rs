// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{Error, HttpMessage, HttpRequest, HttpResponse};
use serde_json::json;
use std::future::{Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use super::jwt::{Claims, RevokedTokens, TokenService};
use crate::store::{User, UserStore};

/// Trait to add authentication methods to HttpRequest
pub trait AuthRequest {
    fn current_user(&self) -> Option<User>;
    fn token_claims(&self) -> Option<Claims>;
    fn is_authenticated(&self) -> bool;
}

impl AuthRequest for HttpRequest {
    fn current_user(&self) -> Option<User> {
        self.extensions().get::<User>().cloned()
    }

    fn token_claims(&self) -> Option<Claims> {
        self.extensions().get::<Claims>().cloned()
    }

    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}

/// Guarding middleware for the authenticated API scope. A request without a
/// verifiable, unrevoked bearer token for an existing user is answered with
/// 401 before any handler runs.
pub struct BearerAuthMiddlewareFactory;

impl<S, B> Transform<S, ServiceRequest> for BearerAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct BearerAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let authenticated = authenticate(&req);

        Box::pin(async move {
            if authenticated {
                let res = service.call(req).await?;
                Ok(res.map_into_left_body())
            } else {
                let (request, _) = req.into_parts();
                let response = HttpResponse::Unauthorized()
                    .json(json!({"message": "Unauthenticated."}))
                    .map_into_right_body();
                Ok(ServiceResponse::new(request, response))
            }
        })
    }
}

/// Verify the bearer token and, on success, stash the claims and the user
/// record in the request extensions for handlers to pick up.
fn authenticate(req: &ServiceRequest) -> bool {
    let Some(token_service) = req.app_data::<Data<TokenService>>() else {
        log::error!("Token service is not registered; rejecting request");
        return false;
    };
    let Some(revoked) = req.app_data::<Data<RevokedTokens>>() else {
        log::error!("Revocation list is not registered; rejecting request");
        return false;
    };
    let Some(users) = req.app_data::<Data<Arc<dyn UserStore>>>() else {
        log::error!("User store is not registered; rejecting request");
        return false;
    };

    let Some(token) = bearer_token(req) else {
        return false;
    };
    let claims = match token_service.verify_token(token) {
        Ok(claims) => claims,
        Err(err) => {
            log::debug!("Bearer token rejected: {}", err);
            return false;
        }
    };
    if revoked.is_revoked(&claims.jti) {
        log::debug!("Rejected revoked token for {}", claims.email);
        return false;
    }

    let user = match users.user_by_email(&claims.email) {
        Ok(Some(user)) => user,
        Ok(None) => {
            log::debug!("Token subject no longer exists: {}", claims.email);
            return false;
        }
        Err(err) => {
            log::error!("User lookup failed during authentication: {}", err);
            return false;
        }
    };
    if claims.user_id() != Some(user.id) {
        log::debug!("Token subject does not match stored user id");
        return false;
    }

    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(user);
    true
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
