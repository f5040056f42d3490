// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::ValidatedConfig;
use crate::store::User;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug)]
pub enum JwtError {
    TokenCreationError(String),
    TokenVerificationError(String),
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenCreationError(msg) => write!(f, "Token creation failed: {}", msg),
            JwtError::TokenVerificationError(msg) => {
                write!(f, "Token verification failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for JwtError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a string per JWT convention.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> Option<u64> {
        self.sub.parse().ok()
    }
}

pub struct TokenService {
    secret: String,
    expiration_hours: u64,
}

impl TokenService {
    pub fn new(config: &ValidatedConfig) -> Self {
        TokenService {
            secret: config.auth.jwt.secret.clone(),
            expiration_hours: config.auth.jwt.expiration_hours,
        }
    }

    /// Create a bearer token for a user
    pub fn create_token(&self, user: &User) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::hours(self.expiration_hours as i64);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| JwtError::TokenCreationError(e.to_string()))
    }

    /// Verify a bearer token and return its claims
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map_err(|e| JwtError::TokenVerificationError(e.to_string()))?;

        Ok(token_data.claims)
    }
}

/// Token ids invalidated by logout. Tokens carry their own expiry, so this
/// only needs to hold ids until the corresponding tokens would have expired
/// anyway; the set is process-local, like the datastore it guards.
#[derive(Default)]
pub struct RevokedTokens {
    ids: Mutex<HashSet<String>>,
}

impl RevokedTokens {
    pub fn new() -> Self {
        RevokedTokens::default()
    }

    pub fn revoke(&self, jti: &str) {
        self.lock().insert(jti.to_string());
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.lock().contains(jti)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        match self.ids.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Revocation list lock poisoned; recovering");
                poisoned.into_inner()
            }
        }
    }
}
