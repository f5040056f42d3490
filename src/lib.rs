// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod app_state;
pub mod auth;
pub mod config;
pub mod seed;
pub mod store;
pub mod tags;
pub mod translations;
pub mod util;
pub mod validation;

use actix_web::web;
use std::sync::Arc;

use app_state::AppState;
use auth::{RevokedTokens, TokenService};
use config::ValidatedConfig;
use store::{Datastore, TagStore, TranslationStore, UserStore};

/// The shared handles every worker needs. Built once at startup and cloned
/// into each worker's app, so caches and the revocation list are shared
/// across workers instead of duplicated per thread.
#[derive(Clone)]
pub struct AppServices {
    pub translations: web::Data<Arc<dyn TranslationStore>>,
    pub tags: web::Data<Arc<dyn TagStore>>,
    pub users: web::Data<Arc<dyn UserStore>>,
    pub tokens: web::Data<TokenService>,
    pub revoked: web::Data<RevokedTokens>,
    pub state: web::Data<AppState>,
}

impl AppServices {
    pub fn new(store: Arc<Datastore>, config: &ValidatedConfig) -> Self {
        let translations: Arc<dyn TranslationStore> = store.clone();
        let tags: Arc<dyn TagStore> = store.clone();
        let users: Arc<dyn UserStore> = store;
        AppServices {
            translations: web::Data::new(translations),
            tags: web::Data::new(tags),
            users: web::Data::new(users),
            tokens: web::Data::new(TokenService::new(config)),
            revoked: web::Data::new(RevokedTokens::new()),
            state: web::Data::new(AppState::new(config)),
        }
    }

    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.translations.clone())
            .app_data(self.tags.clone())
            .app_data(self.users.clone())
            .app_data(self.tokens.clone())
            .app_data(self.revoked.clone())
            .app_data(self.state.clone());
    }
}

/// Mount the API routes: register and login are public, everything else
/// sits behind the bearer guard.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(auth::handlers::configure_public)
            .service(
                web::scope("")
                    .wrap(auth::BearerAuthMiddlewareFactory)
                    .configure(auth::handlers::configure_protected)
                    .configure(translations::configure)
                    .configure(tags::configure),
            ),
    );
}
