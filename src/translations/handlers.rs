// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::export;
use super::filter::FilterParams;
use super::search_cache;
use crate::app_state::AppState;
use crate::store::{NewTranslation, StoreError, TranslationChanges, TranslationStore};
use crate::util::{JsonEscaping, json_array_stream, streamed_json_response};
use crate::validation::{
    MAX_LOCALE_CHARS, MAX_TEXT_CHARS, ValidationErrors, add_taken, check_exact_chars,
    check_max_chars, check_required,
};

/// Batch size for the streaming listing path.
const LISTING_BATCH_SIZE: usize = 1000;
/// Row cap for the search path.
const SEARCH_LIMIT: usize = 50;

pub fn configure(cfg: &mut web::ServiceConfig) {
    // "/search" is registered ahead of "/{id}" so it cannot be captured
    // as an id.
    cfg.service(
        web::scope("/translations")
            .route("", web::get().to(index))
            .route("", web::post().to(store_translation))
            .route("/search", web::get().to(search))
            .route("/{id}", web::get().to(show))
            .route("/{id}", web::put().to(update))
            .route("/{id}", web::patch().to(update))
            .route("/{id}", web::delete().to(destroy)),
    )
    .route("/translations-tags/export", web::get().to(export_all));
}

#[derive(Debug, Deserialize)]
pub struct TranslationPayload {
    group: Option<String>,
    key: Option<String>,
    locale: Option<String>,
    value: Option<String>,
}

async fn index(
    query: web::Query<FilterParams>,
    store: web::Data<Arc<dyn TranslationStore>>,
) -> HttpResponse {
    let filter = query.list_filter();
    let store = store.get_ref().clone();
    let body = json_array_stream(
        move |after| store.translation_batch(&filter, after, LISTING_BATCH_SIZE),
        JsonEscaping::Ascii,
    );
    streamed_json_response(body)
}

async fn store_translation(
    payload: web::Json<TranslationPayload>,
    store: web::Data<Arc<dyn TranslationStore>>,
) -> HttpResponse {
    let mut errors = ValidationErrors::new();
    if let Some(group) = check_required(&mut errors, "group", payload.group.as_deref()) {
        check_max_chars(&mut errors, "group", group, MAX_TEXT_CHARS);
    }
    if let Some(key) = check_required(&mut errors, "key", payload.key.as_deref()) {
        check_max_chars(&mut errors, "key", key, MAX_TEXT_CHARS);
    }
    if let Some(locale) = check_required(&mut errors, "locale", payload.locale.as_deref()) {
        check_exact_chars(&mut errors, "locale", locale, MAX_LOCALE_CHARS);
    }
    check_required(&mut errors, "value", payload.value.as_deref());

    if errors.is_empty() {
        let (Some(group), Some(key), Some(locale)) = (
            payload.group.as_deref(),
            payload.key.as_deref(),
            payload.locale.as_deref(),
        ) else {
            return internal_error();
        };
        match store.translation_triple_taken(group, key, locale, None) {
            Ok(true) => add_taken(&mut errors, "key"),
            Ok(false) => {}
            Err(err) => {
                log::error!("Uniqueness probe failed while storing translation: {}", err);
                return internal_error();
            }
        }
    }
    if !errors.is_empty() {
        return errors.to_response();
    }

    let payload = payload.into_inner();
    let (Some(group), Some(key), Some(locale), Some(value)) =
        (payload.group, payload.key, payload.locale, payload.value)
    else {
        return internal_error();
    };

    match store.create_translation(NewTranslation {
        group,
        key,
        locale,
        value,
    }) {
        Ok(translation) => HttpResponse::Created().json(translation),
        Err(StoreError::Duplicate(_)) => {
            // Lost the race against a concurrent insert of the same triple.
            let mut errors = ValidationErrors::new();
            add_taken(&mut errors, "key");
            errors.to_response()
        }
        Err(err) => {
            log::error!("Failed to store translation: {}", err);
            internal_error()
        }
    }
}

async fn show(
    path: web::Path<String>,
    store: web::Data<Arc<dyn TranslationStore>>,
) -> HttpResponse {
    let Some(id) = parse_id(&path) else {
        return not_found();
    };
    match store.translation(id) {
        Ok(Some(translation)) => HttpResponse::Ok().json(translation),
        Ok(None) => not_found(),
        Err(err) => {
            log::error!("Failed to fetch translation {}: {}", id, err);
            internal_error()
        }
    }
}

async fn update(
    path: web::Path<String>,
    payload: web::Json<TranslationPayload>,
    store: web::Data<Arc<dyn TranslationStore>>,
) -> HttpResponse {
    let Some(id) = parse_id(&path) else {
        return not_found();
    };
    let current = match store.translation(id) {
        Ok(Some(translation)) => translation,
        Ok(None) => return not_found(),
        Err(err) => {
            log::error!("Failed to fetch translation {}: {}", id, err);
            return internal_error();
        }
    };

    // Only fields present in the payload are validated and applied.
    let mut errors = ValidationErrors::new();
    if let Some(group) = payload.group.as_deref() {
        check_max_chars(&mut errors, "group", group, MAX_TEXT_CHARS);
    }
    if let Some(key) = payload.key.as_deref() {
        check_max_chars(&mut errors, "key", key, MAX_TEXT_CHARS);
    }
    if let Some(locale) = payload.locale.as_deref() {
        check_exact_chars(&mut errors, "locale", locale, MAX_LOCALE_CHARS);
    }

    if errors.is_empty() {
        let group = payload.group.as_deref().unwrap_or(&current.group);
        let key = payload.key.as_deref().unwrap_or(&current.key);
        let locale = payload.locale.as_deref().unwrap_or(&current.locale);
        match store.translation_triple_taken(group, key, locale, Some(id)) {
            Ok(true) => add_taken(&mut errors, "key"),
            Ok(false) => {}
            Err(err) => {
                log::error!("Uniqueness probe failed while updating translation: {}", err);
                return internal_error();
            }
        }
    }
    if !errors.is_empty() {
        return errors.to_response();
    }

    let payload = payload.into_inner();
    let changes = TranslationChanges {
        group: payload.group,
        key: payload.key,
        locale: payload.locale,
        value: payload.value,
    };

    match store.update_translation(id, changes) {
        Ok(Some(translation)) => HttpResponse::Ok().json(translation),
        Ok(None) => not_found(),
        Err(StoreError::Duplicate(_)) => {
            let mut errors = ValidationErrors::new();
            add_taken(&mut errors, "key");
            errors.to_response()
        }
        Err(err) => {
            log::error!("Failed to update translation {}: {}", id, err);
            internal_error()
        }
    }
}

async fn destroy(
    path: web::Path<String>,
    store: web::Data<Arc<dyn TranslationStore>>,
) -> HttpResponse {
    let Some(id) = parse_id(&path) else {
        return not_found();
    };
    match store.delete_translation(id) {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => not_found(),
        Err(err) => {
            log::error!("Failed to delete translation {}: {}", id, err);
            internal_error()
        }
    }
}

async fn search(
    query: web::Query<FilterParams>,
    store: web::Data<Arc<dyn TranslationStore>>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let params = query.into_inner();
    let cache_key = search_cache::cache_key(&params);
    if let Some(rows) = state.search_cache.get(&cache_key) {
        return HttpResponse::Ok().json(rows);
    }

    let filter = params.search_filter();
    match store.search_translations(&filter, SEARCH_LIMIT) {
        Ok(rows) => {
            state.search_cache.put(cache_key, rows.clone());
            HttpResponse::Ok().json(rows)
        }
        Err(err) => {
            log::error!("Translation search failed: {}", err);
            internal_error()
        }
    }
}

async fn export_all(store: web::Data<Arc<dyn TranslationStore>>) -> HttpResponse {
    match export::export_tree(store.get_ref().as_ref()) {
        Ok(tree) => HttpResponse::Ok().json(tree),
        Err(err) => {
            log::error!("Translation export failed: {}", err);
            internal_error()
        }
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.parse().ok()
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({"message": "Translation not found"}))
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({"message": "Internal Server Error"}))
}
