// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::store::{StoreError, TagStore};
use crate::util::{JsonEscaping, json_array_stream, streamed_json_response};
use crate::validation::{
    MAX_TEXT_CHARS, ValidationErrors, add_taken, check_max_chars, check_required,
};

const LISTING_BATCH_SIZE: usize = 1000;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tags")
            .route("", web::get().to(index))
            .route("", web::post().to(store_tag))
            .route("/{id}", web::get().to(show))
            .route("/{id}", web::put().to(update))
            .route("/{id}", web::patch().to(update))
            .route("/{id}", web::delete().to(destroy)),
    );
}

#[derive(Debug, Deserialize)]
pub struct TagPayload {
    name: Option<String>,
}

/// The tag listing streams raw UTF-8, unlike the translation listing,
/// which escapes down to ASCII. Both are load-bearing for clients.
async fn index(store: web::Data<Arc<dyn TagStore>>) -> HttpResponse {
    let store = store.get_ref().clone();
    let body = json_array_stream(
        move |after| store.tag_batch(after, LISTING_BATCH_SIZE),
        JsonEscaping::Raw,
    );
    streamed_json_response(body)
}

async fn store_tag(
    payload: web::Json<TagPayload>,
    store: web::Data<Arc<dyn TagStore>>,
) -> HttpResponse {
    let mut errors = ValidationErrors::new();
    if let Some(name) = check_required(&mut errors, "name", payload.name.as_deref()) {
        check_max_chars(&mut errors, "name", name, MAX_TEXT_CHARS);
        match store.tag_name_taken(name, None) {
            Ok(true) => add_taken(&mut errors, "name"),
            Ok(false) => {}
            Err(err) => {
                log::error!("Uniqueness probe failed while storing tag: {}", err);
                return internal_error();
            }
        }
    }
    if !errors.is_empty() {
        return errors.to_response();
    }

    let Some(name) = payload.into_inner().name else {
        return internal_error();
    };
    match store.create_tag(&name) {
        Ok(tag) => HttpResponse::Created().json(tag),
        Err(StoreError::Duplicate(_)) => {
            let mut errors = ValidationErrors::new();
            add_taken(&mut errors, "name");
            errors.to_response()
        }
        Err(err) => {
            log::error!("Failed to store tag: {}", err);
            internal_error()
        }
    }
}

async fn show(path: web::Path<String>, store: web::Data<Arc<dyn TagStore>>) -> HttpResponse {
    let Some(id) = parse_id(&path) else {
        return not_found();
    };
    match store.tag(id) {
        Ok(Some(tag)) => HttpResponse::Ok().json(tag),
        Ok(None) => not_found(),
        Err(err) => {
            log::error!("Failed to fetch tag {}: {}", id, err);
            internal_error()
        }
    }
}

async fn update(
    path: web::Path<String>,
    payload: web::Json<TagPayload>,
    store: web::Data<Arc<dyn TagStore>>,
) -> HttpResponse {
    let Some(id) = parse_id(&path) else {
        return not_found();
    };
    let current = match store.tag(id) {
        Ok(Some(tag)) => tag,
        Ok(None) => return not_found(),
        Err(err) => {
            log::error!("Failed to fetch tag {}: {}", id, err);
            return internal_error();
        }
    };

    // The name is validated only when present ("sometimes"); an empty
    // payload leaves the tag unchanged.
    let Some(name) = payload.into_inner().name else {
        return HttpResponse::Ok().json(current);
    };

    let mut errors = ValidationErrors::new();
    if check_required(&mut errors, "name", Some(name.as_str())).is_some() {
        check_max_chars(&mut errors, "name", &name, MAX_TEXT_CHARS);
        match store.tag_name_taken(&name, Some(id)) {
            Ok(true) => add_taken(&mut errors, "name"),
            Ok(false) => {}
            Err(err) => {
                log::error!("Uniqueness probe failed while updating tag: {}", err);
                return internal_error();
            }
        }
    }
    if !errors.is_empty() {
        return errors.to_response();
    }

    match store.rename_tag(id, &name) {
        Ok(Some(tag)) => HttpResponse::Ok().json(tag),
        Ok(None) => not_found(),
        Err(StoreError::Duplicate(_)) => {
            let mut errors = ValidationErrors::new();
            add_taken(&mut errors, "name");
            errors.to_response()
        }
        Err(err) => {
            log::error!("Failed to update tag {}: {}", id, err);
            internal_error()
        }
    }
}

async fn destroy(path: web::Path<String>, store: web::Data<Arc<dyn TagStore>>) -> HttpResponse {
    let Some(id) = parse_id(&path) else {
        return not_found();
    };
    match store.delete_tag(id) {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => not_found(),
        Err(err) => {
            log::error!("Failed to delete tag {}: {}", id, err);
            internal_error()
        }
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.parse().ok()
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({"message": "Tag not found"}))
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({"message": "Internal Server Error"}))
}
