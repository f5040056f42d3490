// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Request payload validation.
//!
//! Handlers accumulate field errors into a [`ValidationErrors`] and, if any
//! were recorded, answer 422 with the standard envelope: a `message` built
//! from the first error plus an "(and N more errors)" suffix, and an
//! `errors` object mapping each field to its messages. Clients parse that
//! envelope, so the wording of the stock messages is part of the API.

use actix_web::HttpResponse;
use serde_json::json;
use validator::ValidateEmail;

pub const MAX_TEXT_CHARS: usize = 255;
pub const MAX_LOCALE_CHARS: usize = 5;
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Field errors in the order they were recorded.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    fields: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors::default()
    }

    pub fn add(&mut self, field: &str, message: String) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.fields.push((field.to_string(), vec![message])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn count(&self) -> usize {
        self.fields.iter().map(|(_, messages)| messages.len()).sum()
    }

    /// The summary line: the first recorded error, with a suffix when more
    /// errors follow it.
    pub fn message(&self) -> String {
        let first = self
            .fields
            .first()
            .and_then(|(_, messages)| messages.first());
        let Some(first) = first else {
            return String::new();
        };
        match self.count() - 1 {
            0 => first.clone(),
            1 => format!("{} (and 1 more error)", first),
            more => format!("{} (and {} more errors)", first, more),
        }
    }

    pub fn to_response(&self) -> HttpResponse {
        let mut errors = serde_json::Map::new();
        for (field, messages) in &self.fields {
            errors.insert(field.clone(), json!(messages));
        }
        HttpResponse::UnprocessableEntity().json(json!({
            "message": self.message(),
            "errors": errors,
        }))
    }
}

/// Check the `required` rule: the field must be present and non-empty.
/// Returns the value when it passed, so follow-up rules can skip a field
/// that already failed.
pub fn check_required<'a>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&'a str>,
) -> Option<&'a str> {
    match value {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            errors.add(field, format!("The {} field is required.", field));
            None
        }
    }
}

pub fn check_max_chars(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(
            field,
            format!(
                "The {} field must not be greater than {} characters.",
                field, max
            ),
        );
    }
}

pub fn check_min_chars(errors: &mut ValidationErrors, field: &str, value: &str, min: usize) {
    if value.chars().count() < min {
        errors.add(
            field,
            format!("The {} field must be at least {} characters.", field, min),
        );
    }
}

pub fn check_email_format(errors: &mut ValidationErrors, field: &str, value: &str) {
    if !value.validate_email() {
        errors.add(
            field,
            format!("The {} field must be a valid email address.", field),
        );
    }
}

/// Check the `size` rule for strings: exactly `size` characters.
pub fn check_exact_chars(errors: &mut ValidationErrors, field: &str, value: &str, size: usize) {
    if value.chars().count() != size {
        errors.add(
            field,
            format!("The {} field must be {} characters.", field, size),
        );
    }
}

/// Record the `unique` rule failure for a field.
pub fn add_taken(errors: &mut ValidationErrors, field: &str) {
    errors.add(field, format!("The {} has already been taken.", field));
}
