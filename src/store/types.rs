// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Translation {
    pub id: u64,
    pub group: String,
    pub key: String,
    pub locale: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trimmed row shape used by the listing, search, and export paths.
/// Matches the column subset those queries select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRow {
    pub id: u64,
    pub group: String,
    pub key: String,
    pub locale: String,
    pub value: String,
}

impl From<&Translation> for TranslationRow {
    fn from(translation: &Translation) -> Self {
        TranslationRow {
            id: translation.id,
            group: translation.group.clone(),
            key: translation.key.clone(),
            locale: translation.locale.clone(),
            value: translation.value.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTranslation {
    pub group: String,
    pub key: String,
    pub locale: String,
    pub value: String,
}

/// Partial update: fields left as `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct TranslationChanges {
    pub group: Option<String>,
    pub key: Option<String>,
    pub locale: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape for the streamed tag listing (id and name only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRow {
    pub id: u64,
    pub name: String,
}

impl From<&Tag> for TagRow {
    fn from(tag: &Tag) -> Self {
        TagRow {
            id: tag.id,
            name: tag.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub enum StoreError {
    /// A uniqueness invariant was violated (duplicate triple, tag name, or email).
    Duplicate(String),
    /// A referenced parent row does not exist (attach against missing ids).
    MissingParent(String),
    FileError(String),
    ParseError(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Duplicate(msg) => write!(f, "Duplicate: {}", msg),
            StoreError::MissingParent(msg) => write!(f, "Missing parent: {}", msg),
            StoreError::FileError(msg) => write!(f, "File error: {}", msg),
            StoreError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
