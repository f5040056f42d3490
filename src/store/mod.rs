// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod datastore;
pub mod fulltext;
pub mod snapshot;
pub mod types;

pub use datastore::Datastore;
pub use types::{
    NewTranslation, NewUser, StoreError, Tag, TagRow, Translation, TranslationChanges,
    TranslationRow, User,
};

use crate::translations::filter::{ListFilter, SearchFilter};

/// Storage capability for translations. Handlers depend on this trait,
/// never on the concrete engine, so tests can inject their own instance.
pub trait TranslationStore: Send + Sync {
    fn create_translation(&self, new: NewTranslation) -> Result<Translation, StoreError>;
    fn translation(&self, id: u64) -> Result<Option<Translation>, StoreError>;
    fn update_translation(
        &self,
        id: u64,
        changes: TranslationChanges,
    ) -> Result<Option<Translation>, StoreError>;
    fn delete_translation(&self, id: u64) -> Result<bool, StoreError>;

    /// Uniqueness probe for the (group, key, locale) triple, optionally
    /// excluding one row (the row being updated).
    fn translation_triple_taken(
        &self,
        group: &str,
        key: &str,
        locale: &str,
        exclude: Option<u64>,
    ) -> Result<bool, StoreError>;

    /// Forward-only cursor page: rows with id greater than `after_id`,
    /// in id order, at most `limit` rows. An empty page means exhausted.
    fn translation_batch(
        &self,
        filter: &ListFilter,
        after_id: Option<u64>,
        limit: usize,
    ) -> Result<Vec<TranslationRow>, StoreError>;

    /// Full-text search path; capped by the caller.
    fn search_translations(
        &self,
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<TranslationRow>, StoreError>;

    fn attach_tags(&self, translation_id: u64, tag_ids: &[u64]) -> Result<(), StoreError>;
    fn detach_tags(&self, translation_id: u64, tag_ids: &[u64]) -> Result<(), StoreError>;
}

pub trait TagStore: Send + Sync {
    fn create_tag(&self, name: &str) -> Result<Tag, StoreError>;
    fn tag(&self, id: u64) -> Result<Option<Tag>, StoreError>;
    fn rename_tag(&self, id: u64, name: &str) -> Result<Option<Tag>, StoreError>;
    fn delete_tag(&self, id: u64) -> Result<bool, StoreError>;
    fn tag_name_taken(&self, name: &str, exclude: Option<u64>) -> Result<bool, StoreError>;
    fn tag_batch(&self, after_id: Option<u64>, limit: usize) -> Result<Vec<TagRow>, StoreError>;
}

pub trait UserStore: Send + Sync {
    fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    fn email_taken(&self, email: &str) -> Result<bool, StoreError>;
}
