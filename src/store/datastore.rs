// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! In-process datastore behind the storage traits.
//!
//! All records live in indexed maps under a single `RwLock`; mutations are
//! persisted to the JSON snapshot before they are considered committed, and
//! rolled back in memory when the snapshot write fails. Reads never touch
//! the disk. `in_memory()` skips persistence entirely and is what the test
//! suites inject.

use super::snapshot::{SnapshotData, SnapshotFile};
use super::types::{
    NewTranslation, NewUser, StoreError, Tag, TagRow, Translation, TranslationChanges,
    TranslationRow, User,
};
use super::{TagStore, TranslationStore, UserStore};
use crate::translations::filter::{ListFilter, SearchFilter};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct DataSet {
    translations: BTreeMap<u64, Translation>,
    // (group, key, locale) -> id
    triple_index: HashMap<(String, String, String), u64>,
    tags: BTreeMap<u64, Tag>,
    tag_names: HashMap<String, u64>,
    // (translation_id, tag_id), composite-unique by construction
    links: BTreeSet<(u64, u64)>,
    users: BTreeMap<u64, User>,
    user_emails: HashMap<String, u64>,
    next_translation_id: u64,
    next_tag_id: u64,
    next_user_id: u64,
}

impl DataSet {
    fn from_snapshot(data: SnapshotData) -> Self {
        let mut set = DataSet {
            next_translation_id: data.next_translation_id.max(1),
            next_tag_id: data.next_tag_id.max(1),
            next_user_id: data.next_user_id.max(1),
            ..DataSet::default()
        };
        for translation in data.translations {
            set.next_translation_id = set.next_translation_id.max(translation.id + 1);
            set.triple_index.insert(
                triple_key(&translation.group, &translation.key, &translation.locale),
                translation.id,
            );
            set.translations.insert(translation.id, translation);
        }
        for tag in data.tags {
            set.next_tag_id = set.next_tag_id.max(tag.id + 1);
            set.tag_names.insert(tag.name.clone(), tag.id);
            set.tags.insert(tag.id, tag);
        }
        for user in data.users {
            set.next_user_id = set.next_user_id.max(user.id + 1);
            set.user_emails.insert(user.email.clone(), user.id);
            set.users.insert(user.id, user);
        }
        set.links = data.links.into_iter().collect();
        set
    }

    fn to_snapshot(&self) -> SnapshotData {
        SnapshotData {
            translations: self.translations.values().cloned().collect(),
            tags: self.tags.values().cloned().collect(),
            users: self.users.values().cloned().collect(),
            links: self.links.iter().cloned().collect(),
            next_translation_id: self.next_translation_id,
            next_tag_id: self.next_tag_id,
            next_user_id: self.next_user_id,
        }
    }
}

fn triple_key(group: &str, key: &str, locale: &str) -> (String, String, String) {
    (group.to_string(), key.to_string(), locale.to_string())
}

pub struct Datastore {
    inner: RwLock<DataSet>,
    snapshot: Option<SnapshotFile>,
}

impl Datastore {
    /// Open (or initialize) a datastore persisted at `path`.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let snapshot = SnapshotFile::new(path)?;
        let data = DataSet::from_snapshot(snapshot.load()?);
        Ok(Datastore {
            inner: RwLock::new(data),
            snapshot: Some(snapshot),
        })
    }

    /// Ephemeral datastore with no snapshot file. Used by the test suites.
    pub fn in_memory() -> Self {
        Datastore {
            inner: RwLock::new(DataSet::default()),
            snapshot: None,
        }
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, DataSet> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Datastore lock poisoned on read; recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, DataSet> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Datastore lock poisoned on write; recovering");
                poisoned.into_inner()
            }
        }
    }

    fn persist(&self, data: &DataSet) -> Result<(), StoreError> {
        match &self.snapshot {
            Some(snapshot) => snapshot.save(&data.to_snapshot()),
            None => Ok(()),
        }
    }

    /// Resolve the tag filter to a tag id. `Err(())` is the "filter can
    /// never match" case: a tag parameter was given but no such tag exists,
    /// which must yield zero rows rather than ignoring the filter.
    fn resolve_tag(data: &DataSet, tag: &Option<String>) -> Result<Option<u64>, ()> {
        match tag {
            None => Ok(None),
            Some(name) => match data.tag_names.get(name.as_str()) {
                Some(id) => Ok(Some(*id)),
                None => Err(()),
            },
        }
    }

    fn linked(data: &DataSet, translation_id: u64, tag_id: u64) -> bool {
        data.links.contains(&(translation_id, tag_id))
    }

    /// Insert many tags with a single snapshot write. Names already present
    /// are skipped. Used by the seeder; the request path goes through
    /// [`TagStore::create_tag`].
    pub fn bulk_insert_tags(&self, names: &[String]) -> Result<Vec<Tag>, StoreError> {
        let mut data = self.write_guard();
        let now = Utc::now();
        let mut created = Vec::new();
        for name in names {
            if data.tag_names.contains_key(name.as_str()) {
                continue;
            }
            let id = data.next_tag_id;
            data.next_tag_id += 1;
            let tag = Tag {
                id,
                name: name.clone(),
                created_at: now,
                updated_at: now,
            };
            data.tag_names.insert(name.clone(), id);
            data.tags.insert(id, tag.clone());
            created.push(tag);
        }

        if let Err(err) = self.persist(&data) {
            for tag in &created {
                data.tag_names.remove(&tag.name);
                data.tags.remove(&tag.id);
            }
            if let Some(first) = created.first() {
                data.next_tag_id = first.id;
            }
            return Err(err);
        }
        Ok(created)
    }

    /// Insert many translations, each with its tag links, in one snapshot
    /// write. Rows whose triple is already taken are skipped; links to
    /// unknown tags are dropped. Returns the number of rows inserted.
    pub fn bulk_insert_translations(
        &self,
        rows: Vec<(NewTranslation, Vec<u64>)>,
    ) -> Result<usize, StoreError> {
        let mut data = self.write_guard();
        let now = Utc::now();
        let mut inserted_ids = Vec::new();
        let mut inserted_links = Vec::new();
        let first_id = data.next_translation_id;

        for (new, tag_ids) in rows {
            let key = triple_key(&new.group, &new.key, &new.locale);
            if data.triple_index.contains_key(&key) {
                continue;
            }
            let id = data.next_translation_id;
            data.next_translation_id += 1;
            data.triple_index.insert(key, id);
            data.translations.insert(
                id,
                Translation {
                    id,
                    group: new.group,
                    key: new.key,
                    locale: new.locale,
                    value: new.value,
                    created_at: now,
                    updated_at: now,
                },
            );
            inserted_ids.push(id);
            for tag_id in tag_ids {
                if data.tags.contains_key(&tag_id) && data.links.insert((id, tag_id)) {
                    inserted_links.push((id, tag_id));
                }
            }
        }

        if let Err(err) = self.persist(&data) {
            for id in &inserted_ids {
                if let Some(removed) = data.translations.remove(id) {
                    data.triple_index
                        .remove(&triple_key(&removed.group, &removed.key, &removed.locale));
                }
            }
            for link in inserted_links {
                data.links.remove(&link);
            }
            data.next_translation_id = first_id;
            return Err(err);
        }
        Ok(inserted_ids.len())
    }
}

impl TranslationStore for Datastore {
    fn create_translation(&self, new: NewTranslation) -> Result<Translation, StoreError> {
        let mut data = self.write_guard();
        let key = triple_key(&new.group, &new.key, &new.locale);
        if data.triple_index.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "translation ({}, {}, {}) already exists",
                new.group, new.key, new.locale
            )));
        }

        let now = Utc::now();
        let id = data.next_translation_id;
        let translation = Translation {
            id,
            group: new.group,
            key: new.key,
            locale: new.locale,
            value: new.value,
            created_at: now,
            updated_at: now,
        };

        data.next_translation_id += 1;
        data.triple_index.insert(key.clone(), id);
        data.translations.insert(id, translation.clone());

        if let Err(err) = self.persist(&data) {
            data.translations.remove(&id);
            data.triple_index.remove(&key);
            data.next_translation_id = id;
            return Err(err);
        }
        Ok(translation)
    }

    fn translation(&self, id: u64) -> Result<Option<Translation>, StoreError> {
        Ok(self.read_guard().translations.get(&id).cloned())
    }

    fn update_translation(
        &self,
        id: u64,
        changes: TranslationChanges,
    ) -> Result<Option<Translation>, StoreError> {
        let mut data = self.write_guard();
        let Some(current) = data.translations.get(&id).cloned() else {
            return Ok(None);
        };

        let mut updated = current.clone();
        if let Some(group) = changes.group {
            updated.group = group;
        }
        if let Some(key) = changes.key {
            updated.key = key;
        }
        if let Some(locale) = changes.locale {
            updated.locale = locale;
        }
        if let Some(value) = changes.value {
            updated.value = value;
        }

        let old_key = triple_key(&current.group, &current.key, &current.locale);
        let new_key = triple_key(&updated.group, &updated.key, &updated.locale);
        if new_key != old_key {
            if data.triple_index.contains_key(&new_key) {
                return Err(StoreError::Duplicate(format!(
                    "translation ({}, {}, {}) already exists",
                    updated.group, updated.key, updated.locale
                )));
            }
            data.triple_index.remove(&old_key);
            data.triple_index.insert(new_key.clone(), id);
        }
        updated.updated_at = Utc::now();
        data.translations.insert(id, updated.clone());

        if let Err(err) = self.persist(&data) {
            data.translations.insert(id, current);
            if new_key != old_key {
                data.triple_index.remove(&new_key);
                data.triple_index.insert(old_key, id);
            }
            return Err(err);
        }
        Ok(Some(updated))
    }

    fn delete_translation(&self, id: u64) -> Result<bool, StoreError> {
        let mut data = self.write_guard();
        let Some(removed) = data.translations.remove(&id) else {
            return Ok(false);
        };
        data.triple_index
            .remove(&triple_key(&removed.group, &removed.key, &removed.locale));
        let removed_links: Vec<(u64, u64)> = data
            .links
            .iter()
            .filter(|(translation_id, _)| *translation_id == id)
            .cloned()
            .collect();
        for link in &removed_links {
            data.links.remove(link);
        }

        if let Err(err) = self.persist(&data) {
            data.triple_index.insert(
                triple_key(&removed.group, &removed.key, &removed.locale),
                id,
            );
            data.translations.insert(id, removed);
            data.links.extend(removed_links);
            return Err(err);
        }
        Ok(true)
    }

    fn translation_triple_taken(
        &self,
        group: &str,
        key: &str,
        locale: &str,
        exclude: Option<u64>,
    ) -> Result<bool, StoreError> {
        let data = self.read_guard();
        match data.triple_index.get(&triple_key(group, key, locale)) {
            Some(id) => Ok(Some(*id) != exclude),
            None => Ok(false),
        }
    }

    fn translation_batch(
        &self,
        filter: &ListFilter,
        after_id: Option<u64>,
        limit: usize,
    ) -> Result<Vec<TranslationRow>, StoreError> {
        let data = self.read_guard();
        let tag_id = match Self::resolve_tag(&data, &filter.tag) {
            Ok(tag_id) => tag_id,
            Err(()) => return Ok(Vec::new()),
        };

        let lower = match after_id {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        let rows = data
            .translations
            .range((lower, Bound::Unbounded))
            .filter(|(id, translation)| {
                if let Some(tag_id) = tag_id {
                    if !Self::linked(&data, **id, tag_id) {
                        return false;
                    }
                }
                filter.matches_text(translation)
            })
            .take(limit)
            .map(|(_, translation)| TranslationRow::from(translation))
            .collect();
        Ok(rows)
    }

    fn search_translations(
        &self,
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<TranslationRow>, StoreError> {
        let data = self.read_guard();
        let tag_id = match Self::resolve_tag(&data, &filter.tag) {
            Ok(tag_id) => tag_id,
            Err(()) => return Ok(Vec::new()),
        };

        let rows = data
            .translations
            .iter()
            .filter(|(id, translation)| {
                if let Some(tag_id) = tag_id {
                    if !Self::linked(&data, **id, tag_id) {
                        return false;
                    }
                }
                filter.matches_text(translation)
            })
            .take(limit)
            .map(|(_, translation)| TranslationRow::from(translation))
            .collect();
        Ok(rows)
    }

    fn attach_tags(&self, translation_id: u64, tag_ids: &[u64]) -> Result<(), StoreError> {
        let mut data = self.write_guard();
        if !data.translations.contains_key(&translation_id) {
            return Err(StoreError::MissingParent(format!(
                "translation {} does not exist",
                translation_id
            )));
        }
        for tag_id in tag_ids {
            if !data.tags.contains_key(tag_id) {
                return Err(StoreError::MissingParent(format!(
                    "tag {} does not exist",
                    tag_id
                )));
            }
        }

        let mut inserted = Vec::new();
        for tag_id in tag_ids {
            if data.links.insert((translation_id, *tag_id)) {
                inserted.push((translation_id, *tag_id));
            }
        }

        if let Err(err) = self.persist(&data) {
            for link in inserted {
                data.links.remove(&link);
            }
            return Err(err);
        }
        Ok(())
    }

    fn detach_tags(&self, translation_id: u64, tag_ids: &[u64]) -> Result<(), StoreError> {
        let mut data = self.write_guard();
        let mut removed = Vec::new();
        for tag_id in tag_ids {
            if data.links.remove(&(translation_id, *tag_id)) {
                removed.push((translation_id, *tag_id));
            }
        }

        if let Err(err) = self.persist(&data) {
            data.links.extend(removed);
            return Err(err);
        }
        Ok(())
    }
}

impl TagStore for Datastore {
    fn create_tag(&self, name: &str) -> Result<Tag, StoreError> {
        let mut data = self.write_guard();
        if data.tag_names.contains_key(name) {
            return Err(StoreError::Duplicate(format!(
                "tag {:?} already exists",
                name
            )));
        }

        let now = Utc::now();
        let id = data.next_tag_id;
        let tag = Tag {
            id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };

        data.next_tag_id += 1;
        data.tag_names.insert(name.to_string(), id);
        data.tags.insert(id, tag.clone());

        if let Err(err) = self.persist(&data) {
            data.tags.remove(&id);
            data.tag_names.remove(name);
            data.next_tag_id = id;
            return Err(err);
        }
        Ok(tag)
    }

    fn tag(&self, id: u64) -> Result<Option<Tag>, StoreError> {
        Ok(self.read_guard().tags.get(&id).cloned())
    }

    fn rename_tag(&self, id: u64, name: &str) -> Result<Option<Tag>, StoreError> {
        let mut data = self.write_guard();
        let Some(current) = data.tags.get(&id).cloned() else {
            return Ok(None);
        };
        if let Some(existing) = data.tag_names.get(name) {
            if *existing != id {
                return Err(StoreError::Duplicate(format!(
                    "tag {:?} already exists",
                    name
                )));
            }
        }

        let mut updated = current.clone();
        updated.name = name.to_string();
        updated.updated_at = Utc::now();
        data.tag_names.remove(&current.name);
        data.tag_names.insert(name.to_string(), id);
        data.tags.insert(id, updated.clone());

        if let Err(err) = self.persist(&data) {
            data.tag_names.remove(name);
            data.tag_names.insert(current.name.clone(), id);
            data.tags.insert(id, current);
            return Err(err);
        }
        Ok(Some(updated))
    }

    fn delete_tag(&self, id: u64) -> Result<bool, StoreError> {
        let mut data = self.write_guard();
        let Some(removed) = data.tags.remove(&id) else {
            return Ok(false);
        };
        data.tag_names.remove(&removed.name);
        let removed_links: Vec<(u64, u64)> = data
            .links
            .iter()
            .filter(|(_, tag_id)| *tag_id == id)
            .cloned()
            .collect();
        for link in &removed_links {
            data.links.remove(link);
        }

        if let Err(err) = self.persist(&data) {
            data.tag_names.insert(removed.name.clone(), id);
            data.tags.insert(id, removed);
            data.links.extend(removed_links);
            return Err(err);
        }
        Ok(true)
    }

    fn tag_name_taken(&self, name: &str, exclude: Option<u64>) -> Result<bool, StoreError> {
        let data = self.read_guard();
        match data.tag_names.get(name) {
            Some(id) => Ok(Some(*id) != exclude),
            None => Ok(false),
        }
    }

    fn tag_batch(&self, after_id: Option<u64>, limit: usize) -> Result<Vec<TagRow>, StoreError> {
        let data = self.read_guard();
        let lower = match after_id {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        let rows = data
            .tags
            .range((lower, Bound::Unbounded))
            .take(limit)
            .map(|(_, tag)| TagRow::from(tag))
            .collect();
        Ok(rows)
    }
}

impl UserStore for Datastore {
    fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut data = self.write_guard();
        if data.user_emails.contains_key(&new.email) {
            return Err(StoreError::Duplicate(format!(
                "user {} already exists",
                new.email
            )));
        }

        let now = Utc::now();
        let id = data.next_user_id;
        let user = User {
            id,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };

        data.next_user_id += 1;
        data.user_emails.insert(user.email.clone(), id);
        data.users.insert(id, user.clone());

        // The multi-step insert is atomic from the caller's perspective:
        // a failed snapshot write rolls the in-memory state back before the
        // error is surfaced.
        if let Err(err) = self.persist(&data) {
            data.users.remove(&id);
            data.user_emails.remove(&user.email);
            data.next_user_id = id;
            return Err(err);
        }
        Ok(user)
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let data = self.read_guard();
        Ok(data
            .user_emails
            .get(email)
            .and_then(|id| data.users.get(id))
            .cloned())
    }

    fn email_taken(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.read_guard().user_emails.contains_key(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_translation(group: &str, key: &str, locale: &str, value: &str) -> NewTranslation {
        NewTranslation {
            group: group.to_string(),
            key: key.to_string(),
            locale: locale.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn create_then_fetch_returns_same_values() {
        let store = Datastore::in_memory();
        let created = store
            .create_translation(new_translation("auth", "greeting", "en_US", "Hello"))
            .expect("create");

        let fetched = store
            .translation(created.id)
            .expect("fetch")
            .expect("present");
        assert_eq!(fetched.group, "auth");
        assert_eq!(fetched.key, "greeting");
        assert_eq!(fetched.locale, "en_US");
        assert_eq!(fetched.value, "Hello");
    }

    #[test]
    fn duplicate_triple_is_rejected() {
        let store = Datastore::in_memory();
        store
            .create_translation(new_translation("auth", "greeting", "en_US", "Hello"))
            .expect("create");
        let result = store.create_translation(new_translation("auth", "greeting", "en_US", "Hi"));
        assert!(matches!(result, Err(StoreError::Duplicate(_))));

        // Same key in another locale is fine.
        store
            .create_translation(new_translation("auth", "greeting", "fr_FR", "Bonjour"))
            .expect("create other locale");
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let store = Datastore::in_memory();
        let created = store
            .create_translation(new_translation("auth", "greeting", "en_US", "Hello"))
            .expect("create");

        let updated = store
            .update_translation(
                created.id,
                TranslationChanges {
                    value: Some("Hi there".to_string()),
                    ..Default::default()
                },
            )
            .expect("update")
            .expect("present");
        assert_eq!(updated.group, "auth");
        assert_eq!(updated.key, "greeting");
        assert_eq!(updated.locale, "en_US");
        assert_eq!(updated.value, "Hi there");
    }

    #[test]
    fn update_into_existing_triple_is_rejected() {
        let store = Datastore::in_memory();
        store
            .create_translation(new_translation("auth", "greeting", "en_US", "Hello"))
            .expect("create");
        let other = store
            .create_translation(new_translation("auth", "greeting", "fr_FR", "Bonjour"))
            .expect("create");

        let result = store.update_translation(
            other.id,
            TranslationChanges {
                locale: Some("en_US".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StoreError::Duplicate(_))));

        // The rejected update must not have been partially applied.
        let unchanged = store.translation(other.id).expect("fetch").expect("present");
        assert_eq!(unchanged.locale, "fr_FR");
    }

    #[test]
    fn delete_frees_the_triple_and_join_rows() {
        let store = Datastore::in_memory();
        let translation = store
            .create_translation(new_translation("auth", "greeting", "en_US", "Hello"))
            .expect("create");
        let tag = store.create_tag("ui").expect("tag");
        store
            .attach_tags(translation.id, &[tag.id])
            .expect("attach");

        assert!(store.delete_translation(translation.id).expect("delete"));
        assert!(!store.delete_translation(translation.id).expect("repeat"));

        // Triple can be reused and the tag filter no longer matches.
        store
            .create_translation(new_translation("auth", "greeting", "en_US", "Hello again"))
            .expect("recreate");
        let filter = ListFilter {
            tag: Some("ui".to_string()),
            ..Default::default()
        };
        let rows = store.translation_batch(&filter, None, 10).expect("batch");
        assert!(rows.is_empty());
    }

    #[test]
    fn batch_cursor_pages_in_id_order() {
        let store = Datastore::in_memory();
        for i in 0..5 {
            store
                .create_translation(new_translation("auth", &format!("key{}", i), "en_US", "v"))
                .expect("create");
        }

        let filter = ListFilter::default();
        let first = store.translation_batch(&filter, None, 2).expect("batch");
        assert_eq!(first.len(), 2);
        let second = store
            .translation_batch(&filter, Some(first[1].id), 2)
            .expect("batch");
        assert_eq!(second.len(), 2);
        assert!(second[0].id > first[1].id);
        let third = store
            .translation_batch(&filter, Some(second[1].id), 2)
            .expect("batch");
        assert_eq!(third.len(), 1);
        let done = store
            .translation_batch(&filter, Some(third[0].id), 2)
            .expect("batch");
        assert!(done.is_empty());
    }

    #[test]
    fn unknown_tag_filter_yields_zero_rows_not_error() {
        let store = Datastore::in_memory();
        store
            .create_translation(new_translation("auth", "greeting", "en_US", "Hello"))
            .expect("create");

        let filter = ListFilter {
            tag: Some("no-such-tag".to_string()),
            ..Default::default()
        };
        assert!(store
            .translation_batch(&filter, None, 10)
            .expect("batch")
            .is_empty());

        let search = SearchFilter {
            tag: Some("no-such-tag".to_string()),
            ..Default::default()
        };
        assert!(store
            .search_translations(&search, 50)
            .expect("search")
            .is_empty());
    }

    #[test]
    fn tag_filter_selects_only_linked_translations() {
        let store = Datastore::in_memory();
        let tagged = store
            .create_translation(new_translation("ui", "save", "en_US", "Save"))
            .expect("create");
        store
            .create_translation(new_translation("ui", "cancel", "en_US", "Cancel"))
            .expect("create");
        let tag = store.create_tag("buttons").expect("tag");
        store.attach_tags(tagged.id, &[tag.id]).expect("attach");

        let filter = ListFilter {
            tag: Some("buttons".to_string()),
            ..Default::default()
        };
        let rows = store.translation_batch(&filter, None, 10).expect("batch");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "save");
    }

    #[test]
    fn attach_requires_both_parents() {
        let store = Datastore::in_memory();
        let translation = store
            .create_translation(new_translation("ui", "save", "en_US", "Save"))
            .expect("create");
        assert!(matches!(
            store.attach_tags(translation.id, &[99]),
            Err(StoreError::MissingParent(_))
        ));
        assert!(matches!(
            store.attach_tags(999, &[]),
            Err(StoreError::MissingParent(_))
        ));
    }

    #[test]
    fn attach_is_idempotent_and_detach_removes() {
        let store = Datastore::in_memory();
        let translation = store
            .create_translation(new_translation("ui", "save", "en_US", "Save"))
            .expect("create");
        let tag = store.create_tag("buttons").expect("tag");
        store
            .attach_tags(translation.id, &[tag.id])
            .expect("attach");
        store
            .attach_tags(translation.id, &[tag.id])
            .expect("attach again");
        store
            .detach_tags(translation.id, &[tag.id])
            .expect("detach");

        let filter = ListFilter {
            tag: Some("buttons".to_string()),
            ..Default::default()
        };
        assert!(store
            .translation_batch(&filter, None, 10)
            .expect("batch")
            .is_empty());
    }

    #[test]
    fn tag_rename_excludes_self_from_uniqueness() {
        let store = Datastore::in_memory();
        let tag = store.create_tag("ui").expect("tag");
        store.create_tag("backend").expect("tag");

        // Renaming to its own name is allowed.
        let same = store.rename_tag(tag.id, "ui").expect("rename").expect("present");
        assert_eq!(same.name, "ui");

        // Renaming onto another tag's name is not.
        assert!(matches!(
            store.rename_tag(tag.id, "backend"),
            Err(StoreError::Duplicate(_))
        ));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let store = Datastore::in_memory();
        store
            .create_user(NewUser {
                name: "One".to_string(),
                email: "one@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .expect("create");
        let result = store.create_user(NewUser {
            name: "Two".to_string(),
            email: "one@example.com".to_string(),
            password_hash: "hash".to_string(),
        });
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[test]
    fn bulk_insert_skips_duplicates_and_links_existing_tags() {
        let store = Datastore::in_memory();
        let tags = store
            .bulk_insert_tags(&["ui".to_string(), "backend".to_string(), "ui".to_string()])
            .expect("tags");
        assert_eq!(tags.len(), 2);

        let rows = vec![
            (
                new_translation("auth", "greeting", "en_US", "Hello"),
                vec![tags[0].id, 999],
            ),
            (
                new_translation("auth", "greeting", "en_US", "Hello again"),
                vec![],
            ),
            (new_translation("auth", "farewell", "en_US", "Bye"), vec![]),
        ];
        let inserted = store.bulk_insert_translations(rows).expect("bulk");
        assert_eq!(inserted, 2);

        let filter = ListFilter {
            tag: Some("ui".to_string()),
            ..Default::default()
        };
        let linked = store.translation_batch(&filter, None, 10).expect("batch");
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].value, "Hello");
    }

    #[test]
    fn open_restores_persisted_state() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("data.json");

        {
            let store = Datastore::open(path.clone()).expect("open");
            let translation = store
                .create_translation(new_translation("auth", "greeting", "en_US", "Hello"))
                .expect("create");
            let tag = store.create_tag("ui").expect("tag");
            store
                .attach_tags(translation.id, &[tag.id])
                .expect("attach");
        }

        let reopened = Datastore::open(path).expect("reopen");
        let filter = ListFilter {
            tag: Some("ui".to_string()),
            ..Default::default()
        };
        let rows = reopened.translation_batch(&filter, None, 10).expect("batch");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "greeting");

        // Ids keep counting from where they left off.
        let next = reopened
            .create_translation(new_translation("auth", "farewell", "en_US", "Bye"))
            .expect("create");
        assert_eq!(next.id, 2);
    }

    #[cfg(unix)]
    #[test]
    fn failed_snapshot_write_rolls_back_user_insert() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir");
        let store = Datastore::open(temp.path().join("data.json")).expect("open");

        let dir = temp.path();
        let original = std::fs::metadata(dir)
            .expect("metadata")
            .permissions()
            .mode();
        let read_only = std::fs::Permissions::from_mode(original & 0o555);
        std::fs::set_permissions(dir, read_only).expect("set read-only");

        let result = store.create_user(NewUser {
            name: "One".to_string(),
            email: "one@example.com".to_string(),
            password_hash: "hash".to_string(),
        });
        assert!(result.is_err());

        let restore = std::fs::Permissions::from_mode(original);
        std::fs::set_permissions(dir, restore).expect("restore permissions");

        // Rollback: no half-registered user remains.
        assert!(!store.email_taken("one@example.com").expect("probe"));
        let user = store
            .create_user(NewUser {
                name: "One".to_string(),
                email: "one@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .expect("create after recovery");
        assert_eq!(user.id, 1);
    }
}
