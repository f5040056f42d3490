// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Sample data generation for load testing.
//!
//! Seeding writes straight through the bulk datastore paths, so a run is a
//! handful of snapshot writes rather than one per row. Every generated
//! translation gets two distinct random tags attached, provided enough tags
//! exist.

use argon2::password_hash::rand_core::{OsRng, RngCore};

use crate::store::{Datastore, NewTranslation, StoreError};

pub const DEFAULT_TRANSLATIONS: usize = 100_000;
pub const DEFAULT_TAGS: usize = 1_000;

const TAGS_PER_TRANSLATION: usize = 2;

const GROUPS: &[&str] = &[
    "auth", "messages", "validation", "passwords", "pagination", "navigation", "errors",
    "notifications", "emails", "billing", "profile", "settings", "search", "dashboard", "admin",
];

const LOCALES: &[&str] = &["en_US", "fr_FR", "es_ES", "de_DE", "it_IT"];

const WORDS: &[&str] = &[
    "account", "action", "active", "archive", "balance", "banner", "button", "cancel", "change",
    "confirm", "contact", "content", "country", "create", "credit", "custom", "delete", "detail",
    "domain", "double", "editor", "enable", "export", "filter", "follow", "footer", "format",
    "friend", "global", "header", "hidden", "impact", "import", "invite", "island", "label",
    "launch", "layout", "legacy", "letter", "limit", "listing", "member", "mobile", "module",
    "notice", "number", "object", "option", "orange", "output", "period", "picture", "planet",
    "policy", "prefix", "public", "random", "record", "region", "remote", "remove", "report",
    "result", "review", "sample", "screen", "search", "season", "secret", "secure", "select",
    "signal", "silver", "simple", "source", "status", "stream", "string", "submit", "suffix",
    "survey", "switch", "symbol", "system", "target", "ticket", "toggle", "unique", "update",
    "upload", "vendor", "window", "winter", "wizard",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub tags_created: usize,
    pub translations_created: usize,
}

pub fn run(
    store: &Datastore,
    translations: usize,
    tags: usize,
) -> Result<SeedSummary, StoreError> {
    let mut rng = OsRng;

    let tag_names: Vec<String> = (0..tags).map(|i| tag_name(&mut rng, i)).collect();
    let created_tags = store.bulk_insert_tags(&tag_names)?;
    let tag_ids: Vec<u64> = created_tags.iter().map(|tag| tag.id).collect();

    let rows: Vec<(NewTranslation, Vec<u64>)> = (0..translations)
        .map(|i| {
            let new = NewTranslation {
                group: pick(&mut rng, GROUPS).to_string(),
                // The index keeps the (group, key, locale) triple unique.
                key: format!("{}_{}", pick(&mut rng, WORDS), i),
                locale: pick(&mut rng, LOCALES).to_string(),
                value: sentence(&mut rng),
            };
            (new, pick_tag_ids(&mut rng, &tag_ids))
        })
        .collect();
    let translations_created = store.bulk_insert_translations(rows)?;

    Ok(SeedSummary {
        tags_created: created_tags.len(),
        translations_created,
    })
}

fn pick<'a, T: ?Sized>(rng: &mut OsRng, from: &[&'a T]) -> &'a T {
    from[(rng.next_u64() % from.len() as u64) as usize]
}

fn tag_name(rng: &mut OsRng, index: usize) -> String {
    // Five random words plus the index, unique by construction.
    format!(
        "{} {} {} {} {}",
        pick(rng, WORDS),
        pick(rng, WORDS),
        pick(rng, WORDS),
        pick(rng, WORDS),
        index,
    )
}

fn sentence(rng: &mut OsRng) -> String {
    let word_count = 4 + (rng.next_u64() % 5) as usize;
    let mut out = String::new();
    for i in 0..word_count {
        let word = pick(rng, WORDS);
        if i == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        } else {
            out.push(' ');
            out.push_str(word);
        }
    }
    out.push('.');
    out
}

fn pick_tag_ids(rng: &mut OsRng, tag_ids: &[u64]) -> Vec<u64> {
    if tag_ids.len() < TAGS_PER_TRANSLATION {
        return tag_ids.to_vec();
    }
    let first = (rng.next_u64() % tag_ids.len() as u64) as usize;
    let mut second = (rng.next_u64() % tag_ids.len() as u64) as usize;
    while second == first {
        second = (rng.next_u64() % tag_ids.len() as u64) as usize;
    }
    vec![tag_ids[first], tag_ids[second]]
}
