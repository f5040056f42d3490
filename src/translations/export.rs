// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Bulk export of all translations as a nested tree.
//!
//! The export shape is locale -> group -> key -> value. Rows are pulled in
//! fixed-size batches in id order; when two rows claim the same slot the
//! later row wins, matching the insertion-order aggregation consumers
//! already rely on.

use crate::store::types::StoreError;
use crate::store::TranslationStore;
use crate::translations::filter::ListFilter;
use serde_json::{Map, Value};

pub const EXPORT_BATCH_SIZE: usize = 1000;

pub fn export_tree(store: &dyn TranslationStore) -> Result<Value, StoreError> {
    let filter = ListFilter::default();
    let mut tree: Map<String, Value> = Map::new();
    let mut after_id = None;

    loop {
        let batch = store.translation_batch(&filter, after_id, EXPORT_BATCH_SIZE)?;
        let Some(last) = batch.last() else {
            break;
        };
        after_id = Some(last.id);

        for row in batch {
            let locale = tree
                .entry(row.locale)
                .or_insert_with(|| Value::Object(Map::new()));
            let Some(locale) = locale.as_object_mut() else {
                continue;
            };
            let group = locale
                .entry(row.group)
                .or_insert_with(|| Value::Object(Map::new()));
            let Some(group) = group.as_object_mut() else {
                continue;
            };
            group.insert(row.key, Value::String(row.value));
        }
    }

    Ok(Value::Object(tree))
}
