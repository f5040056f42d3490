// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::config::ValidatedConfig;
use crate::store::TranslationRow;
use crate::util::TtlCache;

/// Shared per-process state: the short-lived caches. Everything durable
/// lives in the datastore.
pub struct AppState {
    /// Search responses, keyed by the canonical digest of the request
    /// parameters. Hits inside the window may serve stale rows; that is
    /// the documented trade for not re-running the search.
    pub search_cache: TtlCache<String, Vec<TranslationRow>>,
    /// Recently registered email digests, consulted before the store on
    /// the registration uniqueness probe.
    pub registered_emails: TtlCache<String, u64>,
}

impl AppState {
    pub fn new(config: &ValidatedConfig) -> Self {
        AppState {
            search_cache: TtlCache::new(Duration::from_secs(config.cache.search_ttl_seconds)),
            registered_emails: TtlCache::new(Duration::from_secs(
                config.cache.registration_ttl_seconds,
            )),
        }
    }

    /// Cache key for a registered email address.
    pub fn email_key(email: &str) -> String {
        format!("user_email_{}", hex::encode(Sha256::digest(email.as_bytes())))
    }
}
