// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Cache keys for the search endpoint.
//!
//! Two requests with the same filters must map to the same key no matter
//! how the query string orders them, so the present parameters are
//! canonicalized (sorted by name, one `name=value` line each) before
//! digesting.

use crate::translations::filter::FilterParams;
use sha2::{Digest, Sha256};

pub fn cache_key(params: &FilterParams) -> String {
    let mut pairs = params.present_pairs();
    pairs.sort_by_key(|(name, _)| *name);

    // The value is length-prefixed so a value containing "\n" or "=" can
    // never masquerade as additional parameters.
    let mut canonical = String::new();
    for (name, value) in pairs {
        canonical.push_str(name);
        canonical.push('=');
        canonical.push_str(&value.len().to_string());
        canonical.push(':');
        canonical.push_str(value);
        canonical.push('\n');
    }

    format!("search_{}", hex::encode(Sha256::digest(canonical.as_bytes())))
}
