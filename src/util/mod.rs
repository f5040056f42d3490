// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod json_stream;
pub mod ttl_cache;

pub use json_stream::{JsonEscaping, StreamError, json_array_stream, streamed_json_response};
pub use ttl_cache::TtlCache;
