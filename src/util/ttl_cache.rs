// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Time-bounded in-process cache. Entries expire a fixed duration after
//! they were written; a hit within the window returns the stored value
//! even if the underlying data changed in the meantime.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: K, value: V) {
        let ttl = self.ttl;
        let mut entries = self.lock();
        // Writes double as the eviction point for entries nothing asks
        // for anymore.
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        entries.insert(key, (Instant::now(), value));
    }

    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, (Instant, V)>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Cache lock poisoned; recovering");
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_within_ttl_returns_stored_value() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
        cache.put("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert!(cache.contains(&"a".to_string()));
    }

    #[test]
    fn miss_for_absent_key() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get(&"a".to_string()), None);
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_millis(20));
        cache.put("a".to_string(), 1);
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&"a".to_string()), None);
    }

    #[test]
    fn put_refreshes_the_window() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_millis(60));
        cache.put("a".to_string(), 1);
        std::thread::sleep(Duration::from_millis(30));
        cache.put("a".to_string(), 2);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get(&"a".to_string()), Some(2));
    }
}
