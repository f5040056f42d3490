// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Filter composition for the listing and search paths.
//!
//! Both paths accept the same optional request parameters (tag, key,
//! content, locale) and AND together only the filters actually present.
//! They differ in how key/content match: the listing path uses substring
//! matching, the search path uses boolean-mode full-text matching.

use crate::store::fulltext::BooleanQuery;
use crate::store::types::Translation;
use serde::Deserialize;

/// Raw request parameters, deserialized straight from the query string.
/// An absent parameter means "no constraint", never "match empty".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub tag: Option<String>,
    pub key: Option<String>,
    pub content: Option<String>,
    pub locale: Option<String>,
}

impl FilterParams {
    pub fn list_filter(&self) -> ListFilter {
        ListFilter {
            tag: self.tag.clone(),
            key: self.key.clone(),
            content: self.content.clone(),
            locale: self.locale.clone(),
        }
    }

    pub fn search_filter(&self) -> SearchFilter {
        SearchFilter {
            tag: self.tag.clone(),
            key: self.key.as_deref().map(BooleanQuery::parse),
            content: self.content.as_deref().map(BooleanQuery::parse),
            locale: self.locale.clone(),
        }
    }

    /// Present parameters as (name, value) pairs, in declaration order.
    /// The search cache canonicalizes these before digesting.
    pub fn present_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(tag) = &self.tag {
            pairs.push(("tag", tag.as_str()));
        }
        if let Some(key) = &self.key {
            pairs.push(("key", key.as_str()));
        }
        if let Some(content) = &self.content {
            pairs.push(("content", content.as_str()));
        }
        if let Some(locale) = &self.locale {
            pairs.push(("locale", locale.as_str()));
        }
        pairs
    }
}

/// Composed predicate for the listing/export path: substring matching on
/// key and value, exact locale. Tag membership is resolved by the store,
/// which owns the join table.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub tag: Option<String>,
    pub key: Option<String>,
    pub content: Option<String>,
    pub locale: Option<String>,
}

impl ListFilter {
    pub fn matches_text(&self, translation: &Translation) -> bool {
        if let Some(key) = &self.key {
            if !translation.key.contains(key.as_str()) {
                return false;
            }
        }
        if let Some(content) = &self.content {
            if !translation.value.contains(content.as_str()) {
                return false;
            }
        }
        if let Some(locale) = &self.locale {
            if &translation.locale != locale {
                return false;
            }
        }
        true
    }
}

/// Composed predicate for the search path: boolean-mode full-text matching
/// on key and value, exact locale.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub tag: Option<String>,
    pub key: Option<BooleanQuery>,
    pub content: Option<BooleanQuery>,
    pub locale: Option<String>,
}

impl SearchFilter {
    pub fn matches_text(&self, translation: &Translation) -> bool {
        if let Some(key) = &self.key {
            if !key.matches(&translation.key) {
                return false;
            }
        }
        if let Some(content) = &self.content {
            if !content.matches(&translation.value) {
                return false;
            }
        }
        if let Some(locale) = &self.locale {
            if &translation.locale != locale {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(key: &str, value: &str, locale: &str) -> Translation {
        let now = Utc::now();
        Translation {
            id: 1,
            group: "auth".to_string(),
            key: key.to_string(),
            locale: locale.to_string(),
            value: value.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ListFilter::default();
        assert!(filter.matches_text(&sample("greeting", "Hello", "en_US")));
    }

    #[test]
    fn list_filter_uses_substring_matching() {
        let filter = ListFilter {
            key: Some("greet".to_string()),
            ..Default::default()
        };
        assert!(filter.matches_text(&sample("greeting", "Hello", "en_US")));
        assert!(!filter.matches_text(&sample("farewell", "Bye", "en_US")));
    }

    #[test]
    fn list_filter_substring_is_case_sensitive() {
        let filter = ListFilter {
            content: Some("hello".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches_text(&sample("greeting", "Hello", "en_US")));
    }

    #[test]
    fn present_filters_are_anded() {
        let filter = ListFilter {
            key: Some("greet".to_string()),
            locale: Some("en_US".to_string()),
            ..Default::default()
        };
        assert!(filter.matches_text(&sample("greeting", "Hello", "en_US")));
        assert!(!filter.matches_text(&sample("greeting", "Bonjour", "fr_FR")));
    }

    #[test]
    fn search_filter_uses_full_text_matching() {
        let params = FilterParams {
            content: Some("hello".to_string()),
            ..Default::default()
        };
        let filter = params.search_filter();
        // Full-text tokenization is case-insensitive and word-bounded,
        // unlike the listing path's substring match.
        assert!(filter.matches_text(&sample("greeting", "Hello there", "en_US")));
        assert!(!filter.matches_text(&sample("greeting", "Othello", "en_US")));
    }

    #[test]
    fn present_pairs_reports_only_present_parameters() {
        let params = FilterParams {
            locale: Some("en_US".to_string()),
            tag: Some("ui".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.present_pairs(),
            vec![("tag", "ui"), ("locale", "en_US")]
        );
    }
}
