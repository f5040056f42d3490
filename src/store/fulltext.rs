// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Boolean-mode full-text matching for the search path.
//!
//! The search endpoint matches `key` and `content` with boolean-mode
//! semantics rather than the substring matching used by the listing path:
//! `+term` must be present, `-term` must be absent, bare terms are OR'd,
//! and a trailing `*` matches any token with that prefix.

/// A parsed boolean-mode query. Terms are lowercased at parse time;
/// candidate text is tokenized and lowercased at match time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanQuery {
    required: Vec<Term>,
    excluded: Vec<Term>,
    optional: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Term {
    word: String,
    prefix: bool,
}

impl BooleanQuery {
    pub fn parse(input: &str) -> Self {
        let mut required = Vec::new();
        let mut excluded = Vec::new();
        let mut optional = Vec::new();

        for raw in input.split_whitespace() {
            let (bucket, body) = match raw.strip_prefix('+') {
                Some(rest) => (&mut required, rest),
                None => match raw.strip_prefix('-') {
                    Some(rest) => (&mut excluded, rest),
                    None => (&mut optional, raw),
                },
            };

            let (body, prefix) = match body.strip_suffix('*') {
                Some(rest) => (rest, true),
                None => (body, false),
            };

            let word: String = body
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if word.is_empty() {
                continue;
            }
            bucket.push(Term { word, prefix });
        }

        BooleanQuery {
            required,
            excluded,
            optional,
        }
    }

    /// True when the query carries no usable terms. An empty query matches
    /// no rows, mirroring an empty MATCH ... AGAINST expression.
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.excluded.is_empty() && self.optional.is_empty()
    }

    pub fn matches(&self, text: &str) -> bool {
        if self.is_empty() {
            return false;
        }

        let tokens: Vec<String> = tokenize(text);

        for term in &self.excluded {
            if term.hits(&tokens) {
                return false;
            }
        }
        for term in &self.required {
            if !term.hits(&tokens) {
                return false;
            }
        }
        if self.optional.is_empty() {
            // Purely +/- queries succeed once the above checks pass, but a
            // query of only exclusions needs at least one positive anchor.
            return !self.required.is_empty();
        }
        self.optional.iter().any(|term| term.hits(&tokens))
    }
}

impl Term {
    fn hits(&self, tokens: &[String]) -> bool {
        if self.prefix {
            tokens.iter().any(|token| token.starts_with(&self.word))
        } else {
            tokens.iter().any(|token| token == &self.word)
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect()
}
