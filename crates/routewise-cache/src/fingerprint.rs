// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query fingerprinting for fuzzy cache lookups.
//!
//! A fingerprint is the truncated SHA-256 of a query's salient terms:
//! lower-cased alphanumeric tokens, minus stop-words and single characters,
//! deduplicated, sorted and capped at [`MAX_TERMS`]. Paraphrases that share
//! the same salient terms collide on purpose.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Maximum number of sorted terms that contribute to a fingerprint.
pub const MAX_TERMS: usize = 10;

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 16;

const STOP_WORDS: &[&str] = &[
    "a", "about", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "do", "does", "for", "from", "had", "has", "have", "help",
    "how", "i", "if", "in", "into", "is", "it", "its", "just", "let", "me", "my", "need",
    "of", "on", "or", "our", "please", "should", "so", "some", "that", "the", "their",
    "them", "then", "there", "these", "this", "those", "to", "up", "us", "want", "was",
    "we", "were", "what", "when", "where", "which", "who", "why", "will", "with", "would",
    "you", "your",
];

/// Short, stable cache key derived from a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of a query. Total: every input yields a key.
pub fn fingerprint(text: &str) -> Fingerprint {
    let key = salient_terms(text).join(" ");
    let digest = Sha256::digest(key.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(FINGERPRINT_LEN);
    Fingerprint(hex)
}

/// The normalized term set a fingerprint is computed from.
pub fn salient_terms(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1 && !STOP_WORDS.contains(t))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(MAX_TERMS)
        .map(str::to_string)
        .collect()
}
