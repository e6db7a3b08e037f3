// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent tier: a bounded JSON document shared by every process.
//!
//! Lookups read the whole document under a shared lock. Writes go through
//! [`JsonDocument::update`], so each read-modify-write happens inside one
//! exclusive-lock scope and concurrent invocations cannot lose increments
//! or append the same fingerprint twice.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use routewise_core::RoutewiseError;
use routewise_storage::JsonDocument;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entry::CacheEntry;
use crate::fingerprint::Fingerprint;

/// On-disk format version written to new documents.
pub const CACHE_FORMAT_VERSION: &str = "1.0";

/// Serialized form of the persistent cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheDocument {
    pub version: String,
    pub total_entries: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub entries: Vec<CacheEntry>,
}

impl Default for CacheDocument {
    fn default() -> Self {
        Self {
            version: CACHE_FORMAT_VERSION.to_string(),
            total_entries: 0,
            last_updated: None,
            entries: Vec::new(),
        }
    }
}

impl CacheDocument {
    fn position(&self, fingerprint: &Fingerprint) -> Option<usize> {
        self.entries.iter().position(|e| &e.fingerprint == fingerprint)
    }

    /// Drop least recently used entries, never `keep`, until at most
    /// `limit` remain.
    fn evict_to(&mut self, limit: usize, keep: &Fingerprint) -> Vec<Fingerprint> {
        let mut evicted = Vec::new();
        while self.entries.len() > limit {
            let oldest = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| &e.fingerprint != keep)
                .min_by_key(|(idx, e)| (e.last_used, *idx))
                .map(|(idx, _)| idx);
            match oldest {
                Some(idx) => evicted.push(self.entries.remove(idx).fingerprint),
                None => break,
            }
        }
        evicted
    }

    fn touch(&mut self) {
        self.total_entries = self.entries.len();
        self.last_updated = Some(Utc::now());
    }
}

/// Summary of the persistent tier for the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_hits: u64,
    pub max_entries: usize,
}

/// Fingerprint-keyed store bounded to `max_entries`.
#[derive(Debug, Clone)]
pub struct PersistentTier {
    doc: JsonDocument<CacheDocument>,
    max_entries: usize,
}

impl PersistentTier {
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            doc: JsonDocument::new(path),
            max_entries: max_entries.max(1),
        }
    }

    /// How long reads and writes wait for a contended lock.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.doc = self.doc.with_lock_timeout(timeout);
        self
    }

    pub fn path(&self) -> &Path {
        self.doc.path()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Exact-match scan under a shared lock.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>, RoutewiseError> {
        let doc = self.doc.load()?;
        Ok(doc.entries.into_iter().find(|e| &e.fingerprint == fingerprint))
    }

    /// Insert or refresh `entry` as of `entry.last_used`.
    ///
    /// An existing fingerprint is updated in place (hit count incremented).
    /// Otherwise the entry is appended. Either way, least recently used
    /// entries other than this one are evicted until the document fits
    /// `max_entries`, which also shrinks a document written under a larger
    /// bound. Returns the evicted fingerprints, oldest first.
    pub fn upsert(&self, entry: CacheEntry) -> Result<Vec<Fingerprint>, RoutewiseError> {
        let max = self.max_entries;
        self.doc.update(move |doc| {
            let keep = entry.fingerprint.clone();
            let mut evicted = match doc.position(&entry.fingerprint) {
                Some(idx) => {
                    doc.entries[idx].refresh_from(&entry);
                    Vec::new()
                }
                None => {
                    let evicted = doc.evict_to(max.saturating_sub(1), &keep);
                    doc.entries.push(entry);
                    evicted
                }
            };
            evicted.extend(doc.evict_to(max, &keep));
            doc.touch();
            evicted
        })
    }

    /// Record a served hit: bump the hit count and stamp `today`.
    ///
    /// Returns false if the fingerprint has since been evicted.
    pub fn record_hit(&self, fingerprint: &Fingerprint, today: NaiveDate) -> Result<bool, RoutewiseError> {
        self.doc.update(|doc| match doc.position(fingerprint) {
            Some(idx) => {
                let entry = &mut doc.entries[idx];
                entry.hit_count = entry.hit_count.saturating_add(1);
                entry.last_used = today;
                doc.touch();
                true
            }
            None => false,
        })
    }

    /// Delete the document.
    pub fn clear(&self) -> Result<(), RoutewiseError> {
        debug!(path = %self.path().display(), "clearing persistent cache");
        self.doc.remove()
    }

    pub fn stats(&self) -> Result<CacheStats, RoutewiseError> {
        let doc = self.doc.load()?;
        Ok(CacheStats {
            entries: doc.entries.len(),
            total_hits: doc.entries.iter().map(|e| u64::from(e.hit_count)).sum(),
            max_entries: self.max_entries,
        })
    }

    /// All entries in file order.
    pub fn entries(&self) -> Result<Vec<CacheEntry>, RoutewiseError> {
        Ok(self.doc.load()?.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;
    use routewise_core::{ClassificationResult, Method, Route};
    use tempfile::tempdir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    fn entry(query: &str, on: NaiveDate) -> CacheEntry {
        let result = ClassificationResult::new(Route::Standard, 0.85, vec!["s".into()], Method::Rules);
        CacheEntry::from_result(fingerprint(query), query, &result, on)
    }

    #[test]
    fn missing_document_is_empty() {
        let dir = tempdir().unwrap();
        let tier = PersistentTier::new(dir.path().join("cache.json"), 10);
        assert_eq!(tier.lookup(&fingerprint("anything at all")).unwrap(), None);
        assert_eq!(tier.stats().unwrap().entries, 0);
    }

    #[test]
    fn upsert_existing_updates_in_place() {
        let dir = tempdir().unwrap();
        let tier = PersistentTier::new(dir.path().join("cache.json"), 10);
        tier.upsert(entry("fix the login bug", day(1))).unwrap();
        tier.upsert(entry("unrelated cleanup work", day(1))).unwrap();
        tier.upsert(entry("fix the login bug", day(3))).unwrap();

        let entries = tier.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].fingerprint, fingerprint("fix the login bug"));
        assert_eq!(entries[0].hit_count, 2);
        assert_eq!(entries[0].last_used, day(3));
    }

    #[test]
    fn evicts_least_recently_used_first_in_file_order_on_ties() {
        let dir = tempdir().unwrap();
        let tier = PersistentTier::new(dir.path().join("cache.json"), 3);
        tier.upsert(entry("first query here", day(2))).unwrap();
        tier.upsert(entry("second query here", day(1))).unwrap();
        tier.upsert(entry("third query here", day(1))).unwrap();

        let evicted = tier.upsert(entry("fourth query here", day(4))).unwrap();
        assert_eq!(evicted, vec![fingerprint("second query here")]);

        let evicted = tier.upsert(entry("fifth query here", day(5))).unwrap();
        assert_eq!(evicted, vec![fingerprint("third query here")]);
        assert_eq!(tier.stats().unwrap().entries, 3);
    }

    #[test]
    fn refresh_shrinks_a_document_written_under_a_larger_bound() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let wide = PersistentTier::new(&path, 10);
        for d in 1..=10 {
            wide.upsert(entry(&format!("query number {d} for the cache"), day(d))).unwrap();
        }

        let narrow = PersistentTier::new(&path, 3);
        let refreshed = fingerprint("query number 2 for the cache");
        let evicted = narrow.upsert(entry("query number 2 for the cache", day(11))).unwrap();
        assert_eq!(evicted.len(), 7);
        assert!(!evicted.contains(&refreshed));

        let entries = narrow.entries().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().any(|e| e.fingerprint == refreshed));
        assert_eq!(narrow.stats().unwrap().entries, 3);

        let fresh = narrow.upsert(entry("a brand new query entirely", day(12))).unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(narrow.entries().unwrap().len(), 3);
    }

    #[test]
    fn record_hit_bumps_count_and_date() {
        let dir = tempdir().unwrap();
        let tier = PersistentTier::new(dir.path().join("cache.json"), 10);
        let fp = fingerprint("explain the retry logic");
        tier.upsert(entry("explain the retry logic", day(1))).unwrap();

        assert!(tier.record_hit(&fp, day(9)).unwrap());
        let found = tier.lookup(&fp).unwrap().unwrap();
        assert_eq!(found.hit_count, 2);
        assert_eq!(found.last_used, day(9));

        assert!(!tier.record_hit(&fingerprint("never stored"), day(9)).unwrap());
    }

    #[test]
    fn document_header_tracks_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let tier = PersistentTier::new(&path, 10);
        tier.upsert(entry("describe the queue", day(1))).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], CACHE_FORMAT_VERSION);
        assert_eq!(raw["total_entries"], 1);
        assert!(raw["last_updated"].is_string());
        assert_eq!(raw["entries"][0]["route"], "standard");
    }

    #[test]
    fn clear_removes_everything() {
        let dir = tempdir().unwrap();
        let tier = PersistentTier::new(dir.path().join("cache.json"), 10);
        tier.upsert(entry("describe the queue", day(1))).unwrap();
        tier.clear().unwrap();
        assert_eq!(tier.stats().unwrap(), CacheStats { entries: 0, total_hits: 0, max_entries: 10 });
    }
}
