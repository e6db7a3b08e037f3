// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-tier decision cache.

use chrono::{Local, NaiveDate};
use routewise_config::model::CacheConfig;
use routewise_core::{ClassificationResult, RoutewiseError};
use serde::Serialize;
use strum::Display;
use tracing::{debug, warn};

use crate::entry::CacheEntry;
use crate::fingerprint::Fingerprint;
use crate::memory::MemoryTier;
use crate::persistent::{CacheStats, PersistentTier};

/// Which tier served a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Memory,
    Persistent,
}

/// Memory tier in front of an optional persistent tier.
///
/// Storage failures never surface from `lookup` or `upsert`: they are
/// logged and the operation degrades to a miss or a memory-only write.
#[derive(Debug)]
pub struct CacheStore {
    memory: MemoryTier,
    persistent: Option<PersistentTier>,
}

impl CacheStore {
    pub fn new(memory_capacity: usize, persistent: Option<PersistentTier>) -> Self {
        Self {
            memory: MemoryTier::new(memory_capacity),
            persistent,
        }
    }

    /// Memory-only store.
    pub fn in_memory(memory_capacity: usize) -> Self {
        Self::new(memory_capacity, None)
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        let persistent = PersistentTier::new(&config.path, config.max_entries);
        Self::new(config.memory_capacity, Some(persistent))
    }

    pub fn memory(&self) -> &MemoryTier {
        &self.memory
    }

    pub fn persistent(&self) -> Option<&PersistentTier> {
        self.persistent.as_ref()
    }

    /// Look up a fingerprint, memory first.
    ///
    /// A persistent hit is copied into the memory tier and counted on disk.
    pub fn lookup(&mut self, fingerprint: &Fingerprint) -> Option<(CacheEntry, Tier)> {
        self.lookup_at(fingerprint, today())
    }

    pub fn lookup_at(&mut self, fingerprint: &Fingerprint, today: NaiveDate) -> Option<(CacheEntry, Tier)> {
        if let Some(entry) = self.memory.get(fingerprint) {
            debug!(%fingerprint, "memory cache hit");
            return Some((entry.clone(), Tier::Memory));
        }

        let persistent = self.persistent.as_ref()?;
        let mut entry = match persistent.lookup(fingerprint) {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(err) => {
                warn!(%fingerprint, error = %err, "persistent cache lookup failed, treating as miss");
                return None;
            }
        };

        match persistent.record_hit(fingerprint, today) {
            Ok(_) => {
                entry.hit_count = entry.hit_count.saturating_add(1);
                entry.last_used = today;
            }
            Err(err) => warn!(%fingerprint, error = %err, "could not record cache hit"),
        }

        debug!(%fingerprint, hits = entry.hit_count, "persistent cache hit");
        self.memory.insert(entry.clone());
        Some((entry, Tier::Persistent))
    }

    /// Store a decision in both tiers.
    pub fn upsert(&mut self, fingerprint: Fingerprint, query: &str, result: &ClassificationResult) {
        self.upsert_at(fingerprint, query, result, today());
    }

    pub fn upsert_at(
        &mut self,
        fingerprint: Fingerprint,
        query: &str,
        result: &ClassificationResult,
        today: NaiveDate,
    ) {
        let entry = CacheEntry::from_result(fingerprint, query, result, today);
        if let Some(evicted) = self.memory.insert(entry.clone()) {
            debug!(%evicted, "memory tier evicted oldest entry");
        }

        let Some(persistent) = &self.persistent else {
            return;
        };
        let fingerprint = entry.fingerprint.clone();
        match persistent.upsert(entry) {
            Ok(evicted) => {
                for fp in evicted {
                    debug!(evicted = %fp, "persistent tier evicted least recently used entry");
                }
            }
            Err(err) => warn!(%fingerprint, error = %err, "persistent cache write skipped"),
        }
    }

    /// Empty both tiers.
    pub fn clear(&mut self) -> Result<(), RoutewiseError> {
        self.memory.clear();
        match &self.persistent {
            Some(persistent) => persistent.clear(),
            None => Ok(()),
        }
    }

    pub fn stats(&self) -> Result<CacheStats, RoutewiseError> {
        match &self.persistent {
            Some(persistent) => persistent.stats(),
            None => Ok(CacheStats {
                entries: self.memory.len(),
                total_hits: 0,
                max_entries: self.memory.capacity(),
            }),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
