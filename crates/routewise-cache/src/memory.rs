// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process memory tier: bounded, insertion-ordered, evicts the oldest insert.

use std::collections::{HashMap, VecDeque};

use crate::entry::CacheEntry;
use crate::fingerprint::Fingerprint;

/// Bounded FIFO map from fingerprint to entry.
///
/// Re-inserting a key replaces its value but keeps its original position.
#[derive(Debug)]
pub struct MemoryTier {
    capacity: usize,
    order: VecDeque<Fingerprint>,
    entries: HashMap<Fingerprint, CacheEntry>,
}

impl MemoryTier {
    /// Creates a tier holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&CacheEntry> {
        self.entries.get(fingerprint)
    }

    /// Insert an entry, returning the evicted fingerprint if the tier was full.
    pub fn insert(&mut self, entry: CacheEntry) -> Option<Fingerprint> {
        if let Some(existing) = self.entries.get_mut(&entry.fingerprint) {
            *existing = entry;
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.order.pop_front().inspect(|oldest| {
                self.entries.remove(oldest);
            })
        } else {
            None
        };

        self.order.push_back(entry.fingerprint.clone());
        self.entries.insert(entry.fingerprint.clone(), entry);
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }
}
