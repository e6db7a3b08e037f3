// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fingerprint-keyed decision cache for Routewise.
//!
//! Two tiers sit behind [`CacheStore`]:
//! - [`MemoryTier`]: per-process, bounded, first-in first-out
//! - [`PersistentTier`]: a JSON document shared by all invocations, bounded
//!   by count with least-recently-used eviction
//!
//! Keys come from [`fingerprint`], which maps paraphrases with the same
//! salient terms onto the same entry.

pub mod entry;
pub mod fingerprint;
pub mod memory;
pub mod persistent;
pub mod store;

pub use entry::CacheEntry;
pub use fingerprint::{Fingerprint, fingerprint};
pub use memory::MemoryTier;
pub use persistent::{CacheDocument, CacheStats, PersistentTier};
pub use store::{CacheStore, Tier};
