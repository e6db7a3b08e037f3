// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed persistence shared by the cache, session, learning and stats stores.
//!
//! Every store in Routewise is a small JSON document owned by no single
//! process. This crate provides the two primitives they share:
//! - [`ScopedLock`]: scoped shared/exclusive advisory access to a named resource
//! - [`JsonDocument`]: typed whole-document load, save and locked update

pub mod document;
pub mod lock;

pub use document::JsonDocument;
pub use lock::{LockMode, ScopedLock};
