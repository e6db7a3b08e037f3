// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query classification and the routing pipeline for Routewise.
//!
//! This crate provides:
//! - [`RuleClassifier`]: regex category matching (zero-cost, zero-latency)
//! - [`SessionTracker`]: conversation continuity between invocations
//! - [`LearningEngine`]: keyword nudges derived from a Markdown knowledge corpus
//! - [`DecisionRouter`]: the pipeline tying these to the cache, the oracle and stats

pub mod classifier;
pub mod context;
pub mod learning;
pub mod router;

pub use classifier::RuleClassifier;
pub use context::{SessionState, SessionTracker};
pub use learning::LearningEngine;
pub use router::{Decision, DecisionRouter, RouterSettings};
