// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost estimates and routing statistics for Routewise.
//!
//! This crate provides:
//! - **Pricing**: per-route token pricing and savings relative to the deep tier
//! - **Stats ledger**: a persistent, lock-protected tally of routing decisions

pub mod pricing;
pub mod stats;

pub use pricing::{RoutePricing, estimated_cost, estimated_savings};
pub use stats::{RouterStats, StatsLedger};
