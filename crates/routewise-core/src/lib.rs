// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Routewise.
//!
//! This crate provides the error taxonomy, the shared classification types,
//! and the oracle trait used by the escalation step. Every other crate in the
//! workspace builds on these.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{Recovery, RoutewiseError};
pub use traits::EscalationOracle;
pub use types::{ClassificationResult, ExceptionKind, Method, ResultMetadata, Route};
