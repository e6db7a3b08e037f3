// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic escalation oracle for Routewise.
//!
//! When local rules are not confident, the router asks a small hosted model
//! to classify the query. This crate implements [`EscalationOracle`] over the
//! Anthropic Messages API:
//! - [`client`]: authenticated single-attempt HTTP client
//! - [`credentials`]: API key discovery (env var, dotenv files, key files)
//! - [`escalation`]: prompt construction and answer validation
//!
//! [`EscalationOracle`]: routewise_core::EscalationOracle

pub mod client;
pub mod credentials;
pub mod escalation;
pub mod types;

pub use client::AnthropicClient;
pub use credentials::CredentialSource;
pub use escalation::AnthropicEscalation;
