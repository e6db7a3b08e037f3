// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Routewise classification pipeline.
//!
//! Every store and network boundary returns [`RoutewiseError`]. Callers never
//! decide ad hoc how to react: [`RoutewiseError::recovery`] maps each failure
//! kind to a [`Recovery`] policy, and the orchestrator applies it.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across all Routewise crates.
#[derive(Debug, Error)]
pub enum RoutewiseError {
    /// Configuration errors (invalid TOML, bad values, unusable paths).
    #[error("configuration error: {0}")]
    Config(String),

    /// File I/O against one of the persistent stores failed.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Acquiring or releasing an advisory lock failed.
    #[error("lock error on {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A store document exists but could not be decoded.
    #[error("corrupt document {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The escalation oracle failed (transport, HTTP status, or non-conforming answer).
    #[error("escalation error: {message}")]
    Escalation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No credential for the escalation oracle could be found.
    #[error("no escalation credential found")]
    Credential,

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// The query was rejected before classification.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// What the pipeline does when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Continue with empty/default state in place of what failed to load.
    UseDefault,
    /// Drop the failed step and keep the result computed so far.
    SkipStep,
    /// Emit no decision at all.
    SkipDecision,
}

impl RoutewiseError {
    /// Policy table mapping each failure kind to a recovery action.
    ///
    /// Store failures read as empty state; escalation failures fall back to the
    /// rule-based result; only invalid input suppresses the decision.
    pub fn recovery(&self) -> Recovery {
        match self {
            RoutewiseError::InvalidInput(_) => Recovery::SkipDecision,
            RoutewiseError::Config(_)
            | RoutewiseError::Storage { .. }
            | RoutewiseError::Lock { .. }
            | RoutewiseError::Corrupt { .. } => Recovery::UseDefault,
            RoutewiseError::Escalation { .. }
            | RoutewiseError::Credential
            | RoutewiseError::Timeout { .. }
            | RoutewiseError::Internal(_) => Recovery::SkipStep,
        }
    }

    /// Wraps an I/O error as a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        RoutewiseError::Storage {
            source: Box::new(err),
        }
    }

    /// Convenience constructor for escalation failures without an underlying source.
    pub fn escalation(message: impl Into<String>) -> Self {
        RoutewiseError::Escalation {
            message: message.into(),
            source: None,
        }
    }
}
