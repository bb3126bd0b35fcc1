// SPDX-FileCopyrightText: 2026 Chanvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for chanvault.

use thiserror::Error;

/// The primary error type used across the store, gateway, and engine.
#[derive(Debug, Error)]
pub enum ChanvaultError {
    /// Configuration errors (missing bot token, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Content store errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A remote chat platform call failed, either in transport or with `ok=false`.
    #[error("gateway call {method} failed: {description}")]
    Gateway {
        method: String,
        description: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed operator input (invalid channel reference, unknown command argument).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// JSON encoding or decoding of a stored record failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChanvaultError {
    /// Builds a [`ChanvaultError::Gateway`] without an underlying source.
    pub fn gateway(method: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Gateway {
            method: method.into(),
            description: description.into(),
            source: None,
        }
    }

    /// Builds a [`ChanvaultError::Storage`] from any displayable error.
    pub fn storage(message: impl std::fmt::Display) -> Self {
        Self::Storage {
            source: message.to_string().into(),
        }
    }

    /// Whether this is the platform's "message is not modified" edit rejection.
    pub fn is_not_modified(&self) -> bool {
        matches!(self, Self::Gateway { description, .. } if description.contains("message is not modified"))
    }
}
