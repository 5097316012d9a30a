//! Error types shared across the catalog.
//!
//! Registry lookups never fail (an unknown selector resolves to the family
//! default). Only strict parsing of a typed selector (`"mongo".parse::<Dialect>()`)
//! reports [`UnknownSelector`].

use thiserror::Error;

// =============================================================================
// Builder validation
// =============================================================================

/// Validation failure recorded by a query builder and surfaced by `finalize`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("table name must not be empty")]
    EmptyTable,

    #[error("no table was set before finalize")]
    MissingTable,

    #[error("column name must not be empty (in {context})")]
    EmptyColumn { context: &'static str },

    #[error("limit must not be negative, got {0}")]
    NegativeLimit(i64),

    #[error("'{identifier}' is not a valid {dialect} identifier: {reason}")]
    InvalidIdentifier {
        dialect: &'static str,
        identifier: String,
        reason: &'static str,
    },

    #[error("builder was finalized for '{finalized}' and reused for '{requested}' without reset")]
    StaleBuilder { finalized: String, requested: String },
}

impl QueryError {
    pub fn invalid_identifier(
        dialect: &'static str,
        identifier: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidIdentifier {
            dialect,
            identifier: identifier.into(),
            reason,
        }
    }
}

// =============================================================================
// Typed selectors
// =============================================================================

/// A selector string that names no member of its family.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {family} '{selector}'")]
pub struct UnknownSelector {
    pub family: &'static str,
    pub selector: String,
}

impl UnknownSelector {
    pub fn new(family: &'static str, selector: impl Into<String>) -> Self {
        Self {
            family,
            selector: selector.into(),
        }
    }
}

// =============================================================================
// Singleton initialization
// =============================================================================

/// Cached construction failure of a lazy singleton.
///
/// Cloned out to every caller that asks for the instance after the first
/// attempt failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("singleton initialization failed: {reason}")]
pub struct InitializationFailure {
    pub reason: String,
}

impl InitializationFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("recipient must not be empty")]
    EmptyRecipient,

    #[error("{channel} gateway refused login")]
    LoginRefused { channel: String },
}
