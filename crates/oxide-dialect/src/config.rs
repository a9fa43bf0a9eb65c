//! Adapter configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What an adapter does when an existence check fails to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntrospectionPolicy {
    /// Log the failure and report the object as absent.
    ///
    /// Migrations stay re-runnable, but a connectivity failure looks exactly
    /// like a missing table until the following DDL statement fails.
    #[default]
    Lenient,
    /// Return the failure to the caller.
    Strict,
}

/// Options shared by every dialect in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterOptions {
    /// Failure policy for `has_table`, `has_column`, `has_index` and
    /// `has_foreign_key`.
    pub introspection: IntrospectionPolicy,
    /// Maximum length of generated index and constraint names.
    /// `None` leaves the dialect's own limit in place.
    pub max_identifier_len: Option<usize>,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            introspection: IntrospectionPolicy::Lenient,
            max_identifier_len: None,
        }
    }
}

impl AdapterOptions {
    /// Options that propagate introspection failures.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            introspection: IntrospectionPolicy::Strict,
            ..Self::default()
        }
    }

    /// Parses options from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
