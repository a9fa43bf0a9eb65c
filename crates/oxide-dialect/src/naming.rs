//! Index and constraint name generation.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Kind of key being named; used as the name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// `idx`
    Index,
    /// `uix`
    UniqueIndex,
    /// `fk`
    ForeignKey,
}

impl KeyKind {
    /// Returns the name prefix.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Index => "idx",
            Self::UniqueIndex => "uix",
            Self::ForeignKey => "fk",
        }
    }
}

/// Strategy producing names for generated indexes and constraints.
pub trait KeyNamer: Send + Sync + fmt::Debug {
    /// Builds a name for a key on `table` covering `fields`.
    fn build_key_name(&self, kind: KeyKind, table: &str, fields: &[&str]) -> String;
}

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-zA-Z0-9]+").expect("valid key name pattern"))
}

/// `kind_table_field1_field2`, with every run of non-alphanumeric
/// characters replaced by one `_`, cut to `max_len` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultKeyNamer {
    max_len: Option<usize>,
}

impl DefaultKeyNamer {
    /// Creates a namer without a length limit.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_len: None }
    }

    /// Creates a namer that truncates names to `max_len` characters.
    #[must_use]
    pub const fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
        }
    }
}

impl Default for DefaultKeyNamer {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyNamer for DefaultKeyNamer {
    fn build_key_name(&self, kind: KeyKind, table: &str, fields: &[&str]) -> String {
        let raw = format!("{}_{}_{}", kind.prefix(), table, fields.join("_"));
        let mut name = separator_pattern().replace_all(&raw, "_").into_owned();
        if let Some(max) = self.max_len {
            if name.len() > max {
                // ASCII only after the replacement, so byte truncation is safe.
                name.truncate(max);
            }
        }
        name
    }
}
