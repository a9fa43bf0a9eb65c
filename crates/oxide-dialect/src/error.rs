//! Error types for dialect adapters.

/// Errors that can occur while translating or introspecting.
#[derive(Debug, thiserror::Error)]
pub enum DialectError {
    /// No type rule matched the field and no explicit type was given.
    ///
    /// This is a schema-definition error: the calling migration must abort.
    #[error("invalid sql type {kind} for field '{field}' in {dialect}")]
    UnsupportedType {
        /// Dialect that rejected the field.
        dialect: &'static str,
        /// Field name.
        field: String,
        /// Value kind that could not be mapped.
        kind: String,
    },

    /// The registry has no factory under this name.
    #[error("Dialect '{0}' is not registered")]
    UnknownDialect(String),

    /// The adapter was asked to reach the database before a connection was attached.
    #[error("No database connection attached to the {0} dialect")]
    NotConnected(&'static str),

    /// The dialect has no single-statement form of the operation.
    #[error("{operation} is not supported by {dialect}")]
    Unsupported {
        /// Dialect name.
        dialect: &'static str,
        /// Operation name.
        operation: &'static str,
    },

    /// Database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Query failure reported by a connection that is not backed by sqlx.
    #[error("Query failed: {0}")]
    Query(String),

    /// IO error (reading configuration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Adapter options could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl DialectError {
    /// Returns whether the error is unrecoverable for the calling migration.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::UnsupportedType { .. })
    }
}

/// Result type for dialect operations.
pub type Result<T> = std::result::Result<T, DialectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_type_errors_are_fatal() {
        let fatal = DialectError::UnsupportedType {
            dialect: "oracle",
            field: "tags".to_string(),
            kind: "map".to_string(),
        };
        assert!(fatal.is_fatal());
        assert_eq!(
            fatal.to_string(),
            "invalid sql type map for field 'tags' in oracle"
        );

        assert!(!DialectError::Query("timeout".into()).is_fatal());
        assert!(!DialectError::NotConnected("mysql").is_fatal());
    }
}
