//! Connection state shared by every dialect.
//!
//! A [`Session`] owns the attached connection, the introspection policy and
//! the key namer. Dialects keep one and route every database round trip
//! through it, so failure handling and logging are the same everywhere.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{AdapterOptions, IntrospectionPolicy};
use crate::connection::Connection;
use crate::error::{DialectError, Result};
use crate::naming::{DefaultKeyNamer, KeyNamer};

/// Connection handle plus per-adapter policy.
#[derive(Debug, Clone)]
pub struct Session {
    dialect: &'static str,
    conn: Option<Arc<dyn Connection>>,
    policy: IntrospectionPolicy,
    max_identifier_len: Option<usize>,
    default_namer: DefaultKeyNamer,
    custom_namer: Option<Arc<dyn KeyNamer>>,
}

impl Session {
    /// Creates a detached session for `dialect` with no identifier limit.
    #[must_use]
    pub const fn new(dialect: &'static str) -> Self {
        Self {
            dialect,
            conn: None,
            policy: IntrospectionPolicy::Lenient,
            max_identifier_len: None,
            default_namer: DefaultKeyNamer::new(),
            custom_namer: None,
        }
    }

    /// Sets the dialect's identifier limit, applied to generated key names
    /// unless the options override it.
    #[must_use]
    pub fn with_max_identifier_len(mut self, max: usize) -> Self {
        self.max_identifier_len = Some(max);
        self.default_namer = DefaultKeyNamer::with_max_len(max);
        self
    }

    /// Applies options. A key namer installed with
    /// [`set_key_namer`](Self::set_key_namer) is kept as is.
    pub fn configure(&mut self, options: &AdapterOptions) {
        self.policy = options.introspection;
        self.default_namer = match options.max_identifier_len.or(self.max_identifier_len) {
            Some(max) => DefaultKeyNamer::with_max_len(max),
            None => DefaultKeyNamer::new(),
        };
    }

    /// Attaches or replaces the connection.
    pub fn set_connection(&mut self, conn: Arc<dyn Connection>) {
        self.conn = Some(conn);
    }

    /// Replaces the key namer.
    pub fn set_key_namer(&mut self, namer: Arc<dyn KeyNamer>) {
        self.custom_namer = Some(namer);
    }

    /// Returns the key namer.
    #[must_use]
    pub fn key_namer(&self) -> &dyn KeyNamer {
        match &self.custom_namer {
            Some(namer) => namer.as_ref(),
            None => &self.default_namer,
        }
    }

    /// Returns the introspection policy.
    #[must_use]
    pub const fn policy(&self) -> IntrospectionPolicy {
        self.policy
    }

    fn require_connection(&self) -> Result<&Arc<dyn Connection>> {
        self.conn
            .as_ref()
            .ok_or(DialectError::NotConnected(self.dialect))
    }

    /// Runs a catalog `COUNT` query and reports whether it was positive.
    ///
    /// Failures, including a missing connection, follow the policy.
    pub async fn exists(&self, check: &'static str, sql: &str, params: &[&str]) -> Result<bool> {
        debug!(dialect = self.dialect, check, sql = %sql, ?params, "Running catalog query");

        let outcome = match self.require_connection() {
            Ok(conn) => conn.fetch_count(sql, params).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(count) => Ok(count > 0),
            Err(err) => match self.policy {
                IntrospectionPolicy::Lenient => {
                    warn!(
                        dialect = self.dialect,
                        check,
                        ?params,
                        error = %err,
                        "Catalog query failed, treating object as absent"
                    );
                    Ok(false)
                }
                IntrospectionPolicy::Strict => Err(err),
            },
        }
    }

    /// Runs a scalar string query, returning `""` on any failure.
    pub async fn scalar_or_empty(&self, sql: &str) -> String {
        let Ok(conn) = self.require_connection() else {
            warn!(dialect = self.dialect, "No connection attached, current database unknown");
            return String::new();
        };

        match conn.fetch_string(sql, &[]).await {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                warn!(dialect = self.dialect, error = %err, "Current database query failed");
                String::new()
            }
        }
    }

    /// Executes one DDL statement. Errors are returned as produced.
    pub async fn execute(&self, sql: &str) -> Result<()> {
        let conn = self.require_connection()?;
        debug!(dialect = self.dialect, sql = %sql, "Executing SQL");
        conn.execute(sql).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::mock::MockConnection;
    use crate::naming::KeyKind;

    fn session_with(conn: MockConnection) -> (Session, Arc<MockConnection>) {
        let conn = Arc::new(conn);
        let mut session = Session::new("test");
        session.set_connection(conn.clone());
        (session, conn)
    }

    #[tokio::test]
    async fn test_exists_counts() {
        let (session, conn) = session_with(MockConnection::new().count(2).count(0));
        assert!(session.exists("table", "SELECT 1", &["a"]).await.unwrap());
        assert!(!session.exists("table", "SELECT 1", &["b"]).await.unwrap());
        assert_eq!(conn.calls().len(), 2);
        assert_eq!(conn.calls()[1].params, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_exists_lenient_on_error() {
        let (session, _) = session_with(MockConnection::new().fail("connection reset"));
        assert!(!session.exists("table", "SELECT 1", &[]).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_strict_on_error() {
        let (mut session, _) = session_with(MockConnection::new().fail("connection reset"));
        session.configure(&AdapterOptions::strict());
        let err = session.exists("table", "SELECT 1", &[]).await.unwrap_err();
        assert!(matches!(err, DialectError::Query(ref m) if m == "connection reset"));
    }

    #[tokio::test]
    async fn test_detached_session() {
        let session = Session::new("test");
        assert!(!session.exists("table", "SELECT 1", &[]).await.unwrap());
        assert_eq!(session.scalar_or_empty("SELECT 1").await, "");
        assert!(matches!(
            session.execute("DROP TABLE t").await,
            Err(DialectError::NotConnected("test"))
        ));
    }

    #[tokio::test]
    async fn test_execute_propagates_error() {
        let (session, conn) = session_with(MockConnection::new().fail("permission denied"));
        let err = session.execute("DROP INDEX x").await.unwrap_err();
        assert!(matches!(err, DialectError::Query(ref m) if m == "permission denied"));
        assert_eq!(conn.last_sql(), "DROP INDEX x");
    }

    #[tokio::test]
    async fn test_scalar_or_empty() {
        let (session, _) = session_with(MockConnection::new().text("shop").fail("boom"));
        assert_eq!(session.scalar_or_empty("SELECT db").await, "shop");
        assert_eq!(session.scalar_or_empty("SELECT db").await, "");
    }

    #[derive(Debug)]
    struct UpperNamer;

    impl KeyNamer for UpperNamer {
        fn build_key_name(&self, _kind: KeyKind, table: &str, _fields: &[&str]) -> String {
            table.to_uppercase()
        }
    }

    #[test]
    fn test_dialect_limit_applies_without_configure() {
        let session = Session::new("test").with_max_identifier_len(10);
        let name = session
            .key_namer()
            .build_key_name(KeyKind::Index, "orders", &["created_at"]);
        assert_eq!(name, "idx_orders");
    }

    #[test]
    fn test_options_override_dialect_limit() {
        let mut session = Session::new("test").with_max_identifier_len(10);
        session.configure(&AdapterOptions {
            max_identifier_len: Some(6),
            ..AdapterOptions::default()
        });
        let name = session
            .key_namer()
            .build_key_name(KeyKind::Index, "orders", &["created_at"]);
        assert_eq!(name, "idx_or");

        session.configure(&AdapterOptions::default());
        let name = session
            .key_namer()
            .build_key_name(KeyKind::Index, "orders", &["created_at"]);
        assert_eq!(name, "idx_orders");
    }

    #[test]
    fn test_custom_namer_survives_configure() {
        let mut session = Session::new("test").with_max_identifier_len(10);
        session.set_key_namer(Arc::new(UpperNamer));
        session.configure(&AdapterOptions::strict());

        let name = session
            .key_namer()
            .build_key_name(KeyKind::Index, "users", &["email"]);
        assert_eq!(name, "USERS");
        assert_eq!(session.policy(), IntrospectionPolicy::Strict);
    }
}
