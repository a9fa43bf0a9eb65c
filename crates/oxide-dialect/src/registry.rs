//! Name-based dialect lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::AdapterOptions;
use crate::connection::Connection;
use crate::dialect::{
    DialectAdapter, MssqlDialect, MysqlDialect, OracleDialect, PostgresDialect, SqliteDialect,
};
use crate::error::{DialectError, Result};

/// Builds a fresh, detached adapter.
pub type Factory = Arc<dyn Fn() -> Box<dyn DialectAdapter> + Send + Sync>;

/// Maps dialect names to adapter factories.
///
/// The registry is an ordinary value: hosts build one at startup and pass
/// it to whatever needs to open adapters.
#[derive(Clone, Default)]
pub struct DialectRegistry {
    factories: HashMap<String, Factory>,
    order: Vec<String>,
    options: AdapterOptions,
}

impl fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("names", &self.order)
            .field("options", &self.options)
            .finish()
    }
}

impl DialectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every dialect shipped with the crate.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("oracle", || Box::new(OracleDialect::new()));
        registry.register("postgres", || Box::new(PostgresDialect::new()));
        registry.register("mysql", || Box::new(MysqlDialect::new()));
        registry.register("sqlite3", || Box::new(SqliteDialect::new()));
        registry.register("mssql", || Box::new(MssqlDialect::new()));
        registry
    }

    /// Sets the options applied by [`open`](Self::open).
    #[must_use]
    pub fn options(mut self, options: AdapterOptions) -> Self {
        self.options = options;
        self
    }

    /// Adds a factory, replacing any previous one under the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn DialectAdapter> + Send + Sync + 'static,
    {
        let name = name.into();
        if !self.factories.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.factories.insert(name, Arc::new(factory));
        self
    }

    /// Returns registered names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Returns whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Builds a detached adapter configured with the registry's options.
    pub fn create(&self, name: &str) -> Result<Box<dyn DialectAdapter>> {
        self.build(name, &self.options)
    }

    /// Builds an adapter for `name` and attaches `conn`.
    pub fn open(&self, name: &str, conn: Arc<dyn Connection>) -> Result<Box<dyn DialectAdapter>> {
        self.open_with(name, conn, &self.options)
    }

    /// Like [`open`](Self::open), with explicit options.
    pub fn open_with(
        &self,
        name: &str,
        conn: Arc<dyn Connection>,
        options: &AdapterOptions,
    ) -> Result<Box<dyn DialectAdapter>> {
        let mut adapter = self.build(name, options)?;
        adapter.set_connection(conn);
        debug!(dialect = name, policy = ?options.introspection, "Opened dialect adapter");
        Ok(adapter)
    }

    fn build(&self, name: &str, options: &AdapterOptions) -> Result<Box<dyn DialectAdapter>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| DialectError::UnknownDialect(name.to_string()))?;
        let mut adapter = factory();
        adapter.configure(options);
        Ok(adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntrospectionPolicy;
    use crate::connection::mock::MockConnection;
    use crate::naming::{KeyKind, KeyNamer};

    #[test]
    fn test_builtins_in_order() {
        let registry = DialectRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec!["oracle", "postgres", "mysql", "sqlite3", "mssql"]
        );
        assert!(registry.contains("oracle"));
        assert!(!registry.contains("sqlite"));
    }

    #[test]
    fn test_unknown_dialect() {
        let registry = DialectRegistry::with_builtins();
        let conn = Arc::new(MockConnection::new());
        let err = registry.open("db2", conn).unwrap_err();
        assert!(matches!(err, DialectError::UnknownDialect(ref n) if n == "db2"));
        assert!(DialectRegistry::new().create("oracle").is_err());
    }

    #[test]
    fn test_register_replaces_without_reordering() {
        let mut registry = DialectRegistry::with_builtins();
        registry.register("oracle", || Box::new(PostgresDialect::new()));
        assert_eq!(registry.names()[0], "oracle");
        assert_eq!(registry.names().len(), 5);
        assert_eq!(registry.create("oracle").unwrap().name(), "postgres");
    }

    #[test]
    fn test_factory_key_namer_is_kept() {
        #[derive(Debug)]
        struct TableOnly;

        impl KeyNamer for TableOnly {
            fn build_key_name(&self, _kind: KeyKind, table: &str, _fields: &[&str]) -> String {
                table.to_string()
            }
        }

        let mut registry = DialectRegistry::new().options(AdapterOptions {
            max_identifier_len: Some(4),
            ..AdapterOptions::default()
        });
        registry.register("custom", || {
            let mut dialect = PostgresDialect::new();
            dialect.session_mut().set_key_namer(Arc::new(TableOnly));
            Box::new(dialect)
        });

        let adapter = registry.create("custom").unwrap();
        assert_eq!(
            adapter.build_key_name(KeyKind::Index, "customers", &["email"]),
            "customers"
        );
    }

    #[test]
    fn test_adapter_names_match_registration() {
        let registry = DialectRegistry::with_builtins();
        for name in registry.names() {
            assert_eq!(registry.create(name).unwrap().name(), name);
        }
    }

    #[tokio::test]
    async fn test_open_attaches_connection_and_options() {
        let registry = DialectRegistry::with_builtins();
        let conn = Arc::new(MockConnection::new().fail("server gone").count(1));
        let adapter = registry
            .open_with("postgres", conn.clone(), &AdapterOptions::strict())
            .unwrap();

        assert_eq!(adapter.session().policy(), IntrospectionPolicy::Strict);
        assert!(adapter.has_table("users").await.is_err());
        assert!(adapter.has_table("users").await.unwrap());
        assert_eq!(conn.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_open_uses_registry_options() {
        let registry = DialectRegistry::with_builtins().options(AdapterOptions {
            max_identifier_len: Some(8),
            ..AdapterOptions::default()
        });
        let adapter = registry
            .open("mysql", Arc::new(MockConnection::new()))
            .unwrap();
        assert_eq!(
            adapter.build_key_name(KeyKind::Index, "users", &["email"]),
            "idx_user"
        );
    }
}
