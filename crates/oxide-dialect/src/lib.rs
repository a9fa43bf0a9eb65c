//! Pluggable SQL dialect adapters.
//!
//! `oxide-dialect` translates what an ORM knows about a model into the SQL a
//! particular engine understands, and answers schema questions against a
//! live database:
//! - Column types resolved from portable value kinds, including identity columns
//! - Identifier quoting and positional placeholders
//! - Pagination, insert-id retrieval and date formatting fragments
//! - Catalog introspection (`has_table`, `has_column`, `has_index`, ...)
//! - Single-statement DDL (`remove_index`, `modify_column`, `rename_column`)
//!
//! # Architecture
//!
//! - **DialectAdapter** - The contract every dialect implements
//! - **Dialects** - Oracle, PostgreSQL, MySQL, SQLite and SQL Server
//! - **DialectRegistry** - Builds adapters by name
//! - **Connection** - The database handle adapters query through
//! - **Session** - Per-adapter connection state and failure policy
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use oxide_dialect::prelude::*;
//! use sqlx::SqlitePool;
//!
//! let pool = SqlitePool::connect("sqlite::memory:").await?;
//! let registry = DialectRegistry::with_builtins();
//! let adapter = registry.open("sqlite3", Arc::new(pool))?;
//!
//! let mut id = FieldDescriptor::new("id", ValueKind::BigInt).primary_key();
//! assert_eq!(adapter.resolve_sql_type(&mut id)?, "integer primary key autoincrement");
//!
//! if !adapter.has_table("users").await? {
//!     // create it
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # List the built-in dialects
//! oxide-dialect dialects
//!
//! # Resolve a column type
//! oxide-dialect --dialect oracle type string --size 4000
//!
//! # Render a pagination clause
//! oxide-dialect --dialect mssql paginate --limit 10 --offset 20
//!
//! # Inspect a SQLite database
//! oxide-dialect --database sqlite:app.db inspect users --column email
//! ```

pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod field;
pub mod naming;
pub mod registry;
pub mod session;
pub mod value;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{AdapterOptions, IntrospectionPolicy};
    pub use crate::connection::Connection;
    pub use crate::dialect::{
        DialectAdapter, MssqlDialect, MysqlDialect, OracleDialect, PostgresDialect, SqliteDialect,
    };
    pub use crate::error::{DialectError, Result};
    pub use crate::expr::Expr;
    pub use crate::field::{FieldDescriptor, ValueKind};
    pub use crate::naming::{DefaultKeyNamer, KeyKind, KeyNamer};
    pub use crate::registry::DialectRegistry;
    pub use crate::session::Session;
    pub use crate::value::{BindValue, LastInsertId, PageBound};
}
