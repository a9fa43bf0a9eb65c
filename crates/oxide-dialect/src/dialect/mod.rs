//! Database dialect implementations.
//!
//! Each dialect knows how a specific engine spells column types, quotes
//! identifiers, paginates, reports generated keys and describes its own
//! schema. Dialects are independent implementations of [`DialectAdapter`];
//! none of them inherits behaviour from another.

mod mssql;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;

pub use mssql::MssqlDialect;
pub use mysql::MysqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AdapterOptions;
use crate::connection::Connection;
use crate::error::{DialectError, Result};
use crate::expr::Expr;
use crate::field::FieldDescriptor;
use crate::naming::KeyKind;
use crate::session::Session;
use crate::value::{BindValue, LastInsertId, PageBound};

/// Contract between the host ORM and one SQL dialect.
///
/// Introspection results are never cached: every `has_*` call is a fresh
/// round trip.
#[async_trait]
pub trait DialectAdapter: Send + Sync + fmt::Debug {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the connection state.
    fn session(&self) -> &Session;

    /// Returns the connection state mutably.
    fn session_mut(&mut self) -> &mut Session;

    /// Attaches or replaces the database connection.
    fn set_connection(&mut self, conn: Arc<dyn Connection>) {
        self.session_mut().set_connection(conn);
    }

    /// Applies registry-wide options.
    fn configure(&mut self, options: &AdapterOptions) {
        self.session_mut().configure(options);
    }

    /// Positional parameter syntax for the 1-based `position`.
    fn bind_placeholder(&self, position: usize) -> String;

    /// Quotes an identifier, escaping embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        quote_with(name, '"', '"')
    }

    /// Native column type for the field's value kind, or `None` when the
    /// kind has no mapping. Sets `field.auto_increment` when it picks an
    /// identity type.
    fn native_sql_type(&self, field: &mut FieldDescriptor) -> Option<String>;

    /// Resolves the full column type for a field: the explicit type if one
    /// was given, else the native type, followed by the field's modifiers.
    ///
    /// Fails with [`DialectError::UnsupportedType`] when neither applies.
    fn resolve_sql_type(&self, field: &mut FieldDescriptor) -> Result<String> {
        let explicit = field
            .sql_type
            .as_deref()
            .map(str::trim)
            .filter(|ty| !ty.is_empty())
            .map(str::to_string);

        let sql_type = match explicit {
            Some(ty) => ty,
            None => self
                .native_sql_type(field)
                .ok_or_else(|| DialectError::UnsupportedType {
                    dialect: self.name(),
                    field: field.name.clone(),
                    kind: field.kind.to_string(),
                })?,
        };

        Ok(field.with_modifiers(sql_type))
    }

    /// Returns whether `index` exists on `table`.
    async fn has_index(&self, table: &str, index: &str) -> Result<bool>;

    /// Returns whether `table` exists.
    async fn has_table(&self, table: &str) -> Result<bool>;

    /// Returns whether `column` exists on `table`.
    async fn has_column(&self, table: &str, column: &str) -> Result<bool>;

    /// Returns whether the foreign key `name` exists on `table`.
    async fn has_foreign_key(&self, _table: &str, _name: &str) -> Result<bool> {
        Ok(false)
    }

    /// Drops `index`.
    async fn remove_index(&self, table: &str, index: &str) -> Result<()>;

    /// Changes the type of `column`. `ty` is emitted as given.
    async fn modify_column(&self, table: &str, column: &str, ty: &str) -> Result<()>;

    /// Renames `column` to `new_name`.
    async fn rename_column(&self, table: &str, column: &str, new_name: &str) -> Result<()> {
        let sql = format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quote_identifier(table),
            self.quote_identifier(column),
            self.quote_identifier(new_name)
        );
        self.session().execute(&sql).await
    }

    /// Name of the active database or schema; `""` if the lookup fails.
    async fn current_database(&self) -> String;

    /// Trailing pagination clause. Unparseable or negative bounds are dropped.
    fn limit_and_offset_sql(&self, limit: Option<PageBound>, offset: Option<PageBound>) -> String {
        let mut sql = String::new();
        if let Some(limit) = limit.as_ref().and_then(PageBound::parse) {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset.as_ref().and_then(PageBound::parse) {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        sql
    }

    /// Fragment retrieving the identity value generated by an insert into
    /// `table`. `columns` are the identity columns; empty means none.
    fn last_insert_id(&self, _table: &str, _column: &str, _columns: &[String]) -> LastInsertId {
        LastInsertId::None
    }

    /// Wraps `expr` in the native call formatting it with the portable
    /// pattern `format`.
    fn format_date<'e>(&self, expr: &'e mut Expr, format: &str) -> &'e mut Expr;

    /// Syntax for inserting a row made only of defaults.
    fn default_value_str(&self) -> &'static str {
        "DEFAULT VALUES"
    }

    /// `FROM` clause for a table-less `SELECT`, or `""`.
    fn select_from_dummy_table(&self) -> &'static str {
        ""
    }

    /// Whether `NULL`/`NOT NULL` precedes the type modifiers in column definitions.
    fn column_definition_null_first(&self) -> bool {
        false
    }

    /// Adjusts a value before it is bound.
    fn convert_bind_value(&self, value: BindValue) -> BindValue {
        value
    }

    /// Longest identifier the engine accepts, if it is worth enforcing.
    fn max_identifier_len(&self) -> Option<usize> {
        None
    }

    /// Name for a generated index or constraint.
    fn build_key_name(&self, kind: KeyKind, table: &str, fields: &[&str]) -> String {
        self.session().key_namer().build_key_name(kind, table, fields)
    }
}

/// Wraps `name` in `open`/`close`, doubling any embedded `close`.
pub(crate) fn quote_with(name: &str, open: char, close: char) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push(open);
    for c in name.chars() {
        if c == close {
            quoted.push(close);
        }
        quoted.push(c);
    }
    quoted.push(close);
    quoted
}

/// Picks `identity` when the field can auto-increment, recording that
/// on the field, and `plain` otherwise.
pub(crate) fn identity_or(field: &mut FieldDescriptor, identity: &str, plain: &str) -> String {
    if field.can_auto_increment() {
        field.auto_increment = Some(true);
        identity.to_string()
    } else {
        plain.to_string()
    }
}

/// Escapes `value` for use inside a single-quoted SQL string literal.
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `OFFSET .. ROWS` / `FETCH NEXT .. ROWS ONLY` pagination, shared by the
/// engines that require OFFSET before FETCH.
pub(crate) fn offset_fetch_sql(limit: Option<PageBound>, offset: Option<PageBound>) -> String {
    let mut sql = String::new();
    if let Some(offset) = offset.as_ref().and_then(PageBound::parse) {
        sql.push_str(&format!(" OFFSET {offset} ROWS"));
    }
    if let Some(limit) = limit.as_ref().and_then(PageBound::parse) {
        if sql.is_empty() {
            sql.push_str(" OFFSET 0 ROWS");
        }
        sql.push_str(&format!(" FETCH NEXT {limit} ROWS ONLY"));
    }
    sql
}
