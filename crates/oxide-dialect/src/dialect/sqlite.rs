//! SQLite dialect.
//!
//! SQLite has limited ALTER TABLE support: columns can be renamed but not
//! retyped, so `modify_column` is reported as unsupported instead of
//! attempting a table rebuild.

use async_trait::async_trait;

use super::{DialectAdapter, identity_or, quote_literal};
use crate::error::{DialectError, Result};
use crate::expr::{DateToken, Expr, push_percent_literal, translate_date_format};
use crate::field::{FieldDescriptor, ValueKind};
use crate::session::Session;
use crate::value::PageBound;

const MAX_VARCHAR: usize = 65_531;

/// Only `INTEGER PRIMARY KEY` aliases the rowid, so both integer widths use it.
const AUTOINCREMENT: &str = "integer primary key autoincrement";

const HAS_INDEX_SQL: &str =
    "SELECT count(*) FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1 AND name = ?2";
const HAS_TABLE_SQL: &str = "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1";
const HAS_COLUMN_SQL: &str = "SELECT count(*) FROM pragma_table_info(?1) WHERE name = ?2";
const CURRENT_DATABASE_SQL: &str = "SELECT file FROM pragma_database_list WHERE name = 'main'";

/// SQLite dialect.
#[derive(Debug, Clone)]
pub struct SqliteDialect {
    session: Session,
}

impl SqliteDialect {
    /// Creates a detached SQLite dialect.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: Session::new("sqlite3"),
        }
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DialectAdapter for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite3"
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn bind_placeholder(&self, position: usize) -> String {
        format!("?{position}")
    }

    fn native_sql_type(&self, field: &mut FieldDescriptor) -> Option<String> {
        let sql_type = match field.kind {
            ValueKind::Bool => "bool".to_string(),
            ValueKind::Int | ValueKind::Uint => identity_or(field, AUTOINCREMENT, "integer"),
            ValueKind::BigInt | ValueKind::BigUint => identity_or(field, AUTOINCREMENT, "bigint"),
            ValueKind::Float => "real".to_string(),
            ValueKind::String if field.fits_inline(MAX_VARCHAR) => {
                format!("varchar({})", field.size)
            }
            ValueKind::String => "text".to_string(),
            ValueKind::Time => "datetime".to_string(),
            ValueKind::Bytes => "blob".to_string(),
            ValueKind::Other(_) => return None,
        };
        Some(sql_type)
    }

    async fn has_index(&self, table: &str, index: &str) -> Result<bool> {
        self.session
            .exists("index", HAS_INDEX_SQL, &[table, index])
            .await
    }

    async fn has_table(&self, table: &str) -> Result<bool> {
        self.session.exists("table", HAS_TABLE_SQL, &[table]).await
    }

    async fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        self.session
            .exists("column", HAS_COLUMN_SQL, &[table, column])
            .await
    }

    async fn remove_index(&self, _table: &str, index: &str) -> Result<()> {
        let sql = format!("DROP INDEX {}", self.quote_identifier(index));
        self.session.execute(&sql).await
    }

    async fn modify_column(&self, _table: &str, _column: &str, _ty: &str) -> Result<()> {
        Err(DialectError::Unsupported {
            dialect: "sqlite3",
            operation: "modify_column",
        })
    }

    async fn current_database(&self) -> String {
        self.session.scalar_or_empty(CURRENT_DATABASE_SQL).await
    }

    fn limit_and_offset_sql(&self, limit: Option<PageBound>, offset: Option<PageBound>) -> String {
        let limit = limit.as_ref().and_then(PageBound::parse);
        let offset = offset.as_ref().and_then(PageBound::parse);
        match (limit, offset) {
            (Some(limit), Some(offset)) => format!(" LIMIT {limit} OFFSET {offset}"),
            (Some(limit), None) => format!(" LIMIT {limit}"),
            (None, Some(offset)) => format!(" LIMIT -1 OFFSET {offset}"),
            (None, None) => String::new(),
        }
    }

    fn format_date<'e>(&self, expr: &'e mut Expr, format: &str) -> &'e mut Expr {
        let pattern = translate_date_format(format, sqlite_token, push_percent_literal);
        let pattern = quote_literal(&pattern);
        expr.rewrite(|e| format!("strftime({pattern}, {e})"))
    }
}

const fn sqlite_token(token: DateToken) -> &'static str {
    match token {
        DateToken::Year => "%Y",
        DateToken::Month => "%m",
        DateToken::Day => "%d",
        DateToken::Hour => "%H",
        DateToken::Minute => "%M",
        DateToken::Second => "%S",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::connection::mock::MockConnection;

    #[test]
    fn test_name_and_placeholders() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.name(), "sqlite3");
        assert_eq!(dialect.bind_placeholder(1), "?1");
        assert_eq!(dialect.quote_identifier("users"), "\"users\"");
    }

    #[test]
    fn test_types() {
        let dialect = SqliteDialect::new();

        let mut id = FieldDescriptor::new("id", ValueKind::BigInt).primary_key();
        assert_eq!(dialect.resolve_sql_type(&mut id).unwrap(), AUTOINCREMENT);
        assert_eq!(id.auto_increment, Some(true));

        let mut manual = FieldDescriptor::new("id", ValueKind::BigInt)
            .primary_key()
            .auto_increment(false);
        assert_eq!(dialect.resolve_sql_type(&mut manual).unwrap(), "bigint");
        assert_eq!(manual.auto_increment, Some(false));

        let mut ok = FieldDescriptor::new("ok", ValueKind::Bool).not_null();
        assert_eq!(dialect.resolve_sql_type(&mut ok).unwrap(), "bool NOT NULL");

        let mut ratio = FieldDescriptor::new("ratio", ValueKind::Float);
        assert_eq!(dialect.resolve_sql_type(&mut ratio).unwrap(), "real");

        let mut big = FieldDescriptor::new("body", ValueKind::String).size(70_000);
        assert_eq!(dialect.resolve_sql_type(&mut big).unwrap(), "text");
    }

    #[test]
    fn test_unmapped_kind_is_fatal() {
        let dialect = SqliteDialect::new();
        let mut tags = FieldDescriptor::new("tags", ValueKind::Other("map".into()));
        let err = dialect.resolve_sql_type(&mut tags).unwrap_err();
        assert!(err.is_fatal());

        let mut json = FieldDescriptor::new("tags", ValueKind::Other("map".into())).sql_type("json");
        assert_eq!(dialect.resolve_sql_type(&mut json).unwrap(), "json");
    }

    #[test]
    fn test_limit_and_offset() {
        let dialect = SqliteDialect::new();
        assert_eq!(
            dialect.limit_and_offset_sql(Some(10.into()), Some(5.into())),
            " LIMIT 10 OFFSET 5"
        );
        assert_eq!(
            dialect.limit_and_offset_sql(None, Some(5.into())),
            " LIMIT -1 OFFSET 5"
        );
        assert_eq!(dialect.limit_and_offset_sql(Some((-1).into()), None), "");
        assert_eq!(dialect.limit_and_offset_sql(None, None), "");
    }

    #[test]
    fn test_format_date() {
        let dialect = SqliteDialect::new();
        let mut expr = Expr::new("created_at");
        dialect.format_date(&mut expr, "yyyy-mm-dd h:M:s");
        assert_eq!(expr.sql, "strftime('%Y-%m-%d %H:%M:%S', created_at)");

        let mut expr = Expr::new("created_at");
        dialect.format_date(&mut expr, "d'h%");
        assert_eq!(expr.sql, "strftime('%d''%H%%', created_at)");
    }

    #[tokio::test]
    async fn test_modify_column_is_unsupported() {
        let conn = Arc::new(MockConnection::new());
        let mut dialect = SqliteDialect::new();
        dialect.set_connection(conn.clone());

        let err = dialect
            .modify_column("users", "email", "text")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DialectError::Unsupported {
                operation: "modify_column",
                ..
            }
        ));
        assert!(conn.calls().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_keys_are_not_queried() {
        let conn = Arc::new(MockConnection::new().count(1));
        let mut dialect = SqliteDialect::new();
        dialect.set_connection(conn.clone());

        assert!(!dialect.has_foreign_key("orders", "fk_orders_user").await.unwrap());
        assert!(conn.calls().is_empty());
    }
}
