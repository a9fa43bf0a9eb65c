//! PostgreSQL dialect.

use async_trait::async_trait;

use super::{DialectAdapter, identity_or, quote_literal};
use crate::error::Result;
use crate::expr::{DateToken, Expr, push_literal, translate_date_format};
use crate::field::{FieldDescriptor, ValueKind};
use crate::session::Session;
use crate::value::LastInsertId;

/// Longest `varchar(n)` PostgreSQL accepts.
const MAX_VARCHAR: usize = 10_485_760;

const MAX_IDENTIFIER_LEN: usize = 63;

const HAS_INDEX_SQL: &str = "SELECT count(*) FROM pg_indexes \
     WHERE tablename = $1 AND indexname = $2 AND schemaname = CURRENT_SCHEMA()";
const HAS_TABLE_SQL: &str = "SELECT count(*) FROM INFORMATION_SCHEMA.tables \
     WHERE table_name = $1 AND table_type = 'BASE TABLE' AND table_schema = CURRENT_SCHEMA()";
const HAS_COLUMN_SQL: &str = "SELECT count(*) FROM INFORMATION_SCHEMA.columns \
     WHERE table_name = $1 AND column_name = $2 AND table_schema = CURRENT_SCHEMA()";
const HAS_FOREIGN_KEY_SQL: &str = "SELECT count(con.conname) FROM pg_constraint con \
     WHERE $1::regclass::oid = con.conrelid AND con.conname = $2 AND con.contype = 'f'";
const CURRENT_DATABASE_SQL: &str = "SELECT CURRENT_DATABASE()";

/// PostgreSQL dialect.
#[derive(Debug, Clone)]
pub struct PostgresDialect {
    session: Session,
}

impl PostgresDialect {
    /// Creates a detached PostgreSQL dialect.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: Session::new("postgres").with_max_identifier_len(MAX_IDENTIFIER_LEN),
        }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DialectAdapter for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn bind_placeholder(&self, position: usize) -> String {
        format!("${position}")
    }

    fn native_sql_type(&self, field: &mut FieldDescriptor) -> Option<String> {
        let sql_type = match field.kind {
            ValueKind::Bool => "boolean".to_string(),
            ValueKind::Int | ValueKind::Uint => identity_or(field, "serial", "integer"),
            ValueKind::BigInt | ValueKind::BigUint => identity_or(field, "bigserial", "bigint"),
            ValueKind::Float => "double precision".to_string(),
            ValueKind::String if field.fits_inline(MAX_VARCHAR) => {
                format!("varchar({})", field.size)
            }
            ValueKind::String => "text".to_string(),
            ValueKind::Time => "timestamp with time zone".to_string(),
            ValueKind::Bytes => "bytea".to_string(),
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

    async fn has_foreign_key(&self, table: &str, name: &str) -> Result<bool> {
        let relation = self.quote_identifier(table);
        self.session
            .exists("foreign_key", HAS_FOREIGN_KEY_SQL, &[relation.as_str(), name])
            .await
    }

    async fn remove_index(&self, _table: &str, index: &str) -> Result<()> {
        let sql = format!("DROP INDEX {}", self.quote_identifier(index));
        self.session.execute(&sql).await
    }

    async fn modify_column(&self, table: &str, column: &str, ty: &str) -> Result<()> {
        let sql = format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            self.quote_identifier(table),
            self.quote_identifier(column),
            ty
        );
        self.session.execute(&sql).await
    }

    async fn current_database(&self) -> String {
        self.session.scalar_or_empty(CURRENT_DATABASE_SQL).await
    }

    fn last_insert_id(&self, table: &str, column: &str, columns: &[String]) -> LastInsertId {
        if columns.is_empty() {
            return LastInsertId::None;
        }
        LastInsertId::Suffix(format!(
            " RETURNING {}.{}",
            self.quote_identifier(table),
            self.quote_identifier(column)
        ))
    }

    fn format_date<'e>(&self, expr: &'e mut Expr, format: &str) -> &'e mut Expr {
        let pattern = translate_date_format(format, postgres_token, postgres_literal);
        let pattern = quote_literal(&pattern);
        expr.rewrite(|e| format!("to_char({e}, {pattern})"))
    }

    fn max_identifier_len(&self) -> Option<usize> {
        Some(MAX_IDENTIFIER_LEN)
    }
}

const fn postgres_token(token: DateToken) -> &'static str {
    match token {
        DateToken::Year => "YYYY",
        DateToken::Month => "MM",
        DateToken::Day => "DD",
        DateToken::Hour => "HH24",
        DateToken::Minute => "MI",
        DateToken::Second => "SS",
    }
}

fn postgres_literal(c: char, out: &mut String) {
    match c {
        '"' => out.push_str("\\\""),
        c if c.is_ascii_alphanumeric() => {
            out.push('"');
            out.push(c);
            out.push('"');
        }
        c => push_literal(c, out),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::connection::mock::MockConnection;
    use crate::naming::KeyKind;

    #[test]
    fn test_placeholders_and_quoting() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.name(), "postgres");
        assert_eq!(dialect.bind_placeholder(2), "$2");
        assert_eq!(dialect.quote_identifier("My Table"), "\"My Table\"");
    }

    #[test]
    fn test_serial_primary_keys() {
        let dialect = PostgresDialect::new();

        let mut id = FieldDescriptor::new("id", ValueKind::BigUint).primary_key();
        assert_eq!(dialect.resolve_sql_type(&mut id).unwrap(), "bigserial");
        assert_eq!(id.auto_increment, Some(true));

        let mut seq = FieldDescriptor::new("seq", ValueKind::Int).auto_increment(true);
        assert_eq!(dialect.resolve_sql_type(&mut seq).unwrap(), "serial");

        let mut count = FieldDescriptor::new("count", ValueKind::Int);
        assert_eq!(dialect.resolve_sql_type(&mut count).unwrap(), "integer");
    }

    #[test]
    fn test_other_types() {
        let dialect = PostgresDialect::new();
        let resolve = |mut field: FieldDescriptor| dialect.resolve_sql_type(&mut field).unwrap();

        assert_eq!(resolve(FieldDescriptor::new("ok", ValueKind::Bool)), "boolean");
        assert_eq!(
            resolve(FieldDescriptor::new("ratio", ValueKind::Float)),
            "double precision"
        );
        assert_eq!(
            resolve(FieldDescriptor::new("title", ValueKind::String)),
            "varchar(255)"
        );
        assert_eq!(
            resolve(FieldDescriptor::new("body", ValueKind::String).size(0)),
            "text"
        );
        assert_eq!(
            resolve(FieldDescriptor::new("at", ValueKind::Time)),
            "timestamp with time zone"
        );
        assert_eq!(
            resolve(FieldDescriptor::new("raw", ValueKind::Bytes).size(16)),
            "bytea"
        );
    }

    #[test]
    fn test_limit_and_offset() {
        let dialect = PostgresDialect::new();
        assert_eq!(
            dialect.limit_and_offset_sql(Some(10.into()), Some(5.into())),
            " LIMIT 10 OFFSET 5"
        );
        assert_eq!(dialect.limit_and_offset_sql(Some(10.into()), None), " LIMIT 10");
        assert_eq!(dialect.limit_and_offset_sql(None, Some(5.into())), " OFFSET 5");
        assert_eq!(dialect.limit_and_offset_sql(Some((-1).into()), None), "");
    }

    #[test]
    fn test_returning_suffix() {
        let dialect = PostgresDialect::new();
        let clause = dialect.last_insert_id("users", "id", &["id".to_string()]);
        assert_eq!(clause.suffix(), " RETURNING \"users\".\"id\"");
        assert!(dialect.last_insert_id("users", "id", &[]).is_none());
    }

    #[test]
    fn test_format_date() {
        let dialect = PostgresDialect::new();
        let mut expr = Expr::new("created_at");
        dialect.format_date(&mut expr, "yyyy-mm-dd");
        assert_eq!(expr.sql, "to_char(created_at, 'YYYY-MM-DD')");

        let mut expr = Expr::new("ts");
        dialect.format_date(&mut expr, "y\"d'h");
        assert_eq!(expr.sql, "to_char(ts, 'YYYY\\\"DD''HH24')");
    }

    #[test]
    fn test_key_names_are_cut_to_identifier_limit() {
        let dialect = PostgresDialect::new();
        let long = "a".repeat(80);
        let name = dialect.build_key_name(KeyKind::Index, &long, &["id"]);
        assert_eq!(name.len(), 63);
        assert!(name.starts_with("idx_aaa"));
    }

    #[tokio::test]
    async fn test_introspection_and_ddl() {
        let conn = Arc::new(MockConnection::new().count(1).count(0));
        let mut dialect = PostgresDialect::new();
        dialect.set_connection(conn.clone());

        assert!(dialect.has_index("users", "idx_users_email").await.unwrap());
        assert!(!dialect.has_foreign_key("orders", "fk_orders_user").await.unwrap());
        dialect
            .modify_column("users", "email", "varchar(320)")
            .await
            .unwrap();

        let calls = conn.calls();
        assert_eq!(calls[0].params, vec!["users", "idx_users_email"]);
        assert_eq!(calls[1].params, vec!["\"orders\"", "fk_orders_user"]);
        assert_eq!(
            calls[2].sql,
            "ALTER TABLE \"users\" ALTER COLUMN \"email\" TYPE varchar(320)"
        );
    }
}
