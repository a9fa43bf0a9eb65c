//! Oracle dialect.
//!
//! Oracle has no boolean column type and no `LIMIT`; booleans are stored as
//! `NUMBER(1, 0)` and pagination uses `OFFSET .. FETCH` (12c+). Identity
//! columns use `GENERATED BY DEFAULT AS IDENTITY`, and generated keys are
//! returned through `RETURNING .. INTO` an out bind.

use async_trait::async_trait;

use super::{DialectAdapter, identity_or, offset_fetch_sql, quote_literal};
use crate::error::Result;
use crate::expr::{DateToken, Expr, push_literal, translate_date_format};
use crate::field::{FieldDescriptor, ValueKind};
use crate::session::Session;
use crate::value::{BindValue, LastInsertId, PageBound};

/// Longest `NVARCHAR2` kept inline before falling back to `NCLOB`.
const MAX_NVARCHAR2: usize = 2000;
/// Longest `RAW` kept inline before falling back to `BLOB`.
const MAX_RAW: usize = 2000;

const MAX_IDENTIFIER_LEN: usize = 128;

const HAS_INDEX_SQL: &str =
    "SELECT count(*) FROM user_indexes WHERE index_name = :1 AND table_name = :2";
const HAS_TABLE_SQL: &str =
    "SELECT count(*) FROM all_objects WHERE object_type = :1 AND object_name = :2";
const HAS_COLUMN_SQL: &str =
    "SELECT count(*) FROM user_tab_cols WHERE table_name = :1 AND column_name = :2";
const HAS_FOREIGN_KEY_SQL: &str = "SELECT count(*) FROM user_constraints \
     WHERE constraint_type = 'R' AND table_name = :1 AND constraint_name = :2";
const CURRENT_DATABASE_SQL: &str = "SELECT SYS_CONTEXT('USERENV', 'DB_NAME') FROM dual";

/// Oracle dialect (12c and later).
#[derive(Debug, Clone)]
pub struct OracleDialect {
    session: Session,
}

impl OracleDialect {
    /// Creates a detached Oracle dialect.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: Session::new("oracle").with_max_identifier_len(MAX_IDENTIFIER_LEN),
        }
    }
}

impl Default for OracleDialect {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DialectAdapter for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn bind_placeholder(&self, position: usize) -> String {
        format!(":{position}")
    }

    fn native_sql_type(&self, field: &mut FieldDescriptor) -> Option<String> {
        let sql_type = match field.kind {
            ValueKind::Bool => "NUMBER(1, 0)".to_string(),
            ValueKind::Int | ValueKind::Uint => identity_or(
                field,
                "NUMBER(10) GENERATED BY DEFAULT AS IDENTITY",
                "NUMBER(10)",
            ),
            ValueKind::BigInt | ValueKind::BigUint => identity_or(
                field,
                "NUMBER(19) GENERATED BY DEFAULT AS IDENTITY",
                "NUMBER(19)",
            ),
            ValueKind::Float => "FLOAT(49)".to_string(),
            ValueKind::String if field.fits_inline(MAX_NVARCHAR2) => {
                format!("NVARCHAR2({})", field.size)
            }
            ValueKind::String => "NCLOB".to_string(),
            ValueKind::Time => "TIMESTAMP".to_string(),
            ValueKind::Bytes if field.fits_inline(MAX_RAW) => format!("RAW({})", field.size),
            ValueKind::Bytes => "BLOB".to_string(),
            ValueKind::Other(_) => return None,
        };
        Some(sql_type)
    }

    async fn has_index(&self, table: &str, index: &str) -> Result<bool> {
        self.session
            .exists("index", HAS_INDEX_SQL, &[index, table])
            .await
    }

    async fn has_table(&self, table: &str) -> Result<bool> {
        self.session
            .exists("table", HAS_TABLE_SQL, &["TABLE", table])
            .await
    }

    async fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        self.session
            .exists("column", HAS_COLUMN_SQL, &[table, column])
            .await
    }

    async fn has_foreign_key(&self, table: &str, name: &str) -> Result<bool> {
        self.session
            .exists("foreign_key", HAS_FOREIGN_KEY_SQL, &[table, name])
            .await
    }

    async fn remove_index(&self, _table: &str, index: &str) -> Result<()> {
        // Index names are schema-scoped in Oracle; DROP INDEX takes no table.
        let sql = format!("DROP INDEX {}", self.quote_identifier(index));
        self.session.execute(&sql).await
    }

    async fn modify_column(&self, table: &str, column: &str, ty: &str) -> Result<()> {
        let sql = format!(
            "ALTER TABLE {} MODIFY {} {}",
            self.quote_identifier(table),
            self.quote_identifier(column),
            ty
        );
        self.session.execute(&sql).await
    }

    async fn current_database(&self) -> String {
        self.session.scalar_or_empty(CURRENT_DATABASE_SQL).await
    }

    fn limit_and_offset_sql(&self, limit: Option<PageBound>, offset: Option<PageBound>) -> String {
        offset_fetch_sql(limit, offset)
    }

    fn last_insert_id(&self, _table: &str, column: &str, columns: &[String]) -> LastInsertId {
        if columns.is_empty() || column == "*" {
            return LastInsertId::None;
        }
        LastInsertId::Suffix(format!(
            " RETURNING {} INTO :id",
            self.quote_identifier(column)
        ))
    }

    fn format_date<'e>(&self, expr: &'e mut Expr, format: &str) -> &'e mut Expr {
        let pattern = translate_date_format(format, oracle_token, oracle_literal);
        let pattern = quote_literal(&pattern);
        expr.rewrite(|e| format!("(to_char({e}, {pattern}))"))
    }

    fn select_from_dummy_table(&self) -> &'static str {
        "FROM DUAL"
    }

    fn convert_bind_value(&self, value: BindValue) -> BindValue {
        match value {
            BindValue::Bool(b) => BindValue::Int(i64::from(b)),
            other => other,
        }
    }

    fn max_identifier_len(&self) -> Option<usize> {
        Some(MAX_IDENTIFIER_LEN)
    }
}

const fn oracle_token(token: DateToken) -> &'static str {
    match token {
        DateToken::Year => "YYYY",
        DateToken::Month => "MM",
        DateToken::Day => "DD",
        DateToken::Hour => "HH24",
        DateToken::Minute => "MI",
        DateToken::Second => "SS",
    }
}

// Letters in a to_char mask are format elements; literal text goes in double
// quotes. A double quote has no escape there and is dropped.
fn oracle_literal(c: char, out: &mut String) {
    match c {
        '"' => {}
        c if c.is_ascii_alphanumeric() => {
            out.push('"');
            out.push(c);
            out.push('"');
        }
        c => push_literal(c, out),
    }
}
