//! SQL Server dialect.
//!
//! - Square bracket identifier quoting (`[name]`)
//! - `IDENTITY(1,1)` columns, read back with `OUTPUT Inserted.<col>`
//! - `OFFSET .. ROWS FETCH NEXT .. ROWS ONLY`, OFFSET mandatory
//! - Column renames go through `sp_rename`

use async_trait::async_trait;

use super::{DialectAdapter, identity_or, offset_fetch_sql, quote_literal, quote_with};
use crate::error::Result;
use crate::expr::{DateToken, Expr, push_literal, translate_date_format};
use crate::field::{FieldDescriptor, ValueKind};
use crate::session::Session;
use crate::value::{LastInsertId, PageBound};

const MAX_NVARCHAR: usize = 4000;
const MAX_VARBINARY: usize = 8000;

const MAX_IDENTIFIER_LEN: usize = 128;

const HAS_INDEX_SQL: &str =
    "SELECT count(*) FROM sys.indexes WHERE name = @p1 AND object_id = OBJECT_ID(@p2)";
const HAS_TABLE_SQL: &str = "SELECT count(*) FROM INFORMATION_SCHEMA.TABLES \
     WHERE TABLE_NAME = @p1 AND TABLE_CATALOG = DB_NAME()";
const HAS_COLUMN_SQL: &str = "SELECT count(*) FROM INFORMATION_SCHEMA.COLUMNS \
     WHERE TABLE_CATALOG = DB_NAME() AND TABLE_NAME = @p1 AND COLUMN_NAME = @p2";
const HAS_FOREIGN_KEY_SQL: &str = "SELECT count(*) FROM sys.foreign_keys \
     WHERE parent_object_id = OBJECT_ID(@p1) AND name = @p2";
const CURRENT_DATABASE_SQL: &str = "SELECT DB_NAME() AS [Current Database]";

/// SQL Server dialect (2012 and later).
#[derive(Debug, Clone)]
pub struct MssqlDialect {
    session: Session,
}

impl MssqlDialect {
    /// Creates a detached SQL Server dialect.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: Session::new("mssql").with_max_identifier_len(MAX_IDENTIFIER_LEN),
        }
    }
}

impl Default for MssqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DialectAdapter for MssqlDialect {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn bind_placeholder(&self, position: usize) -> String {
        format!("@p{position}")
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_with(name, '[', ']')
    }

    fn native_sql_type(&self, field: &mut FieldDescriptor) -> Option<String> {
        let sql_type = match field.kind {
            ValueKind::Bool => "bit".to_string(),
            ValueKind::Int | ValueKind::Uint => identity_or(field, "int IDENTITY(1,1)", "int"),
            ValueKind::BigInt | ValueKind::BigUint => {
                identity_or(field, "bigint IDENTITY(1,1)", "bigint")
            }
            ValueKind::Float => "float".to_string(),
            ValueKind::String if field.fits_inline(MAX_NVARCHAR) => {
                format!("nvarchar({})", field.size)
            }
            ValueKind::String => "nvarchar(max)".to_string(),
            ValueKind::Time => "datetimeoffset".to_string(),
            ValueKind::Bytes if field.fits_inline(MAX_VARBINARY) => {
                format!("varbinary({})", field.size)
            }
            ValueKind::Bytes => "varbinary(max)".to_string(),
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
        self.session.exists("table", HAS_TABLE_SQL, &[table]).await
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

    async fn remove_index(&self, table: &str, index: &str) -> Result<()> {
        let sql = format!(
            "DROP INDEX {} ON {}",
            self.quote_identifier(index),
            self.quote_identifier(table)
        );
        self.session.execute(&sql).await
    }

    async fn modify_column(&self, table: &str, column: &str, ty: &str) -> Result<()> {
        let sql = format!(
            "ALTER TABLE {} ALTER COLUMN {} {}",
            self.quote_identifier(table),
            self.quote_identifier(column),
            ty
        );
        self.session.execute(&sql).await
    }

    async fn rename_column(&self, table: &str, column: &str, new_name: &str) -> Result<()> {
        // sp_rename takes the old name as an object path and the new name bare.
        let object = format!(
            "{}.{}",
            self.quote_identifier(table),
            self.quote_identifier(column)
        );
        let sql = format!(
            "EXEC sp_rename {}, {}, 'COLUMN'",
            quote_literal(&object),
            quote_literal(new_name)
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
        if columns.is_empty() {
            return LastInsertId::None;
        }
        LastInsertId::Interstitial(format!(
            "OUTPUT Inserted.{}",
            self.quote_identifier(column)
        ))
    }

    fn format_date<'e>(&self, expr: &'e mut Expr, format: &str) -> &'e mut Expr {
        let pattern = translate_date_format(format, mssql_token, mssql_literal);
        let pattern = quote_literal(&pattern);
        expr.rewrite(|e| format!("FORMAT({e}, {pattern})"))
    }

    fn max_identifier_len(&self) -> Option<usize> {
        Some(MAX_IDENTIFIER_LEN)
    }
}

const fn mssql_token(token: DateToken) -> &'static str {
    match token {
        DateToken::Year => "yyyy",
        DateToken::Month => "MM",
        DateToken::Day => "dd",
        DateToken::Hour => "HH",
        DateToken::Minute => "mm",
        DateToken::Second => "ss",
    }
}

// .NET format strings treat letters as specifiers; a backslash makes one literal.
fn mssql_literal(c: char, out: &mut String) {
    if c.is_ascii_alphabetic() || c == '\\' {
        out.push('\\');
        out.push(c);
    } else {
        push_literal(c, out);
    }
}
