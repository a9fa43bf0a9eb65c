//! MySQL dialect.
//!
//! MySQL quotes identifiers with backticks, supports unsigned integers and
//! reports generated keys through the driver, so inserts need no extra
//! clause.

use async_trait::async_trait;

use super::{DialectAdapter, identity_or, quote_literal, quote_with};
use crate::error::Result;
use crate::expr::{DateToken, Expr, push_percent_literal, translate_date_format};
use crate::field::{FieldDescriptor, ValueKind};
use crate::session::Session;

/// Longest `varchar`/`varbinary` kept inline; larger values use the long types.
const MAX_INLINE: usize = 65_531;

const MAX_IDENTIFIER_LEN: usize = 64;

const HAS_INDEX_SQL: &str = "SELECT count(*) FROM INFORMATION_SCHEMA.STATISTICS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND INDEX_NAME = ?";
const HAS_TABLE_SQL: &str = "SELECT count(*) FROM INFORMATION_SCHEMA.TABLES \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND TABLE_TYPE = 'BASE TABLE'";
const HAS_COLUMN_SQL: &str = "SELECT count(*) FROM INFORMATION_SCHEMA.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?";
const HAS_FOREIGN_KEY_SQL: &str = "SELECT count(*) FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS \
     WHERE CONSTRAINT_SCHEMA = DATABASE() AND TABLE_NAME = ? AND CONSTRAINT_NAME = ? \
     AND CONSTRAINT_TYPE = 'FOREIGN KEY'";
const CURRENT_DATABASE_SQL: &str = "SELECT DATABASE()";

/// MySQL dialect (5.7 and later).
#[derive(Debug, Clone)]
pub struct MysqlDialect {
    session: Session,
}

impl MysqlDialect {
    /// Creates a detached MySQL dialect.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: Session::new("mysql").with_max_identifier_len(MAX_IDENTIFIER_LEN),
        }
    }
}

impl Default for MysqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DialectAdapter for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn bind_placeholder(&self, _position: usize) -> String {
        "?".to_string()
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_with(name, '`', '`')
    }

    fn native_sql_type(&self, field: &mut FieldDescriptor) -> Option<String> {
        let sql_type = match field.kind {
            ValueKind::Bool => "boolean".to_string(),
            ValueKind::Int => identity_or(field, "int AUTO_INCREMENT", "int"),
            ValueKind::Uint => identity_or(field, "int unsigned AUTO_INCREMENT", "int unsigned"),
            ValueKind::BigInt => identity_or(field, "bigint AUTO_INCREMENT", "bigint"),
            ValueKind::BigUint => {
                identity_or(field, "bigint unsigned AUTO_INCREMENT", "bigint unsigned")
            }
            ValueKind::Float => "double".to_string(),
            ValueKind::String if field.fits_inline(MAX_INLINE) => {
                format!("varchar({})", field.size)
            }
            ValueKind::String => "longtext".to_string(),
            ValueKind::Time => "DATETIME".to_string(),
            ValueKind::Bytes if field.fits_inline(MAX_INLINE) => {
                format!("varbinary({})", field.size)
            }
            ValueKind::Bytes => "longblob".to_string(),
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
            "ALTER TABLE {} MODIFY COLUMN {} {}",
            self.quote_identifier(table),
            self.quote_identifier(column),
            ty
        );
        self.session.execute(&sql).await
    }

    async fn current_database(&self) -> String {
        self.session.scalar_or_empty(CURRENT_DATABASE_SQL).await
    }

    fn format_date<'e>(&self, expr: &'e mut Expr, format: &str) -> &'e mut Expr {
        let pattern = translate_date_format(format, mysql_token, push_percent_literal);
        let pattern = quote_literal(&pattern);
        expr.rewrite(|e| format!("DATE_FORMAT({e}, {pattern})"))
    }

    fn default_value_str(&self) -> &'static str {
        "VALUES()"
    }

    fn select_from_dummy_table(&self) -> &'static str {
        "FROM DUAL"
    }

    fn max_identifier_len(&self) -> Option<usize> {
        Some(MAX_IDENTIFIER_LEN)
    }
}

const fn mysql_token(token: DateToken) -> &'static str {
    match token {
        DateToken::Year => "%Y",
        DateToken::Month => "%m",
        DateToken::Day => "%d",
        DateToken::Hour => "%H",
        DateToken::Minute => "%i",
        DateToken::Second => "%s",
    }
}
