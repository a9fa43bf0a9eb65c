#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use oxide_dialect::prelude::*;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// One-connection in-memory pool; every connection would otherwise get its
/// own empty database.
pub async fn memory_pool() -> Arc<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap_or_else(|e| panic!("Failed to open in-memory database: {e}"));
    Arc::new(pool)
}

pub async fn file_pool(path: &Path) -> Arc<SqlitePool> {
    let url = format!("sqlite:{}?mode=rwc", path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .unwrap_or_else(|e| panic!("Failed to open {url}: {e}"));
    Arc::new(pool)
}

pub fn sqlite_adapter(pool: &Arc<SqlitePool>) -> Box<dyn DialectAdapter> {
    DialectRegistry::with_builtins()
        .open("sqlite3", pool.clone())
        .unwrap_or_else(|e| panic!("Failed to open sqlite3 adapter: {e}"))
}

pub async fn exec(pool: &SqlitePool, sql: &str) {
    sqlx::query(sql)
        .execute(pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to execute: {sql}\nError: {e}"));
}

/// Builds a `CREATE TABLE` statement from resolved field types.
pub fn create_table_sql(
    adapter: &dyn DialectAdapter,
    table: &str,
    fields: &mut [FieldDescriptor],
) -> String {
    let columns: Vec<String> = fields
        .iter_mut()
        .map(|field| {
            let ty = adapter
                .resolve_sql_type(field)
                .unwrap_or_else(|e| panic!("Failed to resolve {}: {e}", field.name));
            format!("{} {}", adapter.quote_identifier(&field.name), ty)
        })
        .collect();
    format!(
        "CREATE TABLE {} ({})",
        adapter.quote_identifier(table),
        columns.join(", ")
    )
}
