//! The database handle a dialect talks to.
//!
//! Dialects only ever run three kinds of statements: a single-row `COUNT`
//! against the catalog, a single scalar string lookup, and DDL. Hosts
//! implement [`Connection`] for whatever driver they use; an implementation
//! for [`SqlitePool`] ships with the crate.

use std::fmt;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

use crate::error::Result;

/// Minimal database interface used for introspection and DDL.
///
/// Implementations must be safe for concurrent use; adapters share one
/// handle between all callers.
#[async_trait]
pub trait Connection: Send + Sync + fmt::Debug {
    /// Runs a query returning one integer, binding `params` positionally.
    ///
    /// A query returning no row yields `0`.
    async fn fetch_count(&self, sql: &str, params: &[&str]) -> Result<i64>;

    /// Runs a query returning at most one string.
    async fn fetch_string(&self, sql: &str, params: &[&str]) -> Result<Option<String>>;

    /// Executes a statement, returning the number of affected rows.
    async fn execute(&self, sql: &str) -> Result<u64>;
}

#[async_trait]
impl Connection for SqlitePool {
    async fn fetch_count(&self, sql: &str, params: &[&str]) -> Result<i64> {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for param in params {
            query = query.bind(*param);
        }
        Ok(query.fetch_optional(self).await?.unwrap_or(0))
    }

    async fn fetch_string(&self, sql: &str, params: &[&str]) -> Result<Option<String>> {
        let mut query = sqlx::query_scalar::<_, Option<String>>(sql);
        for param in params {
            query = query.bind(*param);
        }
        Ok(query.fetch_optional(self).await?.flatten())
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        let result = sqlx::query(sql).execute(self).await?;
        Ok(result.rows_affected())
    }
}
