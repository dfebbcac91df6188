//! Database connection abstraction
//!
//! This module provides the database backend enum and connection pooling
//! logic supporting PostgreSQL, MySQL and SQLite. Every statement checks a
//! connection out of the pool for the duration of a single call, so the
//! pool can safely be shared across conversations.

use crate::error::{Result, QueryMindError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{mysql::MySqlPool, postgres::PgPool, sqlite::SqlitePool};
use sqlx::{Column, Row};
use std::str::FromStr;

/// Supported database backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    /// PostgreSQL
    PostgreSQL,
    /// MySQL/MariaDB
    MySQL,
    /// SQLite
    SQLite,
}

impl DatabaseBackend {
    /// Parse database URL to determine backend
    pub fn from_url(url: &str) -> Result<Self> {
        let url_lower = url.to_lowercase();

        if url_lower.starts_with("postgres://") || url_lower.starts_with("postgresql://") {
            Ok(DatabaseBackend::PostgreSQL)
        } else if url_lower.starts_with("mysql://") || url_lower.starts_with("mariadb://") {
            Ok(DatabaseBackend::MySQL)
        } else if url_lower.starts_with("sqlite://")
            || url_lower.starts_with("sqlite:")
            || url_lower.ends_with(".db")
            || url_lower.ends_with(".sqlite")
            || url_lower.ends_with(".sqlite3")
        {
            Ok(DatabaseBackend::SQLite)
        } else {
            Err(QueryMindError::InvalidDatabaseUrl(format!(
                "Unable to determine database type from URL: {}",
                url
            )))
        }
    }

    /// Get the name of this database backend
    pub fn name(&self) -> &'static str {
        match self {
            DatabaseBackend::PostgreSQL => "PostgreSQL",
            DatabaseBackend::MySQL => "MySQL",
            DatabaseBackend::SQLite => "SQLite",
        }
    }
}

impl FromStr for DatabaseBackend {
    type Err = QueryMindError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(DatabaseBackend::PostgreSQL),
            "mysql" | "mariadb" => Ok(DatabaseBackend::MySQL),
            "sqlite" | "sqlite3" => Ok(DatabaseBackend::SQLite),
            _ => Err(QueryMindError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

impl std::fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Result set of a SELECT-style query, decoded to display strings
#[derive(Debug, Clone, Default)]
pub struct QueryRows {
    /// Column names in result order
    pub columns: Vec<String>,
    /// Row values rendered as text ("NULL" for nulls)
    pub rows: Vec<Vec<String>>,
}

impl QueryRows {
    /// Number of rows in the result set
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the result set has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Database connection pool wrapper
///
/// This enum holds the actual database pool for the connected backend.
#[derive(Clone)]
pub enum DatabasePool {
    /// SQLite pool
    Sqlite(SqlitePool),
    /// PostgreSQL pool
    Postgres(PgPool),
    /// MySQL pool
    MySql(MySqlPool),
}

impl DatabasePool {
    /// Get the database backend for this pool
    pub fn backend(&self) -> DatabaseBackend {
        match self {
            DatabasePool::Sqlite(_) => DatabaseBackend::SQLite,
            DatabasePool::Postgres(_) => DatabaseBackend::PostgreSQL,
            DatabasePool::MySql(_) => DatabaseBackend::MySQL,
        }
    }

    /// Create a new database pool from connection URL
    pub async fn from_url(url: &str) -> Result<Self> {
        let backend = DatabaseBackend::from_url(url)?;

        match backend {
            DatabaseBackend::SQLite => {
                let options = SqliteConnectOptions::from_str(url)
                    .map_err(|e| QueryMindError::db_connection(url.to_string(), e))?
                    .create_if_missing(true);

                // A single connection keeps every statement on the same
                // database; pooled :memory: connections would each get a
                // private one.
                let pool = SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_with(options)
                    .await
                    .map_err(|e| QueryMindError::db_connection(url.to_string(), e))?;
                Ok(DatabasePool::Sqlite(pool))
            }
            DatabaseBackend::PostgreSQL => {
                let pool = PgPool::connect(url)
                    .await
                    .map_err(|e| QueryMindError::db_connection(url.to_string(), e))?;
                Ok(DatabasePool::Postgres(pool))
            }
            DatabaseBackend::MySQL => {
                let pool = MySqlPool::connect(url)
                    .await
                    .map_err(|e| QueryMindError::db_connection(url.to_string(), e))?;
                Ok(DatabasePool::MySql(pool))
            }
        }
    }

    /// Test the connection
    pub async fn test_connection(&self) -> Result<()> {
        match self {
            DatabasePool::Sqlite(pool) => {
                sqlx::query("SELECT 1").fetch_one(pool).await?;
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query("SELECT 1").fetch_one(pool).await?;
            }
            DatabasePool::MySql(pool) => {
                sqlx::query("SELECT 1").fetch_one(pool).await?;
            }
        }
        Ok(())
    }

    /// Execute a statement that returns no rows (DDL/DML)
    ///
    /// # Returns
    /// The number of rows affected
    pub async fn execute(&self, sql: &str) -> Result<u64> {
        let affected = match self {
            DatabasePool::Sqlite(pool) => sqlx::query(sql).execute(pool).await?.rows_affected(),
            DatabasePool::Postgres(pool) => sqlx::query(sql).execute(pool).await?.rows_affected(),
            DatabasePool::MySql(pool) => sqlx::query(sql).execute(pool).await?.rows_affected(),
        };
        Ok(affected)
    }

    /// Run a SELECT-style query and decode every value to display text
    pub async fn fetch(&self, sql: &str) -> Result<QueryRows> {
        match self {
            DatabasePool::Sqlite(pool) => {
                let rows = sqlx::query(sql).fetch_all(pool).await?;
                let mut result = QueryRows::default();
                if let Some(first) = rows.first() {
                    result.columns = first
                        .columns()
                        .iter()
                        .map(|c| c.name().to_string())
                        .collect();
                }
                for row in &rows {
                    let mut values = Vec::with_capacity(row.columns().len());
                    for i in 0..row.columns().len() {
                        values.push(decode_sqlite_value(row, i));
                    }
                    result.rows.push(values);
                }
                Ok(result)
            }
            DatabasePool::Postgres(pool) => {
                let rows = sqlx::query(sql).fetch_all(pool).await?;
                let mut result = QueryRows::default();
                if let Some(first) = rows.first() {
                    result.columns = first
                        .columns()
                        .iter()
                        .map(|c| c.name().to_string())
                        .collect();
                }
                for row in &rows {
                    let mut values = Vec::with_capacity(row.columns().len());
                    for i in 0..row.columns().len() {
                        values.push(decode_postgres_value(row, i));
                    }
                    result.rows.push(values);
                }
                Ok(result)
            }
            DatabasePool::MySql(pool) => {
                let rows = sqlx::query(sql).fetch_all(pool).await?;
                let mut result = QueryRows::default();
                if let Some(first) = rows.first() {
                    result.columns = first
                        .columns()
                        .iter()
                        .map(|c| c.name().to_string())
                        .collect();
                }
                for row in &rows {
                    let mut values = Vec::with_capacity(row.columns().len());
                    for i in 0..row.columns().len() {
                        values.push(decode_mysql_value(row, i));
                    }
                    result.rows.push(values);
                }
                Ok(result)
            }
        }
    }
}

// Value decoding: each backend reports types differently, so try the common
// decodings in order and fall back to a placeholder for exotic types.

fn decode_sqlite_value(row: &sqlx::sqlite::SqliteRow, index: usize) -> String {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value.unwrap_or_else(|| "NULL".to_string());
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| format!("<{} bytes>", v.len()));
    }
    "<unsupported>".to_string()
}

fn decode_postgres_value(row: &sqlx::postgres::PgRow, index: usize) -> String {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value.unwrap_or_else(|| "NULL".to_string());
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<i32>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<i16>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<f32>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
    }
    "<unsupported>".to_string()
}

fn decode_mysql_value(row: &sqlx::mysql::MySqlRow, index: usize) -> String {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value.unwrap_or_else(|| "NULL".to_string());
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<u64>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return value.map_or_else(
            || "NULL".to_string(),
            |v| String::from_utf8(v.clone()).unwrap_or_else(|_| format!("<{} bytes>", v.len())),
        );
    }
    "<unsupported>".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_url() {
        assert_eq!(
            DatabaseBackend::from_url("postgresql://localhost/test").unwrap(),
            DatabaseBackend::PostgreSQL
        );
        assert_eq!(
            DatabaseBackend::from_url("postgres://localhost/test").unwrap(),
            DatabaseBackend::PostgreSQL
        );
        assert_eq!(
            DatabaseBackend::from_url("mysql://localhost/test").unwrap(),
            DatabaseBackend::MySQL
        );
        assert_eq!(
            DatabaseBackend::from_url("sqlite://test.db").unwrap(),
            DatabaseBackend::SQLite
        );
        assert_eq!(
            DatabaseBackend::from_url("test.db").unwrap(),
            DatabaseBackend::SQLite
        );
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!(
            "postgres".parse::<DatabaseBackend>().unwrap(),
            DatabaseBackend::PostgreSQL
        );
        assert_eq!(
            "mysql".parse::<DatabaseBackend>().unwrap(),
            DatabaseBackend::MySQL
        );
        assert_eq!(
            "sqlite".parse::<DatabaseBackend>().unwrap(),
            DatabaseBackend::SQLite
        );
        assert!("oracle".parse::<DatabaseBackend>().is_err());
    }

    #[test]
    fn test_invalid_url() {
        assert!(DatabaseBackend::from_url("invalid://url").is_err());
    }

    #[test]
    fn test_backend_display() {
        assert_eq!(DatabaseBackend::PostgreSQL.to_string(), "PostgreSQL");
        assert_eq!(DatabaseBackend::MySQL.to_string(), "MySQL");
        assert_eq!(DatabaseBackend::SQLite.to_string(), "SQLite");
    }

    #[tokio::test]
    async fn test_sqlite_execute_and_fetch() {
        let pool = DatabasePool::from_url("sqlite::memory:").await.unwrap();
        pool.execute("CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT, email TEXT)")
            .await
            .unwrap();
        let affected = pool
            .execute("INSERT INTO customers (name, email) VALUES ('Ada', 'ada@example.com')")
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let rows = pool.fetch("SELECT name, email FROM customers").await.unwrap();
        assert_eq!(rows.columns, vec!["name", "email"]);
        assert_eq!(rows.rows, vec![vec!["Ada".to_string(), "ada@example.com".to_string()]]);
    }

    #[tokio::test]
    async fn test_sqlite_fetch_empty() {
        let pool = DatabasePool::from_url("sqlite::memory:").await.unwrap();
        pool.execute("CREATE TABLE t (x INTEGER)").await.unwrap();
        let rows = pool.fetch("SELECT * FROM t").await.unwrap();
        assert!(rows.is_empty());
    }
}
