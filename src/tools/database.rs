//! Database operations
//!
//! The concrete operation set the agent can invoke: flat, single-purpose
//! request/response handlers over a shared connection pool. Each handler
//! checks a connection out of the pool per call and reports its result in
//! the uniform ToolOutcome envelope; SQL failures become failed outcomes,
//! never panics.

use crate::database::{DatabaseBackend, DatabasePool, QueryRows};
use crate::error::{Result, QueryMindError};
use crate::tools::{Tool, ToolOutcome, ToolRegistry};
use async_trait::async_trait;
use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::Table;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Build the full database operation registry over one shared pool
pub fn register_database_tools(pool: DatabasePool) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(CreateTableTool { pool: pool.clone() }));
    registry.register(Arc::new(InsertDataTool { pool: pool.clone() }));
    registry.register(Arc::new(UpdateDataTool { pool: pool.clone() }));
    registry.register(Arc::new(DeleteDataTool { pool: pool.clone() }));
    registry.register(Arc::new(GetDataTool { pool: pool.clone() }));
    registry.register(Arc::new(ListTablesTool { pool: pool.clone() }));
    registry.register(Arc::new(DescribeTableTool { pool }));
    registry
}

/// Extract a required string argument from the action input
fn require_str<'a>(args: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| QueryMindError::Operation(format!("missing required argument '{}'", key)))
}

/// Validate a SQL identifier (table names interpolated into DDL)
fn validate_identifier(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.chars().next().map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(QueryMindError::Operation(format!(
            "invalid table name '{}': use letters, digits and underscores",
            name
        )))
    }
}

/// Check that a query starts with the expected SQL verb
fn leading_keyword_is(query: &str, expected: &str) -> bool {
    query
        .trim_start()
        .split_whitespace()
        .next()
        .map_or(false, |word| word.eq_ignore_ascii_case(expected))
}

/// Render a result set as a text table for the observation
fn render_rows(rows: &QueryRows) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN);
    table.set_header(rows.columns.clone());
    for row in &rows.rows {
        table.add_row(row.clone());
    }
    table.to_string()
}

/// Creates a new table with the standard customer shape
pub struct CreateTableTool {
    pool: DatabasePool,
}

#[async_trait]
impl Tool for CreateTableTool {
    fn name(&self) -> &str {
        "create_table"
    }

    fn description(&self) -> &str {
        "creates a new table in the database with columns id (auto-generated), name and email"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "table_name": {
                    "type": "string",
                    "description": "Name of the table to create"
                }
            },
            "required": ["table_name"]
        })
    }

    async fn call(&self, args: &Map<String, Value>) -> Result<ToolOutcome> {
        let table_name = require_str(args, "table_name")?;
        validate_identifier(table_name)?;

        // IF NOT EXISTS prevents an error when the table already exists
        let id_column = match self.pool.backend() {
            DatabaseBackend::PostgreSQL => "id SERIAL PRIMARY KEY",
            DatabaseBackend::MySQL => "id INT AUTO_INCREMENT PRIMARY KEY",
            DatabaseBackend::SQLite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
        };
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({}, name VARCHAR(100) NOT NULL, email VARCHAR(100) NOT NULL)",
            table_name, id_column
        );

        match self.pool.execute(&sql).await {
            Ok(_) => Ok(ToolOutcome::ok(
                json!({ "table": table_name }),
                format!("Table '{}' created successfully", table_name),
            )),
            Err(e) => Ok(ToolOutcome::fail(format!(
                "Error creating table '{}': {}",
                table_name, e
            ))),
        }
    }
}

/// Adds new rows using a SQL INSERT statement
pub struct InsertDataTool {
    pool: DatabasePool,
}

#[async_trait]
impl Tool for InsertDataTool {
    fn name(&self) -> &str {
        "insert_data"
    }

    fn description(&self) -> &str {
        "adds new rows to the database using a SQL INSERT statement, e.g. \
         INSERT INTO customers (name, email) VALUES ('John Doe', 'john@example.com')"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A complete SQL INSERT statement"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: &Map<String, Value>) -> Result<ToolOutcome> {
        let query = require_str(args, "query")?;
        if !leading_keyword_is(query, "INSERT") {
            return Ok(ToolOutcome::fail(
                "insert_data only accepts INSERT statements",
            ));
        }

        match self.pool.execute(query).await {
            Ok(affected) => Ok(ToolOutcome::ok(
                json!({ "rows_affected": affected }),
                format!("{} row(s) inserted", affected),
            )),
            Err(e) => Ok(ToolOutcome::fail(format!("Error inserting data: {}", e))),
        }
    }
}

/// Modifies rows using a SQL UPDATE statement
pub struct UpdateDataTool {
    pool: DatabasePool,
}

#[async_trait]
impl Tool for UpdateDataTool {
    fn name(&self) -> &str {
        "update_data"
    }

    fn description(&self) -> &str {
        "modifies existing rows using a SQL UPDATE statement, e.g. \
         UPDATE customers SET email = 'new@example.com' WHERE name = 'John Doe'"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A complete SQL UPDATE statement"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: &Map<String, Value>) -> Result<ToolOutcome> {
        let query = require_str(args, "query")?;
        if !leading_keyword_is(query, "UPDATE") {
            return Ok(ToolOutcome::fail(
                "update_data only accepts UPDATE statements",
            ));
        }

        match self.pool.execute(query).await {
            Ok(affected) => Ok(ToolOutcome::ok(
                json!({ "rows_affected": affected }),
                format!("{} row(s) updated", affected),
            )),
            Err(e) => Ok(ToolOutcome::fail(format!("Error updating data: {}", e))),
        }
    }
}

/// Removes rows using a SQL DELETE statement
pub struct DeleteDataTool {
    pool: DatabasePool,
}

#[async_trait]
impl Tool for DeleteDataTool {
    fn name(&self) -> &str {
        "delete_data"
    }

    fn description(&self) -> &str {
        "removes rows from the database using a SQL DELETE statement, e.g. \
         DELETE FROM customers WHERE name = 'John Doe'"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A complete SQL DELETE statement"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: &Map<String, Value>) -> Result<ToolOutcome> {
        let query = require_str(args, "query")?;
        if !leading_keyword_is(query, "DELETE") {
            return Ok(ToolOutcome::fail(
                "delete_data only accepts DELETE statements",
            ));
        }

        match self.pool.execute(query).await {
            Ok(affected) => Ok(ToolOutcome::ok(
                json!({ "rows_affected": affected }),
                format!("{} row(s) deleted", affected),
            )),
            Err(e) => Ok(ToolOutcome::fail(format!("Error deleting data: {}", e))),
        }
    }
}

/// Retrieves data using a SQL SELECT query
pub struct GetDataTool {
    pool: DatabasePool,
}

#[async_trait]
impl Tool for GetDataTool {
    fn name(&self) -> &str {
        "get_data"
    }

    fn description(&self) -> &str {
        "retrieves data from the database using a SQL SELECT query, e.g. \
         SELECT name, email FROM customers WHERE name = 'John Doe'"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A complete SQL SELECT query"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: &Map<String, Value>) -> Result<ToolOutcome> {
        let query = require_str(args, "query")?;
        if !leading_keyword_is(query, "SELECT") {
            return Ok(ToolOutcome::fail("get_data only accepts SELECT queries"));
        }

        match self.pool.fetch(query).await {
            Ok(rows) => {
                let rendered = render_rows(&rows);
                Ok(ToolOutcome::ok(
                    json!({
                        "columns": rows.columns,
                        "rows": rows.rows,
                        "row_count": rows.len(),
                    }),
                    format!("Retrieved {} record(s)\n{}", rows.len(), rendered),
                ))
            }
            Err(e) => Ok(ToolOutcome::fail(format!("Error retrieving data: {}", e))),
        }
    }
}

/// Lists the user tables in the connected database
pub struct ListTablesTool {
    pool: DatabasePool,
}

#[async_trait]
impl Tool for ListTablesTool {
    fn name(&self) -> &str {
        "list_tables"
    }

    fn description(&self) -> &str {
        "lists all user tables in the connected database"
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, _args: &Map<String, Value>) -> Result<ToolOutcome> {
        let sql = match self.pool.backend() {
            DatabaseBackend::PostgreSQL => {
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = 'public' ORDER BY table_name"
            }
            DatabaseBackend::MySQL => {
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = DATABASE() ORDER BY table_name"
            }
            DatabaseBackend::SQLite => {
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
            }
        };

        match self.pool.fetch(sql).await {
            Ok(rows) => {
                let tables: Vec<String> =
                    rows.rows.iter().filter_map(|r| r.first().cloned()).collect();
                Ok(ToolOutcome::ok(
                    json!({ "tables": tables }),
                    format!("Found {} table(s): {}", tables.len(), tables.join(", ")),
                ))
            }
            Err(e) => Ok(ToolOutcome::fail(format!("Error listing tables: {}", e))),
        }
    }
}

/// Describes the columns of one table
pub struct DescribeTableTool {
    pool: DatabasePool,
}

#[async_trait]
impl Tool for DescribeTableTool {
    fn name(&self) -> &str {
        "describe_table"
    }

    fn description(&self) -> &str {
        "shows the column names, types and nullability of a table"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "table_name": {
                    "type": "string",
                    "description": "Name of the table to describe"
                }
            },
            "required": ["table_name"]
        })
    }

    async fn call(&self, args: &Map<String, Value>) -> Result<ToolOutcome> {
        let table_name = require_str(args, "table_name")?;
        validate_identifier(table_name)?;

        let sql = match self.pool.backend() {
            DatabaseBackend::PostgreSQL => format!(
                "SELECT column_name, data_type, is_nullable FROM information_schema.columns \
                 WHERE table_schema = 'public' AND table_name = '{}' ORDER BY ordinal_position",
                table_name
            ),
            DatabaseBackend::MySQL => format!(
                "SELECT column_name, data_type, is_nullable FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = '{}' ORDER BY ordinal_position",
                table_name
            ),
            DatabaseBackend::SQLite => format!("PRAGMA table_info({})", table_name),
        };

        match self.pool.fetch(&sql).await {
            Ok(rows) if rows.is_empty() => Ok(ToolOutcome::fail(format!(
                "Table '{}' has no columns or does not exist",
                table_name
            ))),
            Ok(rows) => Ok(ToolOutcome::ok(
                json!({
                    "table": table_name,
                    "columns": rows.rows,
                }),
                format!("Schema of '{}':\n{}", table_name, render_rows(&rows)),
            )),
            Err(e) => Ok(ToolOutcome::fail(format!(
                "Error describing table '{}': {}",
                table_name, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn sqlite_registry() -> ToolRegistry {
        let pool = DatabasePool::from_url("sqlite::memory:").await.unwrap();
        register_database_tools(pool)
    }

    fn args(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[test]
    fn test_identifier_validation() {
        assert!(validate_identifier("customers").is_ok());
        assert!(validate_identifier("_staging_2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1abc").is_err());
        assert!(validate_identifier("users; DROP TABLE users").is_err());
    }

    #[test]
    fn test_leading_keyword() {
        assert!(leading_keyword_is("  insert into t values (1)", "INSERT"));
        assert!(leading_keyword_is("SELECT * FROM t", "SELECT"));
        assert!(!leading_keyword_is("DELETE FROM t", "INSERT"));
    }

    #[tokio::test]
    async fn test_registry_has_all_operations() {
        let registry = sqlite_registry().await;
        assert_eq!(
            registry.names(),
            vec![
                "create_table",
                "delete_data",
                "describe_table",
                "get_data",
                "insert_data",
                "list_tables",
                "update_data",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_insert_select_roundtrip() {
        let registry = sqlite_registry().await;

        let outcome = registry
            .get("create_table")
            .unwrap()
            .call(&args(&[("table_name", "customers")]))
            .await
            .unwrap();
        assert!(outcome.success, "{}", outcome.message);

        let outcome = registry
            .get("insert_data")
            .unwrap()
            .call(&args(&[(
                "query",
                "INSERT INTO customers (name, email) VALUES ('Ada', 'ada@example.com')",
            )]))
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.payload["rows_affected"], 1);

        let outcome = registry
            .get("get_data")
            .unwrap()
            .call(&args(&[("query", "SELECT name FROM customers")]))
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.payload["row_count"], 1);
        assert!(outcome.message.contains("Ada"));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let registry = sqlite_registry().await;
        registry
            .get("create_table")
            .unwrap()
            .call(&args(&[("table_name", "customers")]))
            .await
            .unwrap();
        registry
            .get("insert_data")
            .unwrap()
            .call(&args(&[(
                "query",
                "INSERT INTO customers (name, email) VALUES ('Ada', 'old@example.com')",
            )]))
            .await
            .unwrap();

        let outcome = registry
            .get("update_data")
            .unwrap()
            .call(&args(&[(
                "query",
                "UPDATE customers SET email = 'new@example.com' WHERE name = 'Ada'",
            )]))
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.payload["rows_affected"], 1);

        let outcome = registry
            .get("delete_data")
            .unwrap()
            .call(&args(&[("query", "DELETE FROM customers WHERE name = 'Ada'")]))
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.payload["rows_affected"], 1);
    }

    #[tokio::test]
    async fn test_statement_kind_guards() {
        let registry = sqlite_registry().await;

        let outcome = registry
            .get("insert_data")
            .unwrap()
            .call(&args(&[("query", "DELETE FROM customers")]))
            .await
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.message.contains("INSERT"));

        let outcome = registry
            .get("get_data")
            .unwrap()
            .call(&args(&[("query", "DROP TABLE customers")]))
            .await
            .unwrap();
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn test_sql_failure_is_a_failed_outcome_not_an_error() {
        let registry = sqlite_registry().await;
        let outcome = registry
            .get("get_data")
            .unwrap()
            .call(&args(&[("query", "SELECT * FROM missing_table")]))
            .await
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.message.contains("Error retrieving data"));
    }

    #[tokio::test]
    async fn test_missing_argument_is_an_operation_error() {
        let registry = sqlite_registry().await;
        let result = registry
            .get("create_table")
            .unwrap()
            .call(&Map::new())
            .await;
        assert!(matches!(result, Err(QueryMindError::Operation(_))));
    }

    #[tokio::test]
    async fn test_list_and_describe() {
        let registry = sqlite_registry().await;
        registry
            .get("create_table")
            .unwrap()
            .call(&args(&[("table_name", "customers")]))
            .await
            .unwrap();

        let outcome = registry
            .get("list_tables")
            .unwrap()
            .call(&Map::new())
            .await
            .unwrap();
        assert!(outcome.success);
        assert!(outcome.message.contains("customers"));

        let outcome = registry
            .get("describe_table")
            .unwrap()
            .call(&args(&[("table_name", "customers")]))
            .await
            .unwrap();
        assert!(outcome.success, "{}", outcome.message);
        assert!(outcome.message.contains("email"));
    }
}
