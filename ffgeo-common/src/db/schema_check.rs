//! Declarative Schema Checking
//!
//! Table layouts are declared once in code (see `table_schemas`) and used two ways:
//! - **Input tables** are introspected with `PRAGMA table_info` and compared
//!   against the declaration. Any drift is fatal: the upstream store is
//!   read-only, so nothing is repaired in place.
//! - **Output tables** are created from the declaration, so the DDL and the
//!   writers cannot disagree on column names.
//!
//! # Usage
//!
//! ```rust,ignore
//! pub struct FirstFilingTableSchema;
//!
//! impl TableSchema for FirstFilingTableSchema {
//!     fn table_name() -> &'static str { "first_filing" }
//!
//!     fn expected_columns() -> Vec<ColumnDefinition> {
//!         vec![
//!             ColumnDefinition::new("appln_id", "INTEGER").primary_key(),
//!             ColumnDefinition::new("type", "TEXT").not_null(),
//!         ]
//!     }
//! }
//!
//! let drift = SchemaCheck::check_table::<FirstFilingTableSchema>(&pool).await?;
//! ```

use crate::Result;
use sqlx::{Row, SqlitePool};
use std::fmt;
use tracing::{debug, info};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER", "REAL")
    pub sql_type: String,
    /// NOT NULL constraint
    pub not_null: bool,
    /// Part of the PRIMARY KEY (several columns form a composite key)
    pub primary_key: bool,
}

impl ColumnDefinition {
    /// Create new column definition
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
        }
    }

    /// Mark column as (part of) the PRIMARY KEY
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    /// Mark column as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }
}

/// Actual column from database introspection (PRAGMA table_info result)
#[derive(Debug, Clone)]
pub struct ActualColumn {
    /// Column ID (position in table)
    pub cid: i32,
    /// Column name
    pub name: String,
    /// SQL type from PRAGMA table_info
    pub type_name: String,
}

/// Difference between declared and actual schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDrift {
    MissingTable {
        table: String,
    },
    MissingColumn {
        table: String,
        column: String,
    },
    /// Declared type and actual type have different SQLite affinities
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },
}

impl fmt::Display for SchemaDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaDrift::MissingTable { table } => write!(f, "table '{}' is missing", table),
            SchemaDrift::MissingColumn { table, column } => {
                write!(f, "column {}.{} is missing", table, column)
            }
            SchemaDrift::TypeMismatch { table, column, expected, actual } => write!(
                f,
                "column {}.{} has type '{}', expected '{}'",
                table, column, actual, expected
            ),
        }
    }
}

/// Defines expected schema for a database table
pub trait TableSchema {
    /// Table name in database
    fn table_name() -> &'static str;

    /// Expected column definitions (order matters for table creation)
    fn expected_columns() -> Vec<ColumnDefinition>;

    /// `CREATE TABLE` statement built from the declaration
    fn create_sql() -> String {
        let columns = Self::expected_columns();
        let mut parts: Vec<String> = columns
            .iter()
            .map(|c| {
                let mut part = format!("{} {}", c.name, c.sql_type);
                if c.not_null {
                    part.push_str(" NOT NULL");
                }
                part
            })
            .collect();

        let key: Vec<&str> = columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect();
        if !key.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", key.join(", ")));
        }

        format!("CREATE TABLE {} (\n    {}\n)", Self::table_name(), parts.join(",\n    "))
    }
}

/// Schema introspection - read actual database schema
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Read actual columns from database table using PRAGMA table_info
    ///
    /// Returns columns in database order (by cid)
    pub async fn introspect_table(pool: &SqlitePool, table_name: &str) -> Result<Vec<ActualColumn>> {
        let query = format!("PRAGMA table_info({})", table_name);
        let rows = sqlx::query(&query).fetch_all(pool).await?;

        let mut columns: Vec<ActualColumn> = rows
            .iter()
            .map(|row| ActualColumn {
                cid: row.get("cid"),
                name: row.get("name"),
                type_name: row.get("type"),
            })
            .collect();

        columns.sort_by_key(|c| c.cid);

        Ok(columns)
    }

    /// Check if table exists
    pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM sqlite_master
                WHERE type='table' AND name = ?
            )
            "#,
        )
        .bind(table_name)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}

/// Schema comparison - detect drift between expected and actual
pub struct SchemaDiff;

impl SchemaDiff {
    /// Compare expected schema to actual database schema
    pub fn compare(
        table_name: &str,
        expected: &[ColumnDefinition],
        actual: &[ActualColumn],
    ) -> Vec<SchemaDrift> {
        let mut drift = Vec::new();

        for expected_col in expected {
            match actual.iter().find(|c| c.name.eq_ignore_ascii_case(&expected_col.name)) {
                Some(actual_col) => {
                    if !Self::types_compatible(&expected_col.sql_type, &actual_col.type_name) {
                        drift.push(SchemaDrift::TypeMismatch {
                            table: table_name.to_string(),
                            column: expected_col.name.clone(),
                            expected: expected_col.sql_type.clone(),
                            actual: actual_col.type_name.clone(),
                        });
                    }
                }
                None => drift.push(SchemaDrift::MissingColumn {
                    table: table_name.to_string(),
                    column: expected_col.name.clone(),
                }),
            }
        }

        drift
    }

    /// Check if SQL types are compatible (SQLite type affinity rules)
    ///
    /// An untyped column accepts anything. Date-like declarations count as
    /// text, since dates are stored as ISO strings.
    pub(crate) fn types_compatible(expected: &str, actual: &str) -> bool {
        let exp = expected.to_uppercase();
        let act = actual.to_uppercase();

        if exp == act || act.is_empty() {
            return true;
        }

        let is_int = |t: &str| t.contains("INT");
        let is_text = |t: &str| {
            t.contains("TEXT") || t.contains("CHAR") || t.contains("CLOB") || t.contains("DATE")
        };
        let is_real = |t: &str| {
            t.contains("REAL") || t.contains("FLOA") || t.contains("DOUB") || t.contains("NUMERIC")
        };

        (is_int(&exp) && is_int(&act))
            || (is_text(&exp) && is_text(&act))
            || (is_real(&exp) && is_real(&act))
    }
}

/// Verify tables against their declarations
pub struct SchemaCheck;

impl SchemaCheck {
    /// Return every drift item for one table (empty = table matches)
    pub async fn check_table<T: TableSchema>(pool: &SqlitePool) -> Result<Vec<SchemaDrift>> {
        let table_name = T::table_name();

        if !SchemaIntrospector::table_exists(pool, table_name).await? {
            return Ok(vec![SchemaDrift::MissingTable {
                table: table_name.to_string(),
            }]);
        }

        let actual = SchemaIntrospector::introspect_table(pool, table_name).await?;
        let drift = SchemaDiff::compare(table_name, &T::expected_columns(), &actual);

        if drift.is_empty() {
            debug!("  ✓ Schema matches for '{}'", table_name);
        } else {
            info!("  ⚠ {} schema problem(s) in '{}'", drift.len(), table_name);
        }

        Ok(drift)
    }
}
