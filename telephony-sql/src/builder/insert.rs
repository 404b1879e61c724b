//! INSERT statement builder.

use crate::validate::assert_valid_sql_identifier;

use super::types::{ContentValues, Statement, param};

/// Builder for single-row INSERT statements.
#[derive(Debug)]
pub struct InsertBuilder {
    table: String,
    values: ContentValues,
}

impl InsertBuilder {
    /// Create a new insert builder.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a valid SQL identifier.
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        assert_valid_sql_identifier(&table, "table");
        Self {
            table,
            values: ContentValues::new(),
        }
    }

    /// Set the row to insert.
    ///
    /// # Panics
    ///
    /// Panics if any column name is not a valid SQL identifier. Callers
    /// holding untrusted values run [`ContentValues::validate_columns`] first.
    pub fn values(mut self, values: ContentValues) -> Self {
        for (column, _) in values.iter() {
            assert_valid_sql_identifier(column, "column");
        }
        self.values = values;
        self
    }

    /// Build the INSERT statement.
    ///
    /// An empty row inserts column defaults.
    pub fn build(self) -> Statement {
        if self.values.is_empty() {
            return Statement {
                sql: format!("INSERT INTO {} DEFAULT VALUES", self.table),
                params: Vec::new(),
            };
        }

        let mut columns = Vec::with_capacity(self.values.len());
        let mut placeholders = Vec::with_capacity(self.values.len());
        let mut params = Vec::with_capacity(self.values.len());

        for (idx, (column, value)) in self.values.iter().enumerate() {
            columns.push(column);
            placeholders.push(param(idx + 1));
            params.push(value.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        );

        Statement { sql, params }
    }
}

/// Create an INSERT builder.
pub fn insert(table: impl Into<String>) -> InsertBuilder {
    InsertBuilder::new(table)
}
