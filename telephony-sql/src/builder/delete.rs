//! DELETE statement builder.

use crate::validate::assert_valid_sql_identifier;

use super::filter::{WhereClause, push_where};
use super::types::Statement;

/// Builder for DELETE statements.
#[derive(Debug)]
pub struct DeleteBuilder<'a> {
    table: String,
    clause: WhereClause<'a>,
}

impl<'a> DeleteBuilder<'a> {
    /// Create a new delete builder.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a valid SQL identifier.
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        assert_valid_sql_identifier(&table, "table");
        Self {
            table,
            clause: WhereClause::new(),
        }
    }

    /// Set the `WHERE` conditions. Without any, every row is deleted.
    pub fn where_clause(mut self, clause: WhereClause<'a>) -> Self {
        self.clause = clause;
        self
    }

    /// Build the DELETE statement.
    pub fn build(self) -> Statement {
        let mut sql = format!("DELETE FROM {}", self.table);
        let mut params = Vec::new();
        push_where(&mut sql, &mut params, &self.clause, 1);
        Statement { sql, params }
    }
}

/// Create a DELETE builder.
pub fn delete<'a>(table: impl Into<String>) -> DeleteBuilder<'a> {
    DeleteBuilder::new(table)
}
