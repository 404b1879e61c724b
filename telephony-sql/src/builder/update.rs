//! UPDATE statement builder.

use crate::validate::assert_valid_sql_identifier;

use super::filter::{WhereClause, push_where};
use super::types::{ContentValues, Statement, param};

/// Builder for UPDATE statements.
#[derive(Debug)]
pub struct UpdateBuilder<'a> {
    table: String,
    sets: ContentValues,
    clause: WhereClause<'a>,
}

impl<'a> UpdateBuilder<'a> {
    /// Create a new update builder.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a valid SQL identifier.
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        assert_valid_sql_identifier(&table, "table");
        Self {
            table,
            sets: ContentValues::new(),
            clause: WhereClause::new(),
        }
    }

    /// Set the columns to change.
    ///
    /// # Panics
    ///
    /// Panics if any column name is not a valid SQL identifier.
    pub fn set_values(mut self, values: ContentValues) -> Self {
        for (column, _) in values.iter() {
            assert_valid_sql_identifier(column, "column");
        }
        self.sets = values;
        self
    }

    /// Set the `WHERE` conditions.
    pub fn where_clause(mut self, clause: WhereClause<'a>) -> Self {
        self.clause = clause;
        self
    }

    /// Build the UPDATE statement.
    ///
    /// # Panics
    ///
    /// Panics if no column is set; `UPDATE t SET WHERE ...` is not valid SQL.
    pub fn build(self) -> Statement {
        assert!(!self.sets.is_empty(), "UPDATE on {} has no columns", self.table);

        let mut params = Vec::new();
        let mut param_idx = 1usize;

        let set_parts: Vec<String> = self
            .sets
            .iter()
            .map(|(col, val)| {
                let p = param(param_idx);
                params.push(val.clone());
                param_idx += 1;
                format!("{col} = {p}")
            })
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.table, set_parts.join(", "));
        push_where(&mut sql, &mut params, &self.clause, param_idx);

        Statement { sql, params }
    }
}

/// Create an UPDATE builder.
pub fn update<'a>(table: impl Into<String>) -> UpdateBuilder<'a> {
    UpdateBuilder::new(table)
}
