//! SELECT statement builder.

use crate::validate::{Projection, SortOrder, assert_valid_sql_identifier};

use super::filter::{WhereClause, push_where};
use super::types::Statement;

/// Builder for SELECT statements.
#[derive(Debug)]
pub struct SelectBuilder<'a> {
    table: String,
    projection: Projection,
    clause: WhereClause<'a>,
    sort: SortOrder,
    limit: Option<u32>,
}

impl<'a> SelectBuilder<'a> {
    /// Create a new select builder for the given table or view.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a valid SQL identifier.
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        assert_valid_sql_identifier(&table, "table");
        Self {
            table,
            projection: Projection::default(),
            clause: WhereClause::new(),
            sort: SortOrder::default(),
            limit: None,
        }
    }

    /// Set the projection. An empty projection selects `*`.
    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Set the `WHERE` conditions.
    pub fn where_clause(mut self, clause: WhereClause<'a>) -> Self {
        self.clause = clause;
        self
    }

    /// Set the `ORDER BY` list.
    pub fn order_by(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Set a row limit.
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Build the SELECT statement.
    pub fn build(self) -> Statement {
        let mut sql = format!("SELECT {} FROM {}", self.projection.to_sql(), self.table);
        let mut params = Vec::new();

        push_where(&mut sql, &mut params, &self.clause, 1);

        if !self.sort.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.sort.to_sql());
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        Statement { sql, params }
    }
}

/// Create a SELECT builder.
pub fn select<'a>(table: impl Into<String>) -> SelectBuilder<'a> {
    SelectBuilder::new(table)
}
