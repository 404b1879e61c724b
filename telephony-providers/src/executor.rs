//! Storage capability used by every provider.

use std::fmt;

use telephony_sql::{ContentValues, Projection, SortOrder, Statement, WhereClause, select};

use crate::error::ProviderError;
use crate::rows::Rows;

/// A read request: everything needed to render one `SELECT`.
///
/// Every caller-supplied part is already validated by the time a request
/// exists, so executors can render it without further checks.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest<'a> {
    /// Table or view name (trusted).
    pub table: &'a str,
    /// Columns to return; empty selects all.
    pub projection: Projection,
    /// Trusted filters plus the admitted caller selection.
    pub where_clause: WhereClause<'a>,
    /// Row order; empty leaves it to the engine.
    pub sort_order: SortOrder,
    /// Maximum number of rows.
    pub limit: Option<u32>,
}

impl<'a> QueryRequest<'a> {
    /// Request every row of `table`.
    #[must_use]
    pub fn new(table: &'a str) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// Render the `SELECT` statement for this request.
    #[must_use]
    pub fn to_statement(&self) -> Statement {
        let builder = select(self.table)
            .projection(self.projection.clone())
            .where_clause(self.where_clause.clone())
            .order_by(self.sort_order.clone());
        match self.limit {
            Some(limit) => builder.limit(limit).build(),
            None => builder.build(),
        }
    }
}

/// CRUD over named tables.
///
/// Implemented by [`SqliteExecutor`](crate::SqliteExecutor); tests substitute
/// a recording double. Providers only ever call an executor after the caller
/// selection was admitted.
pub trait QueryExecutor: Send + Sync + fmt::Debug {
    /// Run a read request.
    fn query(&self, request: &QueryRequest<'_>) -> Result<Rows, ProviderError>;

    /// Insert one row and return its row id.
    fn insert(&self, table: &str, values: &ContentValues) -> Result<i64, ProviderError>;

    /// Update matching rows and return how many changed.
    fn update(
        &self,
        table: &str,
        values: &ContentValues,
        clause: &WhereClause<'_>,
    ) -> Result<usize, ProviderError>;

    /// Delete matching rows and return how many were removed.
    fn delete(&self, table: &str, clause: &WhereClause<'_>) -> Result<usize, ProviderError>;

    /// Delete matching rows and, when any were removed, run each `prune`
    /// delete in the same transaction.
    ///
    /// Returns how many rows were removed from `table`. On error nothing is
    /// deleted.
    fn delete_and_prune(
        &self,
        table: &str,
        clause: &WhereClause<'_>,
        prune: &[(&str, WhereClause<'_>)],
    ) -> Result<usize, ProviderError>;
}

#[cfg(test)]
mod tests {
    use telephony_sql::{Selection, Value};

    use super::*;

    #[test]
    fn test_request_renders_select() {
        let request = QueryRequest {
            projection: Projection::columns(&["_id"]),
            where_clause: WhereClause::new()
                .filter("thread_id", 2)
                .selection(Selection::parse("read=1").unwrap(), vec![]),
            sort_order: SortOrder::parse("date DESC").unwrap(),
            limit: Some(10),
            ..QueryRequest::new("sms")
        };
        let stmt = request.to_statement();
        assert_eq!(
            stmt.sql,
            "SELECT _id FROM sms WHERE (thread_id = ?1) AND (read=1) ORDER BY date DESC LIMIT 10"
        );
        assert_eq!(stmt.params, vec![Value::Integer(2)]);
    }

    #[test]
    fn test_default_request_selects_everything() {
        assert_eq!(QueryRequest::new("threads").to_statement().sql, "SELECT * FROM threads");
    }
}
