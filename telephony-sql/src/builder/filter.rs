//! `WHERE` clause composition shared by SELECT, UPDATE and DELETE.

use crate::validate::{Selection, assert_valid_sql_identifier};

use super::types::{Value, param};

/// Trusted equality condition added by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column name (validated at construction).
    pub field: String,
    /// Value the column must equal; `Null` renders as `IS NULL`.
    pub value: Value,
}

/// Conditions for a statement: trusted filters first, then at most one
/// caller selection.
///
/// Every condition is parenthesised and joined with `AND`:
///
/// ```text
/// (thread_id = ?1) AND (read=? AND address=?)
/// ```
///
/// The trusted filters use numbered placeholders. The caller selection keeps
/// its own anonymous `?` placeholders, which `SQLite` numbers after the
/// largest index already used, so its arguments bind after the filter values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause<'a> {
    filters: Vec<Filter>,
    selection: Option<Selection<'a>>,
    selection_args: Vec<Value>,
}

impl<'a> WhereClause<'a> {
    /// Empty clause (matches every row).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trusted `field = value` condition.
    ///
    /// # Panics
    ///
    /// Panics if the field name is not a valid SQL identifier.
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        assert_valid_sql_identifier(&field, "filter field");
        self.filters.push(Filter {
            field,
            value: value.into(),
        });
        self
    }

    /// Set the caller selection and its positional arguments.
    ///
    /// `None` leaves the clause unrestricted by the caller; the arguments
    /// are still kept so an argument/placeholder mismatch surfaces from the
    /// database instead of being dropped silently.
    #[must_use]
    pub fn selection(mut self, selection: Option<Selection<'a>>, args: Vec<Value>) -> Self {
        self.selection = selection;
        self.selection_args = args;
        self
    }

    /// Trusted filters.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Caller selection, if any.
    #[must_use]
    pub const fn caller_selection(&self) -> Option<Selection<'a>> {
        self.selection
    }

    /// Caller selection arguments.
    #[must_use]
    pub fn selection_args(&self) -> &[Value] {
        &self.selection_args
    }

    /// Returns `true` when no condition is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.selection.is_none()
    }

    /// Render the conditions (without the `WHERE` keyword).
    ///
    /// Returns the SQL, the parameters in placeholder order, and the next
    /// free placeholder index.
    pub(super) fn build(&self, start_idx: usize) -> (String, Vec<Value>, usize) {
        let mut idx = start_idx;
        let mut params = Vec::new();
        let mut conditions = Vec::new();

        for filter in &self.filters {
            let field = &filter.field;
            match &filter.value {
                Value::Null => conditions.push(format!("({field} IS NULL)")),
                value => {
                    conditions.push(format!("({field} = {})", param(idx)));
                    params.push(value.clone());
                    idx += 1;
                },
            }
        }

        if let Some(selection) = self.selection {
            conditions.push(format!("({})", selection.as_str()));
        }
        params.extend(self.selection_args.iter().cloned());
        idx += self.selection_args.len();

        (conditions.join(" AND "), params, idx)
    }
}

/// Append ` WHERE ...` to `sql` when the clause has conditions.
pub(super) fn push_where(
    sql: &mut String,
    params: &mut Vec<Value>,
    clause: &WhereClause<'_>,
    start_idx: usize,
) -> usize {
    let (condition, new_params, next_idx) = clause.build(start_idx);
    if !condition.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&condition);
    }
    params.extend(new_params);
    next_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_clause_renders_nothing() {
        let (sql, params, idx) = WhereClause::new().build(1);
        assert!(sql.is_empty());
        assert!(params.is_empty());
        assert_eq!(idx, 1);
    }

    #[test]
    fn test_filters_then_selection() {
        let selection = Selection::parse("read=? AND address=?").unwrap();
        let clause = WhereClause::new()
            .filter("thread_id", 7)
            .selection(selection, vec![Value::from("1"), Value::from("12345")]);
        let (sql, params, idx) = clause.build(1);
        assert_eq!(sql, "(thread_id = ?1) AND (read=? AND address=?)");
        assert_eq!(
            params,
            vec![
                Value::Integer(7),
                Value::Text("1".into()),
                Value::Text("12345".into())
            ]
        );
        assert_eq!(idx, 4);
    }

    #[test]
    fn test_null_filter_uses_is_null() {
        let (sql, params, _) = WhereClause::new().filter("body", Value::Null).build(1);
        assert_eq!(sql, "(body IS NULL)");
        assert!(params.is_empty());
    }

    #[test]
    fn test_numbering_continues_from_start_index() {
        let (sql, _, idx) = WhereClause::new().filter("_id", 3).build(4);
        assert_eq!(sql, "(_id = ?4)");
        assert_eq!(idx, 5);
    }
}
