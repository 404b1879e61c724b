//! Validation for the caller-supplied parts of a statement.
//!
//! Providers accept four kinds of raw text from callers:
//! - selection clauses (`WHERE` fragments), checked for balanced parentheses
//! - projection entries, restricted to columns, `*` and `count(*)`
//! - sort orders, restricted to `column [ASC|DESC]` lists
//! - column names in inserted or updated values
//!
//! Each check produces a typed value ([`Selection`], [`Projection`],
//! [`SortOrder`]) that the builders accept, so unchecked text never reaches
//! a statement.

mod column;
mod projection;
mod selection;
mod sort;

pub use column::{
    InvalidIdentifier, assert_valid_sql_identifier, check_identifier, is_valid_sql_identifier,
};
pub use projection::{Projection, ProjectionError, ProjectionItem};
pub use selection::{
    MalformedSelection, Selection, ValidationResult, check_selection, is_balanced_selection,
    validate_selection,
};
pub use sort::{SortDir, SortField, SortOrder, SortOrderError};
