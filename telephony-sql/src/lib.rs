// =============================================================================
// CRATE-LEVEL QUALITY LINTS
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // SQL keywords in docs
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self by design
#![allow(clippy::format_push_string)] // String building style preference

//! # telephony-sql - Guarded SQL for telephony data providers
//!
//! Callers of the telephony providers pass raw SQL fragments: a selection
//! (`WHERE` clause) with `?` arguments, a projection and a sort order. This
//! crate validates those fragments and renders `SQLite` statements from the
//! validated forms.
//!
//! ## Selection check
//!
//! The selection is wrapped in parentheses and appended after any
//! conditions the provider adds itself. A clause whose parentheses do not
//! balance is rejected, most importantly one that closes a parenthesis it
//! never opened:
//!
//! ```
//! use telephony_sql::{ValidationResult, validate_selection};
//!
//! assert!(validate_selection("(read=1)").is_accepted());
//! assert!(validate_selection("read=1").is_accepted());
//! assert!(validate_selection("").is_accepted());
//! assert!(!validate_selection("1=1) OR (1=1").is_accepted());
//! assert!(matches!(validate_selection(") OR (1=1"), ValidationResult::Rejected(_)));
//! ```
//!
//! The check is structural. Parentheses are counted wherever they appear,
//! including inside string literals and comments, and nothing else about
//! the clause is inspected. Balanced text inside a comment still passes.
//!
//! ## Building statements
//!
//! ```
//! use telephony_sql::{Projection, Selection, Value, WhereClause, select};
//!
//! let selection = Selection::parse("read=?").unwrap();
//! let stmt = select("sms")
//!     .projection(Projection::parse(&["_id", "body"]).unwrap())
//!     .where_clause(
//!         WhereClause::new()
//!             .filter("thread_id", 3)
//!             .selection(selection, vec![Value::from("1")]),
//!     )
//!     .build();
//!
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT _id, body FROM sms WHERE (thread_id = ?1) AND (read=?)"
//! );
//! assert_eq!(stmt.params.len(), 2);
//! ```

mod builder;
mod validate;

pub use builder::{
    ContentValues, DeleteBuilder, Filter, InsertBuilder, SelectBuilder, Statement, UpdateBuilder,
    Value, WhereClause, delete, insert, select, update,
};
pub use validate::{
    InvalidIdentifier, MalformedSelection, Projection, ProjectionError, ProjectionItem, Selection,
    SortDir, SortField, SortOrder, SortOrderError, ValidationResult, assert_valid_sql_identifier,
    check_identifier, check_selection, is_balanced_selection, is_valid_sql_identifier,
    validate_selection,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        ContentValues, MalformedSelection, Projection, Selection, SortOrder, Statement,
        ValidationResult, Value, WhereClause, check_selection, delete, insert, select, update,
        validate_selection,
    };
}

// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
