//! Statement builders for `SQLite` with numbered parameters.

mod delete;
mod filter;
mod insert;
mod select;
mod types;
mod update;


pub use delete::{DeleteBuilder, delete};
pub use filter::{Filter, WhereClause};
pub use insert::{InsertBuilder, insert};
pub use select::{SelectBuilder, select};
pub use types::{ContentValues, Statement, Value};
pub use update::{UpdateBuilder, update};
