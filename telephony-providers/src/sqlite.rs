//! `SQLite` implementation of [`QueryExecutor`].
//!
//! One connection per database, guarded by a mutex. The schema version is
//! kept in `PRAGMA user_version`; opening a database creates the schema when
//! the version is 0 and otherwise walks the [`Upgrade`] steps up to the
//! current version inside a single transaction.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags, Transaction, params_from_iter};
use telephony_sql::{ContentValues, Statement, Value, WhereClause, delete, insert, update};
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::error::ProviderError;
use crate::executor::{QueryExecutor, QueryRequest};
use crate::rows::Rows;

// ============================================================================
// Schema
// ============================================================================

/// Versioned schema of one database.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Name used in logs and errors.
    pub name: &'static str,
    /// Version written to `user_version` once the schema is current.
    pub version: i64,
    /// Statements creating the current schema from scratch.
    pub create: &'static [&'static str],
    /// Steps from older versions, each moving `from` to `from + 1`.
    pub upgrades: &'static [Upgrade],
}

/// One upgrade step.
#[derive(Debug, Clone, Copy)]
pub struct Upgrade {
    /// Version this step upgrades from.
    pub from: i64,
    /// Statements run in order.
    pub steps: &'static [&'static str],
}

impl Schema {
    fn upgrade_from(&self, version: i64) -> Option<&Upgrade> {
        self.upgrades.iter().find(|u| u.from == version)
    }
}

// ============================================================================
// Executor
// ============================================================================

/// [`QueryExecutor`] over a single `SQLite` connection.
#[derive(Debug)]
pub struct SqliteExecutor {
    name: &'static str,
    connection: Mutex<Connection>,
}

impl SqliteExecutor {
    /// Open (or create) the database described by `config` and bring it to
    /// the current `schema` version.
    pub fn open(config: &DatabaseConfig, schema: &Schema) -> Result<Self, ProviderError> {
        let connection = match &config.path {
            Some(path) => {
                ensure_parent_dir(path)?;
                let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
                let connection = Connection::open_with_flags(path, flags)?;
                connection.execute_batch("PRAGMA journal_mode = WAL;")?;
                connection
            },
            None => Connection::open_in_memory()?,
        };
        connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        Self::from_connection(connection, schema)
    }

    /// Private in-memory database at the current `schema` version.
    pub fn open_in_memory(schema: &Schema) -> Result<Self, ProviderError> {
        Self::open(&DatabaseConfig::in_memory(), schema)
    }

    /// Take over an existing connection, upgrading its schema if needed.
    pub fn from_connection(
        mut connection: Connection,
        schema: &Schema,
    ) -> Result<Self, ProviderError> {
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&mut connection, schema)?;
        Ok(Self {
            name: schema.name,
            connection: Mutex::new(connection),
        })
    }

    /// Schema version stored in the database.
    pub fn schema_version(&self) -> Result<i64, ProviderError> {
        let guard = self.lock()?;
        Ok(read_user_version(&guard)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ProviderError> {
        self.connection
            .lock()
            .map_err(|_| ProviderError::Db(format!("{} connection mutex poisoned", self.name)))
    }

    fn execute(&self, statement: &Statement) -> Result<usize, ProviderError> {
        let guard = self.lock()?;
        Ok(run(&guard, statement)?)
    }
}

impl QueryExecutor for SqliteExecutor {
    fn query(&self, request: &QueryRequest<'_>) -> Result<Rows, ProviderError> {
        let statement = request.to_statement();
        debug!(db = self.name, table = request.table, "query");

        let guard = self.lock()?;
        let mut stmt = guard.prepare_cached(&statement.sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = stmt.query(params_from_iter(statement.params.iter().map(to_sql_value)))?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(width);
            for idx in 0..width {
                record.push(from_sql_value(row.get::<_, SqlValue>(idx)?));
            }
            values.push(record);
        }
        Ok(Rows::new(columns, values))
    }

    fn insert(&self, table: &str, values: &ContentValues) -> Result<i64, ProviderError> {
        values.validate_columns()?;
        let statement = insert(table).values(values.clone()).build();
        debug!(db = self.name, table, columns = values.len(), "insert");

        let guard = self.lock()?;
        let mut stmt = guard.prepare_cached(&statement.sql)?;
        stmt.execute(params_from_iter(statement.params.iter().map(to_sql_value)))?;
        Ok(guard.last_insert_rowid())
    }

    fn update(
        &self,
        table: &str,
        values: &ContentValues,
        clause: &WhereClause<'_>,
    ) -> Result<usize, ProviderError> {
        values.validate_columns()?;
        if values.is_empty() {
            debug!(db = self.name, table, "update with no values");
            return Ok(0);
        }
        let statement = update(table)
            .set_values(values.clone())
            .where_clause(clause.clone())
            .build();
        debug!(db = self.name, table, columns = values.len(), "update");
        self.execute(&statement)
    }

    fn delete(&self, table: &str, clause: &WhereClause<'_>) -> Result<usize, ProviderError> {
        let statement = delete(table).where_clause(clause.clone()).build();
        debug!(db = self.name, table, "delete");
        self.execute(&statement)
    }

    fn delete_and_prune(
        &self,
        table: &str,
        clause: &WhereClause<'_>,
        prune: &[(&str, WhereClause<'_>)],
    ) -> Result<usize, ProviderError> {
        let statement = delete(table).where_clause(clause.clone()).build();
        debug!(db = self.name, table, prune = prune.len(), "delete and prune");

        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        let deleted = run(&tx, &statement)?;
        if deleted > 0 {
            for (target, clause) in prune {
                let pruned = run(&tx, &delete(*target).where_clause(clause.clone()).build())?;
                debug!(db = self.name, table = *target, pruned, "pruned");
            }
        }
        tx.commit()?;
        Ok(deleted)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn run(connection: &Connection, statement: &Statement) -> rusqlite::Result<usize> {
    let mut stmt = connection.prepare_cached(&statement.sql)?;
    stmt.execute(params_from_iter(statement.params.iter().map(to_sql_value)))
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(*v),
        Value::Real(v) => SqlValue::Real(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::Blob(v) => SqlValue::Blob(v.clone()),
    }
}

fn from_sql_value(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => Value::Integer(v),
        SqlValue::Real(v) => Value::Real(v),
        SqlValue::Text(v) => Value::Text(v),
        SqlValue::Blob(v) => Value::Blob(v),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), ProviderError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|err| ProviderError::Db(format!("{}: {err}", parent.display()))),
        _ => Ok(()),
    }
}

fn read_user_version(connection: &Connection) -> rusqlite::Result<i64> {
    connection.pragma_query_value(None, "user_version", |row| row.get(0))
}

fn write_user_version(tx: &Transaction<'_>, version: i64) -> rusqlite::Result<()> {
    tx.pragma_update(None, "user_version", version)
}

fn run_all(tx: &Transaction<'_>, statements: &[&str]) -> rusqlite::Result<()> {
    statements.iter().try_for_each(|sql| tx.execute_batch(sql))
}

/// Create or upgrade the schema, or fail if the stored version is unknown.
fn initialize_schema(connection: &mut Connection, schema: &Schema) -> Result<(), ProviderError> {
    let tx = connection.transaction()?;
    let stored = read_user_version(&tx)?;

    match stored {
        0 => {
            run_all(&tx, schema.create)?;
            write_user_version(&tx, schema.version)?;
            info!(db = schema.name, version = schema.version, "created schema");
        },
        v if v == schema.version => {},
        v if v > schema.version => {
            return Err(ProviderError::VersionMismatch(format!(
                "{} schema version {v} is newer than supported version {}",
                schema.name, schema.version
            )));
        },
        mut version => {
            while version < schema.version {
                let Some(step) = schema.upgrade_from(version) else {
                    warn!(db = schema.name, from = version, "no upgrade path");
                    return Err(ProviderError::VersionMismatch(format!(
                        "{} schema version {version} cannot be upgraded to {}",
                        schema.name, schema.version
                    )));
                };
                run_all(&tx, step.steps)?;
                version += 1;
                info!(db = schema.name, from = step.from, to = version, "upgraded schema");
            }
            write_user_version(&tx, schema.version)?;
        },
    }

    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use telephony_sql::{Projection, Selection};

    use super::*;

    const NOTES_V1: &str = "CREATE TABLE notes (_id INTEGER PRIMARY KEY, body TEXT)";
    const NOTES_V2: &str = "ALTER TABLE notes ADD COLUMN pinned INTEGER NOT NULL DEFAULT 0";

    const NOTES: Schema = Schema {
        name: "notes",
        version: 2,
        create: &[NOTES_V1, NOTES_V2],
        upgrades: &[Upgrade {
            from: 1,
            steps: &[NOTES_V2],
        }],
    };

    fn executor() -> SqliteExecutor {
        SqliteExecutor::open_in_memory(&NOTES).unwrap()
    }

    #[test]
    fn test_fresh_database_is_stamped() {
        assert_eq!(executor().schema_version().unwrap(), 2);
    }

    #[test]
    fn test_upgrade_applies_missing_steps() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(NOTES_V1).unwrap();
        conn.execute_batch("INSERT INTO notes (body) VALUES ('kept'); PRAGMA user_version = 1;")
            .unwrap();

        let executor = SqliteExecutor::from_connection(conn, &NOTES).unwrap();
        assert_eq!(executor.schema_version().unwrap(), 2);

        let rows = executor.query(&QueryRequest::new("notes")).unwrap();
        assert_eq!(rows.columns(), ["_id", "body", "pinned"].map(String::from));
        assert_eq!(rows.first().unwrap().get_i64(2), Some(0));
    }

    #[test]
    fn test_newer_version_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 9;").unwrap();
        let err = SqliteExecutor::from_connection(conn, &NOTES).unwrap_err();
        assert!(matches!(err, ProviderError::VersionMismatch(_)));
    }

    #[test]
    fn test_missing_upgrade_step_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = -1;").unwrap();
        let err = SqliteExecutor::from_connection(conn, &NOTES).unwrap_err();
        assert!(matches!(err, ProviderError::VersionMismatch(_)));
    }

    #[test]
    fn test_crud_round() {
        let executor = executor();
        let id = executor
            .insert("notes", &ContentValues::new().with("body", "first"))
            .unwrap();
        executor
            .insert("notes", &ContentValues::new().with("body", "second"))
            .unwrap();
        assert_eq!(id, 1);

        let changed = executor
            .update(
                "notes",
                &ContentValues::new().with("pinned", 1),
                &WhereClause::new().selection(
                    Selection::parse("body = ?").unwrap(),
                    vec![Value::from("second")],
                ),
            )
            .unwrap();
        assert_eq!(changed, 1);

        let rows = executor
            .query(&QueryRequest {
                projection: Projection::columns(&["body"]),
                where_clause: WhereClause::new().filter("pinned", 1),
                ..QueryRequest::new("notes")
            })
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().unwrap().get_text(0), Some("second"));

        assert_eq!(executor.delete("notes", &WhereClause::new()).unwrap(), 2);
    }

    #[test]
    fn test_delete_and_prune() {
        let executor = executor();
        for body in ["a", "b", "c"] {
            executor
                .insert("notes", &ContentValues::new().with("body", body))
                .unwrap();
        }
        let body_is = |body: &'static str| {
            WhereClause::new()
                .selection(Selection::parse("body = ?").unwrap(), vec![Value::from(body)])
        };

        // Nothing matched, so nothing is pruned
        let deleted = executor
            .delete_and_prune("notes", &body_is("zzz"), &[("notes", body_is("c"))])
            .unwrap();
        assert_eq!(deleted, 0);
        assert_eq!(executor.query(&QueryRequest::new("notes")).unwrap().len(), 3);

        let deleted = executor
            .delete_and_prune("notes", &body_is("a"), &[("notes", body_is("c"))])
            .unwrap();
        assert_eq!(deleted, 1);
        let rows = executor.query(&QueryRequest::new("notes")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().unwrap().get_text(1), Some("b"));
    }

    #[test]
    fn test_failed_prune_rolls_back_delete() {
        let executor = executor();
        executor
            .insert("notes", &ContentValues::new().with("body", "kept"))
            .unwrap();

        // Unbound placeholder makes the prune step fail
        let broken = WhereClause::new().selection(Selection::parse("body = ?").unwrap(), vec![]);
        let err = executor
            .delete_and_prune("notes", &WhereClause::new(), &[("notes", broken)])
            .unwrap_err();
        assert!(matches!(err, ProviderError::Db(_)));
        assert_eq!(executor.query(&QueryRequest::new("notes")).unwrap().len(), 1);
    }

    #[test]
    fn test_insert_rejects_bad_column() {
        let err = executor()
            .insert("notes", &ContentValues::new().with("body) --", "x"))
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidColumn(_)));
    }

    #[test]
    fn test_argument_count_mismatch_is_db_error() {
        let err = executor()
            .delete(
                "notes",
                &WhereClause::new().selection(Selection::parse("body = ?").unwrap(), vec![]),
            )
            .unwrap_err();
        assert!(matches!(err, ProviderError::Db(_)));
    }

    #[test]
    fn test_empty_update_touches_nothing() {
        let executor = executor();
        executor
            .insert("notes", &ContentValues::new().with("body", "x"))
            .unwrap();
        assert_eq!(
            executor
                .update("notes", &ContentValues::new(), &WhereClause::new())
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::file(dir.path().join("nested").join("notes.db"));
        {
            let executor = SqliteExecutor::open(&config, &NOTES).unwrap();
            executor
                .insert("notes", &ContentValues::new().with("body", "durable"))
                .unwrap();
        }
        let reopened = SqliteExecutor::open(&config, &NOTES).unwrap();
        assert_eq!(reopened.schema_version().unwrap(), 2);
        assert_eq!(reopened.query(&QueryRequest::new("notes")).unwrap().len(), 1);
    }
}
