//! Shared fixtures for provider integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};

use telephony_providers::{
    CARRIER_SCHEMA, ProviderError, QueryExecutor, QueryRequest, Rows, SqliteExecutor,
    TELEPHONY_SCHEMA,
};
use telephony_sql::{ContentValues, Selection, WhereClause};

/// Install a test-writer subscriber once per test binary.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "telephony_providers=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn telephony_db() -> Arc<SqliteExecutor> {
    init_tracing();
    Arc::new(SqliteExecutor::open_in_memory(&TELEPHONY_SCHEMA).unwrap())
}

pub fn carrier_db() -> Arc<SqliteExecutor> {
    init_tracing();
    Arc::new(SqliteExecutor::open_in_memory(&CARRIER_SCHEMA).unwrap())
}

/// One call seen by [`RecordingExecutor`], with the rendered SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query { table: String, sql: String },
    Insert { table: String },
    Update { table: String, sql: String },
    Delete { table: String, sql: String },
}

/// Executor double that records every call and returns empty results.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<Call>>,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        init_tracing();
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl QueryExecutor for RecordingExecutor {
    fn query(&self, request: &QueryRequest<'_>) -> Result<Rows, ProviderError> {
        self.record(Call::Query {
            table: request.table.to_string(),
            sql: request.to_statement().sql,
        });
        Ok(Rows::empty(vec!["_id".to_string()]))
    }

    fn insert(&self, table: &str, _values: &ContentValues) -> Result<i64, ProviderError> {
        self.record(Call::Insert {
            table: table.to_string(),
        });
        Ok(1)
    }

    fn update(
        &self,
        table: &str,
        values: &ContentValues,
        clause: &WhereClause<'_>,
    ) -> Result<usize, ProviderError> {
        let sql = telephony_sql::update(table)
            .set_values(values.clone())
            .where_clause(clause.clone())
            .build()
            .sql;
        self.record(Call::Update {
            table: table.to_string(),
            sql,
        });
        Ok(0)
    }

    fn delete(&self, table: &str, clause: &WhereClause<'_>) -> Result<usize, ProviderError> {
        let sql = telephony_sql::delete(table)
            .where_clause(clause.clone())
            .build()
            .sql;
        self.record(Call::Delete {
            table: table.to_string(),
            sql,
        });
        Ok(0)
    }

    fn delete_and_prune(
        &self,
        table: &str,
        clause: &WhereClause<'_>,
        _prune: &[(&str, WhereClause<'_>)],
    ) -> Result<usize, ProviderError> {
        // Nothing is ever deleted, so there is nothing to prune
        self.delete(table, clause)
    }
}

/// What [`InterferingExecutor`] does once, as if another writer raced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interference {
    /// The next `threads` lookup finds nothing.
    StaleThreadLookup,
    /// Empty threads are deleted just before the next `sms` insert.
    PruneBeforeInsert,
}

/// Telephony database whose next matching call is disturbed once.
#[derive(Debug)]
pub struct InterferingExecutor {
    inner: Arc<SqliteExecutor>,
    interference: Interference,
    pending: AtomicBool,
}

impl InterferingExecutor {
    pub fn new(inner: Arc<SqliteExecutor>, interference: Interference) -> Arc<Self> {
        Arc::new(Self {
            inner,
            interference,
            pending: AtomicBool::new(true),
        })
    }

    /// Whether the interference already happened.
    pub fn fired(&self) -> bool {
        !self.pending.load(Ordering::SeqCst)
    }

    fn fire(&self, interference: Interference) -> bool {
        self.interference == interference && self.pending.swap(false, Ordering::SeqCst)
    }
}

impl QueryExecutor for InterferingExecutor {
    fn query(&self, request: &QueryRequest<'_>) -> Result<Rows, ProviderError> {
        if request.table == "threads" && self.fire(Interference::StaleThreadLookup) {
            return Ok(Rows::empty(vec!["_id".to_string()]));
        }
        self.inner.query(request)
    }

    fn insert(&self, table: &str, values: &ContentValues) -> Result<i64, ProviderError> {
        if table == "sms" && self.fire(Interference::PruneBeforeInsert) {
            let empty = Selection::parse(
                "_id NOT IN (SELECT thread_id FROM sms WHERE thread_id IS NOT NULL)",
            )?;
            self.inner
                .delete("threads", &WhereClause::new().selection(empty, vec![]))?;
        }
        self.inner.insert(table, values)
    }

    fn update(
        &self,
        table: &str,
        values: &ContentValues,
        clause: &WhereClause<'_>,
    ) -> Result<usize, ProviderError> {
        self.inner.update(table, values, clause)
    }

    fn delete(&self, table: &str, clause: &WhereClause<'_>) -> Result<usize, ProviderError> {
        self.inner.delete(table, clause)
    }

    fn delete_and_prune(
        &self,
        table: &str,
        clause: &WhereClause<'_>,
        prune: &[(&str, WhereClause<'_>)],
    ) -> Result<usize, ProviderError> {
        self.inner.delete_and_prune(table, clause, prune)
    }
}
