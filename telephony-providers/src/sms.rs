//! SMS messages and their conversation threads.

use std::fmt;
use std::sync::Arc;

use telephony_sql::{ContentValues, Projection, Selection, Value, WhereClause};
use tracing::debug;

use crate::error::ProviderError;
use crate::executor::{QueryExecutor, QueryRequest};
use crate::gate::{self, Gate, SelectionPolicy};
use crate::rows::Rows;
use crate::sqlite::Schema;

/// Message table.
pub const TABLE: &str = "sms";

/// Thread table, one row per address.
pub const THREADS_TABLE: &str = "threads";

/// Per-thread summary view.
pub const CONVERSATIONS_VIEW: &str = "conversations";

/// Column names of [`TABLE`].
pub mod columns {
    /// Row id.
    pub const ID: &str = "_id";
    /// Owning thread.
    pub const THREAD_ID: &str = "thread_id";
    /// Other party's address.
    pub const ADDRESS: &str = "address";
    /// Received or created, milliseconds since the epoch.
    pub const DATE: &str = "date";
    /// Sent, milliseconds since the epoch.
    pub const DATE_SENT: &str = "date_sent";
    /// 1 once read.
    pub const READ: &str = "read";
    /// 1 once shown to the user.
    pub const SEEN: &str = "seen";
    /// Delivery status.
    pub const STATUS: &str = "status";
    /// Box, see [`message_type`](super::message_type).
    pub const TYPE: &str = "type";
    /// Subject line.
    pub const SUBJECT: &str = "subject";
    /// Message text.
    pub const BODY: &str = "body";
    /// 1 when protected from bulk deletes.
    pub const LOCKED: &str = "locked";
}

/// Values of the `type` column.
pub mod message_type {
    /// Any box.
    pub const ALL: i64 = 0;
    /// Received.
    pub const INBOX: i64 = 1;
    /// Sent.
    pub const SENT: i64 = 2;
    /// Draft.
    pub const DRAFT: i64 = 3;
    /// Waiting to be sent.
    pub const OUTBOX: i64 = 4;
    /// Send failed.
    pub const FAILED: i64 = 5;
    /// Queued for later.
    pub const QUEUED: i64 = 6;
}

/// Schema of the telephony database.
pub const TELEPHONY_SCHEMA: Schema = Schema {
    name: "telephony",
    version: 1,
    create: &[
        "CREATE TABLE threads (
            _id INTEGER PRIMARY KEY AUTOINCREMENT,
            address TEXT NOT NULL UNIQUE,
            date INTEGER NOT NULL DEFAULT 0
        )",
        "CREATE TABLE sms (
            _id INTEGER PRIMARY KEY AUTOINCREMENT,
            thread_id INTEGER REFERENCES threads (_id) ON DELETE CASCADE,
            address TEXT,
            date INTEGER,
            date_sent INTEGER DEFAULT 0,
            read INTEGER DEFAULT 0,
            seen INTEGER DEFAULT 0,
            status INTEGER DEFAULT -1,
            type INTEGER,
            subject TEXT,
            body TEXT,
            locked INTEGER DEFAULT 0
        )",
        "CREATE INDEX sms_thread_id ON sms (thread_id)",
        // Computed columns carry no affinity unless CAST, and text arguments
        // would then never equal their numbers
        "CREATE VIEW conversations AS
            SELECT t._id AS _id,
                t.address AS address,
                CAST((SELECT MAX(s.date) FROM sms s WHERE s.thread_id = t._id)
                    AS INTEGER) AS date,
                CAST((SELECT COUNT(*) FROM sms s WHERE s.thread_id = t._id)
                    AS INTEGER) AS message_count,
                CAST((SELECT COALESCE(MIN(s.read), 1) FROM sms s WHERE s.thread_id = t._id)
                    AS INTEGER) AS read,
                CAST((SELECT s.body FROM sms s WHERE s.thread_id = t._id
                    ORDER BY s.date DESC, s._id DESC LIMIT 1) AS TEXT) AS snippet
            FROM threads t",
    ],
    upgrades: &[],
};

const ORPHAN_THREADS: &str = "_id NOT IN (SELECT thread_id FROM sms WHERE thread_id IS NOT NULL)";

/// Subset of messages an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsTarget {
    /// Every message.
    All,
    /// Received messages.
    Inbox,
    /// Sent messages.
    Sent,
    /// Drafts.
    Draft,
    /// Messages waiting to be sent.
    Outbox,
    /// Messages that failed to send.
    Failed,
    /// Messages queued for later.
    Queued,
    /// One message by row id.
    Message(i64),
}

impl SmsTarget {
    /// The `type` value this target is restricted to.
    pub const fn message_type(self) -> Option<i64> {
        match self {
            Self::All | Self::Message(_) => None,
            Self::Inbox => Some(message_type::INBOX),
            Self::Sent => Some(message_type::SENT),
            Self::Draft => Some(message_type::DRAFT),
            Self::Outbox => Some(message_type::OUTBOX),
            Self::Failed => Some(message_type::FAILED),
            Self::Queued => Some(message_type::QUEUED),
        }
    }

    fn where_clause<'a>(self) -> WhereClause<'a> {
        match self {
            Self::Message(id) => WhereClause::new().filter(columns::ID, id),
            other => match other.message_type() {
                Some(kind) => WhereClause::new().filter(columns::TYPE, kind),
                None => WhereClause::new(),
            },
        }
    }
}

impl fmt::Display for SmsTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("sms"),
            Self::Inbox => f.write_str("sms/inbox"),
            Self::Sent => f.write_str("sms/sent"),
            Self::Draft => f.write_str("sms/draft"),
            Self::Outbox => f.write_str("sms/outbox"),
            Self::Failed => f.write_str("sms/failed"),
            Self::Queued => f.write_str("sms/queued"),
            Self::Message(id) => write!(f, "sms/{id}"),
        }
    }
}

/// CRUD facade over [`TABLE`].
#[derive(Debug, Clone)]
pub struct SmsProvider {
    executor: Arc<dyn QueryExecutor>,
    policy: SelectionPolicy,
}

impl SmsProvider {
    /// Provider over `executor`, whose database must use [`TELEPHONY_SCHEMA`].
    pub fn new(executor: Arc<dyn QueryExecutor>, policy: SelectionPolicy) -> Self {
        Self { executor, policy }
    }

    /// Store a message and return its row id.
    ///
    /// Box targets force the `type` column; [`SmsTarget::All`] defaults it to
    /// inbox. `date` defaults to now and `thread_id` is looked up (or
    /// created) from `address` when not given.
    pub fn insert(&self, target: SmsTarget, values: &ContentValues) -> Result<i64, ProviderError> {
        if let SmsTarget::Message(_) = target {
            return Err(ProviderError::Unsupported {
                target: target.to_string(),
                operation: "insert",
            });
        }
        values.validate_columns()?;

        let mut row = values.clone();
        match target.message_type() {
            Some(kind) => {
                row.put(columns::TYPE, kind);
            },
            None => {
                row.put_if_absent(columns::TYPE, message_type::INBOX);
            },
        }
        row.put_if_absent(columns::DATE, gate::unix_millis());

        // Address whose thread this insert resolved, if any
        let resolved = if row.contains(columns::THREAD_ID) {
            None
        } else {
            row.get(columns::ADDRESS)
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        if let Some(address) = &resolved {
            let thread_id = self.thread_id_for(address)?;
            row.put(columns::THREAD_ID, thread_id);
        }

        let id = match (self.executor.insert(TABLE, &row), resolved) {
            // A concurrent delete pruned the new, still empty thread
            (Err(ProviderError::Constraint(_)), Some(address)) => {
                debug!(scope = %target, "thread pruned before insert, retrying");
                let thread_id = self.thread_id_for(&address)?;
                row.put(columns::THREAD_ID, thread_id);
                self.executor.insert(TABLE, &row)?
            },
            (result, _) => result?,
        };
        debug!(id, scope = %target, "stored message");
        Ok(id)
    }

    /// Read messages, newest first unless `sort` says otherwise.
    ///
    /// Returns `Ok(None)` when the selection is rejected under
    /// [`SelectionPolicy::FailClosed`].
    pub fn query(
        &self,
        target: SmsTarget,
        projection: &[&str],
        selection: &str,
        args: &[&str],
        sort: &str,
    ) -> Result<Option<Rows>, ProviderError> {
        let projection = gate::projection(projection)?;
        let sort_order = gate::sort_order(sort, "date DESC")?;
        let selection = match self.policy.admit(TABLE, "query", selection)? {
            Gate::Proceed(selection) => selection,
            Gate::Suppress => return Ok(None),
        };

        let request = QueryRequest {
            projection,
            where_clause: target
                .where_clause()
                .selection(selection, gate::text_args(args)),
            sort_order,
            ..QueryRequest::new(TABLE)
        };
        self.executor.query(&request).map(Some)
    }

    /// Update messages in `target` matching `selection`.
    pub fn update(
        &self,
        target: SmsTarget,
        values: &ContentValues,
        selection: &str,
        args: &[&str],
    ) -> Result<usize, ProviderError> {
        values.validate_columns()?;
        let selection = match self.policy.admit(TABLE, "update", selection)? {
            Gate::Proceed(selection) => selection,
            Gate::Suppress => return Ok(0),
        };

        let clause = target
            .where_clause()
            .selection(selection, gate::text_args(args));
        self.executor.update(TABLE, values, &clause)
    }

    /// Delete messages in `target` matching `selection`.
    ///
    /// Threads left without messages are removed in the same transaction.
    pub fn delete(
        &self,
        target: SmsTarget,
        selection: &str,
        args: &[&str],
    ) -> Result<usize, ProviderError> {
        let selection = match self.policy.admit(TABLE, "delete", selection)? {
            Gate::Proceed(selection) => selection,
            Gate::Suppress => return Ok(0),
        };

        let clause = target
            .where_clause()
            .selection(selection, gate::text_args(args));
        let orphans = WhereClause::new().selection(Selection::parse(ORPHAN_THREADS)?, vec![]);
        let deleted = self
            .executor
            .delete_and_prune(TABLE, &clause, &[(THREADS_TABLE, orphans)])?;
        debug!(deleted, scope = %target, "deleted messages");
        Ok(deleted)
    }

    /// Thread id for `address`, creating the thread on first use.
    pub fn thread_id_for(&self, address: &str) -> Result<i64, ProviderError> {
        if let Some(id) = self.find_thread(address)? {
            return Ok(id);
        }
        let thread = ContentValues::new()
            .with("address", address)
            .with("date", gate::unix_millis());
        match self.executor.insert(THREADS_TABLE, &thread) {
            Ok(id) => Ok(id),
            // Created concurrently by another writer
            Err(ProviderError::Constraint(_)) => self.find_thread(address)?.ok_or_else(|| {
                ProviderError::Db("thread for address vanished after conflict".to_string())
            }),
            Err(err) => Err(err),
        }
    }

    fn find_thread(&self, address: &str) -> Result<Option<i64>, ProviderError> {
        let request = QueryRequest {
            projection: Projection::columns(&["_id"]),
            where_clause: WhereClause::new().filter("address", address),
            limit: Some(1),
            ..QueryRequest::new(THREADS_TABLE)
        };
        let rows = self.executor.query(&request)?;
        Ok(rows.first().and_then(|row| row.get_i64(0)))
    }
}
