//! Conversation-level reads across the message tables.

use std::fmt;
use std::sync::Arc;

use telephony_sql::WhereClause;

use crate::error::ProviderError;
use crate::executor::{QueryExecutor, QueryRequest};
use crate::gate::{self, Gate, SelectionPolicy};
use crate::rows::Rows;
use crate::sms;

/// What a conversation query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmsSmsTarget {
    /// One summary row per thread: `_id`, `address`, `date`,
    /// `message_count`, `read` and `snippet`. Newest first by default.
    Conversations,
    /// Messages of one thread, oldest first by default.
    ConversationMessages(i64),
}

impl MmsSmsTarget {
    const fn table(self) -> &'static str {
        match self {
            Self::Conversations => sms::CONVERSATIONS_VIEW,
            Self::ConversationMessages(_) => sms::TABLE,
        }
    }

    const fn default_sort(self) -> &'static str {
        match self {
            Self::Conversations => "date DESC",
            Self::ConversationMessages(_) => "date ASC",
        }
    }

    fn where_clause<'a>(self) -> WhereClause<'a> {
        match self {
            Self::Conversations => WhereClause::new(),
            Self::ConversationMessages(thread_id) => {
                WhereClause::new().filter(sms::columns::THREAD_ID, thread_id)
            },
        }
    }
}

impl fmt::Display for MmsSmsTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conversations => f.write_str("mms-sms/conversations"),
            Self::ConversationMessages(id) => write!(f, "mms-sms/conversations/{id}"),
        }
    }
}

/// Read-only conversation provider over the telephony database.
#[derive(Debug, Clone)]
pub struct MmsSmsProvider {
    executor: Arc<dyn QueryExecutor>,
    policy: SelectionPolicy,
}

impl MmsSmsProvider {
    /// Provider over `executor`, whose database must use
    /// [`TELEPHONY_SCHEMA`](crate::sms::TELEPHONY_SCHEMA).
    pub fn new(executor: Arc<dyn QueryExecutor>, policy: SelectionPolicy) -> Self {
        Self { executor, policy }
    }

    /// Query conversations or the messages of one conversation.
    ///
    /// The selection is checked before anything else touches storage. A
    /// clause with unbalanced parentheses yields `Ok(None)` under
    /// [`SelectionPolicy::FailClosed`] and
    /// [`ProviderError::MalformedSelection`] under
    /// [`SelectionPolicy::Reject`]; the executor is not called either way.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use telephony_providers::{
    ///     MmsSmsProvider, MmsSmsTarget, SelectionPolicy, SqliteExecutor, TELEPHONY_SCHEMA,
    /// };
    ///
    /// let executor = Arc::new(SqliteExecutor::open_in_memory(&TELEPHONY_SCHEMA).unwrap());
    /// let provider = MmsSmsProvider::new(executor, SelectionPolicy::FailClosed);
    ///
    /// let rows = provider
    ///     .query(MmsSmsTarget::Conversations, &["_id"], "(read=1)", &[], "")
    ///     .unwrap();
    /// assert!(rows.is_some());
    ///
    /// let rows = provider
    ///     .query(MmsSmsTarget::Conversations, &["_id"], "1=1) OR (1=1", &[], "")
    ///     .unwrap();
    /// assert!(rows.is_none());
    /// ```
    pub fn query(
        &self,
        target: MmsSmsTarget,
        projection: &[&str],
        selection: &str,
        args: &[&str],
        sort: &str,
    ) -> Result<Option<Rows>, ProviderError> {
        let table = target.table();
        let selection = match self.policy.admit(table, "query", selection)? {
            Gate::Proceed(selection) => selection,
            Gate::Suppress => return Ok(None),
        };
        let projection = gate::projection(projection)?;
        let sort_order = gate::sort_order(sort, target.default_sort())?;

        let request = QueryRequest {
            projection,
            where_clause: target
                .where_clause()
                .selection(selection, gate::text_args(args)),
            sort_order,
            ..QueryRequest::new(table)
        };
        self.executor.query(&request).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets() {
        assert_eq!(MmsSmsTarget::Conversations.table(), "conversations");
        assert_eq!(MmsSmsTarget::ConversationMessages(4).table(), "sms");
        assert!(MmsSmsTarget::Conversations.where_clause().is_empty());
        assert_eq!(
            MmsSmsTarget::ConversationMessages(4).to_string(),
            "mms-sms/conversations/4"
        );
    }
}
