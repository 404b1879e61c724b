//! Carrier public-key store.
//!
//! One row per key: MCC/MNC, the carrier id (`-1` when unknown), optional
//! MVNO match data, the key type and the key itself. Rows for the same
//! network with different carrier ids coexist, so an operator key and an
//! MVNO key can be stored side by side.

use std::sync::Arc;

use telephony_sql::{ContentValues, WhereClause};
use tracing::debug;

use crate::error::ProviderError;
use crate::executor::{QueryExecutor, QueryRequest};
use crate::gate::{self, Gate, SelectionPolicy};
use crate::rows::Rows;
use crate::sqlite::{Schema, Upgrade};

/// Table holding the keys.
pub const TABLE: &str = "carrier_key";

/// Carrier id stored for keys provisioned before carrier ids existed.
pub const UNKNOWN_CARRIER_ID: i64 = -1;

/// Column names of [`TABLE`].
pub mod columns {
    /// Row id.
    pub const ID: &str = "_id";
    /// Mobile country code.
    pub const MCC: &str = "mcc";
    /// Mobile network code.
    pub const MNC: &str = "mnc";
    /// Carrier id, [`UNKNOWN_CARRIER_ID`](super::UNKNOWN_CARRIER_ID) when unknown.
    pub const CARRIER_ID: &str = "carrier_id";
    /// MVNO match type.
    pub const MVNO_TYPE: &str = "mvno_type";
    /// MVNO match value.
    pub const MVNO_MATCH_DATA: &str = "mvno_match_data";
    /// Key usage type.
    pub const KEY_TYPE: &str = "key_type";
    /// Identifier issued with the key.
    pub const KEY_IDENTIFIER: &str = "key_identifier";
    /// Encoded public key.
    pub const PUBLIC_KEY: &str = "public_key";
    /// Expiration time in seconds since the epoch.
    pub const EXPIRATION_TIME: &str = "expiration_time";
    /// Last write, milliseconds since the epoch.
    pub const LAST_MODIFIED: &str = "last_modified";
}

const CREATE_TABLE: &str = "CREATE TABLE carrier_key (
    _id INTEGER PRIMARY KEY,
    mcc TEXT NOT NULL DEFAULT '',
    mnc TEXT NOT NULL DEFAULT '',
    carrier_id INTEGER NOT NULL DEFAULT -1,
    mvno_type TEXT NOT NULL DEFAULT '',
    mvno_match_data TEXT NOT NULL DEFAULT '',
    key_type INTEGER NOT NULL DEFAULT 0,
    key_identifier TEXT NOT NULL DEFAULT '',
    public_key BLOB NOT NULL DEFAULT '',
    expiration_time INTEGER NOT NULL DEFAULT 0,
    last_modified INTEGER NOT NULL DEFAULT 0,
    UNIQUE (mcc, mnc, carrier_id, mvno_type, mvno_match_data, key_type)
)";

/// Layout before carrier ids, kept for upgrade tests.
pub const CREATE_TABLE_V2: &str = "CREATE TABLE carrier_key (
    _id INTEGER PRIMARY KEY,
    mcc TEXT NOT NULL DEFAULT '',
    mnc TEXT NOT NULL DEFAULT '',
    mvno_type TEXT NOT NULL DEFAULT '',
    mvno_match_data TEXT NOT NULL DEFAULT '',
    key_type INTEGER NOT NULL DEFAULT 0,
    key_identifier TEXT NOT NULL DEFAULT '',
    public_key BLOB NOT NULL DEFAULT '',
    expiration_time INTEGER NOT NULL DEFAULT 0,
    last_modified INTEGER NOT NULL DEFAULT 0,
    UNIQUE (mcc, mnc, mvno_type, mvno_match_data, key_type)
)";

/// Schema of the carrier database.
pub const CARRIER_SCHEMA: Schema = Schema {
    name: "carrier",
    version: 3,
    create: &[CREATE_TABLE],
    upgrades: &[Upgrade {
        from: 2,
        steps: &[
            "ALTER TABLE carrier_key RENAME TO carrier_key_v2",
            CREATE_TABLE,
            "INSERT INTO carrier_key (_id, mcc, mnc, mvno_type, mvno_match_data, key_type,
                key_identifier, public_key, expiration_time, last_modified)
             SELECT _id, mcc, mnc, mvno_type, mvno_match_data, key_type,
                key_identifier, public_key, expiration_time, last_modified
             FROM carrier_key_v2",
            "DROP TABLE carrier_key_v2",
        ],
    }],
};

/// CRUD facade over [`TABLE`].
#[derive(Debug, Clone)]
pub struct CarrierProvider {
    executor: Arc<dyn QueryExecutor>,
    policy: SelectionPolicy,
}

impl CarrierProvider {
    /// Provider over `executor`, whose database must use [`CARRIER_SCHEMA`].
    pub fn new(executor: Arc<dyn QueryExecutor>, policy: SelectionPolicy) -> Self {
        Self { executor, policy }
    }

    /// Selection policy in effect.
    pub const fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Store a key. `last_modified` is set to the current time.
    ///
    /// A second key with the same MCC, MNC, carrier id, MVNO data and key
    /// type fails with [`ProviderError::Constraint`].
    pub fn insert(&self, values: &ContentValues) -> Result<i64, ProviderError> {
        values.validate_columns()?;
        let mut row = values.clone();
        row.put(columns::LAST_MODIFIED, gate::unix_millis());
        let id = self.executor.insert(TABLE, &row)?;
        debug!(id, "stored carrier key");
        Ok(id)
    }

    /// Read keys.
    ///
    /// Returns `Ok(None)` when the selection is rejected under
    /// [`SelectionPolicy::FailClosed`].
    pub fn query(
        &self,
        projection: &[&str],
        selection: &str,
        args: &[&str],
        sort: &str,
    ) -> Result<Option<Rows>, ProviderError> {
        let projection = gate::projection(projection)?;
        let sort_order = gate::sort_order(sort, "")?;
        let selection = match self.policy.admit(TABLE, "query", selection)? {
            Gate::Proceed(selection) => selection,
            Gate::Suppress => return Ok(None),
        };

        let request = QueryRequest {
            projection,
            where_clause: WhereClause::new().selection(selection, gate::text_args(args)),
            sort_order,
            ..QueryRequest::new(TABLE)
        };
        self.executor.query(&request).map(Some)
    }

    /// Update keys matching `selection`; `last_modified` is refreshed.
    pub fn update(
        &self,
        values: &ContentValues,
        selection: &str,
        args: &[&str],
    ) -> Result<usize, ProviderError> {
        values.validate_columns()?;
        let selection = match self.policy.admit(TABLE, "update", selection)? {
            Gate::Proceed(selection) => selection,
            Gate::Suppress => return Ok(0),
        };

        let mut row = values.clone();
        row.put(columns::LAST_MODIFIED, gate::unix_millis());
        let clause = WhereClause::new().selection(selection, gate::text_args(args));
        self.executor.update(TABLE, &row, &clause)
    }

    /// Delete keys matching `selection`.
    pub fn delete(&self, selection: &str, args: &[&str]) -> Result<usize, ProviderError> {
        let selection = match self.policy.admit(TABLE, "delete", selection)? {
            Gate::Proceed(selection) => selection,
            Gate::Suppress => return Ok(0),
        };

        let clause = WhereClause::new().selection(selection, gate::text_args(args));
        self.executor.delete(TABLE, &clause)
    }
}
