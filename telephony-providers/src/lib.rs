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

//! # telephony-providers - SMS, conversation and carrier-key providers
//!
//! Each provider is a CRUD facade over tables reached through a
//! [`QueryExecutor`]. Callers pass raw selection clauses, projections and
//! sort orders; providers validate all three before a statement is built.
//!
//! A selection with unbalanced parentheses never reaches storage. What the
//! caller sees depends on the [`SelectionPolicy`]:
//!
//! | Policy | `query` | `update` / `delete` |
//! |--------|---------|---------------------|
//! | `FailClosed` (default) | `Ok(None)` | `Ok(0)` |
//! | `Reject` | `Err(MalformedSelection)` | `Err(MalformedSelection)` |
//!
//! ## Quick start
//!
//! ```
//! use telephony_providers::{ProviderConfig, SmsTarget, TelephonyProviders};
//! use telephony_sql::ContentValues;
//!
//! let providers = TelephonyProviders::open(&ProviderConfig::default()).unwrap();
//!
//! providers
//!     .sms
//!     .insert(
//!         SmsTarget::Inbox,
//!         &ContentValues::new()
//!             .with("address", "12345")
//!             .with("body", "common test body")
//!             .with("read", 1),
//!     )
//!     .unwrap();
//!
//! let unread = providers
//!     .sms
//!     .query(SmsTarget::Inbox, &["_id"], "read=?", &["0"], "")
//!     .unwrap()
//!     .unwrap();
//! assert!(unread.is_empty());
//! ```

pub mod carrier;
mod config;
mod error;
mod executor;
mod gate;
pub mod mms_sms;
mod rows;
pub mod sms;
mod sqlite;

use std::sync::Arc;

use tracing::info;

pub use carrier::{CARRIER_SCHEMA, CarrierProvider};
pub use config::{DEFAULT_BUSY_TIMEOUT_MS, DatabaseConfig, ProviderConfig};
pub use error::{ConfigError, ProviderError};
pub use executor::{QueryExecutor, QueryRequest};
pub use gate::SelectionPolicy;
pub use mms_sms::{MmsSmsProvider, MmsSmsTarget};
pub use rows::{Row, Rows};
pub use sms::{SmsProvider, SmsTarget, TELEPHONY_SCHEMA};
pub use sqlite::{Schema, SqliteExecutor, Upgrade};

/// The providers of one device, opened from a [`ProviderConfig`].
#[derive(Debug, Clone)]
pub struct TelephonyProviders {
    /// SMS messages.
    pub sms: SmsProvider,
    /// Conversations; shares the telephony database with [`sms`](Self::sms).
    pub mms_sms: MmsSmsProvider,
    /// Carrier public keys.
    pub carrier: CarrierProvider,
}

impl TelephonyProviders {
    /// Open both databases, bringing their schemas up to date.
    pub fn open(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let telephony: Arc<dyn QueryExecutor> =
            Arc::new(SqliteExecutor::open(&config.telephony, &TELEPHONY_SCHEMA)?);
        let carrier: Arc<dyn QueryExecutor> =
            Arc::new(SqliteExecutor::open(&config.carrier, &CARRIER_SCHEMA)?);
        let policy = config.selection_policy;
        info!(?policy, "opened telephony providers");

        Ok(Self {
            sms: SmsProvider::new(Arc::clone(&telephony), policy),
            mms_sms: MmsSmsProvider::new(telephony, policy),
            carrier: CarrierProvider::new(carrier, policy),
        })
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        CarrierProvider, MmsSmsProvider, MmsSmsTarget, ProviderConfig, ProviderError,
        QueryExecutor, Rows, SelectionPolicy, SmsProvider, SmsTarget, TelephonyProviders,
    };
    pub use telephony_sql::{ContentValues, Value};
}

// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
