//! Opening the provider bundle from configuration.

mod common;

use anyhow::{Context, Result};
use telephony_providers::carrier::columns;
use telephony_providers::{
    MmsSmsTarget, ProviderConfig, ProviderError, SelectionPolicy, SmsTarget, TelephonyProviders,
};
use telephony_sql::ContentValues;

#[test]
fn default_config_opens_in_memory() -> Result<()> {
    common::init_tracing();
    let providers = TelephonyProviders::open(&ProviderConfig::default())?;

    providers.sms.insert(
        SmsTarget::Inbox,
        &ContentValues::new().with("address", "12345").with("body", "hi"),
    )?;
    let conversations = providers
        .mms_sms
        .query(MmsSmsTarget::Conversations, &["_id"], "", &[], "")?
        .context("suppressed")?;
    assert_eq!(conversations.len(), 1, "sms and mms_sms share one database");

    let keys = providers
        .carrier
        .query(&["count(*)"], "", &[], "")?
        .context("suppressed")?;
    assert_eq!(keys.first().and_then(|row| row.get_i64(0)), Some(0));
    Ok(())
}

#[test]
fn file_databases_survive_reopen() -> Result<()> {
    common::init_tracing();
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("providers.toml");
    std::fs::write(
        &config_path,
        format!(
            "selection_policy = \"reject\"\n\
             [telephony]\npath = {:?}\n\
             [carrier]\npath = {:?}\nbusy_timeout_ms = 100\n",
            dir.path().join("telephony.db"),
            dir.path().join("keys").join("carrier.db"),
        ),
    )?;

    let config = ProviderConfig::load(&config_path)?;
    assert_eq!(config.selection_policy, SelectionPolicy::Reject);
    assert_eq!(config.carrier.busy_timeout_ms, 100);

    {
        let providers = TelephonyProviders::open(&config)?;
        providers.carrier.insert(
            &ContentValues::new()
                .with(columns::MCC, "310")
                .with(columns::MNC, "260")
                .with(columns::PUBLIC_KEY, b"KEY".as_slice()),
        )?;
    }

    let reopened = TelephonyProviders::open(&config)?;
    let rows = reopened
        .carrier
        .query(&[columns::MNC], "mcc=?", &["310"], "")?
        .context("suppressed")?;
    assert_eq!(rows.first().and_then(|row| row.get_text(0)), Some("260"));

    let err = reopened
        .mms_sms
        .query(MmsSmsTarget::Conversations, &[], ") OR (1=1", &[], "")
        .unwrap_err();
    assert!(matches!(err, ProviderError::MalformedSelection(_)));
    Ok(())
}
