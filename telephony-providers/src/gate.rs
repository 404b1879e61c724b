//! Admission of caller-supplied selection, projection and sort text.

use serde::{Deserialize, Serialize};
use telephony_sql::{Projection, Selection, SortOrder, Value};
use tracing::warn;

use crate::error::ProviderError;

/// What a provider does when a caller selection fails the parenthesis check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Suppress the operation: queries return `Ok(None)`, updates and
    /// deletes return `Ok(0)`. Storage is never reached.
    #[default]
    FailClosed,
    /// Return [`ProviderError::MalformedSelection`].
    Reject,
}

/// Outcome of admitting a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gate<'a> {
    /// Run the operation with this (possibly absent) selection.
    Proceed(Option<Selection<'a>>),
    /// Skip the operation and report an empty outcome.
    Suppress,
}

impl SelectionPolicy {
    /// Validate `clause` and decide whether the operation may run.
    ///
    /// The clause text is never logged.
    pub(crate) fn admit<'a>(
        self,
        table: &str,
        operation: &'static str,
        clause: &'a str,
    ) -> Result<Gate<'a>, ProviderError> {
        match Selection::parse(clause) {
            Ok(selection) => Ok(Gate::Proceed(selection)),
            Err(err) => {
                warn!(
                    table,
                    operation,
                    reason = err.reason(),
                    policy = ?self,
                    "rejected caller selection"
                );
                match self {
                    Self::FailClosed => Ok(Gate::Suppress),
                    Self::Reject => Err(err.into()),
                }
            },
        }
    }
}

/// Parse a caller projection.
pub(crate) fn projection(entries: &[&str]) -> Result<Projection, ProviderError> {
    Ok(Projection::parse(entries)?)
}

/// Parse a caller sort order, falling back to `default` when empty.
pub(crate) fn sort_order(sort: &str, default: &str) -> Result<SortOrder, ProviderError> {
    let order = SortOrder::parse(sort)?;
    if order.is_empty() {
        Ok(SortOrder::parse(default)?)
    } else {
        Ok(order)
    }
}

/// Selection arguments bind as text, like string arguments on the platform.
pub(crate) fn text_args(args: &[&str]) -> Vec<Value> {
    args.iter().map(|arg| Value::from(*arg)).collect()
}

/// Current time in milliseconds since the Unix epoch.
pub(crate) fn unix_millis() -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use telephony_sql::MalformedSelection;

    use super::*;

    #[test]
    fn test_fail_closed_suppresses() {
        let gate = SelectionPolicy::FailClosed
            .admit("conversations", "query", "1=1) OR (1=1")
            .unwrap();
        assert_eq!(gate, Gate::Suppress);
    }

    #[test]
    fn test_reject_returns_error() {
        let err = SelectionPolicy::Reject
            .admit("conversations", "query", ") OR (1=1")
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::MalformedSelection(MalformedSelection::UnexpectedClose { position: 0 })
        ));
    }

    #[test]
    fn test_accepted_selections_proceed() {
        for policy in [SelectionPolicy::FailClosed, SelectionPolicy::Reject] {
            assert_eq!(policy.admit("sms", "query", "").unwrap(), Gate::Proceed(None));
            let Gate::Proceed(Some(selection)) = policy.admit("sms", "query", "(read=1)").unwrap()
            else {
                panic!("expected a selection");
            };
            assert_eq!(selection.as_str(), "(read=1)");
        }
    }

    #[test]
    fn test_sort_order_default() {
        assert_eq!(sort_order("", "date DESC").unwrap().to_sql(), "date DESC");
        assert_eq!(sort_order("_id", "date DESC").unwrap().to_sql(), "_id ASC");
        assert!(matches!(
            sort_order("random()", "date DESC"),
            Err(ProviderError::InvalidSortOrder(_))
        ));
    }

    #[test]
    fn test_policy_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: SelectionPolicy,
        }
        let parsed: Wrapper = toml::from_str("policy = \"reject\"").unwrap();
        assert_eq!(parsed.policy, SelectionPolicy::Reject);
        let parsed: Wrapper = toml::from_str("policy = \"fail_closed\"").unwrap();
        assert_eq!(parsed.policy, SelectionPolicy::FailClosed);
    }
}
