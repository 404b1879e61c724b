//! Column and table name validation.

use thiserror::Error;

/// Maximum length for SQL identifiers.
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// A name that cannot be spliced into a statement as an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {context} name `{name}`")]
pub struct InvalidIdentifier {
    /// What the name was used as (`"column"`, `"table"`, ...).
    pub context: &'static str,
    /// The rejected name.
    pub name: String,
}

/// Validate that a string is a safe SQL identifier.
///
/// A valid identifier starts with an ASCII letter or underscore, continues
/// with ASCII letters, digits or underscores, and is 1 to 63 bytes long.
/// Column names such as `_id`, `mcc` or `carrier_id` pass; anything with
/// quotes, whitespace, operators or non-ASCII characters does not.
///
/// # Examples
///
/// ```
/// use telephony_sql::is_valid_sql_identifier;
///
/// assert!(is_valid_sql_identifier("_id"));
/// assert!(is_valid_sql_identifier("public_key"));
///
/// assert!(!is_valid_sql_identifier(""));
/// assert!(!is_valid_sql_identifier("1st"));
/// assert!(!is_valid_sql_identifier("mcc; DROP TABLE carrier_key"));
/// ```
#[inline]
#[must_use]
pub fn is_valid_sql_identifier(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_IDENTIFIER_LENGTH {
        return false;
    }

    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// [`is_valid_sql_identifier`] as a `Result`, for names that come from callers.
pub fn check_identifier(name: &str, context: &'static str) -> Result<(), InvalidIdentifier> {
    if is_valid_sql_identifier(name) {
        Ok(())
    } else {
        Err(InvalidIdentifier {
            context,
            name: name.to_string(),
        })
    }
}

/// Assert that a string is a valid SQL identifier.
///
/// # Panics
///
/// Panics if the identifier is invalid. Intended for names fixed in code
/// (table names), not for caller input.
#[inline]
pub fn assert_valid_sql_identifier(s: &str, context: &str) {
    assert!(
        is_valid_sql_identifier(s),
        "Invalid SQL {context} name '{s}': must start with letter/underscore, \
             contain only ASCII alphanumeric/underscore, and be 1-63 chars"
    );
}
