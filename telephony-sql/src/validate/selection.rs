//! Parenthesis balance check for caller-supplied selection clauses.
//!
//! Providers wrap every selection in parentheses before appending it to a
//! statement that may already carry its own conditions:
//!
//! ```text
//! SELECT _id FROM sms WHERE (type = ?1) AND (<selection>)
//! ```
//!
//! A selection such as `1=1) OR (1=1` would close the wrapping parenthesis
//! early and turn the trusted condition into a no-op. The check here rejects
//! any clause whose running parenthesis depth goes negative or does not end
//! at zero. Nothing else about the clause is inspected.

use thiserror::Error;

/// A selection clause failed the parenthesis balance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MalformedSelection {
    /// A `)` was found with no unmatched `(` before it.
    #[error("unbalanced brackets: `)` at byte {position} closes nothing")]
    UnexpectedClose {
        /// Byte offset of the offending `)`.
        position: usize,
    },
    /// The clause ended with `(` still open.
    #[error("unbalanced brackets: {open} `(` left open")]
    UnclosedOpen {
        /// Number of parentheses left open at the end of the clause.
        open: usize,
    },
}

impl MalformedSelection {
    /// Short, stable reason shared by every variant.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        "unbalanced brackets"
    }
}

/// Verdict of [`validate_selection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum ValidationResult {
    /// The clause is structurally well-formed.
    Accepted,
    /// The clause must not reach the database.
    Rejected(MalformedSelection),
}

impl ValidationResult {
    /// Returns `true` for [`ValidationResult::Accepted`].
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Convert into a `Result` for `?` propagation.
    pub const fn into_result(self) -> Result<(), MalformedSelection> {
        match self {
            Self::Accepted => Ok(()),
            Self::Rejected(err) => Err(err),
        }
    }
}

/// Check that every `)` closes an earlier `(` and that every `(` is closed.
///
/// The empty string is accepted (no filter). Runs in a single pass over the
/// bytes of `clause`; `(` and `)` are ASCII so byte positions are always on
/// character boundaries.
///
/// # Examples
///
/// ```
/// use telephony_sql::{MalformedSelection, ValidationResult, validate_selection};
///
/// assert_eq!(validate_selection("(read=1)"), ValidationResult::Accepted);
/// assert_eq!(validate_selection(""), ValidationResult::Accepted);
/// assert_eq!(
///     validate_selection("1=1) OR (1=1"),
///     ValidationResult::Rejected(MalformedSelection::UnexpectedClose { position: 3 })
/// );
/// ```
pub fn validate_selection(clause: &str) -> ValidationResult {
    let mut depth = 0usize;

    for (position, byte) in clause.bytes().enumerate() {
        match byte {
            b'(' => depth += 1,
            b')' => match depth.checked_sub(1) {
                Some(next) => depth = next,
                None => {
                    return ValidationResult::Rejected(MalformedSelection::UnexpectedClose {
                        position,
                    });
                },
            },
            _ => {},
        }
    }

    if depth == 0 {
        ValidationResult::Accepted
    } else {
        ValidationResult::Rejected(MalformedSelection::UnclosedOpen { open: depth })
    }
}

/// [`validate_selection`] as a `Result`.
#[inline]
pub fn check_selection(clause: &str) -> Result<(), MalformedSelection> {
    validate_selection(clause).into_result()
}

/// Returns `true` if `clause` passes [`validate_selection`].
#[inline]
#[must_use]
pub fn is_balanced_selection(clause: &str) -> bool {
    validate_selection(clause).is_accepted()
}

/// A selection clause that passed the balance check.
///
/// Builders only accept this type, so an unchecked clause cannot be
/// interpolated into a statement. The check counts parentheses only; it
/// does not parse comments or string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a>(&'a str);

impl<'a> Selection<'a> {
    /// Validate `clause`.
    ///
    /// Returns `Ok(None)` when the clause is empty or only whitespace, which
    /// callers treat as "no filter".
    pub fn parse(clause: &'a str) -> Result<Option<Self>, MalformedSelection> {
        check_selection(clause)?;
        let trimmed = clause.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Self(trimmed)))
        }
    }

    /// The validated clause text.
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        self.0
    }
}
