//! `ORDER BY` validation.

use thiserror::Error;

use super::column::is_valid_sql_identifier;

/// A sort-order term that is not `column [ASC|DESC]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported sort term `{term}`")]
pub struct SortOrderError {
    /// The rejected term.
    pub term: String,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    /// `ASC`
    #[default]
    Asc,
    /// `DESC`
    Desc,
}

impl SortDir {
    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sort field with direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Column name.
    pub field: String,
    /// Direction.
    pub dir: SortDir,
}

impl SortField {
    /// Create a new sort field.
    ///
    /// # Panics
    ///
    /// Panics if the field name is not a valid SQL identifier.
    pub fn new(field: impl Into<String>, dir: SortDir) -> Self {
        let field = field.into();
        super::column::assert_valid_sql_identifier(&field, "sort field");
        Self { field, dir }
    }
}

/// A validated `ORDER BY` list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOrder {
    fields: Vec<SortField>,
}

impl SortOrder {
    /// Parse a sort string like `"date DESC, _id"`.
    ///
    /// Terms are comma-separated; each is a column optionally followed by
    /// `ASC` or `DESC` (case-insensitive). Empty terms are skipped, so an empty
    /// string yields an empty order.
    ///
    /// # Examples
    ///
    /// ```
    /// use telephony_sql::SortOrder;
    ///
    /// let order = SortOrder::parse("date DESC, _id").unwrap();
    /// assert_eq!(order.to_sql(), "date DESC, _id ASC");
    ///
    /// assert!(SortOrder::parse("date; DROP TABLE sms").is_err());
    /// ```
    pub fn parse(sort: &str) -> Result<Self, SortOrderError> {
        let mut fields = Vec::new();

        for part in sort.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let reject = || SortOrderError {
                term: part.to_string(),
            };

            let mut tokens = part.split_whitespace();
            let field = tokens.next().ok_or_else(reject)?;
            let dir = match tokens.next() {
                None => SortDir::Asc,
                Some(kw) if kw.eq_ignore_ascii_case("asc") => SortDir::Asc,
                Some(kw) if kw.eq_ignore_ascii_case("desc") => SortDir::Desc,
                Some(_) => return Err(reject()),
            };

            if tokens.next().is_some() || !is_valid_sql_identifier(field) {
                return Err(reject());
            }

            fields.push(SortField {
                field: field.to_string(),
                dir,
            });
        }

        Ok(Self { fields })
    }

    /// Sort order fixed in code.
    #[must_use]
    pub fn by(fields: Vec<SortField>) -> Self {
        Self { fields }
    }

    /// The validated sort fields.
    #[must_use]
    pub fn fields(&self) -> &[SortField] {
        &self.fields
    }

    /// Returns `true` when no ordering is requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render the term list (without the `ORDER BY` keyword).
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.fields
            .iter()
            .map(|s| format!("{} {}", s.field, s.dir.as_sql()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
