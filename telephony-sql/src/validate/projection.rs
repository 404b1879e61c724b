//! Projection (column list) validation.

use thiserror::Error;

use super::column::is_valid_sql_identifier;

/// A projection entry that is neither a column, `*`, nor `count(*)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported projection entry `{entry}`")]
pub struct ProjectionError {
    /// The rejected entry.
    pub entry: String,
}

/// One validated entry of a projection.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProjectionItem {
    /// `*`
    All,
    /// A plain column, optionally renamed.
    Column {
        /// Column name.
        name: String,
        /// `AS` alias.
        alias: Option<String>,
    },
    /// `COUNT(*)`, optionally renamed.
    CountAll {
        /// `AS` alias.
        alias: Option<String>,
    },
}

impl ProjectionItem {
    /// Parse a single entry such as `_id`, `*`, `body AS text` or
    /// `count(*) AS count`. Keywords are case-insensitive.
    pub fn parse(entry: &str) -> Result<Self, ProjectionError> {
        let reject = || ProjectionError {
            entry: entry.to_string(),
        };

        let mut tokens = entry.split_whitespace();
        let head = tokens.next().ok_or_else(reject)?;

        let alias = match (tokens.next(), tokens.next(), tokens.next()) {
            (None, _, _) => None,
            (Some(kw), Some(alias), None)
                if kw.eq_ignore_ascii_case("as") && is_valid_sql_identifier(alias) =>
            {
                Some(alias.to_string())
            },
            _ => return Err(reject()),
        };

        if head == "*" {
            return match alias {
                None => Ok(Self::All),
                Some(_) => Err(reject()),
            };
        }

        if head.eq_ignore_ascii_case("count(*)") {
            return Ok(Self::CountAll { alias });
        }

        if is_valid_sql_identifier(head) {
            return Ok(Self::Column {
                name: head.to_string(),
                alias,
            });
        }

        Err(reject())
    }

    /// Render the entry as it appears after `SELECT`.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let (expr, alias) = match self {
            Self::All => return "*".to_string(),
            Self::Column { name, alias } => (name.as_str(), alias),
            Self::CountAll { alias } => ("COUNT(*)", alias),
        };
        match alias {
            Some(a) => format!("{expr} AS {a}"),
            None => expr.to_string(),
        }
    }
}

/// A validated projection.
///
/// An empty projection selects every column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    items: Vec<ProjectionItem>,
}

impl Projection {
    /// Validate every entry of a caller-supplied column list.
    ///
    /// # Examples
    ///
    /// ```
    /// use telephony_sql::Projection;
    ///
    /// let projection = Projection::parse(&["count(*) AS count"]).unwrap();
    /// assert_eq!(projection.to_sql(), "COUNT(*) AS count");
    ///
    /// assert!(Projection::parse(&["_id", "(SELECT 1)"]).is_err());
    /// ```
    pub fn parse(entries: &[&str]) -> Result<Self, ProjectionError> {
        let items = entries
            .iter()
            .map(|entry| ProjectionItem::parse(entry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items })
    }

    /// Projection over plain columns fixed in code.
    ///
    /// # Panics
    ///
    /// Panics if any name is not a valid SQL identifier.
    #[must_use]
    pub fn columns(names: &[&str]) -> Self {
        let items = names
            .iter()
            .map(|name| {
                super::column::assert_valid_sql_identifier(name, "projection column");
                ProjectionItem::Column {
                    name: (*name).to_string(),
                    alias: None,
                }
            })
            .collect();
        Self { items }
    }

    /// The validated entries.
    #[must_use]
    pub fn items(&self) -> &[ProjectionItem] {
        &self.items
    }

    /// Returns `true` when every column is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render the column list.
    #[must_use]
    pub fn to_sql(&self) -> String {
        if self.items.is_empty() {
            return "*".to_string();
        }
        self.items
            .iter()
            .map(ProjectionItem::to_sql)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
