//! Scope levels and the downgrade rule.
//!
//! Every context is assembled at a level. Related objects and query results
//! are assembled one level lower than the context that reaches them, and a
//! `reference` context never expands anything, so expansion depth is
//! bounded by the number of levels regardless of the content graph.
//!
//! ```text
//! detail ──► list ──► reference ──► (identifiers only)
//! ```

use std::fmt;

/// Assembly depth of a context, ordered `Reference < List < Detail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Reference,
    List,
    Detail,
}

impl Level {
    /// Parse a scope name. Only the three level names are levels.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "reference" => Some(Self::Reference),
            "list" => Some(Self::List),
            "detail" => Some(Self::Detail),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::List => "list",
            Self::Detail => "detail",
        }
    }

    /// The level related objects are assembled at, or `None` when nothing
    /// may be expanded.
    pub const fn downgrade(self) -> Option<Self> {
        match self {
            Self::Detail => Some(Self::List),
            Self::List => Some(Self::Reference),
            Self::Reference => None,
        }
    }

    /// Level for a query's results: its requested scope when that is below
    /// `self`, otherwise the downgraded level.
    pub fn for_query(self, requested: Option<&str>) -> Option<Self> {
        let downgraded = self.downgrade()?;
        Some(
            requested
                .and_then(Self::from_name)
                .filter(|level| *level < downgraded)
                .unwrap_or(downgraded),
        )
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
