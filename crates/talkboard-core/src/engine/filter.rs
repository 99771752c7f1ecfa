use std::fmt;
use std::str::FromStr;

use crate::model::{Lifecycle, ParseEnumError, Tracked};

/// Sentinel that selects every record.
pub const ALL_SENTINEL: &str = "all";

/// Spelling of the sentinel kept by older clients.
const ALL_ALIAS: &str = "todas";

/// Either every record or exactly one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter<S> {
    All,
    Exact(S),
}

impl<S> Default for StatusFilter<S> {
    fn default() -> Self {
        Self::All
    }
}

impl<S: Lifecycle> StatusFilter<S> {
    #[must_use]
    pub fn matches(&self, status: S) -> bool {
        match self {
            Self::All => true,
            Self::Exact(wanted) => *wanted == status,
        }
    }
}

impl<S: Lifecycle> fmt::Display for StatusFilter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_SENTINEL),
            Self::Exact(status) => f.write_str(status.slug()),
        }
    }
}

impl<S: Lifecycle> FromStr for StatusFilter<S> {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(ALL_SENTINEL) || trimmed.eq_ignore_ascii_case(ALL_ALIAS) {
            return Ok(Self::All);
        }
        trimmed.parse().map(Self::Exact)
    }
}

/// Records passing `filter`, in snapshot order. The snapshot is not touched.
#[must_use]
pub fn apply<'a, R: Tracked>(records: &'a [R], filter: &StatusFilter<R::Status>) -> Vec<&'a R> {
    records
        .iter()
        .filter(|record| filter.matches(record.status()))
        .collect()
}
