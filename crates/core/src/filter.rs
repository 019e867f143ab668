// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filters over JSON payloads and pagination bounds
//!
//! Payloads carry no fixed relational schema, so filters address fields by
//! dotted JSON path (`balance_proof.sender`). Nested filter objects are
//! flattened into those paths before any SQL is built.

use crate::error::ArgumentError;
use serde_json::{Map, Value};

/// How individual filter clauses are joined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// Ordered set of `path = value` equality filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    entries: Vec<(String, Value)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter on a dotted path
    ///
    /// Object values are flattened, so `with("a", json!({"b": 1}))` filters
    /// on `a.b = 1`.
    pub fn with(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        let path = path.into();
        match value.into() {
            Value::Object(nested) => {
                for (sub, leaf) in flatten_filters(&nested) {
                    self.entries.push((format!("{}.{}", path, sub), leaf));
                }
            }
            leaf => self.entries.push((path, leaf)),
        }
        self
    }

    /// Build filters from a nested JSON object
    pub fn from_nested(nested: &Map<String, Value>) -> Self {
        Self {
            entries: flatten_filters(nested),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reject paths that would not survive inside a `$.` JSON path
    pub fn validate(&self) -> Result<(), ArgumentError> {
        for (path, _) in &self.entries {
            let bad = path.is_empty()
                || path.split('.').any(|segment| segment.is_empty())
                || path.contains(&['$', '"', '\'', '[', ']', ' '][..]);
            if bad {
                return Err(ArgumentError::InvalidFilterPath(path.clone()));
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |filters, (k, v)| filters.with(k, v))
    }
}

/// Flatten a nested filter object into dotted-path leaves
///
/// `{"a": {"b": 1}, "c": "x"}` becomes `[("a.b", 1), ("c", "x")]`. Key order
/// of the input is preserved.
pub fn flatten_filters(current: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut flat = Vec::new();
    for (key, value) in current {
        match value {
            Value::Object(nested) => {
                for (sub, leaf) in flatten_filters(nested) {
                    flat.push((format!("{}.{}", key, sub), leaf));
                }
            }
            leaf => flat.push((key.clone(), leaf.clone())),
        }
    }
    flat
}

/// Validated `LIMIT`/`OFFSET` pair
///
/// `limit: None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: u64,
}

impl Pagination {
    /// No limit, starting at the first row
    pub const ALL: Self = Self {
        limit: None,
        offset: 0,
    };

    /// Validate caller-supplied bounds
    ///
    /// Both must be non-negative; `None` means unbounded / zero.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self, ArgumentError> {
        let limit = match limit {
            Some(l) if l < 0 => return Err(ArgumentError::InvalidLimit(l)),
            Some(l) => Some(l as u64),
            None => None,
        };
        let offset = match offset {
            Some(o) if o < 0 => return Err(ArgumentError::InvalidOffset(o)),
            Some(o) => o as u64,
            None => 0,
        };
        Ok(Self { limit, offset })
    }

    /// A page of exactly `size` rows starting at `offset`
    pub fn page(size: u64, offset: u64) -> Self {
        Self {
            limit: Some(size),
            offset,
        }
    }

    /// Value to bind to `LIMIT ?`; SQLite reads a negative limit as unbounded
    pub fn sql_limit(&self) -> i64 {
        self.limit
            .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
            .unwrap_or(-1)
    }

    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.offset).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
