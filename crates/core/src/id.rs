// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store-assigned identifiers and identifier bounds
//!
//! Identifiers are auto-incremented integers handed out by the store on
//! insert. Zero never names a real row and is used as the "nothing found"
//! marker by lookups that return a sentinel record.

use crate::error::ArgumentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Identifier that never names a stored row
            pub const NONE: Self = Self(0);

            /// True when this identifier refers to a stored row
            pub fn is_some(&self) -> bool {
                self.0 > 0
            }

            /// The identifier as an SQLite integer, saturating at `i64::MAX`
            pub fn sql_value(&self) -> i64 {
                i64::try_from(self.0).unwrap_or(i64::MAX)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Identifier of a row in `state_changes`
    StateChangeId
);
row_id!(
    /// Identifier of a row in `state_events`
    EventId
);
row_id!(
    /// Identifier of a row in `state_snapshot`
    SnapshotId
);

/// A position in the state-change log: an explicit identifier or the
/// most recently written state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierBound {
    Id(StateChangeId),
    Latest,
}

impl IdentifierBound {
    pub const LATEST_LITERAL: &'static str = "latest";
}

impl From<StateChangeId> for IdentifierBound {
    fn from(id: StateChangeId) -> Self {
        Self::Id(id)
    }
}

impl From<u64> for IdentifierBound {
    fn from(id: u64) -> Self {
        Self::Id(StateChangeId(id))
    }
}

impl FromStr for IdentifierBound {
    type Err = ArgumentError;

    /// Accepts a non-negative integer or the literal `latest`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == Self::LATEST_LITERAL {
            return Ok(Self::Latest);
        }
        trimmed
            .parse::<u64>()
            .map(Self::from)
            .map_err(|_| ArgumentError::InvalidIdentifier(s.to_string()))
    }
}

impl fmt::Display for IdentifierBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Latest => f.write_str(Self::LATEST_LITERAL),
        }
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
