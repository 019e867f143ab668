// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rows read back from the log
//!
//! Records are generic over their payload: the storage engine hands out raw
//! serialized text, the serialization adapter maps them to domain objects.

use crate::id::{EventId, SnapshotId, StateChangeId};
use chrono::{DateTime, Utc};

/// A state change row
#[derive(Debug, Clone, PartialEq)]
pub struct StateChangeRecord<T> {
    pub state_change_identifier: StateChangeId,
    pub data: T,
}

/// An event row and the state change that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord<T> {
    pub event_identifier: EventId,
    pub state_change_identifier: StateChangeId,
    pub data: T,
}

/// A snapshot row
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRecord<T> {
    pub identifier: SnapshotId,
    pub state_change_identifier: StateChangeId,
    pub data: T,
}

/// An event payload with the time it was logged
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampedEvent<T> {
    pub event: T,
    pub log_time: DateTime<Utc>,
}

impl<T> StateChangeRecord<T> {
    pub fn try_map<U, E>(
        self,
        f: impl FnOnce(T) -> Result<U, E>,
    ) -> Result<StateChangeRecord<U>, E> {
        Ok(StateChangeRecord {
            state_change_identifier: self.state_change_identifier,
            data: f(self.data)?,
        })
    }
}

impl<T> StateChangeRecord<Option<T>> {
    /// The "nothing matched" record returned by latest-by-field lookups
    pub fn empty() -> Self {
        Self {
            state_change_identifier: StateChangeId::NONE,
            data: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.state_change_identifier.is_some()
    }
}

impl<T> EventRecord<T> {
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<EventRecord<U>, E> {
        Ok(EventRecord {
            event_identifier: self.event_identifier,
            state_change_identifier: self.state_change_identifier,
            data: f(self.data)?,
        })
    }
}

impl<T> EventRecord<Option<T>> {
    /// The "nothing matched" record returned by latest-by-field lookups
    pub fn empty() -> Self {
        Self {
            event_identifier: EventId::NONE,
            state_change_identifier: StateChangeId::NONE,
            data: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.event_identifier.is_some()
    }
}

impl<T> SnapshotRecord<T> {
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<SnapshotRecord<U>, E> {
        Ok(SnapshotRecord {
            identifier: self.identifier,
            state_change_identifier: self.state_change_identifier,
            data: f(self.data)?,
        })
    }
}

impl<T> TimestampedEvent<T> {
    pub fn try_map<U, E>(
        self,
        f: impl FnOnce(T) -> Result<U, E>,
    ) -> Result<TimestampedEvent<U>, E> {
        Ok(TimestampedEvent {
            event: f(self.event)?,
            log_time: self.log_time,
        })
    }
}
