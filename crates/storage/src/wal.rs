// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log facade
//!
//! The state-change log is the source of truth: a state change is appended
//! before it is applied, the events it produces are appended after, and
//! snapshots only bound how much of the log a restart has to replay.

use crate::error::StorageError;
use crate::serialized::SerializedStorage;
use paynode_core::{
    Clock, EventId, EventRecord, Filters, IdentifierBound, Serializer, SnapshotId,
    StateChangeId, StateChangeRecord, SystemClock,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// What a restart needs: the closest snapshot and the log after it
#[derive(Debug, Clone, PartialEq)]
pub struct Restore<St, Sc> {
    /// State change the snapshot was taken at, `NONE` without a snapshot
    pub snapshot_state_change_id: StateChangeId,
    pub snapshot: Option<St>,
    /// State changes after the snapshot, oldest first
    pub pending: Vec<Sc>,
}

/// Append-and-replay interface over serialized storage
pub struct WriteAheadLog<S, C = SystemClock> {
    storage: SerializedStorage<S>,
    clock: C,
}

impl<S: Serializer> WriteAheadLog<S> {
    /// Open or create a log stamped with the system clock
    pub fn open(path: impl AsRef<Path>, serializer: S) -> Result<Self, StorageError> {
        Ok(Self::new(SerializedStorage::open(path, serializer)?, SystemClock))
    }
}

impl<S: Serializer, C: Clock> WriteAheadLog<S, C> {
    pub fn new(storage: SerializedStorage<S>, clock: C) -> Self {
        Self { storage, clock }
    }

    pub fn storage(&self) -> &SerializedStorage<S> {
        &self.storage
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Append a state change before applying it
    pub fn append_state_change<T: Serialize>(
        &self,
        state_change: &T,
    ) -> Result<StateChangeId, StorageError> {
        self.storage.write_state_change(state_change, self.clock.now())
    }

    /// Append the events produced while applying `state_change_id`
    pub fn append_events<T: Serialize>(
        &self,
        state_change_id: StateChangeId,
        events: &[T],
    ) -> Result<Vec<EventId>, StorageError> {
        self.storage
            .write_events(state_change_id, events, self.clock.now())
    }

    /// Record the state reached after applying `state_change_id`
    pub fn append_snapshot<T: Serialize>(
        &self,
        state_change_id: StateChangeId,
        snapshot: &T,
    ) -> Result<SnapshotId, StorageError> {
        let id = self.storage.write_state_snapshot(state_change_id, snapshot)?;
        info!(%state_change_id, snapshot_id = %id, "snapshot taken");
        Ok(id)
    }

    pub fn latest_snapshot<T: DeserializeOwned>(
        &self,
    ) -> Result<Option<(StateChangeId, T)>, StorageError> {
        self.storage.get_latest_state_snapshot()
    }

    pub fn snapshot_closest_to<T: DeserializeOwned>(
        &self,
        bound: IdentifierBound,
    ) -> Result<(StateChangeId, Option<T>), StorageError> {
        self.storage.get_snapshot_closest_to_state_change(bound)
    }

    /// State changes in `[from, to]`, oldest first
    pub fn replay_range<T: DeserializeOwned>(
        &self,
        from: IdentifierBound,
        to: Option<IdentifierBound>,
    ) -> Result<Vec<T>, StorageError> {
        self.storage.get_statechanges_by_identifier(from, to)
    }

    pub fn latest_event_matching<T: DeserializeOwned>(
        &self,
        filters: &Filters,
    ) -> Result<EventRecord<Option<T>>, StorageError> {
        self.storage.get_latest_event_by_data_field(filters)
    }

    pub fn latest_state_change_matching<T: DeserializeOwned>(
        &self,
        filters: &Filters,
    ) -> Result<StateChangeRecord<Option<T>>, StorageError> {
        self.storage.get_latest_state_change_by_data_field(filters)
    }

    /// Load the snapshot closest to `target` and the state changes after it
    pub fn restore<St, Sc>(&self, target: IdentifierBound) -> Result<Restore<St, Sc>, StorageError>
    where
        St: DeserializeOwned,
        Sc: DeserializeOwned,
    {
        let (snapshot_state_change_id, snapshot) = self.snapshot_closest_to(target)?;
        let from = StateChangeId(snapshot_state_change_id.0 + 1);
        let pending = self.replay_range(from.into(), Some(target))?;

        info!(
            %snapshot_state_change_id,
            has_snapshot = snapshot.is_some(),
            pending = pending.len(),
            "state restored from log"
        );
        Ok(Restore {
            snapshot_state_change_id,
            snapshot,
            pending,
        })
    }

    /// Rebuild state up to `target` by folding pending state changes
    ///
    /// Starts from the closest snapshot, or from `initial()` when the log
    /// has none.
    pub fn replay_with<St, Sc>(
        &self,
        target: IdentifierBound,
        initial: impl FnOnce() -> St,
        mut apply: impl FnMut(&mut St, Sc),
    ) -> Result<St, StorageError>
    where
        St: DeserializeOwned,
        Sc: DeserializeOwned,
    {
        let restore = self.restore::<St, Sc>(target)?;
        let mut state = restore.snapshot.unwrap_or_else(initial);
        let mut applied = 0usize;
        for state_change in restore.pending {
            apply(&mut state, state_change);
            applied += 1;
        }
        debug!(applied, "state changes replayed");
        Ok(state)
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
