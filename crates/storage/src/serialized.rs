// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serialization adapter over the storage engine
//!
//! Writes encode domain objects before they reach SQLite; reads decode the
//! stored text back. A payload that no longer decodes into the requested
//! type is reported as a corrupt store, never skipped.

use crate::error::{CorruptStoreError, StorageError};
use crate::schema::{STATE_CHANGES, STATE_EVENTS, STATE_SNAPSHOT};
use crate::sqlite::SqliteStorage;
use chrono::{DateTime, Utc};
use paynode_core::{
    DashboardData, DashboardQuery, DashboardTable, EventId, EventRecord, Filters,
    IdentifierBound, Pagination, PaymentEventQuery, SerializationError, Serializer, SnapshotId,
    StateChangeId, StateChangeRecord, TimestampedEvent,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

/// Storage engine paired with the serializer for its payloads
pub struct SerializedStorage<S> {
    storage: SqliteStorage,
    serializer: S,
}

impl<S: Serializer> SerializedStorage<S> {
    pub fn new(storage: SqliteStorage, serializer: S) -> Self {
        Self {
            storage,
            serializer,
        }
    }

    pub fn open(path: impl AsRef<Path>, serializer: S) -> Result<Self, StorageError> {
        Ok(Self::new(SqliteStorage::open(path)?, serializer))
    }

    /// The raw engine, for queries that need no decoding
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<String, StorageError> {
        Ok(self.serializer.serialize(value)?)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        table: &'static str,
        data: &str,
    ) -> Result<T, StorageError> {
        self.serializer
            .deserialize(data)
            .map_err(|source: SerializationError| {
                warn!(table, error = %source, "stored payload does not decode");
                CorruptStoreError::Payload { table, source }.into()
            })
    }

    fn decode_events<T: DeserializeOwned>(
        &self,
        events: Vec<TimestampedEvent<String>>,
    ) -> Result<Vec<TimestampedEvent<T>>, StorageError> {
        events
            .into_iter()
            .map(|e| {
                Ok(TimestampedEvent {
                    event: self.decode(STATE_EVENTS, &e.event)?,
                    log_time: e.log_time,
                })
            })
            .collect()
    }

    pub fn write_state_change<T: Serialize>(
        &self,
        state_change: &T,
        log_time: DateTime<Utc>,
    ) -> Result<StateChangeId, StorageError> {
        let data = self.encode(state_change)?;
        self.storage.write_state_change(&data, log_time)
    }

    pub fn write_state_snapshot<T: Serialize>(
        &self,
        state_change_id: StateChangeId,
        snapshot: &T,
    ) -> Result<SnapshotId, StorageError> {
        let data = self.encode(snapshot)?;
        self.storage.write_state_snapshot(state_change_id, &data)
    }

    /// Encode every event first so a bad one leaves nothing written
    pub fn write_events<T: Serialize>(
        &self,
        state_change_id: StateChangeId,
        events: &[T],
        log_time: DateTime<Utc>,
    ) -> Result<Vec<EventId>, StorageError> {
        let encoded = events
            .iter()
            .map(|e| self.encode(e))
            .collect::<Result<Vec<_>, _>>()?;
        self.storage
            .write_events(state_change_id, encoded.iter().map(String::as_str), log_time)
    }

    pub fn get_latest_state_snapshot<T: DeserializeOwned>(
        &self,
    ) -> Result<Option<(StateChangeId, T)>, StorageError> {
        self.storage
            .get_latest_state_snapshot()?
            .map(|(id, data)| self.decode(STATE_SNAPSHOT, &data).map(|snapshot| (id, snapshot)))
            .transpose()
    }

    pub fn get_snapshot_closest_to_state_change<T: DeserializeOwned>(
        &self,
        bound: IdentifierBound,
    ) -> Result<(StateChangeId, Option<T>), StorageError> {
        let (id, data) = self.storage.get_snapshot_closest_to_state_change(bound)?;
        let snapshot = data
            .map(|data| self.decode(STATE_SNAPSHOT, &data))
            .transpose()?;
        Ok((id, snapshot))
    }

    pub fn get_latest_event_by_data_field<T: DeserializeOwned>(
        &self,
        filters: &Filters,
    ) -> Result<EventRecord<Option<T>>, StorageError> {
        self.storage
            .get_latest_event_by_data_field(filters)?
            .try_map(|data| data.map(|d| self.decode(STATE_EVENTS, &d)).transpose())
    }

    pub fn get_latest_state_change_by_data_field<T: DeserializeOwned>(
        &self,
        filters: &Filters,
    ) -> Result<StateChangeRecord<Option<T>>, StorageError> {
        self.storage
            .get_latest_state_change_by_data_field(filters)?
            .try_map(|data| data.map(|d| self.decode(STATE_CHANGES, &d)).transpose())
    }

    pub fn get_statechanges_by_identifier<T: DeserializeOwned>(
        &self,
        from: IdentifierBound,
        to: Option<IdentifierBound>,
    ) -> Result<Vec<T>, StorageError> {
        self.storage
            .get_statechanges_by_identifier(from, to)?
            .iter()
            .map(|data| self.decode(STATE_CHANGES, data))
            .collect()
    }

    pub fn get_events<T: DeserializeOwned>(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<T>, StorageError> {
        self.storage
            .get_events(pagination)?
            .iter()
            .map(|data| self.decode(STATE_EVENTS, data))
            .collect()
    }

    pub fn get_events_with_timestamps<T: DeserializeOwned>(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<TimestampedEvent<T>>, StorageError> {
        let events = self.storage.get_events_with_timestamps(pagination)?;
        self.decode_events(events)
    }

    pub fn get_payment_events<T: DeserializeOwned>(
        &self,
        query: &PaymentEventQuery,
    ) -> Result<Vec<TimestampedEvent<T>>, StorageError> {
        let events = self.storage.get_payment_events(query)?;
        self.decode_events(events)
    }

    pub fn get_dashboard_data<T: DeserializeOwned>(
        &self,
        query: &DashboardQuery,
        now: DateTime<Utc>,
    ) -> Result<DashboardData<T>, StorageError> {
        let data = self.storage.get_dashboard_data(query, now)?;
        Ok(DashboardData {
            graph: data.graph,
            table: DashboardTable {
                payments_received: self.decode_events(data.table.payments_received)?,
                payments_sent: self.decode_events(data.table.payments_sent)?,
            },
            general: data.general,
        })
    }
}

#[cfg(test)]
#[path = "serialized_tests.rs"]
mod tests;
