// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit multi-statement transactions

use crate::error::StorageError;
use crate::schema::{STATE_CHANGES, STATE_EVENTS, STATE_SNAPSHOT};
use crate::statements;
use chrono::{DateTime, Utc};
use paynode_core::{EventId, SnapshotId, StateChangeId};
use rusqlite::Connection;
use std::sync::MutexGuard;
use tracing::{debug, warn};

/// An open `BEGIN IMMEDIATE` transaction
///
/// Holds the connection and the store's write lock until it ends. Dropping
/// an unfinished transaction rolls it back.
pub struct StorageTransaction<'a> {
    // Released before the write lock so the next writer finds the
    // connection free.
    conn: MutexGuard<'a, Connection>,
    _write: MutexGuard<'a, ()>,
    finished: bool,
}

impl<'a> StorageTransaction<'a> {
    pub(crate) fn begin(
        write: MutexGuard<'a, ()>,
        conn: MutexGuard<'a, Connection>,
    ) -> Result<Self, StorageError> {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        debug!("transaction started");
        Ok(Self {
            conn,
            _write: write,
            finished: false,
        })
    }

    pub fn commit(mut self) -> Result<(), StorageError> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        debug!("transaction committed");
        Ok(())
    }

    /// Roll back; on failure the handle is still unfinished and `Drop`
    /// tries again
    pub fn rollback(mut self) -> Result<(), StorageError> {
        self.conn.execute_batch("ROLLBACK")?;
        self.finished = true;
        debug!("transaction rolled back");
        Ok(())
    }

    pub fn write_state_change(
        &self,
        data: &str,
        log_time: DateTime<Utc>,
    ) -> Result<StateChangeId, StorageError> {
        Ok(statements::insert_state_change(&self.conn, data, &log_time)?)
    }

    pub fn write_state_snapshot(
        &self,
        state_change_id: StateChangeId,
        data: &str,
    ) -> Result<SnapshotId, StorageError> {
        Ok(statements::insert_snapshot(&self.conn, state_change_id, data)?)
    }

    pub fn write_events<'e>(
        &self,
        state_change_id: StateChangeId,
        events: impl IntoIterator<Item = &'e str>,
        log_time: DateTime<Utc>,
    ) -> Result<Vec<EventId>, StorageError> {
        Ok(statements::insert_events(
            &self.conn,
            state_change_id,
            events,
            &log_time,
        )?)
    }

    pub fn update_state_changes(
        &self,
        rows: &[(String, StateChangeId)],
    ) -> Result<usize, StorageError> {
        let rows: Vec<_> = rows.iter().map(|(d, id)| (d.clone(), id.sql_value())).collect();
        Ok(statements::update_payloads(&self.conn, STATE_CHANGES, &rows)?)
    }

    pub fn update_events(&self, rows: &[(String, EventId)]) -> Result<usize, StorageError> {
        let rows: Vec<_> = rows.iter().map(|(d, id)| (d.clone(), id.sql_value())).collect();
        Ok(statements::update_payloads(&self.conn, STATE_EVENTS, &rows)?)
    }

    pub fn update_snapshots(&self, rows: &[(String, SnapshotId)]) -> Result<usize, StorageError> {
        let rows: Vec<_> = rows.iter().map(|(d, id)| (d.clone(), id.sql_value())).collect();
        Ok(statements::update_payloads(&self.conn, STATE_SNAPSHOT, &rows)?)
    }

    pub fn delete_state_changes(&self, ids: &[StateChangeId]) -> Result<usize, StorageError> {
        Ok(statements::delete_state_changes(&self.conn, ids)?)
    }

    pub fn count_state_changes(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(1) FROM state_changes", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl Drop for StorageTransaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        match self.conn.execute_batch("ROLLBACK") {
            Ok(()) => debug!("unfinished transaction rolled back"),
            Err(e) => warn!(error = %e, "failed to roll back unfinished transaction"),
        }
    }
}

#[cfg(test)]
#[path = "transaction_tests.rs"]
mod tests;
