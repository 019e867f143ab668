// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed state-change log
//!
//! One connection per store, guarded by a mutex because a rusqlite
//! connection cannot be shared between threads. Writers additionally take
//! the write lock for the whole insert-and-commit so the identifier read
//! back through `last_insert_rowid` is always their own. Readers only take
//! the connection and may interleave with writers between statements.

use crate::batch::Pages;
use crate::config::StorageConfig;
use crate::error::{CorruptStoreError, StorageError};
use crate::query::{self, SqlQuery, Table};
use crate::schema::{CREATE_TABLES, STATE_CHANGES, STATE_EVENTS, STATE_SNAPSHOT};
use crate::statements;
use crate::timestamp;
use crate::transaction::StorageTransaction;
use chrono::{DateTime, Utc};
use paynode_core::{
    ArgumentError, Combinator, EventId, EventRecord, Filters, IdentifierBound, Pagination,
    PaymentEventQuery, SnapshotId, SnapshotRecord, StateChangeId, StateChangeRecord,
    TimestampedEvent,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Durable store for state changes, events and snapshots
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    write_lock: Mutex<()>,
    config: StorageConfig,
}

impl SqliteStorage {
    /// Open or create a store with default configuration
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open_with(StorageConfig::for_path(path))
    }

    /// Open or create a store
    ///
    /// Fails with `CorruptStore` when an existing file is not a usable
    /// database or does not accept the schema.
    pub fn open_with(config: StorageConfig) -> Result<Self, StorageError> {
        let open_err = |source| CorruptStoreError::Open {
            path: config.path.clone(),
            source,
        };
        let schema_err = |source| CorruptStoreError::Schema {
            path: config.path.clone(),
            source,
        };

        let mut conn = Connection::open(&config.path).map_err(open_err)?;
        Self::configure(&conn, &config).map_err(open_err)?;

        let tx = conn.transaction().map_err(schema_err)?;
        tx.execute_batch(CREATE_TABLES).map_err(schema_err)?;
        tx.commit().map_err(schema_err)?;

        info!(
            path = %config.path.display(),
            journal_mode = config.journal_mode.as_pragma(),
            "storage opened"
        );

        Ok(Self {
            conn: Mutex::new(conn),
            write_lock: Mutex::new(()),
            config,
        })
    }

    fn configure(conn: &Connection, config: &StorageConfig) -> rusqlite::Result<()> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.pragma_update_and_check(None, "locking_mode", "NORMAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.pragma_update_and_check(
            None,
            "journal_mode",
            config.journal_mode.as_pragma(),
            |row| row.get::<_, String>(0),
        )?;
        conn.busy_timeout(config.busy_timeout)?;
        Ok(())
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `op` inside its own transaction while holding the write lock
    pub(crate) fn write<T>(
        &self,
        op: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StorageError> {
        let _write = self.write_guard();
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let out = op(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Begin an explicit transaction
    ///
    /// The handle holds the write lock and the connection until it is
    /// committed, rolled back or dropped. Use its write methods; calling
    /// this store's own methods from the same thread before the handle is
    /// gone would wait on locks the handle holds.
    pub fn transaction(&self) -> Result<StorageTransaction<'_>, StorageError> {
        let write = self.write_guard();
        let conn = self.conn();
        StorageTransaction::begin(write, conn)
    }

    /// Run `f` in a transaction: commit on `Ok`, roll back on `Err`
    pub fn with_transaction<T>(
        &self,
        f: impl FnOnce(&StorageTransaction<'_>) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let tx = self.transaction()?;
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback() {
                    warn!(error = %rollback, "rollback after failed transaction body failed");
                }
                Err(e)
            }
        }
    }

    // === Writes ===

    /// Append one state change; returns its identifier
    pub fn write_state_change(
        &self,
        data: &str,
        log_time: DateTime<Utc>,
    ) -> Result<StateChangeId, StorageError> {
        let id = self.write(|conn| statements::insert_state_change(conn, data, &log_time))?;
        debug!(state_change_id = %id, "state change written");
        Ok(id)
    }

    /// Record a snapshot taken after applying `state_change_id`
    pub fn write_state_snapshot(
        &self,
        state_change_id: StateChangeId,
        data: &str,
    ) -> Result<SnapshotId, StorageError> {
        let id = self.write(|conn| statements::insert_snapshot(conn, state_change_id, data))?;
        debug!(snapshot_id = %id, %state_change_id, "snapshot written");
        Ok(id)
    }

    /// Append the events produced by one state change as a single batch
    pub fn write_events<'a>(
        &self,
        state_change_id: StateChangeId,
        events: impl IntoIterator<Item = &'a str>,
        log_time: DateTime<Utc>,
    ) -> Result<Vec<EventId>, StorageError> {
        let ids =
            self.write(|conn| statements::insert_events(conn, state_change_id, events, &log_time))?;
        debug!(%state_change_id, count = ids.len(), "events written");
        Ok(ids)
    }

    /// Rewrite state-change payloads in place (migrations only)
    pub fn update_state_changes(
        &self,
        rows: &[(String, StateChangeId)],
    ) -> Result<usize, StorageError> {
        let rows: Vec<_> = rows.iter().map(|(d, id)| (d.clone(), id.sql_value())).collect();
        self.write(|conn| statements::update_payloads(conn, STATE_CHANGES, &rows))
    }

    /// Rewrite event payloads in place (migrations only)
    pub fn update_events(&self, rows: &[(String, EventId)]) -> Result<usize, StorageError> {
        let rows: Vec<_> = rows.iter().map(|(d, id)| (d.clone(), id.sql_value())).collect();
        self.write(|conn| statements::update_payloads(conn, STATE_EVENTS, &rows))
    }

    /// Rewrite snapshot payloads in place (migrations only)
    pub fn update_snapshots(&self, rows: &[(String, SnapshotId)]) -> Result<usize, StorageError> {
        let rows: Vec<_> = rows.iter().map(|(d, id)| (d.clone(), id.sql_value())).collect();
        self.write(|conn| statements::update_payloads(conn, STATE_SNAPSHOT, &rows))
    }

    pub fn update_snapshot(
        &self,
        identifier: SnapshotId,
        data: &str,
    ) -> Result<usize, StorageError> {
        self.update_snapshots(&[(data.to_string(), identifier)])
    }

    /// Prune state changes and the events they produced
    pub fn delete_state_changes(&self, ids: &[StateChangeId]) -> Result<usize, StorageError> {
        let removed = self.write(|conn| statements::delete_state_changes(conn, ids))?;
        info!(requested = ids.len(), removed, "state changes pruned");
        Ok(removed)
    }

    // === State changes ===

    pub fn count_state_changes(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(1) FROM state_changes", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn latest_state_change_id(conn: &Connection) -> rusqlite::Result<StateChangeId> {
        let id: Option<i64> = conn
            .query_row(
                "SELECT identifier FROM state_changes ORDER BY identifier DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(StateChangeId(id.unwrap_or(0) as u64))
    }

    /// State-change payloads in `[from, to]`, oldest first
    ///
    /// `to = None` selects the single state change at `from`; with
    /// `from = Latest` that is the most recent one. `to = Latest` runs to
    /// the end of the log.
    pub fn get_statechanges_by_identifier(
        &self,
        from: IdentifierBound,
        to: Option<IdentifierBound>,
    ) -> Result<Vec<String>, StorageError> {
        let (sql, params): (&str, Vec<i64>) = match (from, to) {
            (IdentifierBound::Latest, Some(_)) => {
                return Err(ArgumentError::LatestWithUpperBound.into());
            }
            (IdentifierBound::Latest, None) => (
                "SELECT data FROM state_changes ORDER BY identifier DESC LIMIT 1",
                vec![],
            ),
            (IdentifierBound::Id(from), None) => (
                "SELECT data FROM state_changes WHERE identifier = ?1",
                vec![from.sql_value()],
            ),
            (IdentifierBound::Id(from), Some(IdentifierBound::Latest)) => (
                "SELECT data FROM state_changes WHERE identifier >= ?1 ORDER BY identifier ASC",
                vec![from.sql_value()],
            ),
            (IdentifierBound::Id(from), Some(IdentifierBound::Id(to))) => (
                "SELECT data FROM state_changes WHERE identifier BETWEEN ?1 AND ?2 \
                 ORDER BY identifier ASC",
                vec![from.sql_value(), to.sql_value()],
            ),
        };

        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        debug!(%from, rows = rows.len(), "state changes read by identifier");
        Ok(rows)
    }

    /// Filtered page of state-change records
    pub fn get_state_change_records(
        &self,
        filters: &Filters,
        combinator: Combinator,
        pagination: Pagination,
    ) -> Result<Vec<StateChangeRecord<String>>, StorageError> {
        let query = query::filtered(Table::StateChanges, filters, combinator, pagination)?;
        self.query_rows(&query, state_change_record)
    }

    /// Unfiltered page of state-change payloads
    pub fn get_state_changes(&self, pagination: Pagination) -> Result<Vec<String>, StorageError> {
        let records = self.get_state_change_records(&Filters::new(), Combinator::And, pagination)?;
        Ok(records.into_iter().map(|r| r.data).collect())
    }

    /// Lazily page through state-change records matching `filters`
    pub fn batch_query_state_changes(
        &self,
        batch_size: u64,
        filters: Filters,
        combinator: Combinator,
    ) -> Result<
        Pages<impl FnMut(Pagination) -> Result<Vec<StateChangeRecord<String>>, StorageError> + '_>,
        StorageError,
    > {
        filters.validate()?;
        let pages = Pages::new(batch_size, move |page: Pagination| {
            self.get_state_change_records(&filters, combinator, page)
        })?;
        Ok(pages)
    }

    /// Most recent state change matching every filter, or the empty record
    pub fn get_latest_state_change_by_data_field(
        &self,
        filters: &Filters,
    ) -> Result<StateChangeRecord<Option<String>>, StorageError> {
        let query = query::latest_by_field(Table::StateChanges, filters)?;
        let found = self.query_rows(&query, state_change_record)?.into_iter().next();
        Ok(found.map_or_else(StateChangeRecord::empty, |r| StateChangeRecord {
            state_change_identifier: r.state_change_identifier,
            data: Some(r.data),
        }))
    }

    // === Events ===

    /// Filtered page of event records
    pub fn get_event_records(
        &self,
        filters: &Filters,
        combinator: Combinator,
        pagination: Pagination,
    ) -> Result<Vec<EventRecord<String>>, StorageError> {
        let query = query::filtered(Table::StateEvents, filters, combinator, pagination)?;
        self.query_rows(&query, event_record)
    }

    /// Lazily page through event records matching `filters`
    pub fn batch_query_event_records(
        &self,
        batch_size: u64,
        filters: Filters,
        combinator: Combinator,
    ) -> Result<
        Pages<impl FnMut(Pagination) -> Result<Vec<EventRecord<String>>, StorageError> + '_>,
        StorageError,
    > {
        filters.validate()?;
        let pages = Pages::new(batch_size, move |page: Pagination| {
            self.get_event_records(&filters, combinator, page)
        })?;
        Ok(pages)
    }

    /// Most recent event matching every filter, or the empty record
    pub fn get_latest_event_by_data_field(
        &self,
        filters: &Filters,
    ) -> Result<EventRecord<Option<String>>, StorageError> {
        let query = query::latest_by_field(Table::StateEvents, filters)?;
        let found = self.query_rows(&query, event_record)?.into_iter().next();
        Ok(found.map_or_else(EventRecord::empty, |r| EventRecord {
            event_identifier: r.event_identifier,
            state_change_identifier: r.state_change_identifier,
            data: Some(r.data),
        }))
    }

    /// Unfiltered page of event payloads
    pub fn get_events(&self, pagination: Pagination) -> Result<Vec<String>, StorageError> {
        let events = self.get_events_with_timestamps(pagination)?;
        Ok(events.into_iter().map(|e| e.event).collect())
    }

    /// Unfiltered page of event payloads with their log time
    pub fn get_events_with_timestamps(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<TimestampedEvent<String>>, StorageError> {
        let query = SqlQuery {
            sql: "SELECT data, log_time FROM state_events ORDER BY identifier ASC LIMIT ? OFFSET ?"
                .to_string(),
            params: vec![
                pagination.sql_limit().into(),
                pagination.sql_offset().into(),
            ],
        };
        self.timestamped_events(&query)
    }

    /// Payment events as seen from the local node
    pub fn get_payment_events(
        &self,
        query: &PaymentEventQuery,
    ) -> Result<Vec<TimestampedEvent<String>>, StorageError> {
        let sql = query::payment_events(query)?;
        let events = self.timestamped_events(&sql)?;
        debug!(rows = events.len(), "payment events read");
        Ok(events)
    }

    // === Snapshots ===

    /// Most recently written snapshot as `(state_change_id, data)`
    pub fn get_latest_state_snapshot(
        &self,
    ) -> Result<Option<(StateChangeId, String)>, StorageError> {
        let row = self
            .conn()
            .query_row(
                "SELECT statechange_id, data FROM state_snapshot ORDER BY identifier DESC LIMIT 1",
                [],
                |row| Ok((StateChangeId(row.get::<_, i64>(0)? as u64), row.get(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    /// Snapshot with the greatest `statechange_id` not past `bound`
    ///
    /// Returns `(0, None)` when no snapshot qualifies.
    pub fn get_snapshot_closest_to_state_change(
        &self,
        bound: IdentifierBound,
    ) -> Result<(StateChangeId, Option<String>), StorageError> {
        let conn = self.conn();
        let limit = match bound {
            IdentifierBound::Id(id) => id,
            IdentifierBound::Latest => Self::latest_state_change_id(&conn)?,
        };

        let row = conn
            .query_row(
                "SELECT statechange_id, data FROM state_snapshot WHERE statechange_id <= ?1 \
                 ORDER BY statechange_id DESC, identifier DESC LIMIT 1",
                params![limit.sql_value()],
                |row| Ok((StateChangeId(row.get::<_, i64>(0)? as u64), row.get(1)?)),
            )
            .optional()?;

        Ok(match row {
            Some((id, data)) => (id, Some(data)),
            None => (StateChangeId::NONE, None),
        })
    }

    pub fn get_snapshots(&self) -> Result<Vec<SnapshotRecord<String>>, StorageError> {
        let query = SqlQuery {
            sql: "SELECT identifier, statechange_id, data FROM state_snapshot \
                  ORDER BY identifier ASC"
                .to_string(),
            params: vec![],
        };
        self.query_rows(&query, |row| {
            Ok(SnapshotRecord {
                identifier: SnapshotId(row.get::<_, i64>(0)? as u64),
                state_change_identifier: StateChangeId(row.get::<_, i64>(1)? as u64),
                data: row.get(2)?,
            })
        })
    }

    // === Row helpers ===

    pub(crate) fn query_rows<T>(
        &self,
        query: &SqlQuery,
        map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&query.sql)?;
        let rows = stmt
            .query_map(query.bind(), map)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Run a query selecting `data, log_time`
    pub(crate) fn timestamped_events(
        &self,
        query: &SqlQuery,
    ) -> Result<Vec<TimestampedEvent<String>>, StorageError> {
        let rows = self.query_rows(query, |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        rows.into_iter()
            .map(|(event, log_time)| {
                Ok(TimestampedEvent {
                    event,
                    log_time: timestamp::parse(STATE_EVENTS, &log_time)?,
                })
            })
            .collect()
    }
}

fn state_change_record(row: &Row<'_>) -> rusqlite::Result<StateChangeRecord<String>> {
    Ok(StateChangeRecord {
        state_change_identifier: StateChangeId(row.get::<_, i64>(0)? as u64),
        data: row.get(1)?,
    })
}

fn event_record(row: &Row<'_>) -> rusqlite::Result<EventRecord<String>> {
    Ok(EventRecord {
        event_identifier: EventId(row.get::<_, i64>(0)? as u64),
        state_change_identifier: StateChangeId(row.get::<_, i64>(1)? as u64),
        data: row.get(2)?,
    })
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
