// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write statements shared by the engine and the transaction handle
//!
//! Callers must hold the write lock: `last_insert_rowid` is only meaningful
//! when no other insert can land on the connection in between.

use crate::timestamp;
use chrono::{DateTime, Utc};
use paynode_core::{EventId, SnapshotId, StateChangeId};
use rusqlite::{params, Connection};

pub(crate) fn insert_state_change(
    conn: &Connection,
    data: &str,
    log_time: &DateTime<Utc>,
) -> rusqlite::Result<StateChangeId> {
    conn.execute(
        "INSERT INTO state_changes(identifier, data, log_time) VALUES(NULL, ?1, ?2)",
        params![data, timestamp::format(log_time)],
    )?;
    Ok(StateChangeId(conn.last_insert_rowid() as u64))
}

pub(crate) fn insert_snapshot(
    conn: &Connection,
    state_change_id: StateChangeId,
    data: &str,
) -> rusqlite::Result<SnapshotId> {
    conn.execute(
        "INSERT INTO state_snapshot(statechange_id, data) VALUES(?1, ?2)",
        params![state_change_id.sql_value(), data],
    )?;
    Ok(SnapshotId(conn.last_insert_rowid() as u64))
}

pub(crate) fn insert_events<'a>(
    conn: &Connection,
    state_change_id: StateChangeId,
    events: impl IntoIterator<Item = &'a str>,
    log_time: &DateTime<Utc>,
) -> rusqlite::Result<Vec<EventId>> {
    let log_time = timestamp::format(log_time);
    let mut stmt = conn.prepare_cached(
        "INSERT INTO state_events(identifier, source_statechange_id, log_time, data) \
         VALUES(NULL, ?1, ?2, ?3)",
    )?;
    let mut ids = Vec::new();
    for data in events {
        stmt.execute(params![state_change_id.sql_value(), log_time, data])?;
        ids.push(EventId(conn.last_insert_rowid() as u64));
    }
    Ok(ids)
}

/// Rewrite payloads in place; `rows` pairs new data with the row identifier
pub(crate) fn update_payloads(
    conn: &Connection,
    table: &'static str,
    rows: &[(String, i64)],
) -> rusqlite::Result<usize> {
    let sql = format!("UPDATE {} SET data=?1 WHERE identifier=?2", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut changed = 0;
    for (data, identifier) in rows {
        changed += stmt.execute(params![data, identifier])?;
    }
    Ok(changed)
}

/// Delete state changes together with the events they produced
///
/// Returns the number of state-change rows removed. A snapshot that still
/// references one of the state changes makes the foreign key check fail.
pub(crate) fn delete_state_changes(
    conn: &Connection,
    ids: &[StateChangeId],
) -> rusqlite::Result<usize> {
    let mut events = conn.prepare("DELETE FROM state_events WHERE source_statechange_id = ?1")?;
    let mut changes = conn.prepare("DELETE FROM state_changes WHERE identifier = ?1")?;
    let mut removed = 0;
    for id in ids {
        events.execute(params![id.sql_value()])?;
        removed += changes.execute(params![id.sql_value()])?;
    }
    Ok(removed)
}
