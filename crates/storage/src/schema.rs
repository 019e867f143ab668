// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table definitions
//!
//! Every statement is idempotent so the whole script runs on each open.

/// Storage layout version written to `settings` under `version`
pub const STORAGE_VERSION: u32 = 1;

pub(crate) const STATE_CHANGES: &str = "state_changes";
pub(crate) const STATE_EVENTS: &str = "state_events";
pub(crate) const STATE_SNAPSHOT: &str = "state_snapshot";

pub(crate) const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS settings (
    name VARCHAR[24] NOT NULL PRIMARY KEY,
    value TEXT
);

CREATE TABLE IF NOT EXISTS runs (
    started_at TEXT NOT NULL,
    raiden_version TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS state_changes (
    identifier INTEGER PRIMARY KEY AUTOINCREMENT,
    data TEXT,
    log_time TEXT
);

CREATE TABLE IF NOT EXISTS state_snapshot (
    identifier INTEGER PRIMARY KEY,
    statechange_id INTEGER,
    data TEXT,
    FOREIGN KEY(statechange_id) REFERENCES state_changes(identifier)
);

CREATE TABLE IF NOT EXISTS state_events (
    identifier INTEGER PRIMARY KEY,
    source_statechange_id INTEGER NOT NULL,
    log_time TEXT,
    data TEXT,
    FOREIGN KEY(source_statechange_id) REFERENCES state_changes(identifier)
);

CREATE INDEX IF NOT EXISTS state_events_source
    ON state_events(source_statechange_id);

CREATE TABLE IF NOT EXISTS token_action (
    identifier INTEGER PRIMARY KEY,
    token TEXT NOT NULL UNIQUE,
    expires_at TEXT NOT NULL,
    action_request TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS light_client (
    address TEXT NOT NULL PRIMARY KEY,
    api_key TEXT NOT NULL
);
";
