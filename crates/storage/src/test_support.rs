// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures shared by this crate's tests and downstream integration tests

use crate::sqlite::SqliteStorage;
use chrono::{DateTime, Duration, TimeZone, Utc};
use paynode_core::PaymentEventKind;
use serde_json::json;
use tempfile::TempDir;

/// A store in a fresh temporary directory, removed on drop
pub struct TempStorage {
    pub storage: SqliteStorage,
    // Dropped after the storage so the file outlives the connection
    pub dir: TempDir,
}

impl TempStorage {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let storage = SqliteStorage::open(dir.path().join("node.db"))?;
        Ok(Self { storage, dir })
    }
}

/// Fixed base instant plus `seconds`, for deterministic log times
pub fn log_time(seconds: i64) -> DateTime<Utc> {
    let base = Utc
        .with_ymd_and_hms(2026, 1, 15, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    base + Duration::seconds(seconds)
}

/// JSON payload of a payment event as the node stores it
pub fn payment_event(
    kind: PaymentEventKind,
    token_network: &str,
    initiator: &str,
    target: &str,
    amount: u64,
) -> String {
    json!({
        "_type": kind.type_tag(),
        "token_network_identifier": token_network,
        "initiator": initiator,
        "target": target,
        "amount": amount,
    })
    .to_string()
}
